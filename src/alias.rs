//! Random alias generation

use rand::RngExt;

/// Length of generated aliases
pub const GENERATED_ALIAS_LENGTH: usize = 6;

/// URL-safe alphabet used for generated aliases
pub const ALIAS_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a random alias.
///
/// Uniqueness is not guaranteed; callers check the link store before use.
pub fn generate_alias() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_ALIAS_LENGTH)
        .map(|_| ALIAS_ALPHABET[rng.random_range(0..ALIAS_ALPHABET.len())] as char)
        .collect()
}
