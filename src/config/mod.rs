use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub links: LinkConfig,
    pub analytics: AnalyticsConfig,
    /// Populate an empty database with demo links on startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Optional upper bound on custom alias length; unbounded when unset
    pub alias_max_length: Option<usize>,
}

/// Which request headers may be trusted to carry the visitor address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Only the socket peer address is used
    None,
    /// Forwarded / X-Forwarded-For / X-Real-IP
    #[default]
    Standard,
    /// CF-Connecting-IP
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Path to a MaxMind GeoLite2-City / GeoIP2-City database
    pub geoip_city_db_path: Option<String>,
    pub ip_anonymization: bool,
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Proxies whose X-Forwarded-For entries are skipped (right to left)
    pub trusted_proxies: Vec<IpNet>,
    /// Fixed number of proxy hops in front of the service
    pub num_trusted_proxies: Option<usize>,
    /// Capacity of the click tracker queue
    pub tracker_buffer_size: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            geoip_city_db_path: None,
            ip_anonymization: false,
            trusted_proxy_mode: TrustedProxyMode::default(),
            trusted_proxies: Vec::new(),
            num_trusted_proxies: None,
            tracker_buffer_size: AnalyticsConfig::default_tracker_buffer_size(),
        }
    }
}

impl AnalyticsConfig {
    const fn default_tracker_buffer_size() -> usize {
        10_000
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn parse_trusted_proxies(raw: &str) -> anyhow::Result<Vec<IpNet>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_network(s).with_context(|| format!("invalid entry in TRUSTED_PROXIES: '{s}'"))
        })
        .collect()
}

/// Bare addresses are accepted as single-host networks
fn parse_network(s: &str) -> anyhow::Result<IpNet> {
    if let Ok(net) = s.parse::<IpNet>() {
        return Ok(net);
    }
    let ip = s.parse::<std::net::IpAddr>()?;
    let prefix = if ip.is_ipv4() { 32 } else { 128 };
    Ok(IpNet::new(ip, prefix)?)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./snaplink.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let alias_max_length = std::env::var("ALIAS_MAX_LENGTH")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("ALIAS_MAX_LENGTH must be a positive integer")?;

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "standard".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => TrustedProxyMode::None,
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'standard'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::Standard
            }
        };

        let trusted_proxies = match std::env::var("TRUSTED_PROXIES") {
            Ok(raw) => parse_trusted_proxies(&raw)?,
            Err(_) => Vec::new(),
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("NUM_TRUSTED_PROXIES must be a non-negative integer")?;

        let tracker_buffer_size = match std::env::var("TRACKER_BUFFER_SIZE") {
            Ok(v) => v
                .parse::<usize>()
                .context("TRACKER_BUFFER_SIZE must be a positive integer")?,
            Err(_) => AnalyticsConfig::default_tracker_buffer_size(),
        };

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            links: LinkConfig { alias_max_length },
            analytics: AnalyticsConfig {
                geoip_city_db_path: std::env::var("GEOIP_CITY_DB_PATH").ok(),
                ip_anonymization: env_flag("ANALYTICS_IP_ANONYMIZATION"),
                trusted_proxy_mode,
                trusted_proxies,
                num_trusted_proxies,
                tracker_buffer_size,
            },
            seed_demo_data: env_flag("SEED_DEMO_DATA"),
        })
    }
}
