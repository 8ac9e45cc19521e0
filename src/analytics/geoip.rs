//! GeoIP lookup service using a MaxMind GeoLite2/GeoIP2 City MMDB
//!
//! The database is memory-mapped and shared between clones. Without a
//! database every lookup resolves to an empty location.

use anyhow::{Context, Result};
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use crate::analytics::models::GeoLocation;

#[derive(Clone, Default)]
pub struct GeoIpService {
    city_reader: Option<Arc<Reader<Mmap>>>,
}

impl GeoIpService {
    /// Open the City database at `city_path`, if one is configured
    pub fn new(city_path: Option<&str>) -> Result<Self> {
        let city_reader = if let Some(path) = city_path {
            let reader = unsafe { Reader::open_mmap(path) }
                .with_context(|| format!("Failed to open GeoIP City database at {}", path))?;
            Some(Arc::new(reader))
        } else {
            None
        };

        Ok(Self { city_reader })
    }

    /// A service with no database; every lookup is unresolved
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.city_reader.is_some()
    }

    /// Lookup the location of an IP address. Misses yield empty fields.
    pub fn lookup(&self, ip: IpAddr) -> GeoLocation {
        let mut geo_location = GeoLocation::default();

        let Some(ref reader) = self.city_reader else {
            return geo_location;
        };

        if let Ok(result) = reader.lookup(ip) {
            if let Ok(Some(city)) = result.decode::<geoip2::City>() {
                geo_location.country = city.country.iso_code.map(|s| s.to_string());
                geo_location.city = city.city.names.english.map(|s| s.to_string());
            } else if let Ok(Some(country)) = result.decode::<geoip2::Country>() {
                // Country-only entries still carry the ISO code
                geo_location.country = country.country.iso_code.map(|s| s.to_string());
            }
        }

        geo_location
    }
}
