use std::sync::Arc;

use crate::analytics::device::classify_device;
use crate::analytics::geoip::GeoIpService;
use crate::analytics::ip_extractor::anonymize_ip;
use crate::analytics::models::ClickContext;
use crate::analytics::UNKNOWN;
use crate::models::NewClickEvent;

/// Turns a raw [`ClickContext`] into a storable click event
#[derive(Clone)]
pub struct ClickResolver {
    geoip: Arc<GeoIpService>,
    ip_anonymization: bool,
}

impl ClickResolver {
    pub fn new(geoip: Arc<GeoIpService>, ip_anonymization: bool) -> Self {
        Self {
            geoip,
            ip_anonymization,
        }
    }

    pub fn resolve(&self, context: &ClickContext) -> NewClickEvent {
        let client_ip = context.client_ip.map(|ip| {
            if self.ip_anonymization {
                anonymize_ip(ip)
            } else {
                ip
            }
        });

        let location = client_ip
            .map(|ip| self.geoip.lookup(ip))
            .unwrap_or_default();

        let user_agent = context
            .user_agent
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string());
        let device = classify_device(&user_agent);

        NewClickEvent {
            link_id: context.link_id,
            ip: Some(
                client_ip
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
            city: Some(location.city.unwrap_or_else(|| UNKNOWN.to_string())),
            country: Some(location.country.unwrap_or_else(|| UNKNOWN.to_string())),
            user_agent: Some(user_agent),
            device: Some(device.to_string()),
            // No user-agent parsing is done for browsers
            browser: Some(UNKNOWN.to_string()),
        }
    }
}
