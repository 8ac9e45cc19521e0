//! Client IP extraction from HTTP headers with trust validation
//!
//! - `Cloudflare` mode trusts `CF-Connecting-IP`
//! - `Standard` mode walks `Forwarded` / `X-Forwarded-For` right to left,
//!   skipping configured proxies, then tries `X-Real-IP`
//! - Falls back to the socket peer address, if known

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::warn;

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Extract the client IP address according to the trust configuration
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<IpAddr>,
    config: &AnalyticsConfig,
) -> Option<IpAddr> {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => extract_standard_ip(headers, config).or(socket_addr),
        TrustedProxyMode::None => socket_addr,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    header_str(headers, "cf-connecting-ip").and_then(|s| s.trim().parse::<IpAddr>().ok())
}

fn extract_standard_ip(headers: &HeaderMap, config: &AnalyticsConfig) -> Option<IpAddr> {
    if let Some(chain) = forwarded_chain(headers) {
        if let Some(ip) = select_from_chain(&chain, config) {
            return Some(ip);
        }
    }

    if let Some(chain) = x_forwarded_for_chain(headers) {
        if let Some(ip) = select_from_chain(&chain, config) {
            return Some(ip);
        }
    }

    header_str(headers, "x-real-ip").and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// `for=` values of an RFC 7239 header, in hop order
fn forwarded_chain(headers: &HeaderMap) -> Option<Vec<IpAddr>> {
    let forwarded = header_str(headers, "forwarded")?;

    let chain: Vec<IpAddr> = forwarded
        .split(',')
        .flat_map(|element| element.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if !key.eq_ignore_ascii_case("for") {
                return None;
            }
            parse_forwarded_node(value)
        })
        .collect();

    (!chain.is_empty()).then_some(chain)
}

/// Accepts `1.2.3.4`, `"1.2.3.4:80"`, `"[2001:db8::1]:443"` and `"[2001:db8::1]"`
fn parse_forwarded_node(value: &str) -> Option<IpAddr> {
    let value = value.trim().trim_matches('"');

    if let Some(rest) = value.strip_prefix('[') {
        let (addr, _) = rest.split_once(']')?;
        return addr.parse::<Ipv6Addr>().ok().map(IpAddr::V6);
    }

    if let Ok(ip) = value.parse::<IpAddr>() {
        return Some(ip);
    }

    let (host, _port) = value.rsplit_once(':')?;
    host.parse::<Ipv4Addr>().ok().map(IpAddr::V4)
}

fn x_forwarded_for_chain(headers: &HeaderMap) -> Option<Vec<IpAddr>> {
    let xff = header_str(headers, "x-forwarded-for")?;

    let chain: Vec<IpAddr> = xff
        .split(',')
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect();

    (!chain.is_empty()).then_some(chain)
}

/// Pick the client out of a proxy chain (leftmost = original client)
fn select_from_chain(chain: &[IpAddr], config: &AnalyticsConfig) -> Option<IpAddr> {
    if let Some(num_trusted) = config.num_trusted_proxies {
        if chain.len() > num_trusted {
            return Some(chain[chain.len() - num_trusted - 1]);
        }
        // Not enough hops in the chain, return the leftmost (least trusted)
        return chain.first().copied();
    }

    if !config.trusted_proxies.is_empty() {
        // First address from the right that is not one of our proxies
        return chain
            .iter()
            .rev()
            .find(|ip| !config.trusted_proxies.iter().any(|net| net.contains(*ip)))
            .or_else(|| chain.first())
            .copied();
    }

    // No trust configuration, return the rightmost IP
    chain.last().copied()
}

/// Anonymize an IP address by truncating to network prefix
///
/// - IPv4: Truncate to /24 (zero last octet)
/// - IPv6: Truncate to /48 (zero last 80 bits)
pub fn anonymize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(addr) => {
            let octets = addr.octets();
            IpAddr::V4(Ipv4Addr::new(octets[0], octets[1], octets[2], 0))
        }
        IpAddr::V6(addr) => {
            let segments = addr.segments();
            IpAddr::V6(Ipv6Addr::new(
                segments[0],
                segments[1],
                segments[2],
                0,
                0,
                0,
                0,
                0,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn create_config(mode: TrustedProxyMode) -> AnalyticsConfig {
        AnalyticsConfig {
            trusted_proxy_mode: mode,
            ..AnalyticsConfig::default()
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_extract_client_ip_none_mode() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.1"));
        let config = create_config(TrustedProxyMode::None);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("192.168.1.1")));
    }

    #[test]
    fn test_no_headers_no_socket_is_unknown() {
        let config = create_config(TrustedProxyMode::Standard);
        assert_eq!(extract_client_ip(&HeaderMap::new(), None, &config), None);
    }

    #[test]
    fn test_extract_cloudflare_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.1"));
        let config = create_config(TrustedProxyMode::Cloudflare);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("203.0.113.1")));
    }

    #[test]
    fn test_cloudflare_mode_falls_back_to_socket() {
        let config = create_config(TrustedProxyMode::Cloudflare);
        let result = extract_client_ip(&HeaderMap::new(), Some(ip("192.168.1.1")), &config);
        assert_eq!(result, Some(ip("192.168.1.1")));
    }

    #[test]
    fn test_extract_x_forwarded_for_basic() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let config = create_config(TrustedProxyMode::Standard);

        let result = extract_client_ip(&headers, Some(ip("192.168.1.1")), &config);
        // Rightmost IP in the absence of trust configuration
        assert_eq!(result, Some(ip("198.51.100.1")));
    }

    #[test]
    fn test_x_forwarded_for_with_hop_count() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1, 10.0.0.2"),
        );
        let config = AnalyticsConfig {
            num_trusted_proxies: Some(2),
            ..create_config(TrustedProxyMode::Standard)
        };

        let result = extract_client_ip(&headers, None, &config);
        assert_eq!(result, Some(ip("203.0.113.1")));
    }

    #[test]
    fn test_x_forwarded_for_with_trusted_cidrs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.7, 10.1.2.3, 10.4.5.6"),
        );
        let config = AnalyticsConfig {
            trusted_proxies: vec!["10.0.0.0/8".parse().unwrap()],
            ..create_config(TrustedProxyMode::Standard)
        };

        let result = extract_client_ip(&headers, None, &config);
        assert_eq!(result, Some(ip("198.51.100.7")));
    }

    #[test]
    fn test_forwarded_header_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "forwarded",
            HeaderValue::from_static(r#"for="[2001:db8:cafe::17]:4711";proto=https, for=192.0.2.60:8080"#),
        );
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1"));
        let config = AnalyticsConfig {
            num_trusted_proxies: Some(1),
            ..create_config(TrustedProxyMode::Standard)
        };

        let result = extract_client_ip(&headers, None, &config);
        assert_eq!(result, Some(ip("2001:db8:cafe::17")));
    }

    #[test]
    fn test_x_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        let config = create_config(TrustedProxyMode::Standard);

        let result = extract_client_ip(&headers, Some(ip("127.0.0.1")), &config);
        assert_eq!(result, Some(ip("198.51.100.9")));
    }

    #[test]
    fn test_anonymize_ipv4() {
        assert_eq!(anonymize_ip(ip("192.168.1.100")), ip("192.168.1.0"));
    }

    #[test]
    fn test_anonymize_ipv6() {
        // Should zero out everything after first 48 bits (3 segments)
        assert_eq!(anonymize_ip(ip("2001:db8::1234:5678")), ip("2001:db8::"));
    }
}
