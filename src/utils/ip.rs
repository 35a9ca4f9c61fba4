//! 客户端 IP 提取
//!
//! - 可信代理（trusted_proxies，单 IP 或 CIDR）
//! - 未配置时，私有 IP/localhost 连接视为反向代理

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;

pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// Accepts a bare address or `ip:port`
fn parse_peer(peer: &str) -> Option<IpAddr> {
    peer.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| peer.parse::<IpAddr>())
        .ok()
}

pub fn is_trusted_proxy(peer: &str, trusted_proxies: &[String]) -> bool {
    let Some(addr) = parse_peer(peer) else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == addr)
        }
    })
}

pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let (Ok(network), Ok(prefix_len)) = (network.parse::<IpAddr>(), prefix_len.parse::<u32>())
    else {
        return false;
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// First `X-Forwarded-For` entry, else `X-Real-IP`
pub fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header("x-real-ip"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Pick the client address given the peer and the forwarding headers
///
/// Forwarding headers are honoured only when the peer is a trusted proxy:
/// listed in `trusted_proxies`, or (when that list is empty) any private or
/// loopback peer. Otherwise the peer address wins so clients cannot spoof it.
pub fn resolve_client_ip(
    peer: Option<&str>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> Option<String> {
    let Some(peer) = peer else {
        return forwarded_ip(headers);
    };
    let peer_ip = parse_peer(peer).map(|ip| ip.to_string());

    let trusted = if trusted_proxies.is_empty() {
        parse_peer(peer).is_some_and(|ip| is_private_or_local(&ip))
    } else {
        is_trusted_proxy(peer, trusted_proxies)
    };

    if trusted && let Some(real_ip) = forwarded_ip(headers) {
        trace!("Trusted proxy {} forwarded client {}", peer, real_ip);
        return Some(real_ip);
    }
    peer_ip.or_else(|| Some(peer.to_string()))
}

pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    resolve_client_ip(peer.as_deref(), req.headers(), trusted_proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn test_is_private_or_local() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));

        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/33"));
        assert!(!ip_in_cidr(&ip, "2001:db8::/32"));

        let ip6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip6, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip6, "2001:db9::/32"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec!["127.0.0.1".to_string(), "192.168.1.0/24".to_string()];
        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("garbage", &proxies));
    }

    #[test]
    fn test_forwarded_ip() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.2")]);
        assert_eq!(forwarded_ip(&h).as_deref(), Some("203.0.113.7"));

        let h = headers(&[("x-real-ip", "198.51.100.3")]);
        assert_eq!(forwarded_ip(&h).as_deref(), Some("198.51.100.3"));

        assert_eq!(forwarded_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_resolve_client_ip() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7")]);

        // 私有 peer + 未配置代理列表 → 信任头
        assert_eq!(
            resolve_client_ip(Some("127.0.0.1"), &h, &[]).as_deref(),
            Some("203.0.113.7")
        );
        // 公网 peer → 忽略头
        assert_eq!(
            resolve_client_ip(Some("198.51.100.9"), &h, &[]).as_deref(),
            Some("198.51.100.9")
        );
        // 显式列表，peer 不在列表中
        let proxies = vec!["10.0.0.1".to_string()];
        assert_eq!(
            resolve_client_ip(Some("127.0.0.1"), &h, &proxies).as_deref(),
            Some("127.0.0.1")
        );
        assert_eq!(
            resolve_client_ip(Some("10.0.0.1"), &h, &proxies).as_deref(),
            Some("203.0.113.7")
        );
        // 私有 peer 但没有头
        assert_eq!(
            resolve_client_ip(Some("10.0.0.1"), &HeaderMap::new(), &[]).as_deref(),
            Some("10.0.0.1")
        );
    }
}
