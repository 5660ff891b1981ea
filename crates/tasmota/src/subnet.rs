//! Local /24 subnet detection.
//!
//! Produces the three-octet prefixes (`"192.168.1"`) of the host's
//! non-loopback IPv4 interfaces, skipping VPN tunnels whose name matches a
//! configurable pattern. When nothing qualifies the scanner still gets the
//! two most common home-router subnets.

use std::net::{IpAddr, Ipv4Addr};

use regex::Regex;

/// Used when no interface yields a usable address.
pub const FALLBACK_SUBNETS: &[&str] = &["192.168.1", "192.168.0"];

/// Interface names containing this are treated as tunnels (macOS `utunN`).
pub const DEFAULT_TUNNEL_PATTERN: &str = "utun";

/// One address bound to one interface, as seen by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub ip: IpAddr,
    pub is_loopback: bool,
}

impl InterfaceAddress {
    pub fn new(name: impl Into<String>, ip: IpAddr, is_loopback: bool) -> Self {
        Self {
            name: name.into(),
            ip,
            is_loopback,
        }
    }
}

/// Turns the host's interface list into scan targets.
#[derive(Debug, Clone)]
pub struct SubnetDetector {
    tunnel_pattern: Regex,
}

impl SubnetDetector {
    /// Build a detector skipping interfaces whose name matches `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            tunnel_pattern: Regex::new(pattern)?,
        })
    }

    /// Subnets of the interfaces present on this host right now.
    ///
    /// Interface enumeration is a blocking syscall and runs on the blocking
    /// pool.
    pub async fn detect(&self) -> Vec<String> {
        let interfaces = match tokio::task::spawn_blocking(host_interfaces).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                tracing::warn!(error = %e, "Interface enumeration failed, using fallback subnets");
                Vec::new()
            }
        };
        let subnets = self.subnets_from(&interfaces);
        tracing::debug!(interfaces = interfaces.len(), ?subnets, "Detected local subnets");
        subnets
    }

    /// Deterministic part of [`detect`](Self::detect): filter, dedupe in
    /// first-seen order, fall back when empty.
    pub fn subnets_from(&self, interfaces: &[InterfaceAddress]) -> Vec<String> {
        let mut subnets: Vec<String> = Vec::new();

        for iface in interfaces {
            if iface.is_loopback || self.tunnel_pattern.is_match(&iface.name) {
                continue;
            }
            let IpAddr::V4(ip) = iface.ip else {
                continue;
            };
            if ip.is_loopback() || ip.is_link_local() || ip.is_unspecified() {
                continue;
            }

            let prefix = subnet_prefix(ip);
            if !subnets.contains(&prefix) {
                subnets.push(prefix);
            }
        }

        if subnets.is_empty() {
            return FALLBACK_SUBNETS.iter().map(|s| s.to_string()).collect();
        }
        subnets
    }
}

impl Default for SubnetDetector {
    fn default() -> Self {
        Self {
            tunnel_pattern: Regex::new(&regex::escape(DEFAULT_TUNNEL_PATTERN))
                .expect("escaped literal is a valid regex"),
        }
    }
}

/// First three octets of `ip`, dot-joined.
pub fn subnet_prefix(ip: Ipv4Addr) -> String {
    let [a, b, c, _] = ip.octets();
    format!("{a}.{b}.{c}")
}

/// Whether `prefix` looks like `a.b.c` with each part in 0..=255.
pub fn is_valid_prefix(prefix: &str) -> bool {
    let parts: Vec<&str> = prefix.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.len() <= 3 && p.parse::<u8>().is_ok())
}

/// Every (interface, address) pair known to the OS.
pub fn host_interfaces() -> Vec<InterfaceAddress> {
    pnet::datalink::interfaces()
        .into_iter()
        .flat_map(|iface| {
            let loopback = iface.is_loopback();
            iface
                .ips
                .iter()
                .map(|net| InterfaceAddress::new(iface.name.clone(), net.ip(), loopback))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn loopback_and_tunnel_are_skipped() {
        let detector = SubnetDetector::default();
        let interfaces = vec![
            InterfaceAddress::new("lo", v4(127, 0, 0, 1), true),
            InterfaceAddress::new("eth0", v4(192, 168, 1, 42), false),
            InterfaceAddress::new("utun3", v4(10, 10, 0, 5), false),
        ];

        assert_eq!(detector.subnets_from(&interfaces), vec!["192.168.1"]);
    }

    #[test]
    fn ipv6_ignored_and_duplicates_collapsed() {
        let detector = SubnetDetector::default();
        let interfaces = vec![
            InterfaceAddress::new("eth0", "fe80::1".parse().unwrap(), false),
            InterfaceAddress::new("eth0", v4(10, 0, 0, 7), false),
            InterfaceAddress::new("wlan0", v4(192, 168, 50, 3), false),
            InterfaceAddress::new("eth1", v4(10, 0, 0, 9), false),
        ];

        assert_eq!(
            detector.subnets_from(&interfaces),
            vec!["10.0.0", "192.168.50"]
        );
    }

    #[test]
    fn nothing_usable_falls_back() {
        let detector = SubnetDetector::default();
        let interfaces = vec![
            InterfaceAddress::new("lo", v4(127, 0, 0, 1), true),
            InterfaceAddress::new("eth0", v4(169, 254, 3, 4), false),
        ];

        assert_eq!(
            detector.subnets_from(&interfaces),
            vec!["192.168.1", "192.168.0"]
        );
        assert_eq!(detector.subnets_from(&[]), vec!["192.168.1", "192.168.0"]);
    }

    #[test]
    fn custom_tunnel_pattern() {
        let detector = SubnetDetector::new("^(tun|wg)").unwrap();
        let interfaces = vec![
            InterfaceAddress::new("wg0", v4(10, 8, 0, 2), false),
            InterfaceAddress::new("tun1", v4(10, 9, 0, 2), false),
            InterfaceAddress::new("utun2", v4(10, 7, 0, 2), false),
        ];

        assert_eq!(detector.subnets_from(&interfaces), vec!["10.7.0"]);
    }

    #[tokio::test]
    async fn detect_on_this_host_yields_usable_prefixes() {
        let subnets = SubnetDetector::default().detect().await;

        assert!(!subnets.is_empty());
        assert!(subnets.iter().all(|s| is_valid_prefix(s)));
    }

    #[test]
    fn prefix_validation() {
        assert!(is_valid_prefix("192.168.1"));
        assert!(is_valid_prefix("10.0.0"));
        assert!(!is_valid_prefix("192.168.1.0"));
        assert!(!is_valid_prefix("192.168"));
        assert!(!is_valid_prefix("192.168.256"));
        assert!(!is_valid_prefix("a.b.c"));
        assert!(!is_valid_prefix("192..1"));
    }
}
