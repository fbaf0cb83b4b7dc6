use std::net::Ipv4Addr;

/// Whether an address is publicly routable enough to report.
///
/// Private, loopback, unspecified, link-local unicast and link-local
/// multicast addresses are rejected; everything else passes.
pub fn is_public(ip: Ipv4Addr) -> bool {
	let octets = ip.octets();
	// 224.0.0.0/24 is link-local multicast
	let link_local_multicast = octets[0] == 224 && octets[1] == 0 && octets[2] == 0;
	!(ip.is_private()
		|| ip.is_loopback()
		|| ip.is_unspecified()
		|| ip.is_link_local()
		|| link_local_multicast)
}

/// Keep only publicly routable IPv4 addresses, preserving order.
pub fn filter_public(ips: &[Ipv4Addr]) -> Vec<Ipv4Addr> {
	ips.iter()
		.copied()
		.filter(|ip| is_public(*ip))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse_all(ips: &[&str]) -> Vec<Ipv4Addr> {
		ips.iter().map(|s| s.parse().unwrap()).collect()
	}

	#[test]
	fn test_mixed_input() {
		let out = filter_public(&parse_all(&["10.0.0.5", "8.8.8.8", "169.254.1.1"]));
		assert_eq!(out, vec![Ipv4Addr::new(8, 8, 8, 8)]);
	}

	#[test]
	fn test_private_ranges_dropped() {
		let dropped = parse_all(&[
			"10.0.0.1", "10.255.255.255",
			"172.16.0.1", "172.31.255.254",
			"192.168.0.1", "192.168.255.255",
			"127.0.0.1", "127.10.20.30",
			"169.254.0.1", "224.0.0.251",
			"0.0.0.0",
		]);
		for ip in &dropped {
			assert!(!is_public(*ip), "{} should be filtered", ip);
		}
		assert!(filter_public(&dropped).is_empty());
	}

	#[test]
	fn test_public_addresses_pass() {
		let kept = parse_all(&[
			"8.8.8.8", "1.1.1.1", "93.184.216.34",
			"172.15.255.255", "172.32.0.1", "192.169.0.1", "11.0.0.1",
			"224.0.1.1",
		]);
		for ip in &kept {
			assert!(is_public(*ip), "{} should pass", ip);
		}
		assert_eq!(filter_public(&kept), kept);
	}

	#[test]
	fn test_filter_preserves_order() {
		let ips = [
			Ipv4Addr::new(9, 9, 9, 9),
			Ipv4Addr::new(192, 168, 1, 1),
			Ipv4Addr::new(1, 1, 1, 1),
		];
		assert_eq!(filter_public(&ips), vec![Ipv4Addr::new(9, 9, 9, 9), Ipv4Addr::new(1, 1, 1, 1)]);
	}
}
