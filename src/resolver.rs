use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{anyhow, Result};
use log::warn;

use crate::error::ConfigError;
use crate::transport::ResolverConfig;

/// Standard DNS port used when an address has none
pub const DNS_PORT: u16 = 53;

/// Parse a resolver address string into a ResolverConfig.
///
/// Supports formats:
///   "1.1.1.1"              -- IPv4, default port 53
///   "1.1.1.1:53"           -- IPv4 with explicit port
///   "2606:4700::1111"      -- bare IPv6, default port 53
///   "[2606:4700::1111]:53" -- bracketed IPv6 with port
pub fn parse_resolver(input: &str) -> Result<ResolverConfig> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(anyhow!("empty resolver address"));
	}

	let addr: SocketAddr = if trimmed.starts_with('[') {
		trimmed.parse()
			.map_err(|e| anyhow!("invalid bracketed IPv6 address '{}': {}", trimmed, e))?
	} else if trimmed.matches(':').count() > 1 {
		let ip: IpAddr = trimmed.parse()
			.map_err(|e| anyhow!("invalid IPv6 address '{}': {}", trimmed, e))?;
		SocketAddr::new(ip, DNS_PORT)
	} else if let Ok(addr) = trimmed.parse::<SocketAddr>() {
		addr
	} else {
		let ip: IpAddr = trimmed.parse()
			.map_err(|e| anyhow!("invalid IP address '{}': {}", trimmed, e))?;
		SocketAddr::new(ip, DNS_PORT)
	};

	Ok(ResolverConfig {
		label: addr.ip().to_string(),
		addr,
	})
}

/// Parse every entry, warning about and skipping the invalid ones.
/// Duplicate addresses are kept once.
pub fn parse_resolvers<'a, I>(entries: I) -> Vec<ResolverConfig>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut resolvers: Vec<ResolverConfig> = Vec::new();
	for entry in entries {
		match parse_resolver(entry) {
			Ok(resolver) => {
				if !resolvers.iter().any(|r| r.addr == resolver.addr) {
					resolvers.push(resolver);
				}
			}
			Err(e) => warn!("Skipping DNS server: {}", e),
		}
	}
	resolvers
}

/// Read resolver addresses from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped; invalid
/// addresses are warned about and skipped.
pub fn read_resolver_file(path: &Path) -> Result<Vec<ResolverConfig>, ConfigError> {
	let content = std::fs::read_to_string(path)
		.map_err(|source| ConfigError::ResolverFile { path: path.to_path_buf(), source })?;
	let entries = content.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'));
	Ok(parse_resolvers(entries))
}

/// Extract nameserver entries from resolv.conf content.
pub fn parse_resolv_conf(content: &str) -> Vec<ResolverConfig> {
	let entries = content.lines()
		.map(str::trim)
		.filter_map(|line| {
			let mut parts = line.split_whitespace();
			match (parts.next(), parts.next()) {
				(Some("nameserver"), Some(addr)) => Some(addr),
				_ => None,
			}
		});
	parse_resolvers(entries)
}

/// Read system resolvers from /etc/resolv.conf (Unix only).
///
/// Returns an empty vec if the file cannot be read.
pub fn system_resolvers() -> Vec<ResolverConfig> {
	match std::fs::read_to_string("/etc/resolv.conf") {
		Ok(content) => parse_resolv_conf(&content),
		Err(e) => {
			warn!("Cannot read /etc/resolv.conf: {}", e);
			Vec::new()
		}
	}
}

/// Resolvers used when none were configured.
pub fn default_resolvers() -> Vec<ResolverConfig> {
	vec![
		ResolverConfig {
			label: "114DNS".to_string(),
			addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(114, 114, 114, 114)), DNS_PORT),
		},
		ResolverConfig {
			label: "AliDNS".to_string(),
			addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(223, 5, 5, 5)), DNS_PORT),
		},
	]
}
