use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a single DNS resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
	pub label: String,
	pub addr: SocketAddr,
}

/// Record type that determined the TTL of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
	A,
	Cname,
	Aaaa,
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			RecordKind::A => "A",
			RecordKind::Cname => "CNAME",
			RecordKind::Aaaa => "AAAA",
		};
		f.write_str(name)
	}
}

/// Answer produced by the first resolver that returned IPv4 addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
	pub ip_addresses: Vec<Ipv4Addr>,
	pub cname: Option<String>,
	/// Minimum of the record's own TTL and any chased alias target
	pub ttl: u32,
	pub record_type: RecordKind,
	pub server: SocketAddr,
}

/// A verified subdomain that survived wildcard and private-address filtering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanResult {
	pub subdomain: String,
	pub ip_addresses: Vec<Ipv4Addr>,
	pub cname: Option<String>,
	pub ttl: u32,
	pub record_type: RecordKind,
	/// Always false for retained results; wildcard matches are dropped
	pub is_wildcard: bool,
	pub dns_server: SocketAddr,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
	pub domain: String,
	pub wordlist: PathBuf,
	pub resolvers: Vec<ResolverConfig>,
	pub timeout: Duration,
	pub concurrency: usize,
	pub output: PathBuf,
	pub show_progress: bool,
}
