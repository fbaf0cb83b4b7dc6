use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::OsRng;
use rand::Rng;

use crate::lookup::HostLookup;

/// Random labels probed per detection run
pub const PROBE_COUNT: usize = 10;

/// Length of each random probe label
pub const PROBE_LABEL_LEN: usize = 16;

/// Pause between sequential probes to stay under resolver rate limits
pub const PROBE_DELAY: Duration = Duration::from_millis(50);

const LABEL_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random lowercase alphanumeric label from the OS CSPRNG.
pub fn random_label(len: usize) -> String {
	(0..len)
		.map(|_| LABEL_CHARSET[OsRng.gen_range(0..LABEL_CHARSET.len())] as char)
		.collect()
}

/// Learns which addresses a zone hands out for names that do not exist.
///
/// `detect` takes `&mut self` and runs before scanning; afterwards the
/// detector is shared read-only, so lookups on the scan path need no lock.
#[derive(Debug, Clone, Default)]
pub struct WildcardDetector {
	domain: String,
	wildcard_ips: HashSet<Ipv4Addr>,
}

impl WildcardDetector {
	pub fn new(domain: impl Into<String>) -> Self {
		WildcardDetector {
			domain: domain.into(),
			wildcard_ips: HashSet::new(),
		}
	}

	/// Resolve [`PROBE_COUNT`] random names under the domain one after another
	/// and remember every address that came back.
	///
	/// This is a heuristic: a wildcard that rotates across many addresses, or
	/// probes that all fail by chance, go undetected.
	pub async fn detect<R: HostLookup>(&mut self, resolver: &R) {
		info!("Checking {} for wildcard DNS...", self.domain);

		for i in 0..PROBE_COUNT {
			let probe = format!("{}.{}", random_label(PROBE_LABEL_LEN), self.domain);
			match resolver.lookup(&probe).await {
				Ok(result) => {
					debug!("wildcard probe {} answered {:?}", probe, result.ip_addresses);
					self.wildcard_ips.extend(result.ip_addresses);
				}
				Err(e) => debug!("wildcard probe {}: {}", probe, e),
			}
			if i + 1 < PROBE_COUNT {
				tokio::time::sleep(PROBE_DELAY).await;
			}
		}

		if self.wildcard_ips.is_empty() {
			info!("No wildcard DNS detected");
		} else {
			warn!(
				"Wildcard DNS detected, filtering these addresses: {}",
				self.wildcard_ips().iter().map(|ip| ip.to_string()).collect::<Vec<_>>().join(", ")
			);
		}
	}

	pub fn is_wildcard(&self, ip: &Ipv4Addr) -> bool {
		self.wildcard_ips.contains(ip)
	}

	/// True when any of `ips` is a known wildcard address.
	pub fn is_wildcard_result(&self, ips: &[Ipv4Addr]) -> bool {
		ips.iter().any(|ip| self.is_wildcard(ip))
	}

	/// Detected wildcard addresses, sorted for stable display.
	pub fn wildcard_ips(&self) -> Vec<Ipv4Addr> {
		let mut ips: Vec<Ipv4Addr> = self.wildcard_ips.iter().copied().collect();
		ips.sort();
		ips
	}
}
