use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::dns::query_server;
use crate::error::ResolveError;
use crate::stats::{StatSnapshot, StatTracker};
use crate::transport::{LookupResult, ResolverConfig};

/// Resolves a hostname to IPv4 addresses.
///
/// Implemented by [`RaceResolver`]; the wildcard detector and the scanner
/// only depend on this trait.
pub trait HostLookup: Send + Sync + 'static {
	fn lookup(&self, host: &str) -> impl Future<Output = Result<LookupResult, ResolveError>> + Send;
}

/// Fans each lookup out to every configured resolver and keeps the first
/// answer that carries at least one IPv4 address.
pub struct RaceResolver {
	servers: Vec<ResolverConfig>,
	timeout: Duration,
	stats: Arc<StatTracker>,
}

impl RaceResolver {
	pub fn new(servers: Vec<ResolverConfig>, timeout: Duration) -> Self {
		let stats = Arc::new(StatTracker::new(servers.iter().map(|s| s.addr)));
		RaceResolver {
			servers,
			timeout,
			stats,
		}
	}

	/// Snapshot of every server's counters in configuration order.
	pub fn stat_snapshots(&self) -> Vec<(ResolverConfig, StatSnapshot)> {
		self.servers.iter()
			.map(|s| (s.clone(), self.stats.snapshot(s.addr).unwrap_or_default()))
			.collect()
	}

	/// Race `host` across all servers under one shared deadline.
	///
	/// Losing queries keep running in the background until they finish or
	/// hit the deadline; their only remaining effect is a stats update.
	pub async fn lookup_until(&self, host: &str, deadline: Instant) -> Result<LookupResult, ResolveError> {
		let (tx, mut rx) = mpsc::channel(self.servers.len().max(1));

		for server in &self.servers {
			let tx = tx.clone();
			let stats = Arc::clone(&self.stats);
			let addr = server.addr;
			let host = host.to_string();

			tokio::spawn(async move {
				let start = Instant::now();
				let outcome = query_server(addr, &host, deadline).await;
				let elapsed = start.elapsed();
				match &outcome {
					Ok(_) => stats.record_success(addr, elapsed),
					Err(e) => {
						debug!("{} via {}: {}", host, addr, e);
						stats.record_failure(addr, elapsed);
					}
				}
				// The receiver is gone once a winner was returned
				let _ = tx.send(outcome).await;
			});
		}
		drop(tx);

		// Server tasks share the deadline, so their own timeouts can drain the
		// channel before the collector's timer is polled
		let mut saw_timeout = false;
		loop {
			match tokio::time::timeout_at(deadline, rx.recv()).await {
				Ok(Some(Ok(answer))) => return Ok(answer),
				Ok(Some(Err(e))) => saw_timeout |= e == ResolveError::Timeout,
				Ok(None) if saw_timeout || Instant::now() >= deadline => {
					return Err(ResolveError::Timeout);
				}
				// Every server explicitly failed before the deadline
				Ok(None) => return Err(ResolveError::AllServersFailed),
				Err(_) => return Err(ResolveError::Timeout),
			}
		}
	}
}

impl HostLookup for RaceResolver {
	async fn lookup(&self, host: &str) -> Result<LookupResult, ResolveError> {
		self.lookup_until(host, Instant::now() + self.timeout).await
	}
}
