use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

/// Point-in-time copy of one resolver's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatSnapshot {
	pub success: u64,
	pub failure: u64,
	pub avg_latency: Duration,
}

impl StatSnapshot {
	/// Total completed queries against this resolver.
	pub fn total(&self) -> u64 {
		self.success + self.failure
	}

	/// Success rate in percent, 0.0 when nothing completed yet.
	pub fn success_rate(&self) -> f64 {
		let total = self.total();
		if total == 0 {
			return 0.0;
		}
		(self.success as f64 / total as f64) * 100.0
	}
}

/// Counters for a single resolver, updated once per completed query
#[derive(Debug, Default)]
pub struct StatRecord {
	inner: Mutex<StatSnapshot>,
}

impl StatRecord {
	pub fn record_success(&self, latency: Duration) {
		let mut stat = self.inner.lock().unwrap_or_else(|e| e.into_inner());
		stat.success += 1;
		update_average(&mut stat, latency);
	}

	pub fn record_failure(&self, latency: Duration) {
		let mut stat = self.inner.lock().unwrap_or_else(|e| e.into_inner());
		stat.failure += 1;
		update_average(&mut stat, latency);
	}

	pub fn snapshot(&self) -> StatSnapshot {
		*self.inner.lock().unwrap_or_else(|e| e.into_inner())
	}
}

/// Weighted incremental mean: avg = (avg * (n - 1) + sample) / n.
///
/// Must be called after the success or failure counter was bumped.
fn update_average(stat: &mut StatSnapshot, latency: Duration) {
	let n = stat.total() as u128;
	if n == 0 {
		return;
	}
	let nanos = (stat.avg_latency.as_nanos() * (n - 1) + latency.as_nanos()) / n;
	stat.avg_latency = Duration::from_nanos(nanos.min(u64::MAX as u128) as u64);
}

/// Per-resolver query statistics for one run.
///
/// The set of servers is fixed at construction, so the map itself is never
/// mutated and only the individual records take a lock.
#[derive(Debug)]
pub struct StatTracker {
	records: HashMap<SocketAddr, StatRecord>,
}

impl StatTracker {
	pub fn new<I>(servers: I) -> Self
	where
		I: IntoIterator<Item = SocketAddr>,
	{
		let records = servers.into_iter()
			.map(|addr| (addr, StatRecord::default()))
			.collect();
		StatTracker { records }
	}

	pub fn record_success(&self, server: SocketAddr, latency: Duration) {
		if let Some(record) = self.records.get(&server) {
			record.record_success(latency);
		}
	}

	pub fn record_failure(&self, server: SocketAddr, latency: Duration) {
		if let Some(record) = self.records.get(&server) {
			record.record_failure(latency);
		}
	}

	/// Returns None for a server that was not configured.
	pub fn snapshot(&self, server: SocketAddr) -> Option<StatSnapshot> {
		self.records.get(&server).map(StatRecord::snapshot)
	}
}
