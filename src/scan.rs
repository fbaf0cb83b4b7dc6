use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::filter::filter_public;
use crate::lookup::HostLookup;
use crate::progress::Progress;
use crate::transport::{LookupResult, ScanResult};
use crate::wildcard::WildcardDetector;

/// Default number of candidates resolved at once
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Apply the wildcard and public-address filters to one lookup.
///
/// Returns None when any address is a wildcard address, or when no
/// publicly routable address remains.
pub fn evaluate(host: &str, lookup: LookupResult, detector: &WildcardDetector) -> Option<ScanResult> {
	if detector.is_wildcard_result(&lookup.ip_addresses) {
		debug!("{}: dropped as wildcard match", host);
		return None;
	}

	let public = filter_public(&lookup.ip_addresses);
	if public.is_empty() {
		debug!("{}: dropped, only private addresses {:?}", host, lookup.ip_addresses);
		return None;
	}

	Some(ScanResult {
		subdomain: host.to_string(),
		ip_addresses: public,
		cname: lookup.cname,
		ttl: lookup.ttl,
		record_type: lookup.record_type,
		is_wildcard: false,
		dns_server: lookup.server,
	})
}

/// Brute-forces labels under one domain with a bounded worker pool.
pub struct Scanner<R> {
	domain: String,
	resolver: Arc<R>,
	detector: Arc<WildcardDetector>,
	concurrency: usize,
	show_progress: bool,
	results: Arc<Mutex<Vec<ScanResult>>>,
	progress: Arc<Progress>,
}

impl<R: HostLookup> Scanner<R> {
	pub fn new(
		domain: impl Into<String>,
		resolver: Arc<R>,
		detector: Arc<WildcardDetector>,
		concurrency: usize,
	) -> Self {
		Scanner {
			domain: domain.into(),
			resolver,
			detector,
			concurrency: concurrency.max(1),
			show_progress: false,
			results: Arc::new(Mutex::new(Vec::new())),
			progress: Arc::new(Progress::new(0)),
		}
	}

	/// Draw a progress bar on stderr while scanning.
	pub fn with_progress(mut self, show: bool) -> Self {
		self.show_progress = show;
		self
	}

	/// Counters for the scan currently running (or last finished).
	pub fn progress(&self) -> Arc<Progress> {
		Arc::clone(&self.progress)
	}

	/// Resolve every label and collect the survivors.
	///
	/// A permit is taken before each task is spawned and held by the task
	/// until it returns, so at most `concurrency` lookups are in flight.
	/// Misses, timeouts and filtered candidates are skipped silently.
	pub async fn scan(&mut self, labels: &[String]) {
		let progress = Arc::new(if self.show_progress {
			Progress::with_bar(labels.len())
		} else {
			Progress::new(labels.len())
		});
		self.progress = Arc::clone(&progress);
		let semaphore = Arc::new(Semaphore::new(self.concurrency));
		let mut tasks = JoinSet::new();

		for label in labels {
			let permit = match Arc::clone(&semaphore).acquire_owned().await {
				Ok(permit) => permit,
				Err(_) => break,
			};
			let host = format!("{}.{}", label, self.domain);
			let resolver = Arc::clone(&self.resolver);
			let detector = Arc::clone(&self.detector);
			let results = Arc::clone(&self.results);
			let progress = Arc::clone(&progress);

			tasks.spawn(async move {
				let _permit = permit;
				match resolver.lookup(&host).await {
					Ok(lookup) => {
						if let Some(found) = evaluate(&host, lookup, &detector) {
							info!("[+] {} -> {}", found.subdomain, join_ips(&found));
							results.lock().unwrap_or_else(|e| e.into_inner()).push(found);
						}
					}
					Err(e) => debug!("{}: {}", host, e),
				}

				progress.increment();
			});

			// Reap finished tasks so the set does not grow with the wordlist
			while let Some(joined) = tasks.try_join_next() {
				if let Err(e) = joined {
					warn!("scan task failed: {}", e);
				}
			}
		}

		while let Some(joined) = tasks.join_next().await {
			if let Err(e) = joined {
				warn!("scan task failed: {}", e);
			}
		}

		progress.finish();
	}

	/// Copy of everything found so far, in completion order.
	pub fn results(&self) -> Vec<ScanResult> {
		self.results.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}
}

fn join_ips(result: &ScanResult) -> String {
	result.ip_addresses.iter()
		.map(|ip| ip.to_string())
		.collect::<Vec<_>>()
		.join(", ")
}
