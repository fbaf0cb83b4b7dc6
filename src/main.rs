mod cli;
mod dns;
mod error;
mod filter;
mod logging;
mod lookup;
mod output;
mod progress;
mod resolver;
mod scan;
mod stats;
#[cfg(test)]
mod testing;
mod transport;
mod wildcard;
mod wordlist;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use crate::cli::Cli;
use crate::lookup::RaceResolver;
use crate::scan::Scanner;
use crate::wildcard::WildcardDetector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	logging::init_logger(cli.log_level())?;

	let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
	let config = cli.into_config(&timestamp)?;

	// Read the wordlist before touching the network
	let labels = wordlist::read_wordlist(&config.wordlist)?;

	output::print_config_summary(&config, labels.len());

	let resolver = Arc::new(RaceResolver::new(config.resolvers.clone(), config.timeout));

	// Wildcard state is written once here and shared read-only afterwards
	let mut detector = WildcardDetector::new(config.domain.clone());
	detector.detect(resolver.as_ref()).await;

	info!("Scanning {} candidates under {}", labels.len(), config.domain);
	let started = Instant::now();
	let mut scanner = Scanner::new(
		config.domain.clone(),
		Arc::clone(&resolver),
		Arc::new(detector),
		config.concurrency,
	).with_progress(config.show_progress);
	scanner.scan(&labels).await;
	let results = scanner.results();

	if results.is_empty() {
		println!("\nNo subdomains found");
	} else {
		output::print_results_table(&results);
	}
	output::print_resolver_stats(&resolver.stat_snapshots());

	// A failed save does not invalidate the scan
	if !results.is_empty() {
		match output::write_csv(&config.output, &results) {
			Ok(()) => println!("\nResults written to: {}", config.output.display()),
			Err(e) => error!("{}", e),
		}
	}

	let progress = scanner.progress();
	println!(
		"\nScan finished in {:.1?}: {}/{} candidates checked, {} subdomain(s) found",
		started.elapsed(), progress.current(), progress.total(), results.len(),
	);
	Ok(())
}
