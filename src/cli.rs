use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{warn, LevelFilter};

use crate::error::ConfigError;
use crate::resolver;
use crate::scan;
use crate::transport::ScanConfig;

/// Subdomain brute-forcer racing DNS queries across resolvers
#[derive(Parser, Debug)]
#[command(name = "subrace")]
#[command(about = "Brute-force subdomains by racing DNS queries across multiple resolvers")]
pub struct Cli {
	/// Target domain (e.g. example.com)
	#[arg(short = 'd', long = "domain")]
	pub domain: String,

	/// Wordlist file with one label per line
	#[arg(short = 'w', long = "wordlist", default_value = "dict.txt")]
	pub wordlist: PathBuf,

	/// DNS server address (repeatable or comma separated, e.g. 1.1.1.1 or 1.1.1.1:53)
	#[arg(
		short = 'r',
		long = "resolver",
		value_delimiter = ',',
		default_values = ["114.114.114.114", "223.5.5.5"]
	)]
	pub resolvers: Vec<String>,

	/// File containing resolver addresses (one per line)
	#[arg(short = 'f', long = "resolver-file")]
	pub resolver_file: Option<PathBuf>,

	/// Include system resolvers from /etc/resolv.conf
	#[arg(long = "system-resolvers")]
	pub system_resolvers: bool,

	/// Output CSV file path (default: subdomains_<domain>_<timestamp>.csv)
	#[arg(short = 'o', long = "output")]
	pub output: Option<PathBuf>,

	/// Per-lookup timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "3000")]
	pub timeout: u64,

	/// Maximum concurrent lookups
	#[arg(short = 'c', long = "concurrency", default_value_t = scan::DEFAULT_CONCURRENCY)]
	pub concurrency: usize,

	/// Do not draw a progress bar
	#[arg(long = "no-progress")]
	pub no_progress: bool,

	/// More log output (-v debug, -vv trace)
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Only log warnings and errors
	#[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
	pub quiet: bool,
}

impl Cli {
	pub fn log_level(&self) -> LevelFilter {
		if self.quiet {
			return LevelFilter::Warn;
		}
		match self.verbose {
			0 => LevelFilter::Info,
			1 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	}

	/// Validate the arguments into a run configuration.
	///
	/// Performs no network activity. `timestamp` names the default output file.
	pub fn into_config(self, timestamp: &str) -> Result<ScanConfig, ConfigError> {
		let domain = normalize_domain(&self.domain);
		if domain.is_empty() || domain.contains(char::is_whitespace) {
			return Err(ConfigError::MissingDomain);
		}
		if self.concurrency == 0 {
			return Err(ConfigError::ZeroConcurrency);
		}
		if self.timeout == 0 {
			return Err(ConfigError::ZeroTimeout);
		}

		let mut resolvers = resolver::parse_resolvers(self.resolvers.iter().map(String::as_str));
		if let Some(path) = &self.resolver_file {
			for extra in resolver::read_resolver_file(path)? {
				if !resolvers.iter().any(|r| r.addr == extra.addr) {
					resolvers.push(extra);
				}
			}
		}
		if self.system_resolvers {
			for extra in resolver::system_resolvers() {
				if !resolvers.iter().any(|r| r.addr == extra.addr) {
					resolvers.push(extra);
				}
			}
		}
		if resolvers.is_empty() {
			warn!("No valid DNS servers given, falling back to defaults");
			resolvers = resolver::default_resolvers();
		}

		let output = self.output
			.unwrap_or_else(|| default_output_path(&domain, timestamp));

		Ok(ScanConfig {
			domain,
			wordlist: self.wordlist,
			resolvers,
			timeout: Duration::from_millis(self.timeout),
			concurrency: self.concurrency,
			output,
			show_progress: !self.no_progress,
		})
	}
}

/// Strip a URL scheme, trailing slash and trailing dot, and lowercase.
pub fn normalize_domain(input: &str) -> String {
	let trimmed = input.trim();
	let without_scheme = trimmed
		.strip_prefix("http://")
		.or_else(|| trimmed.strip_prefix("https://"))
		.unwrap_or(trimmed);
	without_scheme
		.trim_end_matches('/')
		.trim_end_matches('.')
		.to_lowercase()
}

pub fn default_output_path(domain: &str, timestamp: &str) -> PathBuf {
	PathBuf::from(format!("subdomains_{}_{}.csv", domain, timestamp))
}
