use std::path::PathBuf;

use thiserror::Error;

/// Failure resolving a single hostname.
///
/// `lookup` only reports `Timeout` and `AllServersFailed`; `Protocol`
/// describes why one server's answer was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
	#[error("lookup timed out")]
	Timeout,
	#[error("all DNS servers failed")]
	AllServersFailed,
	#[error("{0}")]
	Protocol(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("a target domain is required (e.g. -d example.com)")]
	MissingDomain,
	#[error("concurrency must be at least 1")]
	ZeroConcurrency,
	#[error("timeout must be greater than 0 ms")]
	ZeroTimeout,
	#[error("failed to read resolver file '{path}': {source}")]
	ResolverFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

#[derive(Debug, Error)]
pub enum WordlistError {
	#[error("failed to read wordlist '{path}': {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("wordlist '{path}' contains no labels")]
	Empty { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum OutputError {
	#[error("no results to save")]
	NoResults,
	#[error("failed to write results to '{path}': {source}")]
	Csv {
		path: PathBuf,
		#[source]
		source: csv::Error,
	},
}
