use std::path::Path;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::error::OutputError;
use crate::stats::StatSnapshot;
use crate::transport::{ResolverConfig, ScanConfig, ScanResult};

/// CSV column order
pub const CSV_HEADER: [&str; 7] = [
	"subdomain", "ip_address", "cname", "ttl",
	"record_type", "wildcard", "dns_server",
];

/// Print a summary of the scan configuration before running.
pub fn print_config_summary(config: &ScanConfig, wordlist_len: usize) {
	println!("Subdomain Scan Configuration");
	println!("============================");
	println!("Domain:         {}", config.domain);
	println!("Wordlist:       {} ({} labels)", config.wordlist.display(), wordlist_len);
	println!("DNS servers:    {}", config.resolvers.len());
	for r in &config.resolvers {
		println!("  - {} ({})", r.label, r.addr);
	}
	println!("Concurrency:    {}", config.concurrency);
	println!("Timeout:        {} ms", config.timeout.as_millis());
	println!("Output:         {}", config.output.display());
	println!();
}

fn csv_row(result: &ScanResult) -> [String; 7] {
	let ips = result.ip_addresses.iter()
		.map(|ip| ip.to_string())
		.collect::<Vec<_>>()
		.join(";");
	[
		result.subdomain.clone(),
		ips,
		result.cname.clone().unwrap_or_default(),
		result.ttl.to_string(),
		result.record_type.to_string(),
		result.is_wildcard.to_string(),
		result.dns_server.ip().to_string(),
	]
}

/// Print found subdomains as a formatted table, sorted by name.
pub fn print_results_table(results: &[ScanResult]) {
	let mut sorted: Vec<&ScanResult> = results.iter().collect();
	sorted.sort_by(|a, b| a.subdomain.cmp(&b.subdomain));

	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec!["Subdomain", "IP Addresses", "CNAME", "TTL", "Type", "DNS Server"]);

	for r in sorted {
		let row = csv_row(r);
		table.add_row(vec![
			row[0].clone(),
			row[1].replace(';', "\n"),
			row[2].clone(),
			row[3].clone(),
			row[4].clone(),
			row[6].clone(),
		]);
	}

	println!("\nDiscovered Subdomains");
	println!("=====================\n");
	println!("{table}");
}

/// Print per-resolver query statistics.
pub fn print_resolver_stats(stats: &[(ResolverConfig, StatSnapshot)]) {
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec!["Resolver", "Address", "Success", "Failure", "Success %", "Avg Latency"]);

	for (resolver, snap) in stats {
		table.add_row(vec![
			resolver.label.clone(),
			resolver.addr.to_string(),
			snap.success.to_string(),
			snap.failure.to_string(),
			format!("{:.1}%", snap.success_rate()),
			format!("{:.1} ms", snap.avg_latency.as_secs_f64() * 1000.0),
		]);
	}

	println!("\nDNS Server Statistics");
	println!("=====================\n");
	println!("{table}");
}

/// Write scan results to a CSV file.
pub fn write_csv(path: &Path, results: &[ScanResult]) -> Result<(), OutputError> {
	if results.is_empty() {
		return Err(OutputError::NoResults);
	}
	let wrap = |source: csv::Error| OutputError::Csv { path: path.to_path_buf(), source };

	let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
	writer.write_record(CSV_HEADER).map_err(wrap)?;
	for r in results {
		writer.write_record(csv_row(r)).map_err(wrap)?;
	}
	writer.flush().map_err(|e| wrap(e.into()))?;
	Ok(())
}
