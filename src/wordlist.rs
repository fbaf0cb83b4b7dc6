use std::path::Path;

use crate::error::WordlistError;

/// Extract labels from wordlist text, one per line.
///
/// Lines are trimmed; blank lines and lines starting with '#' are skipped.
pub fn parse_wordlist(content: &str) -> Vec<String> {
	content.lines()
		.map(|line| line.trim())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.map(String::from)
		.collect()
}

/// Read labels from a wordlist file.
///
/// Fails when the file cannot be read or contains no labels at all.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>, WordlistError> {
	let content = std::fs::read_to_string(path)
		.map_err(|source| WordlistError::Read { path: path.to_path_buf(), source })?;
	let labels = parse_wordlist(&content);
	if labels.is_empty() {
		return Err(WordlistError::Empty { path: path.to_path_buf() });
	}
	Ok(labels)
}
