use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Bar layout: 50 columns, percentage, counts, elapsed and ETA
const BAR_TEMPLATE: &str = "[{bar:50}] {percent}% ({pos}/{len}) elapsed {elapsed} eta {eta}";

fn bar_style() -> ProgressStyle {
	ProgressStyle::with_template(BAR_TEMPLATE)
		.unwrap_or_else(|_| ProgressStyle::default_bar())
		.progress_chars("=> ")
}

/// Completion counters shared by all scan tasks.
///
/// `current` and `total` are always tracked; the bar is hidden unless
/// built with [`Progress::with_bar`].
pub struct Progress {
	total: usize,
	current: AtomicUsize,
	bar: ProgressBar,
}

impl Progress {
	pub fn new(total: usize) -> Self {
		Progress {
			total,
			current: AtomicUsize::new(0),
			bar: ProgressBar::hidden(),
		}
	}

	/// Counters plus a bar drawn on stderr.
	pub fn with_bar(total: usize) -> Self {
		let bar = ProgressBar::new(total as u64);
		bar.set_style(bar_style());
		Progress {
			total,
			current: AtomicUsize::new(0),
			bar,
		}
	}

	/// Mark one candidate as done and return the new completed count.
	pub fn increment(&self) -> usize {
		self.bar.inc(1);
		self.current.fetch_add(1, Ordering::SeqCst) + 1
	}

	pub fn current(&self) -> usize {
		self.current.load(Ordering::SeqCst)
	}

	pub fn total(&self) -> usize {
		self.total
	}

	pub fn finish(&self) {
		self.bar.finish();
	}
}
