use std::io::Write;

use log::{LevelFilter, SetLoggerError};

/// Initialize `env_logger`.
///
/// `RUST_LOG` is read first and `level` overrides its global level.
/// hickory_proto is clamped to errors so malformed stray datagrams stay quiet.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
	let mut builder = env_logger::Builder::from_default_env();
	builder.filter_level(level);
	builder.filter_module("hickory_proto", LevelFilter::Error);
	builder.format(|buf, record| {
		writeln!(buf, "[{}] {}", record.level(), record.args())
	});
	builder.try_init()
}
