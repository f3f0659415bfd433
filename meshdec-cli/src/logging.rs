//! Logger setup for the `meshdec` binary

use crate::args::LogLevel;

/// Pick the filter: explicit flag, then `RUST_LOG`, then `info`
pub fn resolve_log_level(flag: Option<LogLevel>) -> String {
    if let Some(level) = flag {
        return level.as_str().to_string();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        if !level.trim().is_empty() {
            return level;
        }
    }

    "info".to_string()
}

/// Install an `env_logger` on stdout, where progress output belongs
pub fn init_logger(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stdout);
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_filters(level);
    builder.format(|buf, record| {
        use std::io::Write;
        if record.level() == log::Level::Info {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        }
    });

    if let Err(err) = builder.try_init() {
        eprintln!("Failed to initialize logger: {}", err);
    }
}
