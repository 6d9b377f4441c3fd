//! `log` facade backed by `env_logger`.
//!
//! With progress bars on screen, records are printed through the
//! `MultiProgress` so they land above the bars instead of tearing them.

use std::fmt::Arguments;

use indicatif::MultiProgress;
use log::Level;

const RESET: &str = "\x1b[0m";

/// Padded level label plus its ANSI color
fn level_label(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::Error => ("ERROR", "\x1b[31m"),
        Level::Warn => ("WARN ", "\x1b[33m"),
        Level::Info => ("INFO ", "\x1b[32m"),
        Level::Debug => ("DEBUG", "\x1b[36m"),
        Level::Trace => ("TRACE", "\x1b[35m"),
    }
}

/// `[LEVEL] message`, colored on terminals
fn format_line(level: Level, args: &Arguments<'_>, color: bool) -> String {
    let (label, ansi) = level_label(level);
    if color {
        format!("[{ansi}{label}{RESET}] {args}")
    } else {
        format!("[{label}] {args}")
    }
}

/// Routes records through indicatif; filtering stays with `env_logger`.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }
        let line = format_line(record.level(), record.args(), true);
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Filter used when `RUST_LOG` is unset
pub fn default_level(quiet: bool, debug: bool) -> &'static str {
    match (debug, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// Install the global logger. Later calls are no-ops.
///
/// `multi` is set in TTY mode, where progress bars own the terminal.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(default_level(quiet, debug));
    let mut builder = env_logger::Builder::from_env(env);

    match multi {
        Some(multi) => {
            let logger = builder.build();
            let max_level = logger.filter();
            let bridge = IndicatifLogger::new(logger, multi.clone());
            if log::set_boxed_logger(Box::new(bridge)).is_ok() {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = builder
                .format(|buf, record| {
                    writeln!(buf, "{}", format_line(record.level(), record.args(), false))
                })
                .try_init();
        }
    }
}
