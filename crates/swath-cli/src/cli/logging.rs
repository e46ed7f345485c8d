//! A minimal `log` backend that writes to stderr.
//!
//! The library only logs through the `log` facade. Nothing is printed
//! unless a command line asks for it with `-v` (debug) or `-vv` (trace).

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger. Calling it twice keeps the first level.
pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Log level requested by `-v`, `-vv` or `--verbose` anywhere in `args`.
pub fn verbosity(args: &[String]) -> Option<LevelFilter> {
    args.iter().fold(None, |level, arg| match arg.as_str() {
        "-vv" => Some(LevelFilter::Trace),
        "-v" | "--verbose" if level != Some(LevelFilter::Trace) => Some(LevelFilter::Debug),
        _ => level,
    })
}
