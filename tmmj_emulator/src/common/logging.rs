//! Utilities for configuring logging
//!
//! Filters are configured through the `TMMJ_LOG` environment variable using the env_logger
//! syntax, e.g. `TMMJ_LOG=warn,blitter=trace`.
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Once;

use colored::*;
use env_logger::Logger;
use log::LevelFilter;
use log::Log;
use log::Record;

static ONCE_INIT: Once = Once::new();

static TRACE_CONTEXT_LINES: usize = 20;

static FILTER_ENV_VAR: &str = "TMMJ_LOG";

/// Logger with a compact, colored format on top of env_logger filtering.
///
/// Trace records are not printed right away. The most recent `TRACE_CONTEXT_LINES` of them are
/// kept in a ring buffer and flushed as context once a record of a higher level is logged. This
/// keeps per-pixel and per-blit tracing usable.
struct TmmjLogger {
    trace_logs: Mutex<VecDeque<String>>,
    logger: Logger,
}

impl TmmjLogger {
    pub fn new(logger: Logger) -> Self {
        log::set_max_level(logger.filter());
        Self {
            trace_logs: Mutex::new(VecDeque::new()),
            logger,
        }
    }

    fn format_record(&self, record: &Record) -> String {
        let target = record.target().dimmed();
        match record.level() {
            log::Level::Error => format!(
                "{} {} {}",
                "E".red().bold(),
                target,
                record.args().to_string().red()
            ),
            log::Level::Warn => format!(
                "{} {} {}",
                "W".yellow().bold(),
                target,
                record.args().to_string().yellow()
            ),
            log::Level::Info => format!("{} {} {}", "I".blue().bold(), target, record.args()),
            log::Level::Debug => format!("{} {} {}", "D".blue(), target, record.args()),
            log::Level::Trace => format!("{}", record.args().to_string().dimmed()),
        }
    }
}

impl Log for TmmjLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.logger.matches(record) {
            return;
        }
        let record_str = self.format_record(record);
        let Ok(mut trace_logs) = self.trace_logs.lock() else {
            return;
        };
        if record.level() == LevelFilter::Trace {
            trace_logs.push_front(record_str);
            trace_logs.truncate(TRACE_CONTEXT_LINES);
        } else {
            if trace_logs.len() == TRACE_CONTEXT_LINES {
                println!("{}", "...".dimmed());
            }
            for log in trace_logs.drain(0..).rev() {
                println!("{}", log);
            }
            println!("{}", record_str);
        }
    }

    fn flush(&self) {}
}

fn install(default_filter: &str) {
    let filter_config = std::env::var(FILTER_ENV_VAR).unwrap_or(default_filter.to_string());
    let filter = env_logger::builder().parse_filters(&filter_config).build();
    // Another logger may already be installed by the host application.
    let _ = log::set_boxed_logger(Box::new(TmmjLogger::new(filter)));
}

pub fn init() {
    ONCE_INIT.call_once(|| install("error"));
}

pub fn test_init(verbose: bool) {
    ONCE_INIT.call_once(|| {
        install(if verbose {
            "info,blitter=trace,video=debug"
        } else {
            "warn"
        })
    });
}
