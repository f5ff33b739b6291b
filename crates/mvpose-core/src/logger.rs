//! Logging for batch reconstruction runs.
//!
//! A small `log` backend that stamps every record with the time elapsed
//! since initialization, so per-frame progress lines read as a timeline of
//! the batch. Debug and trace records additionally carry their module
//! target, which is what you want when chasing a skipped keypoint through
//! the pipeline.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct BatchLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for BatchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = if record.level() >= Level::Debug {
            writeln!(
                stderr,
                "[{elapsed:8.3}s {:>5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(
                stderr,
                "[{elapsed:8.3}s {:>5}] {}",
                record.level(),
                record.args()
            )
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<BatchLogger> = OnceLock::new();

/// Install the batch logger with the provided level filter.
///
/// The elapsed-time clock starts at the first call; calling again after a
/// successful initialization is a no-op.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| BatchLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber instead of the plain `log` backend.
///
/// Filtering follows `RUST_LOG` (default `info`); spans report their close
/// time against an uptime clock, matching the batch logger's timeline view.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(fmt::time::Uptime::default())
        .finish()
        .try_init();
}
