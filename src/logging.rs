//! Stderr logger used by the binaries. Stdout stays free for the console
//! dialogue and the simulator's JSON lines.

use std::env;
use std::io::Write;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use log::{LevelFilter, Metadata, Record};

struct BridgeLogger {
    started: OnceLock<Instant>,
}

impl BridgeLogger {
    fn uptime(&self) -> Duration {
        self.started.get_or_init(Instant::now).elapsed()
    }
}

impl log::Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(self.uptime(), record);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: BridgeLogger = BridgeLogger {
    started: OnceLock::new(),
};

/// `uptime level target: message`, with the crate prefix stripped from the target.
pub fn format_line(uptime: Duration, record: &Record) -> String {
    let target = record.target();
    let target = target
        .strip_prefix("chessboard_bridge::")
        .unwrap_or(target);
    format!(
        "{:>9.3}s {:<5} {}: {}",
        uptime.as_secs_f64(),
        record.level(),
        target,
        record.args()
    )
}

/// Initialize logging with a level taken from the `BRIDGE_LOG` environment variable.
/// Defaults to `info` if the variable is not set or invalid. Later calls only
/// update the level.
pub fn init_logging() {
    let level = env::var("BRIDGE_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    LOGGER.uptime();
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
