//! Process-wide logging on top of `log4rs`.
//!
//! Application logs go to the console and, when a directory is configured, to
//! a size-rolled `findspot.log`. Mutations are also written to the
//! `findspot::audit` target, which gets its own `audit.log` file.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

pub const AUDIT_TARGET: &str = "findspot::audit";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{name}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{name}.log")), Box::new(policy))?)
}

/// Build the logging configuration.
/// - dir: directory for `findspot.log`/`audit.log`; console only if None
/// - level: error|warn|info|debug|trace (default info)
/// - retention: number of rolled files kept per log (default 7)
///
/// # Errors
/// Returns an error if the log directory or an appender cannot be created.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let lvl = level.map_or(LevelFilter::Info, parse_level);
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let console = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(PATTERN))).build();
    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
        builder = builder
            .appender(Appender::builder().build("app", Box::new(rolling(dir, "findspot", keep)?)))
            .appender(Appender::builder().build("audit", Box::new(rolling(dir, "audit", keep)?)))
            .logger(Logger::builder().appender("audit").additive(true).build(AUDIT_TARGET, lvl));
        root = root.appender("app");
    }
    Ok(builder.build(root.build(lvl))?)
}

/// Install the logger for the whole process. A logger that is already
/// installed is left in place.
///
/// # Errors
/// Returns an error if the configuration cannot be built.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention)?;
    if log4rs::init_config(config).is_err() {
        log::debug!("logger already initialized; keeping existing configuration");
    }
    Ok(())
}

/// Configure logging from environment variables if present:
/// - FINDSPOT_LOG_DIR
/// - FINDSPOT_LOG_LEVEL
/// - FINDSPOT_LOG_RETENTION
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("FINDSPOT_LOG_DIR").ok().map(std::path::PathBuf::from);
    let level = std::env::var("FINDSPOT_LOG_LEVEL").ok();
    let retention =
        std::env::var("FINDSPOT_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
