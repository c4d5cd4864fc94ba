//! log4rs setup for embedding applications.
//!
//! The library itself only uses the `log` facade; nothing here runs unless the host calls it.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::QueryConfig;

pub const METRICS_TARGET: &str = "docquery::metrics";
pub const DEV6_TARGET: &str = "docquery::dev6";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const KEEP: u32 = 7;

/// Initializes logging from `log4rs.yaml` in the working directory.
///
/// # Errors
/// Returns an error if the file is missing or invalid.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_path(Path::new("log4rs.yaml"))
}

/// # Errors
/// Returns an error if the file is missing or invalid.
pub fn init_path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

/// Uses `log_config` from the query config when set; otherwise falls back to `init()`.
///
/// # Errors
/// Returns an error if the chosen file is missing or invalid.
pub fn init_from_config(cfg: &QueryConfig) -> Result<(), Box<dyn std::error::Error>> {
    match &cfg.log_config {
        Some(p) => init_path(p),
        None => init(),
    }
}

/// Writes `{base}/{app}_logs/{app}.log` plus `{app}_metrics.log` for the metrics target, both
/// size-rolled. `dev6` bench lines go to `{app}_dev6.log` when `with_dev6` is set.
///
/// # Errors
/// Returns an error if the directory cannot be created or the logger fails to initialize.
pub fn init_for_app_in(
    base_dir: &Path,
    app: &str,
    level: LevelFilter,
    with_dev6: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = base_dir.join(format!("{app}_logs"));
    std::fs::create_dir_all(&dir)?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&dir, app)?)))
        .appender(Appender::builder().build("metrics", Box::new(rolling(&dir, &format!("{app}_metrics"))?)))
        .logger(Logger::builder().appender("metrics").additive(false).build(METRICS_TARGET, level));
    builder = if with_dev6 {
        builder
            .appender(Appender::builder().build("dev6", Box::new(rolling(&dir, &format!("{app}_dev6"))?)))
            .logger(Logger::builder().appender("dev6").additive(false).build(DEV6_TARGET, LevelFilter::Trace))
    } else {
        builder.logger(Logger::builder().additive(false).build(DEV6_TARGET, LevelFilter::Off))
    };
    let config = builder.build(Root::builder().appender("app").build(level))?;
    log4rs::init_config(config)?;
    Ok(dir)
}

/// Parses `error|warn|info|debug|trace|off`; anything else is `Info`.
#[must_use]
pub fn parse_level(raw: &str) -> LevelFilter {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, stem: &str) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder().build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), KEEP)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}
