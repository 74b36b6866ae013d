use crate::Utils::config::ConfigError;
use chrono::Local;
use log::{debug, info};
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// off, error, warn, info or debug
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        other => Err(ConfigError::UnknownLogLevel(other.to_string())),
    }
}

pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Terminal logger plus, when `log_dir` is given, a timestamped log file in it.
/// Returns the log file path. A second call leaves the first logger in place
/// and removes the file it would have written to.
pub fn init_logger(level: &str, log_dir: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let log_option = parse_level(level)?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let log_path = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name());
            loggers.push(WriteLogger::new(log_option, Config::default(), File::create(&path)?));
            Some(path)
        }
        None => None,
    };
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("Program started with loglevel: {}", log_option);
            Ok(log_path)
        }
        // already initialised
        Err(_) => {
            if let Some(path) = log_path {
                std::fs::remove_file(&path)?;
                debug!("logger already set, {} discarded", path.display());
            }
            Ok(None)
        }
    }
}
