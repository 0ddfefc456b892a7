//! Logging utilities for CLI output

use log::LevelFilter;

/// Log level for CLI output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Default `log` filter when `RUST_LOG` is unset
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Error,
            LogLevel::Normal => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

/// Install `env_logger`; `RUST_LOG` overrides the level's default filter
pub fn init_logger(level: LogLevel) {
    let default = level.filter().to_string().to_lowercase();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

/// Print a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Normal);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Verbose);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Quiet);
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Normal.filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Verbose.filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LogLevel::Quiet);
        init_logger(LogLevel::Verbose);
        log::debug!("logger installed");
    }
}
