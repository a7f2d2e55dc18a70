// Structured logger with colored output, level filtering, and custom log
// handler support. Components receive a shared `MarketLogger` from the
// engine context instead of writing to stdout directly.

use std::fmt;
use std::sync::Arc;

use crate::options::LoggerOptions;

/// ANSI escape codes used for terminal output.
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Log levels, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Success = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// ANSI color for this log level.
    pub fn color(&self) -> &'static str {
        match self {
            LogLevel::Debug => ansi::MAGENTA,
            LogLevel::Info => ansi::BLUE,
            LogLevel::Success => ansi::GREEN,
            LogLevel::Warn => ansi::YELLOW,
            LogLevel::Error => ansi::RED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "success" => Self::Success,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Warn,
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Whether logging is disabled entirely.
    pub disabled: bool,
    /// Whether to disable ANSI color output.
    pub disable_colors: bool,
    /// The minimum log level to emit.
    pub level: LogLevel,
    /// Optional custom log handler (overrides default stderr/stdout output).
    pub custom_handler: Option<Arc<dyn LogHandler>>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            disable_colors: false,
            level: LogLevel::Warn,
            custom_handler: None,
        }
    }
}

impl From<&LoggerOptions> for LoggerConfig {
    fn from(options: &LoggerOptions) -> Self {
        Self {
            disabled: options.disabled,
            level: LogLevel::from(options.level.as_str()),
            ..Default::default()
        }
    }
}

/// Custom log handler trait for embedder-provided logging backends.
pub trait LogHandler: Send + Sync + fmt::Debug {
    fn handle(&self, level: LogLevel, message: &str, args: &[&str]);
}

/// The logger used throughout the engine.
#[derive(Clone)]
pub struct MarketLogger {
    config: LoggerConfig,
}

impl fmt::Debug for MarketLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketLogger")
            .field("level", &self.config.level)
            .field("disabled", &self.config.disabled)
            .finish()
    }
}

impl MarketLogger {
    /// Create a new logger with the given configuration.
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Get the current log level.
    pub fn level(&self) -> LogLevel {
        self.config.level
    }

    /// Whether a given level should be published.
    pub fn should_publish(&self, level: LogLevel) -> bool {
        if self.config.disabled {
            return false;
        }
        level >= self.config.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, &[]);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, &[]);
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message, &[]);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, &[]);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, &[]);
    }

    /// Log a message with extra arguments.
    pub fn log(&self, level: LogLevel, message: &str, args: &[&str]) {
        if !self.should_publish(level) {
            return;
        }

        if let Some(ref handler) = self.config.custom_handler {
            // Custom handlers only see the four conventional levels.
            let handler_level = if level == LogLevel::Success {
                LogLevel::Info
            } else {
                level
            };
            handler.handle(handler_level, message, args);
            return;
        }

        let formatted = self.format_message(level, message);
        match level {
            LogLevel::Warn | LogLevel::Error => {
                eprintln!("{}{}", formatted, format_args_str(args))
            }
            _ => println!("{}{}", formatted, format_args_str(args)),
        }
    }

    /// Format a log message with timestamp, level, and prefix.
    fn format_message(&self, level: LogLevel, message: &str) -> String {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        if self.config.disable_colors {
            format!("{} {} [Fangate]: {}", timestamp, level.as_str(), message)
        } else {
            format!(
                "{dim}{timestamp}{reset} {color}{level}{reset} {bright}[Fangate]:{reset} {message}",
                dim = ansi::DIM,
                reset = ansi::RESET,
                color = level.color(),
                level = level.as_str(),
                bright = ansi::BRIGHT,
            )
        }
    }
}

impl Default for MarketLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

fn format_args_str(args: &[&str]) -> String {
    if args.is_empty() {
        String::new()
    } else {
        format!(" {}", args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Success);
        assert!(LogLevel::Success < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_should_publish_respects_level() {
        let logger = MarketLogger::new(LoggerConfig {
            level: LogLevel::Warn,
            ..Default::default()
        });
        assert!(!logger.should_publish(LogLevel::Debug));
        assert!(!logger.should_publish(LogLevel::Info));
        assert!(logger.should_publish(LogLevel::Warn));
        assert!(logger.should_publish(LogLevel::Error));
    }

    #[test]
    fn test_disabled_logger_publishes_nothing() {
        let logger = MarketLogger::new(LoggerConfig {
            disabled: true,
            ..Default::default()
        });
        assert!(!logger.should_publish(LogLevel::Error));
    }

    #[test]
    fn test_config_from_options() {
        let options = LoggerOptions {
            disabled: false,
            level: "debug".to_string(),
        };
        let config = LoggerConfig::from(&options);
        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.disabled);
    }

    #[test]
    fn test_format_message_no_color() {
        let logger = MarketLogger::new(LoggerConfig {
            disable_colors: true,
            level: LogLevel::Debug,
            ..Default::default()
        });
        let msg = logger.format_message(LogLevel::Info, "quote issued");
        assert!(msg.contains("INFO"));
        assert!(msg.contains("[Fangate]:"));
        assert!(msg.contains("quote issued"));
        assert!(!msg.contains("\x1b["));
    }

    #[test]
    fn test_format_message_with_color() {
        let logger = MarketLogger::new(LoggerConfig {
            level: LogLevel::Debug,
            ..Default::default()
        });
        let msg = logger.format_message(LogLevel::Error, "approval failed");
        assert!(msg.contains("\x1b["));
        assert!(msg.contains("ERROR"));
    }

    #[derive(Debug)]
    struct CapturingHandler {
        captured: std::sync::Mutex<Vec<(LogLevel, String)>>,
    }

    impl LogHandler for CapturingHandler {
        fn handle(&self, level: LogLevel, message: &str, _args: &[&str]) {
            self.captured
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }

    #[test]
    fn test_custom_handler_receives_messages() {
        let handler = Arc::new(CapturingHandler {
            captured: std::sync::Mutex::new(Vec::new()),
        });
        let logger = MarketLogger::new(LoggerConfig {
            level: LogLevel::Debug,
            custom_handler: Some(handler.clone()),
            ..Default::default()
        });
        logger.info("purchase created");
        logger.success("purchase approved");

        let captured = handler.captured.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], (LogLevel::Info, "purchase created".into()));
        // Success is folded into Info for custom handlers.
        assert_eq!(captured[1], (LogLevel::Info, "purchase approved".into()));
    }

    #[test]
    fn test_format_args_str() {
        assert_eq!(format_args_str(&[]), "");
        assert_eq!(format_args_str(&["a", "b"]), " a b");
    }
}
