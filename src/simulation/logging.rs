//! Logging and tracing configuration
//!
//! Every actor runs on its own named thread, so console output includes thread
//! names by default. Park events also flow through [`park_event!`] with
//! `component = "park"` for filtering.

use std::io;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether to enable JSON formatting on the console
    pub json_format: bool,
    /// Whether to also log to a daily rolling file
    pub log_to_file: bool,
    /// Log file directory (if logging to file)
    pub log_directory: Option<String>,
    /// Log file prefix (if logging to file)
    pub log_file_prefix: String,
    /// Whether to enable span events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Whether to print the actor thread name on every line
    pub thread_names: bool,
    /// Custom environment filter
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_to_file: false,
            log_directory: None,
            log_file_prefix: "theme-park-sim".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            thread_names: true,
            env_filter: None,
        }
    }
}

/// Keeps the non-blocking log writers flushing; drop it at process exit
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

type InitResult = Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>>;

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_to_file = true;
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Hide actor thread names
    pub fn without_thread_names(mut self) -> Self {
        self.thread_names = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(filter) = &self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level))
        }))
    }

    /// Install the global tracing subscriber
    ///
    /// Fails if a subscriber is already installed. Keep the returned guard
    /// alive for as long as file output should be written.
    pub fn init(self) -> InitResult {
        let registry = Registry::default().with(self.build_filter()?);
        let mut guard = LoggingGuard::default();

        let file_layer = if self.log_to_file {
            let log_dir = self.log_directory.as_deref().unwrap_or("logs");
            let (writer, file_guard) = non_blocking(rolling::daily(log_dir, &self.log_file_prefix));
            guard._guards.push(file_guard);
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_thread_names(self.thread_names)
                    .with_span_events(self.span_events()),
            )
        } else {
            None
        };

        if self.json_format {
            let console = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_thread_names(self.thread_names)
                .with_span_events(self.span_events());
            registry.with(file_layer).with(console).try_init()?;
        } else {
            let console = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_thread_names(self.thread_names)
                .with_span_events(self.span_events());
            registry.with(file_layer).with(console).try_init()?;
        }

        info!(
            level = %self.level,
            json = self.json_format,
            file = self.log_to_file,
            "Logging initialized"
        );
        Ok(guard)
    }

    /// Initialize logging for testing (warnings only, no colors)
    pub fn init_test() -> InitResult {
        Self::new().with_level(Level::WARN).without_ansi().init()
    }

    /// Initialize verbose logging (INFO level with span events)
    pub fn init_verbose() -> InitResult {
        Self::new().with_level(Level::INFO).with_span_events().init()
    }

    /// Initialize debug logging (DEBUG level with span events)
    pub fn init_debug() -> InitResult {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }

    /// Initialize quiet logging (warnings only)
    pub fn init_quiet() -> InitResult {
        Self::new().with_level(Level::WARN).init()
    }
}

/// Emit a structured log line tagged as a park occurrence
///
/// ```rust
/// theme_park_sim::park_event!(info, "Ride opened", ride = "Carousel", minute = 0u64);
/// ```
#[macro_export]
macro_rules! park_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "park",
            $($key = $value,)*
        );
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(
            message = $message,
            component = "park",
        );
    };
}
