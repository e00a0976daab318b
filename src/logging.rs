//! Structured logging for benchmark runs
//!
//! Diagnostics never share a stream with the report: every entry goes to
//! stderr, leaving stdout for the formatted results. Provides:
//! - Leveled entries with structured fields and correlation IDs
//! - Console and JSON renderings (JSON under `--debug`)
//! - A benchmark event logger for batch lifecycle and lost outcomes
//! - An error event logger for fatal errors

use crate::error::{AppError, Result};
use crate::models::{BenchmarkReport, BenchmarkRequest, Config, RequestOutcome, UrlStatistic};
use crate::types::{AggregationStrategy, UrlSchedule};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Per-request and per-batch detail
    Debug = 1,
    /// Run lifecycle
    Info = 2,
    /// Lost outcomes and suspicious configuration
    Warn = 3,
    /// Failures that end the run
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    /// Minimum level implied by the verbosity flags
    pub fn for_config(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Unknown log level '{}'", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Emitting component, e.g. `BENCH`
    pub component: String,
    /// Ties together the entries of one URL batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable single line
    Console,
    /// One JSON object per line
    Json,
}

/// How a logger filters and renders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggerSettings {
    pub min_level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
    pub include_location: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            format: LogFormat::Console,
            use_color: true,
            include_location: false,
        }
    }
}

impl LoggerSettings {
    /// `--debug` switches to JSON lines with source locations
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_level: LogLevel::for_config(config),
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            use_color: config.enable_color,
            include_location: config.debug,
        }
    }
}

/// Fields merged into every entry of a logger
#[derive(Debug, Default)]
struct SessionContext {
    session_id: Option<String>,
    fields: BTreeMap<String, serde_json::Value>,
}

/// Leveled logger writing to stderr
#[derive(Debug)]
pub struct Logger {
    name: String,
    settings: LoggerSettings,
    session: Arc<RwLock<SessionContext>>,
}

impl Logger {
    /// Create a logger at info level with console output
    pub fn new(name: String) -> Self {
        Self::with_settings(name, LoggerSettings::default())
    }

    pub fn with_settings(name: String, settings: LoggerSettings) -> Self {
        Self {
            name,
            settings,
            session: Arc::new(RwLock::new(SessionContext::default())),
        }
    }

    /// Create a logger following the verbosity and color settings
    pub fn with_config(name: String, config: &Config) -> Self {
        Self::with_settings(name, LoggerSettings::from_config(config))
    }

    pub fn settings(&self) -> LoggerSettings {
        self.settings
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.settings.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.settings.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.settings.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach `session_id` to every entry from now on
    pub async fn set_session_id(&self, session_id: String) {
        self.session.write().await.session_id = Some(session_id);
    }

    /// Add a field attached to every subsequent entry
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.session.write().await.fields.insert(key, value);
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.settings.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let session = self.session.read().await;
            if let Some(session_id) = &session.session_id {
                entry.fields.insert("session_id".to_string(), session_id.clone().into());
            }
            entry
                .fields
                .extend(session.fields.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        let line = self.render(&entry);
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.settings.format {
            LogFormat::Console => self.render_console(entry),
            LogFormat::Json => serde_json::to_string(entry)
                .unwrap_or_else(|e| serde_json::json!({ "message": entry.message, "serialize_error": e.to_string() }).to_string()),
        }
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.settings.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut parts = vec![
            entry.timestamp.format("%H:%M:%S%.3f").to_string(),
            level,
            format!("[{}]", entry.component),
            entry.message.clone(),
        ];
        if let Some(id) = &entry.correlation_id {
            parts.push(format!("[{}]", id.chars().take(8).collect::<String>()));
        }
        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
            parts.push(format!("{{{}}}", fields.join(", ")));
        }
        if let (true, Some(location)) = (self.settings.include_location, &entry.location) {
            parts.push(format!("@ {}:{}", location.file, location.line));
        }
        parts.join(" ")
    }
}

/// Builder for one log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message,
            component: logger.name.clone(),
            correlation_id: None,
            fields: BTreeMap::new(),
            thread: std::thread::current().name().map(String::from),
            location: None,
        };
        Self { logger, entry }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field; values that fail to serialize are skipped
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Attach one request outcome
    pub fn outcome(self, outcome: &RequestOutcome) -> Self {
        self.field("elapsed_ms", outcome.elapsed_ms())
            .field("class", format!("{:?}", outcome.class()))
            .field("http_status", outcome.status())
    }

    /// Attach the headline figures of a URL statistic
    pub fn statistic(self, stat: &UrlStatistic) -> Self {
        let builder = self
            .field("url", &stat.url)
            .field("count", stat.count)
            .field("timeouts", stat.timeouts)
            .field("not2xx", stat.not2xx)
            .field("transport_errors", stat.transport_errors)
            .field("total_ms", stat.total().as_secs_f64() * 1000.0);
        match stat.latency {
            Some(latency) => builder
                .field("min_ms", latency.min_ms())
                .field("max_ms", latency.max_ms())
                .field("avg_ms", latency.avg_ms()),
            None => builder.field("latency", "unavailable"),
        }
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn build(self) -> LogEntry {
        self.entry
    }
}

/// Benchmark lifecycle events
#[derive(Debug)]
pub struct BenchmarkLogger {
    logger: Logger,
}

impl BenchmarkLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("BENCH".to_string(), config),
        }
    }

    /// Build from an existing logger, keeping its level and format
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_run_start(&self, request: &BenchmarkRequest, strategy: AggregationStrategy, schedule: UrlSchedule) {
        self.logger
            .info(&format!(
                "Benchmarking {} URL(s) with {} requests each",
                request.urls().len(),
                request.count()
            ))
            .field("urls", request.urls())
            .field("count", request.count())
            .field("timeout_ms", request.timeout().as_millis() as u64)
            .field("strategy", strategy.as_str())
            .field("schedule", schedule.as_str())
            .log()
            .await;
    }

    /// Log the launch of one URL batch and return its correlation ID
    pub async fn log_batch_start(&self, url: &str, count: usize) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.logger
            .debug(&format!("Launching {} requests against {}", count, url))
            .correlation_id(&correlation_id)
            .field("url", url)
            .field("count", count)
            .log()
            .await;
        correlation_id
    }

    pub async fn log_request(&self, correlation_id: &str, index: usize, outcome: &RequestOutcome) {
        if !self.logger.would_log(LogLevel::Debug) {
            return;
        }
        self.logger
            .debug(&format!("Request {} finished in {:.3}ms", index, outcome.elapsed_ms()))
            .correlation_id(correlation_id)
            .field("index", index)
            .outcome(outcome)
            .log()
            .await;
    }

    pub async fn log_batch_complete(&self, correlation_id: &str, stat: &UrlStatistic) {
        self.logger
            .info(&format!(
                "Completed {}: {}/{} successful",
                stat.url,
                stat.successes(),
                stat.count
            ))
            .correlation_id(correlation_id)
            .statistic(stat)
            .log()
            .await;
    }

    /// Requests whose task ended without reporting an outcome
    pub async fn log_unreported(&self, correlation_id: &str, url: &str, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        self.logger
            .warn(&format!(
                "{} request(s) against {} ended without reporting; counted as transport errors",
                indices.len(),
                url
            ))
            .correlation_id(correlation_id)
            .field("url", url)
            .field("indices", indices)
            .log()
            .await;
    }

    pub async fn log_record_failure(&self, correlation_id: &str, index: usize, error: &AppError) {
        self.logger
            .warn(&format!("Could not record outcome of request {}: {}", index, error))
            .correlation_id(correlation_id)
            .field("index", index)
            .error_info(error)
            .log()
            .await;
    }

    pub async fn log_run_complete(&self, report: &BenchmarkReport) {
        let without_data = report.urls_without_data();
        self.logger
            .info(&format!(
                "Run finished: {} requests, {} successful, {:.3}s wall clock",
                report.total_requests(),
                report.total_successes(),
                report.wall_clock().as_secs_f64()
            ))
            .field("urls", report.statistics.len())
            .field("urls_without_data", &without_data)
            .log()
            .await;
    }
}

/// Error event logger with context
#[derive(Debug)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR".to_string(), config),
        }
    }

    /// Log an application error with optional context
    pub async fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).error_info(error);

        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }

        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }

        builder.log().await;
    }
}

/// Creates loggers sharing one session ID
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_benchmark_logger(&self) -> BenchmarkLogger {
        BenchmarkLogger::from_logger(self.create_logger("BENCH").await)
    }

    pub fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::new(&self.config)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
