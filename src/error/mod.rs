//! Error handling for the HTTP benchmark

use colored::{Color, Colorize};
use thiserror::Error;

/// Custom error types for the HTTP benchmark
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network connectivity errors (connection refused, DNS failure, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Benchmark execution errors
    #[error("Benchmark execution error: {0}")]
    Execution(String),

    /// Statistics calculation errors
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

macro_rules! constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            #[doc = concat!("Create a `", stringify!($variant), "` error")]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant(message.into())
            }
        )*
    };
}

impl AppError {
    constructors! {
        config => Config,
        network => Network,
        http_request => HttpRequest,
        timeout => Timeout,
        validation => Validation,
        io => Io,
        parse => Parse,
        execution => Execution,
        statistics => Statistics,
        internal => Internal,
    }

    /// Short tag used in console output and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Execution(_) => "EXECUTION",
            Self::Statistics(_) => "STATS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error belongs to a single request.
    ///
    /// Request-level errors are recorded as outcome data by the executor and
    /// never abort a benchmark run.
    pub fn is_request_level(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_))
    }

    fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Network(msg)
            | Self::HttpRequest(msg)
            | Self::Timeout(msg)
            | Self::Validation(msg)
            | Self::Io(msg)
            | Self::Parse(msg)
            | Self::Execution(msg)
            | Self::Statistics(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// What the user can try next
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check your .env file, BENCH_* variables or command line arguments.",
            Self::Network(_) => "Check that the target host is reachable from this machine.",
            Self::HttpRequest(_) => "The target server may be down or rejecting requests.",
            Self::Timeout(_) => "Increase the per-request timeout with --timeout.",
            Self::Validation(_) => "Check the URLs, request count and timeout.",
            Self::Io(_) => "Check file permissions and disk space.",
            Self::Parse(_) => "Check the format of the value shown above.",
            Self::Execution(_) => "Lower --count or check system resources.",
            Self::Statistics(_) => "An outcome set did not cover its request batch; please report this.",
            Self::Internal(_) => "This is likely a bug; please report it with the details above.",
        }
    }

    /// Message plus a suggestion, for verbose error output
    pub fn user_friendly_message(&self) -> String {
        format!("{}\n\nSuggestion: {}", self.message(), self.suggestion())
    }

    /// Process exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Execution(_) | Self::Statistics(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    fn console_color(&self) -> Color {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => Color::Red,
            Self::Network(_) | Self::HttpRequest(_) => Color::Yellow,
            Self::Timeout(_) => Color::Blue,
            Self::Io(_) | Self::Execution(_) | Self::Statistics(_) => Color::Cyan,
            Self::Internal(_) => Color::BrightRed,
        }
    }

    /// `[CATEGORY] message`, colored by category when `use_color` is set
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if !use_color {
            return format!("[{}] {}", category, message);
        }
        let color = self.console_color();
        format!("[{}] {}", category.color(color).bold(), message.color(color))
    }
}

/// `From` impls that wrap a foreign error's message in one variant
macro_rules! wrap_errors {
    ($($source:ty => $ctor:ident($prefix:literal)),* $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(error: $source) -> Self {
                    Self::$ctor(format!(concat!($prefix, "{}"), error))
                }
            }
        )*
    };
}

wrap_errors! {
    std::io::Error => io(""),
    url::ParseError => parse("URL parse error: "),
    serde_json::Error => parse("JSON error: "),
    dotenv::Error => config("Environment file error: "),
    std::num::ParseIntError => parse("Integer parse error: "),
    std::str::ParseBoolError => parse("Boolean parse error: "),
    tokio::task::JoinError => execution("Benchmark task failed: "),
    anyhow::Error => internal(""),
}

/// Timeouts and connection failures keep their own variants so the
/// executor can classify them.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_timeout() {
            Self::Timeout(message)
        } else if error.is_connect() || error.is_request() {
            Self::Network(message)
        } else {
            Self::HttpRequest(message)
        }
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way it is shown on stderr
    pub fn render(&self, error: &AppError) -> String {
        let mut rendered = error.format_for_console(self.use_color);
        if self.verbose {
            rendered.push_str("\n\n");
            rendered.push_str(&error.user_friendly_message());
        }
        rendered
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
