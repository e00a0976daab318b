//! Command-line interface

use crate::types::{AggregationStrategy, OutputFormat};
use clap::{ArgAction, Parser};
use std::time::Duration;

/// HTTP Benchmark - fire concurrent GET requests at each URL and report latency
#[derive(Parser, Debug, Clone)]
#[command(name = "hbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target URLs to benchmark
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Additional target URL (can be used multiple times)
    #[arg(long = "url", value_name = "URL", action = ArgAction::Append)]
    pub extra_urls: Vec<String>,

    /// Number of concurrent requests per URL
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Per-request timeout: seconds, or a value suffixed ms, s or m
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// How request outcomes are aggregated
    #[arg(long, value_enum)]
    pub strategy: Option<AggregationStrategy>,

    /// Benchmark all URLs at the same time instead of one after another
    #[arg(long)]
    pub parallel_urls: bool,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub print_env_example: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.count == Some(0) {
            return Err("--count must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Positional URLs followed by `--url` ones
    pub fn all_urls(&self) -> Vec<String> {
        self.urls.iter().chain(self.extra_urls.iter()).cloned().collect()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a timeout such as `30`, `250ms`, `2s` or `1m`
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.starts_with('+') || s.starts_with('-') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    let (digits, unit_ms) = if let Some(value) = s.strip_suffix("ms") {
        (value, 1)
    } else if let Some(value) = s.strip_suffix('s') {
        (value, 1_000)
    } else if let Some(value) = s.strip_suffix('m') {
        (value, 60_000)
    } else {
        (s, 1_000)
    };

    let amount: u64 = digits.parse().map_err(|_| format!("Invalid duration: {}", s))?;
    let millis = amount
        .checked_mul(unit_ms)
        .ok_or_else(|| "Duration cannot exceed 300 seconds".to_string())?;

    if millis == 0 {
        Err("Duration must be greater than 0".to_string())
    } else if millis > crate::models::config::MAX_TIMEOUT_MS {
        Err("Duration cannot exceed 300 seconds".to_string())
    } else {
        Ok(Duration::from_millis(millis))
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["hbench", "https://example.com", "--count", "5", "--timeout", "10"]);
        assert_eq!(cli.urls, vec!["https://example.com"]);
        assert_eq!(cli.count, Some(5));
        assert_eq!(cli.timeout, Some(Duration::from_secs(10)));
        assert!(!cli.verbose);
        assert!(!cli.parallel_urls);
        assert!(cli.strategy.is_none());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "hbench",
            "https://a.example.com",
            "--url", "https://b.example.com",
            "-c", "250",
            "-t", "750ms",
            "--strategy", "guarded",
            "--parallel-urls",
            "--format", "json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.all_urls(), vec!["https://a.example.com", "https://b.example.com"]);
        assert_eq!(cli.count, Some(250));
        assert_eq!(cli.timeout, Some(Duration::from_millis(750)));
        assert_eq!(cli.strategy, Some(AggregationStrategy::Guarded));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.parallel_urls);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Cli::try_parse_from(["hbench", "--strategy", "optimistic"]).is_err());
    }

    #[test]
    fn test_validate_conflicts() {
        let cli = Cli::parse_from(["hbench", "--color", "--no-color"]);
        assert!(cli.validate().unwrap_err().contains("--color"));

        let cli = Cli::parse_from(["hbench", "-c", "0"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["hbench", "https://example.com"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_use_colors_flags() {
        assert!(!Cli::parse_from(["hbench", "--no-color"]).use_colors());
        assert!(Cli::parse_from(["hbench", "--color"]).use_colors());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("300").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_duration_parsing_edge_cases() {
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("6m").is_err());
        assert!(parse_duration("18446744073709551615m").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10.5").is_err());
        assert!(parse_duration("+10").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("10h").is_err());
    }
}
