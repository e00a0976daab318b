//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
    types::UrlSchedule,
};

/// Combines defaults, `.env`, environment variables and CLI arguments
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::validation)?;

        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        if config.debug {
            eprintln!("Final configuration:\n{}", display_config_summary(&config));
        }

        Ok(config)
    }

    /// Apply CLI argument overrides; absent options keep earlier layers
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        let urls = self.cli.all_urls();
        if !urls.is_empty() {
            config.target_urls = urls;
        }

        if let Some(count) = self.cli.count {
            config.request_count = count;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_ms = timeout.as_millis() as u64;
        }

        if let Some(strategy) = self.cli.strategy {
            config.strategy = strategy;
        }

        if self.cli.parallel_urls {
            config.schedule = UrlSchedule::Concurrent;
        }

        if let Some(format) = self.cli.format {
            config.output_format = format;
        }

        if self.cli.color || self.cli.no_color {
            config.enable_color = self.cli.use_colors();
        }

        // Verbosity is CLI-only
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output
pub fn display_config_summary(config: &Config) -> String {
    [
        format!("Target URLs: {}", config.target_urls.join(", ")),
        format!("Request Count: {}", config.request_count),
        format!("Timeout: {}ms", config.timeout_ms),
        format!("Strategy: {}", config.strategy),
        format!("Schedule: {}", config.schedule),
        format!("Output Format: {:?}", config.output_format),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AggregationStrategy, OutputFormat};
    use clap::Parser;

    fn overridden(args: &[&str]) -> Config {
        let cli = Cli::parse_from(std::iter::once("hbench").chain(args.iter().copied()));
        let mut config = Config::default();
        ConfigParser::new(cli).apply_cli_overrides(&mut config);
        config
    }

    #[test]
    fn test_cli_overrides() {
        let config = overridden(&[
            "https://a.example.com",
            "--url", "https://b.example.com",
            "--count", "10",
            "--timeout", "5",
            "--strategy", "guarded",
            "--parallel-urls",
            "--format", "json",
            "--no-color",
            "--verbose",
        ]);

        assert_eq!(config.target_urls, vec!["https://a.example.com", "https://b.example.com"]);
        assert_eq!(config.request_count, 10);
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.strategy, AggregationStrategy::Guarded);
        assert_eq!(config.schedule, UrlSchedule::Concurrent);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(!config.enable_color);
        assert!(config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_absent_options_keep_earlier_layers() {
        let cli = Cli::parse_from(["hbench"]);
        let mut config = Config {
            target_urls: vec!["https://env.example.com".to_string()],
            request_count: 42,
            timeout_ms: 1_234,
            strategy: AggregationStrategy::Guarded,
            enable_color: false,
            ..Config::default()
        };
        ConfigParser::new(cli).apply_cli_overrides(&mut config);

        assert_eq!(config.target_urls, vec!["https://env.example.com"]);
        assert_eq!(config.request_count, 42);
        assert_eq!(config.timeout_ms, 1_234);
        assert_eq!(config.strategy, AggregationStrategy::Guarded);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_conflicting_flags_rejected_before_loading() {
        let cli = Cli::parse_from(["hbench", "https://example.com", "--color", "--no-color"]);
        let error = ConfigParser::new(cli).parse().unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&overridden(&["https://example.com", "-c", "3"]));
        assert!(summary.contains("Target URLs: https://example.com"));
        assert!(summary.contains("Request Count: 3"));
        assert!(summary.contains("Strategy: partitioned"));
        assert!(summary.contains("Timeout: 30000ms"));
    }
}
