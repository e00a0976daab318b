//! Report formatting
//!
//! Text output follows a fixed per-URL block layout, optionally colored;
//! JSON output serializes the whole report.

mod colored;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{
    Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, NO_LATENCY_MESSAGE,
    STATISTIC_SEPARATOR,
};
pub use json::JsonFormatter;

use crate::{error::Result, models::{BenchmarkReport, Config}, types::OutputFormat};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the format, color and verbosity choice
    pub fn create(format: OutputFormat, enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new(verbose)),
            OutputFormat::Text => {
                let options = FormattingOptions {
                    enable_color,
                    verbose_mode: verbose,
                    show_individual_results: verbose,
                    table_borders: true,
                };
                if enable_color {
                    Box::new(ColoredFormatter::new(options))
                } else {
                    Box::new(PlainFormatter::new(options))
                }
            }
        }
    }

    pub fn from_config(config: &Config) -> Box<dyn OutputFormatter> {
        Self::create(config.output_format, config.enable_color, config.verbose)
    }
}

/// Renders a finished run to strings for stdout and stderr
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OutputFormatterFactory::from_config(config))
    }

    /// Report text for stdout
    pub fn display_report(&self, report: &BenchmarkReport) -> Result<String> {
        self.formatter.format_report(report)
    }

    /// Warning lines for stderr
    pub fn display_warnings<S: AsRef<str>>(&self, warnings: &[S]) -> Result<Vec<String>> {
        warnings.iter().map(|w| self.formatter.format_warning(w.as_ref())).collect()
    }

    pub fn display_error(&self, error: &str) -> Result<String> {
        self.formatter.format_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatter::tests::{ramp_statistic, report};

    #[test]
    fn test_factory_picks_format() {
        let report = report(vec![ramp_statistic("https://a.example")]);

        let json = OutputFormatterFactory::create(OutputFormat::Json, true, false).format_report(&report).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let text = OutputFormatterFactory::create(OutputFormat::Text, false, false).format_report(&report).unwrap();
        assert!(text.starts_with("Test result for URL: https://a.example"));
    }

    #[test]
    fn test_coordinator_warnings() {
        let config = Config { enable_color: false, ..Config::default() };
        let coordinator = OutputCoordinator::from_config(&config);
        let lines = coordinator.display_warnings(&["one", "two"]).unwrap();
        assert_eq!(lines, vec!["Warning: one", "Warning: two"]);
        assert_eq!(coordinator.display_error("bad").unwrap(), "Error: bad");
    }
}
