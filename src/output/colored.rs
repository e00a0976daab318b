//! Colored formatter implementation with terminal color support

use super::formatter::{
    describe_outcome, fmt_error, format_duration, format_percentage, FormattingOptions, OutputFormatter,
    PlainFormatter, NO_LATENCY_MESSAGE, STATISTIC_SEPARATOR,
};
use crate::{
    error::Result,
    models::{BenchmarkReport, UrlStatistic},
    types::OutcomeClass,
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl PerformanceLevel {
    /// Classify a latency in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are off
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn format_duration_colored(&self, duration_ms: f64) -> ColoredString {
        let performance = PerformanceLevel::from_response_time(duration_ms);
        self.colorize(&format_duration(duration_ms), performance.color())
    }

    /// Color a failure share: green when zero, yellow under 5%, red above
    fn format_failure_rate_colored(&self, count: usize, percentage: f64) -> ColoredString {
        let text = format!("{} ({} of total)", count, format_percentage(percentage));
        let color = if count == 0 {
            self.color_scheme.success
        } else if percentage < 5.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&text, color)
    }

    fn outcome_color(&self, class: OutcomeClass) -> Color {
        match class {
            OutcomeClass::Success => self.color_scheme.success,
            OutcomeClass::NotOk => self.color_scheme.warning,
            OutcomeClass::Timeout | OutcomeClass::TransportError => self.color_scheme.error,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_statistic(&self, stat: &UrlStatistic) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{} {}",
            self.bold("Test result for URL:"),
            self.emphasize(&stat.url, self.color_scheme.info)
        )
        .map_err(fmt_error)?;
        writeln!(output, "Requests count: {}", stat.count).map_err(fmt_error)?;
        writeln!(
            output,
            "Total execution time: {} (nanos) [{}]",
            stat.total_nanos,
            format_duration(stat.total().as_secs_f64() * 1000.0)
        )
        .map_err(fmt_error)?;
        writeln!(output, "Timeouts: {}", self.format_failure_rate_colored(stat.timeouts, stat.timeout_rate()))
            .map_err(fmt_error)?;
        write!(
            output,
            "Failed requests (not 2xx status code): {}",
            self.format_failure_rate_colored(stat.not2xx, stat.not2xx_rate())
        )
        .map_err(fmt_error)?;
        if stat.transport_errors > 0 {
            let note = format!(", {} without a response", stat.transport_errors);
            write!(output, "{}", self.colorize(&note, self.color_scheme.error)).map_err(fmt_error)?;
        }
        writeln!(output).map_err(fmt_error)?;

        match stat.latency {
            Some(latency) => {
                writeln!(
                    output,
                    "Min execution time: {} (nanos) [{}]",
                    latency.min_nanos,
                    self.format_duration_colored(latency.min_ms())
                )
                .map_err(fmt_error)?;
                writeln!(
                    output,
                    "Max execution time: {} (nanos) [{}]",
                    latency.max_nanos,
                    self.format_duration_colored(latency.max_ms())
                )
                .map_err(fmt_error)?;
                let level = PerformanceLevel::from_response_time(latency.avg_ms());
                writeln!(
                    output,
                    "Average execution time: {:.2} (nanos) [{}] {}",
                    latency.avg_nanos,
                    self.format_duration_colored(latency.avg_ms()),
                    self.colorize(level.description(), level.color())
                )
                .map_err(fmt_error)?;
            }
            None => writeln!(output, "{}", self.emphasize(NO_LATENCY_MESSAGE, self.color_scheme.error))
                .map_err(fmt_error)?,
        }

        if self.options.verbose_mode {
            if let (Some(p50), Some(p90), Some(p99)) = (stat.percentile(50.0), stat.percentile(90.0), stat.percentile(99.0)) {
                writeln!(
                    output,
                    "Percentiles: p50 {}, p90 {}, p99 {}",
                    self.format_duration_colored(p50 as f64 / 1_000_000.0),
                    self.format_duration_colored(p90 as f64 / 1_000_000.0),
                    self.format_duration_colored(p99 as f64 / 1_000_000.0)
                )
                .map_err(fmt_error)?;
            }
            if let Some(rps) = stat.requests_per_second() {
                writeln!(output, "Throughput: {:.1} requests/s", rps).map_err(fmt_error)?;
            }
        }

        if self.options.show_individual_results {
            writeln!(output, "{}", self.bold("Requests:")).map_err(fmt_error)?;
            for (index, outcome) in stat.outcomes.iter().enumerate() {
                let line = describe_outcome(index, outcome);
                writeln!(output, "  {}", self.colorize(&line, self.outcome_color(outcome.class()))).map_err(fmt_error)?;
            }
        }

        write!(output, "{}", self.colorize(STATISTIC_SEPARATOR, self.color_scheme.muted)).map_err(fmt_error)?;
        Ok(output)
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        let mut output = String::new();
        for stat in &report.statistics {
            writeln!(output, "{}", self.format_statistic(stat)?).map_err(fmt_error)?;
        }
        if report.statistics.len() > 1 {
            writeln!(output, "{}", self.plain_formatter.summary_table(report)).map_err(fmt_error)?;
        }

        let header = format!(
            "Run summary: {} URL(s), {} requests each, strategy {}, schedule {}",
            report.statistics.len(),
            report.count,
            report.strategy,
            report.schedule
        );
        writeln!(output, "{}", self.emphasize(&header, self.color_scheme.header)).map_err(fmt_error)?;

        let successes = report.total_successes();
        let total = report.total_requests();
        let color = if successes == total { self.color_scheme.success } else { self.color_scheme.warning };
        write!(
            output,
            "Successful requests: {} in {}",
            self.colorize(&format!("{}/{}", successes, total), color),
            format_duration(report.wall_clock().as_secs_f64() * 1000.0)
        )
        .map_err(fmt_error)?;

        let without_data = report.urls_without_data();
        if !without_data.is_empty() {
            let line = format!("No latency data for: {}", without_data.join(", "));
            write!(output, "\n{}", self.colorize(&line, self.color_scheme.error)).map_err(fmt_error)?;
        }
        Ok(output)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Warning:", self.color_scheme.warning), warning))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Error:", self.color_scheme.error), error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatter::tests::{failed_statistic, ramp_statistic, report};

    fn uncolored(verbose: bool) -> ColoredFormatter {
        ColoredFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: verbose,
            show_individual_results: verbose,
            table_borders: true,
        })
    }

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_response_time(10.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_response_time(75.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_response_time(150.0), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_response_time(500.0), PerformanceLevel::Poor);
        assert_eq!(PerformanceLevel::from_response_time(2000.0), PerformanceLevel::VeryPoor);
    }

    #[test]
    fn test_uncolored_matches_plain_content() {
        let text = uncolored(false).format_statistic(&ramp_statistic("https://example.com")).unwrap();
        assert!(text.starts_with("Test result for URL: https://example.com"));
        assert!(text.contains("Timeouts: 0 (0.0% of total)"));
        assert!(text.contains("Average execution time: 5500000.00 (nanos) [5.500ms] Excellent"));
        assert!(text.ends_with(STATISTIC_SEPARATOR));
    }

    #[test]
    fn test_failed_statistic_message() {
        let text = uncolored(true).format_statistic(&failed_statistic("https://down.example")).unwrap();
        assert!(text.contains(NO_LATENCY_MESSAGE));
        assert!(text.contains("1 without a response"));
        assert!(text.contains("Requests:"));
    }

    #[test]
    fn test_report_summary() {
        let text = uncolored(false)
            .format_report(&report(vec![ramp_statistic("https://a.example"), failed_statistic("https://b.example")]))
            .unwrap();
        assert!(text.contains("Run summary: 2 URL(s)"));
        assert!(text.contains("Successful requests: 10/15"));
        assert!(text.contains("No latency data for: https://b.example"));
    }

    #[test]
    fn test_warning_and_error() {
        let formatter = uncolored(false);
        assert_eq!(formatter.format_warning("slow").unwrap(), "Warning: slow");
        assert_eq!(formatter.format_error("boom").unwrap(), "Error: boom");
    }
}
