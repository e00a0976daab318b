//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::{BenchmarkReport, Outcome, UrlStatistic},
};
use std::fmt::Write as _;

/// Separator printed after every URL block
pub const STATISTIC_SEPARATOR: &str = "============================";

/// Printed in place of min/max/avg when no request succeeded
pub const NO_LATENCY_MESSAGE: &str = "All requests failed! Max, min and avg metrics are not available";

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format one URL's statistic
    fn format_statistic(&self, stat: &UrlStatistic) -> Result<String>;

    /// Format every statistic followed by a run summary
    fn format_report(&self, report: &BenchmarkReport) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Adds percentiles and throughput
    pub verbose_mode: bool,
    /// Lists every request's outcome
    pub show_individual_results: bool,
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: false,
            verbose_mode: false,
            show_individual_results: false,
            table_borders: true,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize) -> Self {
        Self { header: header.to_string(), alignment, min_width }
    }
}

/// Row data for table formatting
pub type RowData = Vec<String>;

pub(crate) fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Format a duration given in milliseconds for display
pub fn format_duration(duration_ms: f64) -> String {
    if duration_ms < 1.0 {
        format!("{:.2}μs", duration_ms * 1000.0)
    } else if duration_ms < 1000.0 {
        format!("{:.3}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.3}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0) as u32;
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

/// Format a percentage with one decimal
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

fn nanos_to_ms(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000.0
}

/// One-line description of a request outcome
pub fn describe_outcome(index: usize, outcome: &crate::models::RequestOutcome) -> String {
    let took = format_duration(outcome.elapsed_ms());
    match &outcome.outcome {
        Outcome::Response { status } => format!("#{:<5} {:>7} {}", index, status, took),
        Outcome::Timeout => format!("#{:<5} {:>7} {}", index, "timeout", took),
        Outcome::TransportError { message } => format!("#{:<5} {:>7} {} ({})", index, "error", took, message),
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Render rows as an aligned table
    pub fn create_table(&self, columns: &[Column], rows: &[RowData]) -> String {
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                rows.iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain([column.min_width, column.header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 4);
        let border = self.create_horizontal_border(&widths);
        if self.options.table_borders {
            lines.push(border.clone());
        }
        let headers: RowData = columns.iter().map(|c| c.header.clone()).collect();
        lines.push(self.create_row(&headers, &widths, columns));
        if self.options.table_borders {
            lines.push(border.clone());
        }
        for row in rows {
            lines.push(self.create_row(row, &widths, columns));
        }
        if self.options.table_borders {
            lines.push(border);
        }
        lines.join("\n")
    }

    fn create_row(&self, data: &[String], widths: &[usize], columns: &[Column]) -> String {
        let mut row = String::new();
        if self.options.table_borders {
            row.push('|');
        }

        for ((cell, &width), column) in data.iter().zip(widths).zip(columns) {
            let padding = width.saturating_sub(cell.chars().count());
            let padded = match column.alignment {
                Alignment::Left => format!("{}{}", cell, " ".repeat(padding)),
                Alignment::Right => format!("{}{}", " ".repeat(padding), cell),
            };
            if self.options.table_borders {
                row.push(' ');
                row.push_str(&padded);
                row.push_str(" |");
            } else {
                row.push_str(&padded);
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }

    /// Cross-URL summary table
    pub fn summary_table(&self, report: &BenchmarkReport) -> String {
        let columns = [
            Column::new("URL", Alignment::Left, 20),
            Column::new("OK", Alignment::Right, 6),
            Column::new("Timeouts", Alignment::Right, 8),
            Column::new("Not 2xx", Alignment::Right, 8),
            Column::new("Avg", Alignment::Right, 10),
        ];
        let rows: Vec<RowData> = report
            .statistics
            .iter()
            .map(|stat| {
                vec![
                    stat.url.clone(),
                    format!("{}/{}", stat.successes(), stat.count),
                    stat.timeouts.to_string(),
                    stat.not2xx.to_string(),
                    stat.latency
                        .map(|latency| format_duration(latency.avg_ms()))
                        .unwrap_or_else(|| "N/A".to_string()),
                ]
            })
            .collect();
        self.create_table(&columns, &rows)
    }

    fn write_run_summary(&self, output: &mut String, report: &BenchmarkReport) -> Result<()> {
        writeln!(
            output,
            "Run summary: {} URL(s), {} requests each, strategy {}, schedule {}",
            report.statistics.len(),
            report.count,
            report.strategy,
            report.schedule
        )
        .map_err(fmt_error)?;
        write!(
            output,
            "Successful requests: {}/{} in {}",
            report.total_successes(),
            report.total_requests(),
            format_duration(report.wall_clock().as_secs_f64() * 1000.0)
        )
        .map_err(fmt_error)?;

        let without_data = report.urls_without_data();
        if !without_data.is_empty() {
            write!(output, "\nNo latency data for: {}", without_data.join(", ")).map_err(fmt_error)?;
        }
        Ok(())
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_statistic(&self, stat: &UrlStatistic) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Test result for URL: {}", stat.url).map_err(fmt_error)?;
        writeln!(output, "Requests count: {}", stat.count).map_err(fmt_error)?;
        writeln!(
            output,
            "Total execution time: {} (nanos) [{}]",
            stat.total_nanos,
            format_duration(nanos_to_ms(stat.total_nanos))
        )
        .map_err(fmt_error)?;
        writeln!(output, "Timeouts: {} ({} of total)", stat.timeouts, format_percentage(stat.timeout_rate()))
            .map_err(fmt_error)?;
        write!(
            output,
            "Failed requests (not 2xx status code): {} ({} of total)",
            stat.not2xx,
            format_percentage(stat.not2xx_rate())
        )
        .map_err(fmt_error)?;
        if stat.transport_errors > 0 {
            write!(output, ", {} without a response", stat.transport_errors).map_err(fmt_error)?;
        }
        writeln!(output).map_err(fmt_error)?;

        match stat.latency {
            Some(latency) => {
                writeln!(output, "Min execution time: {} (nanos) [{}]", latency.min_nanos, format_duration(latency.min_ms()))
                    .map_err(fmt_error)?;
                writeln!(output, "Max execution time: {} (nanos) [{}]", latency.max_nanos, format_duration(latency.max_ms()))
                    .map_err(fmt_error)?;
                writeln!(
                    output,
                    "Average execution time: {:.2} (nanos) [{}]",
                    latency.avg_nanos,
                    format_duration(latency.avg_ms())
                )
                .map_err(fmt_error)?;
            }
            None => writeln!(output, "{}", NO_LATENCY_MESSAGE).map_err(fmt_error)?,
        }

        if self.options.verbose_mode {
            if let (Some(p50), Some(p90), Some(p99)) = (stat.percentile(50.0), stat.percentile(90.0), stat.percentile(99.0)) {
                writeln!(
                    output,
                    "Percentiles: p50 {}, p90 {}, p99 {}",
                    format_duration(nanos_to_ms(p50)),
                    format_duration(nanos_to_ms(p90)),
                    format_duration(nanos_to_ms(p99))
                )
                .map_err(fmt_error)?;
            }
            if let Some(rps) = stat.requests_per_second() {
                writeln!(output, "Throughput: {:.1} requests/s", rps).map_err(fmt_error)?;
            }
        }

        if self.options.show_individual_results {
            writeln!(output, "Requests:").map_err(fmt_error)?;
            for (index, outcome) in stat.outcomes.iter().enumerate() {
                writeln!(output, "  {}", describe_outcome(index, outcome)).map_err(fmt_error)?;
            }
        }

        write!(output, "{}", STATISTIC_SEPARATOR).map_err(fmt_error)?;
        Ok(output)
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        let mut output = String::new();
        for stat in &report.statistics {
            writeln!(output, "{}", self.format_statistic(stat)?).map_err(fmt_error)?;
        }
        if report.statistics.len() > 1 {
            writeln!(output, "{}", self.summary_table(report)).map_err(fmt_error)?;
        }
        self.write_run_summary(&mut output, report)?;
        Ok(output)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Warning: {}", warning))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("Error: {}", error))
    }
}
