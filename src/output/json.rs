//! JSON report output for scripts and pipelines

use super::formatter::OutputFormatter;
use crate::{
    error::Result,
    models::{BenchmarkReport, UrlStatistic},
};
use serde_json::{json, Value};

/// Pretty-printed JSON formatter
///
/// Per-request outcomes are included only when `include_outcomes` is set;
/// the aggregated figures are always present.
pub struct JsonFormatter {
    include_outcomes: bool,
}

impl JsonFormatter {
    pub fn new(include_outcomes: bool) -> Self {
        Self { include_outcomes }
    }

    fn statistic_value(&self, stat: &UrlStatistic) -> Result<Value> {
        let mut value = serde_json::to_value(stat)?;
        if let Value::Object(map) = &mut value {
            if !self.include_outcomes {
                map.remove("outcomes");
            }
            map.insert("successes".to_string(), json!(stat.successes()));
            map.insert("success_rate".to_string(), json!(stat.success_rate()));
        }
        Ok(value)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_statistic(&self, stat: &UrlStatistic) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.statistic_value(stat)?)?)
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        if let Value::Object(map) = &mut value {
            let statistics = report
                .statistics
                .iter()
                .map(|stat| self.statistic_value(stat))
                .collect::<Result<Vec<_>>>()?;
            map.insert("statistics".to_string(), Value::Array(statistics));
            map.insert("total_requests".to_string(), json!(report.total_requests()));
            map.insert("total_successes".to_string(), json!(report.total_successes()));
        }
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(json!({ "warning": warning }).to_string())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(json!({ "error": error }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatter::tests::{failed_statistic, ramp_statistic, report};

    #[test]
    fn test_report_fields() {
        let report = report(vec![ramp_statistic("https://a.example"), failed_statistic("https://b.example")]);
        let text = JsonFormatter::new(false).format_report(&report).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["strategy"], "partitioned");
        assert_eq!(value["schedule"], "sequential");
        assert_eq!(value["total_requests"], 15);
        assert_eq!(value["total_successes"], 10);

        let first = &value["statistics"][0];
        assert_eq!(first["url"], "https://a.example");
        assert_eq!(first["latency"]["min_nanos"], 1_000_000);
        assert_eq!(first["latency"]["max_nanos"], 10_000_000);
        assert_eq!(first["successes"], 10);
        assert!(first.get("outcomes").is_none());

        let second = &value["statistics"][1];
        assert!(second["latency"].is_null());
        assert_eq!(second["timeouts"], 2);
        assert_eq!(second["not2xx"], 3);
        assert_eq!(second["transport_errors"], 1);
    }

    #[test]
    fn test_outcomes_included_on_request() {
        let text = JsonFormatter::new(true).format_statistic(&failed_statistic("https://b.example")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[0]["kind"], "timeout");
        assert_eq!(outcomes[2]["status"], 500);
    }

    #[test]
    fn test_warning_is_json() {
        let value: Value = serde_json::from_str(&JsonFormatter::new(false).format_warning("careful").unwrap()).unwrap();
        assert_eq!(value["warning"], "careful");
    }
}
