//! Environment variable handling and .env file management

use crate::{
    error::{AppError, Result},
    models::config::{MAX_REQUEST_COUNT, MAX_TIMEOUT_MS},
    types::{AggregationStrategy, OutputFormat, UrlSchedule},
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists
    ///
    /// Variables already set in the process environment win over the file.
    pub fn load_env_file(debug: bool) -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                eprintln!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        if debug {
            eprintln!("Loaded configuration from {}", path.display());
        }
        Ok(true)
    }

    /// Example .env file content
    pub fn create_example_env_content() -> String {
        r#"# HTTP Benchmark Configuration
#
# Values here are defaults; environment variables already set and
# command-line arguments take precedence.

# Target URLs to benchmark (comma-separated)
# BENCH_URLS=https://example.com,https://example.org

# Concurrent requests per URL (1-100000)
# BENCH_COUNT=100

# Per-request timeout in milliseconds (1-300000)
# BENCH_TIMEOUT_MS=30000

# Aggregation strategy: partitioned or guarded
# BENCH_STRATEGY=partitioned

# URL schedule: sequential or concurrent
# BENCH_SCHEDULE=sequential

# Report format: text or json
# BENCH_FORMAT=text

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save the example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate one environment variable before it is merged
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "BENCH_URLS" => {
                for url in value.split(',').map(str::trim).filter(|u| !u.is_empty()) {
                    url::Url::parse(url)
                        .map_err(|e| AppError::config(format!("Invalid BENCH_URLS entry '{}': {}", url, e)))?;
                }
            }
            "BENCH_COUNT" => {
                let count: u32 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid BENCH_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > MAX_REQUEST_COUNT {
                    return Err(AppError::config(format!(
                        "BENCH_COUNT must be between 1 and {}, got: {}",
                        MAX_REQUEST_COUNT, count
                    )));
                }
            }
            "BENCH_TIMEOUT_MS" => {
                let timeout: u64 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid BENCH_TIMEOUT_MS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > MAX_TIMEOUT_MS {
                    return Err(AppError::config(format!(
                        "BENCH_TIMEOUT_MS must be between 1 and {}, got: {}",
                        MAX_TIMEOUT_MS, timeout
                    )));
                }
            }
            "BENCH_STRATEGY" => {
                value.parse::<AggregationStrategy>()?;
            }
            "BENCH_SCHEDULE" => {
                value.parse::<UrlSchedule>()?;
            }
            "BENCH_FORMAT" => {
                value.parse::<OutputFormat>()?;
            }
            "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables: name, description, example
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("BENCH_URLS", "Comma-separated list of URLs to benchmark", "https://example.com,https://example.org"),
            ("BENCH_COUNT", "Concurrent requests per URL (1-100000)", "100"),
            ("BENCH_TIMEOUT_MS", "Per-request timeout in milliseconds (1-300000)", "30000"),
            ("BENCH_STRATEGY", "Aggregation strategy (partitioned, guarded)", "partitioned"),
            ("BENCH_SCHEDULE", "URL schedule (sequential, concurrent)", "sequential"),
            ("BENCH_FORMAT", "Report format (text, json)", "text"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Check every supported variable currently set in the environment
    pub fn validate_current_env() -> Vec<AppError> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(key, _, _)| std::env::var(key).ok().map(|value| (key, value)))
            .filter_map(|(key, value)| Self::validate_env_var(key, &value).err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("BENCH_URLS", "https://example.com, https://example.org").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_COUNT", "1000").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_TIMEOUT_MS", "250").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_STRATEGY", "guarded").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_SCHEDULE", "concurrent").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_FORMAT", "json").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());

        assert!(EnvManager::validate_env_var("BENCH_URLS", "not-a-url").is_err());
        assert!(EnvManager::validate_env_var("BENCH_COUNT", "0").is_err());
        assert!(EnvManager::validate_env_var("BENCH_COUNT", "100001").is_err());
        assert!(EnvManager::validate_env_var("BENCH_TIMEOUT_MS", "0").is_err());
        assert!(EnvManager::validate_env_var("BENCH_TIMEOUT_MS", "300001").is_err());
        assert!(EnvManager::validate_env_var("BENCH_STRATEGY", "optimistic").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());
    }

    #[test]
    fn test_example_env_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (key, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", key)), "missing {}", key);
        }
    }

    #[test]
    fn test_save_example_env_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("HTTP Benchmark Configuration"));
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EnvManager::load_env_file_from(&dir.path().join(".env"), false).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_env_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.env");
        std::fs::write(&path, "HBENCH_TEST_ENV_FILE_MARKER=loaded\n").unwrap();

        assert!(EnvManager::load_env_file_from(&path, false).unwrap());
        assert_eq!(std::env::var("HBENCH_TEST_ENV_FILE_MARKER").unwrap(), "loaded");
    }
}
