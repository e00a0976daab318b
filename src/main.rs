//! HTTP Benchmark - Main CLI Application
//!
//! Fires a batch of concurrent GET requests at each target URL and prints
//! per-URL latency and failure statistics.

use clap::Parser;
use http_benchmark::{
    build_info,
    cli::Cli,
    config::{load_config, validate_config, EnvManager},
    error::{ErrorReporter, Result},
    executor::ExecutorFactory,
    log_debug, log_info,
    logging::LoggerFactory,
    models::Config,
    output::OutputCoordinator,
    PKG_DESCRIPTION, PKG_NAME, VERSION,
};
use std::{process, sync::Arc};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Panics inside request tasks unwind and are counted; report them without exiting
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        eprintln!("Panic in thread '{}': {}", thread.name().unwrap_or("<unnamed>"), panic_info);
    }));

    let cli = Cli::parse();

    if cli.print_env_example {
        print!("{}", EnvManager::create_example_env_content());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}: {}", PKG_NAME, VERSION, PKG_DESCRIPTION);
        eprintln!(
            "Built {} from {} for {}",
            build_info::BUILD_TIME,
            build_info::GIT_COMMIT,
            build_info::TARGET_TRIPLE
        );
        eprintln!();
    }

    let config = load_config(cli)?;
    let coordinator = OutputCoordinator::from_config(&config);

    let warnings: Vec<String> = validate_config(&config)?
        .iter()
        .map(|warning| warning.message.clone())
        .collect();
    for line in coordinator.display_warnings(&warnings)? {
        eprintln!("{}", line);
    }

    let loggers = LoggerFactory::new(config.clone());
    let app_logger = loggers.create_logger("APP").await;
    let error_logger = loggers.create_error_logger();

    log_debug!(app_logger, "Session {} started", loggers.session_id());

    match execute(&config, &loggers, &coordinator).await {
        Ok(output) => {
            println!("{}", output);
            log_info!(app_logger, "Report written for {} URL(s)", config.target_urls.len());
            Ok(())
        }
        Err(e) => {
            error_logger.log_error(&e, Some("Benchmark run failed"), None).await;
            Err(e)
        }
    }
}

/// Run the benchmark and render the report
async fn execute(config: &Config, loggers: &LoggerFactory, coordinator: &OutputCoordinator) -> Result<String> {
    let request = config.to_request()?;
    let benchmark_logger = Arc::new(loggers.create_benchmark_logger().await);

    let orchestrator = ExecutorFactory::create(config)?.with_logger(benchmark_logger);
    let report = orchestrator.run_report(&request).await?;

    coordinator.display_report(&report)
}
