//! Converts a Locust stats CSV into a directory of Allure result records.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqres_http::report::{convert_stats, ConvertOptions};

#[derive(Parser)]
#[command(name = "locust2allure")]
#[command(about = "Convert Locust stats CSV into Allure result records", long_about = None)]
struct Cli {
    /// Path to the Locust stats CSV file
    #[arg(long)]
    csv_file: PathBuf,

    /// Directory to write Allure result records into
    #[arg(long)]
    output_dir: PathBuf,

    /// Failure rate at or above which an operation is marked failed
    #[arg(long, default_value_t = 0.1)]
    failure_threshold: f64,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locust2allure=info,reqres_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if !(0.0..=1.0).contains(&cli.failure_threshold) {
        eprintln!(
            "error: --failure-threshold must be within 0.0..=1.0, got {}",
            cli.failure_threshold
        );
        return ExitCode::FAILURE;
    }

    let options = ConvertOptions {
        failure_threshold: cli.failure_threshold,
    };
    match convert_stats(&cli.csv_file, &cli.output_dir, &options) {
        Ok(count) => {
            println!(
                "Converted {count} operation(s) into {}",
                cli.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
