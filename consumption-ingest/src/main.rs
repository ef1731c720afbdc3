use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use consumption_ingest::{config::AppConfig, job, observability};
use eredes_client::domain::DateRange;

/// Log in to E-REDES, download last month's hourly consumption and store it
/// in InfluxDB and in a `consumo-<start>-<end>.json` file.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Settings file with the USER, URL and INFLUXDB sections.
    #[arg(long, env = AppConfig::PATH_ENV, default_value = AppConfig::DEFAULT_PATH)]
    config: PathBuf,

    /// Directory for the JSON file; overrides `[OUTPUT] dir`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Resolve the local date while the process is still single-threaded.
    let range = DateRange::previous_month_from_now();

    let args = Args::parse();
    observability::init_tracing();

    let cfg = AppConfig::from_file(&args.config)?;
    let output_dir = args.output_dir.unwrap_or_else(|| cfg.output.dir.clone());

    if let Err(e) = job::run(&cfg, range, &output_dir).await {
        tracing::error!(error = %format_args!("{e:#}"), "consumption pull failed");
        return Err(e);
    }

    Ok(())
}
