use std::{env, sync::Arc};

use anyhow::{bail, Result};
use consumption_ingest::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::InfluxDbSink,
    sources::ReadingFileSource,
    transform::{HourEndingNormalizer, PointValidation},
};
use eredes_client::domain::{ConsumptionPoint, Reading};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: backfill_consumption_file <consumo_json_path>");
    }
    let file_path = &args[1];

    // Load configuration (EREDES_CONFIG may point at a backfill-specific file).
    let cfg = AppConfig::load()?;

    let sink = InfluxDbSink::from_config(&cfg.influxdb, cfg.http.timeout())?;
    let source = ReadingFileSource::new(file_path);

    let pipeline: Pipeline<_, Reading, ConsumptionPoint, _> = Pipeline {
        source,
        transform: Arc::new(HourEndingNormalizer),
        checks: vec![Arc::new(PointValidation)],
        sink,
    };

    pipeline.run().await?;

    tracing::info!(file = %file_path, "backfill finished");
    Ok(())
}
