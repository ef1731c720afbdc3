use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use eredes_client::domain::{ConsumptionPoint, DateRange, Reading};

use crate::{
    config::AppConfig,
    pipeline::{Pipeline, Sink, Source},
    sinks::{InfluxDbSink, JsonFileSink},
    sources::{EredesConsumptionFetcher, ReadingBatch},
    transform::{HourEndingNormalizer, PointValidation},
};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub range: DateRange,
    pub readings: usize,
    pub file: PathBuf,
}

/// One full pull: login, fetch `range`, write InfluxDB, then write the JSON file.
///
/// The two writes are independent; a failed file write leaves the points in InfluxDB.
pub async fn run(cfg: &AppConfig, range: DateRange, output_dir: &Path) -> anyhow::Result<RunSummary> {
    tracing::info!(start = %range.start_label(), end = %range.end_label(), "starting consumption pull");

    let fetcher = EredesConsumptionFetcher::from_config(cfg)?;
    let readings = fetcher.fetch(&range).await?;
    let count = readings.len();

    let influx = InfluxDbSink::from_config(&cfg.influxdb, cfg.http.timeout())?;
    let pipeline: Pipeline<_, Reading, ConsumptionPoint, _> = Pipeline {
        source: ReadingBatch::new(readings.clone()),
        transform: Arc::new(HourEndingNormalizer),
        checks: vec![Arc::new(PointValidation)],
        sink: influx,
    };
    pipeline.run().await.context("failed to store points in InfluxDB")?;

    let file = output_dir.join(range.file_name());
    let json = JsonFileSink::new(&file);
    json.run(ReadingBatch::new(readings).stream().await)
        .await
        .context("failed to write readings file")?;

    tracing::info!(readings = count, file = %file.display(), "consumption pull finished");
    Ok(RunSummary {
        range,
        readings: count,
        file,
    })
}
