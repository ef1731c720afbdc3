use std::path::PathBuf;

use eredes_client::domain::Reading;
use futures::StreamExt;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Writes the raw readings as a pretty-printed JSON array, replacing any existing file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Sink<Reading> for JsonFileSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<Reading>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut readings = Vec::new();
        while let Some(item) = input.next().await {
            readings.push(item?.payload);
        }

        let json = serde_json::to_string_pretty(&readings)
            .map_err(|e| PipelineError::Sink(format!("failed to serialize readings: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PipelineError::Sink(format!("failed to write {}: {e}", self.path.display())))?;

        tracing::info!(path = %self.path.display(), readings = readings.len(), "wrote readings file");
        Ok(())
    }
}
