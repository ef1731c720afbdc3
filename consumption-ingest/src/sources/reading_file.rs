use std::path::PathBuf;

use async_stream::try_stream;
use eredes_client::domain::Reading;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Replays a `consumo-*.json` file previously written by the JSON file sink.
pub struct ReadingFileSource {
    path: PathBuf,
}

impl ReadingFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for ReadingFileSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        let path = self.path.clone();
        let s = try_stream! {
            let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to read {}: {e}", path.display()))
            })?;
            let readings: Vec<Reading> = serde_json::from_str(&contents).map_err(|e| {
                PipelineError::Source(format!("failed to parse {}: {e}", path.display()))
            })?;
            tracing::info!(path = %path.display(), readings = readings.len(), "loaded readings file");

            for (index, payload) in readings.into_iter().enumerate() {
                yield Envelope { payload, index };
            }
        };

        Box::pin(s)
    }
}
