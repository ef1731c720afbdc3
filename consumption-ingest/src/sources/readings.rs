use eredes_client::domain::Reading;

use crate::pipeline::{Envelope, EnvelopeStream, Source};

/// Readings already held in memory, replayed in order.
#[derive(Debug, Clone)]
pub struct ReadingBatch {
    readings: Vec<Reading>,
}

impl ReadingBatch {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for ReadingBatch {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        let items: Vec<_> = self
            .readings
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, payload)| Ok(Envelope { payload, index }))
            .collect();
        Box::pin(futures::stream::iter(items))
    }
}
