use std::time::Duration;

use eredes_client::domain::ConsumptionPoint;
use futures::StreamExt;
use time::OffsetDateTime;

use crate::{
    config::InfluxDbConfig,
    pipeline::{Envelope, PipelineError, Sink},
};

/// Escape measurement/tag keys/tag values/field keys for line protocol.
///
/// Line protocol requires escaping commas, spaces and equals with a backslash.
fn escape_ident(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            ',' | ' ' | '=' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

fn push_field_f64(out: &mut String, first: &mut bool, key: &str, value: f64) {
    if *first {
        *first = false;
    } else {
        out.push(',');
    }

    escape_ident(key, out);
    out.push('=');
    out.push_str(&value.to_string());
}

fn ts_to_unix_nanos(ts: OffsetDateTime) -> i128 {
    ts.unix_timestamp_nanos()
}

pub trait LineEncode {
    fn write_line(&self, out: &mut String);
}

impl LineEncode for ConsumptionPoint {
    fn write_line(&self, out: &mut String) {
        escape_ident(Self::MEASUREMENT, out);

        out.push(' ');
        let mut first = true;
        push_field_f64(out, &mut first, Self::FIELD, self.kwh);

        out.push(' ');
        out.push_str(&ts_to_unix_nanos(self.ts).to_string());
    }
}

/// Writes every point it receives to InfluxDB 1.x in a single `/write` request.
pub struct InfluxDbSink {
    client: reqwest::Client,
    write_url: String,
    db: String,
    credentials: Option<(String, String)>,
}

impl InfluxDbSink {
    pub fn from_config(cfg: &InfluxDbConfig, timeout: Option<Duration>) -> Result<Self, PipelineError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PipelineError::Sink(format!("failed to build InfluxDB client: {e}")))?;

        let credentials = match (&cfg.username, &cfg.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };

        Ok(Self {
            client,
            write_url: cfg.write_url(),
            db: cfg.db.clone(),
            credentials,
        })
    }

    fn encode_batch(batch: &[Envelope<ConsumptionPoint>]) -> String {
        // Heuristic capacity: ~64 bytes per line.
        let mut s = String::with_capacity(batch.len().saturating_mul(64));
        for env in batch {
            env.payload.write_line(&mut s);
            s.push('\n');
        }
        s
    }

    async fn write_batch(&self, batch: &[Envelope<ConsumptionPoint>]) -> Result<(), PipelineError> {
        let body = Self::encode_batch(batch);

        let mut query = vec![("db", self.db.as_str()), ("precision", "n")];
        if let Some((user, password)) = &self.credentials {
            query.push(("u", user.as_str()));
            query.push(("p", password.as_str()));
        }

        let response = self
            .client
            .post(&self.write_url)
            .query(&query)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| PipelineError::Sink(format!("InfluxDB write failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %detail, "InfluxDB rejected write");
            return Err(PipelineError::Sink(format!("InfluxDB write rejected with {status}: {detail}")));
        }

        tracing::info!(points = batch.len(), db = %self.db, "wrote points to InfluxDB");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sink<ConsumptionPoint> for InfluxDbSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<ConsumptionPoint>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut buffer: Vec<Envelope<ConsumptionPoint>> = Vec::new();

        while let Some(item) = input.next().await {
            buffer.push(item?);
        }

        if buffer.is_empty() {
            tracing::warn!("no points to write to InfluxDB");
            return Ok(());
        }

        self.write_batch(&buffer).await
    }
}
