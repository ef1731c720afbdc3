use eredes_client::domain::{ConsumptionPoint, Reading};
use time::{macros::format_description, Duration, PrimitiveDateTime};

use crate::pipeline::{Envelope, PipelineError, Transform};

const END_OF_DAY: &str = "24:00";

fn parse_label(label: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(label, format_description!("[day]/[month]/[year] [hour]:[minute]"))
}

/// Start of the hour an hour-ending label such as `15/03/2024 24:00` covers.
///
/// `24:00` is read as midnight of the following day before the hour is
/// taken off, so the result always stays on the label's calendar date.
pub fn hour_start(label: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let hour_end = if label.contains(END_OF_DAY) {
        parse_label(&label.replace(END_OF_DAY, "00:00"))? + Duration::days(1)
    } else {
        parse_label(label)?
    };
    Ok(hour_end - Duration::hours(1))
}

/// Pure conversion of a raw reading into a time-series point.
///
/// Labels carry no offset; the resulting timestamp is stored as UTC.
pub fn normalize_reading(env: Envelope<Reading>) -> Result<Envelope<ConsumptionPoint>, PipelineError> {
    let reading = &env.payload;
    let ts = hour_start(&reading.datetime).map_err(|e| {
        PipelineError::Transform(format!(
            "reading #{} has invalid datetime '{}': {e}",
            env.index, reading.datetime
        ))
    })?;

    let point = ConsumptionPoint {
        ts: ts.assume_utc(),
        kwh: reading.consumo,
    };
    Ok(env.map(point))
}

/// Line protocol has no spelling for NaN or infinity.
pub fn validate_point(env: Envelope<ConsumptionPoint>) -> Result<Envelope<ConsumptionPoint>, PipelineError> {
    if !env.payload.kwh.is_finite() {
        return Err(PipelineError::Transform(format!(
            "reading #{} has non-finite kWh {}",
            env.index, env.payload.kwh
        )));
    }
    Ok(env)
}

#[derive(Clone, Default)]
pub struct HourEndingNormalizer;

#[async_trait::async_trait]
impl Transform<Reading, ConsumptionPoint> for HourEndingNormalizer {
    async fn apply(&self, input: Envelope<Reading>) -> Result<Envelope<ConsumptionPoint>, PipelineError> {
        match normalize_reading(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                tracing::error!(error = %e, "failed to normalize reading");
                Err(e)
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct PointValidation;

#[async_trait::async_trait]
impl Transform<ConsumptionPoint, ConsumptionPoint> for PointValidation {
    async fn apply(&self, input: Envelope<ConsumptionPoint>) -> Result<Envelope<ConsumptionPoint>, PipelineError> {
        validate_point(input)
    }
}
