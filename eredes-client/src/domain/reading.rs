use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw hourly reading as returned by `getConsumos`.
///
/// `datetime` is an hour-ending label in `DD/MM/YYYY HH:MM` form, where the
/// last hour of a day is labelled `24:00`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub datetime: String,
    pub consumo: f64,
    /// Any other keys the API sends along; written back out untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reading {
    pub fn new(datetime: impl Into<String>, consumo: f64) -> Self {
        Self {
            datetime: datetime.into(),
            consumo,
            extra: Map::new(),
        }
    }
}
