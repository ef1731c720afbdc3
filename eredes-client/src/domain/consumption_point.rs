use time::OffsetDateTime;

/// One hourly point destined for the time-series database.
///
/// `ts` marks the start of the hour the consumption covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionPoint {
    pub ts: OffsetDateTime,
    pub kwh: f64,
}

impl ConsumptionPoint {
    pub const MEASUREMENT: &'static str = "electricity_consumption";
    pub const FIELD: &'static str = "kWh";
}
