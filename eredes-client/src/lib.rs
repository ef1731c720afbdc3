pub mod api;
pub mod domain;

pub use api::{ApiError, EredesApi};
pub use domain::{ConsumptionPoint, DateRange, Reading, Session};
