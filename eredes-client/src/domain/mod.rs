pub mod consumption_point;
pub mod date_range;
pub mod reading;
pub mod session;

pub use consumption_point::ConsumptionPoint;
pub use date_range::{last_day_of_month, DateRange};
pub use reading::Reading;
pub use session::Session;
