pub mod consumption;
pub mod readings;

pub use consumption::{ConsumptionService, Cost, DayHourCell, PeakDemand};
pub use readings::Alerts;
