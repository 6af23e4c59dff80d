pub mod metric;
pub mod power;
pub mod range;
pub mod reading;
pub mod zones;

pub use metric::{Metric, Unit, UnknownUnit};
pub use power::{
    GeneratorEvent, GeneratorStatus, GeneratorTransition, MinuteDemand, ReadingBounds,
};
pub use range::{DateRange, DayRange, RangeError};
pub use reading::{round1, round2, HourlyMeterDelta, MeterDelta, MeterReading};
pub use zones::{ZoneLabel, ZoneMetadata};
