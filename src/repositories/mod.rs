//! Read access to meter readings.
//!
//! - `postgres`: SQL aggregation over the `modbus_data` table
//! - `local`: in-memory readings for tests and local development

pub mod local;
pub mod postgres;

pub use local::LocalRepository;
pub use postgres::PgConsumptionRepository;

use crate::domain::{
    DateRange, GeneratorTransition, HourlyMeterDelta, MeterDelta, Metric, MinuteDemand,
    ReadingBounds,
};
use crate::error::AppError;
use async_trait::async_trait;
use std::ops::RangeInclusive;

/// Consumption deltas derived from cumulative meter counters. Every method
/// is a pure read, safe to call concurrently and to repeat.
#[async_trait]
pub trait ConsumptionRepository: Send + Sync {
    /// One row per meter and hour bucket that has readings inside `range`,
    /// rounded to one decimal, ordered by hour then meter.
    async fn hourly_meter_deltas(
        &self,
        range: &DateRange,
        metric: Metric,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<HourlyMeterDelta>, AppError>;

    /// One row per meter with readings inside `range`: `MAX - MIN`, rounded
    /// to one decimal, ordered by meter.
    async fn meter_deltas(
        &self,
        range: &DateRange,
        metric: Metric,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<MeterDelta>, AppError>;

    /// First and last reading of every meter with readings inside `range`,
    /// ordered by meter.
    async fn reading_bounds(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<ReadingBounds>, AppError>;

    /// Minutes whose summed per-meter average kVA is above `threshold_kva`,
    /// rounded to one decimal, ordered by minute.
    async fn minute_demand_above(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
        threshold_kva: f64,
    ) -> Result<Vec<MinuteDemand>, AppError>;

    /// Readings where `total_kW > running_kw` flips relative to the same
    /// meter's previous reading, ordered by timestamp then meter.
    async fn generator_transitions(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
        running_kw: f64,
    ) -> Result<Vec<GeneratorTransition>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
