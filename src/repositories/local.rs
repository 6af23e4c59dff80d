use super::ConsumptionRepository;
use crate::domain::{power, reading};
use crate::domain::{
    DateRange, GeneratorTransition, HourlyMeterDelta, MeterDelta, MeterReading, Metric,
    MinuteDemand, ReadingBounds,
};
use crate::error::AppError;
use async_trait::async_trait;
use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};

/// Readings held in memory, aggregated with the same semantics as the SQL
/// repository.
#[derive(Clone, Default)]
pub struct LocalRepository {
    readings: Arc<RwLock<Vec<MeterReading>>>,
}

impl LocalRepository {
    pub fn new(readings: Vec<MeterReading>) -> Self {
        Self {
            readings: Arc::new(RwLock::new(readings)),
        }
    }

    pub fn insert(&self, reading: MeterReading) -> Result<(), AppError> {
        self.readings
            .write()
            .map_err(|_| anyhow::anyhow!("local readings lock poisoned"))?
            .push(reading);
        Ok(())
    }

    fn with_readings<T>(&self, f: impl FnOnce(&[MeterReading]) -> T) -> Result<T, AppError> {
        let guard = self
            .readings
            .read()
            .map_err(|_| anyhow::anyhow!("local readings lock poisoned"))?;
        Ok(f(&guard))
    }
}

#[async_trait]
impl ConsumptionRepository for LocalRepository {
    async fn hourly_meter_deltas(
        &self,
        range: &DateRange,
        metric: Metric,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<HourlyMeterDelta>, AppError> {
        self.with_readings(|r| reading::hourly_meter_deltas(r, range, metric, &meters))
    }

    async fn meter_deltas(
        &self,
        range: &DateRange,
        metric: Metric,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<MeterDelta>, AppError> {
        self.with_readings(|r| reading::meter_deltas(r, range, metric, &meters))
    }

    async fn reading_bounds(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
    ) -> Result<Vec<ReadingBounds>, AppError> {
        self.with_readings(|r| power::reading_bounds(r, range, &meters))
    }

    async fn minute_demand_above(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
        threshold_kva: f64,
    ) -> Result<Vec<MinuteDemand>, AppError> {
        self.with_readings(|r| power::minute_demand_above(r, range, &meters, threshold_kva))
    }

    async fn generator_transitions(
        &self,
        range: &DateRange,
        meters: RangeInclusive<i32>,
        running_kw: f64,
    ) -> Result<Vec<GeneratorTransition>, AppError> {
        self.with_readings(|r| power::generator_transitions(r, range, &meters, running_kw))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn test_inserted_readings_are_visible() {
        let repo = LocalRepository::default();
        let range = DateRange::new(ts("2025-04-01 00:00:00"), ts("2025-04-01 23:59:59")).unwrap();
        assert!(repo
            .meter_deltas(&range, Metric::Kwh, 1..=12)
            .await
            .unwrap()
            .is_empty());

        for (at, kwh) in [("2025-04-01 10:00:00", 1.0), ("2025-04-01 11:00:00", 3.5)] {
            repo.insert(MeterReading::new(4, ts(at), kwh, kwh)).unwrap();
        }

        let rows = repo.meter_deltas(&range, Metric::Kwh, 1..=12).await.unwrap();
        assert_eq!(
            rows,
            vec![MeterDelta {
                energy_meter_id: 4,
                delta: 2.5
            }]
        );
    }
}
