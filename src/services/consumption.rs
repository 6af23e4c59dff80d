use crate::config::{AlertConfig, TariffConfig};
use crate::domain::zones::{DISPLAY_METERS, FACILITY_METERS};
use crate::domain::{
    round1, round2, DateRange, DayRange, HourlyMeterDelta, MeterDelta, Metric, Unit,
};
use crate::error::{AppError, Result};
use crate::repositories::ConsumptionRepository;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Highest facility hour by apparent energy. One hour of kVAh is the
/// average kVA demand over that hour.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDemand {
    pub hour: NaiveDateTime,
    pub kva: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cost {
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayHourCell {
    pub day: NaiveDate,
    pub hour: u32,
    pub total: f64,
}

/// Composes repository deltas into the facility-level views the dashboard
/// shows.
#[derive(Clone)]
pub struct ConsumptionService {
    pub(super) repository: Arc<dyn ConsumptionRepository>,
    pub(super) tariff: TariffConfig,
    pub(super) alerts: AlertConfig,
}

impl ConsumptionService {
    pub fn new(repository: Arc<dyn ConsumptionRepository>, tariff: TariffConfig) -> Self {
        Self {
            repository,
            tariff,
            alerts: AlertConfig::default(),
        }
    }

    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn tariff(&self) -> &TariffConfig {
        &self.tariff
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    /// Facility consumption per hour bucket. Hours without readings are
    /// absent.
    pub async fn hourly(
        &self,
        range: &DateRange,
        unit: Unit,
    ) -> Result<BTreeMap<NaiveDateTime, f64>> {
        let rows = self
            .repository
            .hourly_meter_deltas(range, unit.metric(), FACILITY_METERS)
            .await?;

        let mut totals: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
        for row in rows {
            *totals.entry(row.hour).or_insert(0.0) += row.delta;
        }

        let out = totals
            .into_iter()
            .map(|(hour, total)| {
                let value = match unit {
                    Unit::Currency => round2(round1(total) * self.tariff.rate_per_kvah),
                    Unit::Kwh | Unit::Kvah => round1(total),
                };
                (hour, value)
            })
            .collect();
        Ok(out)
    }

    /// Facility consumption over the whole window, 0 without readings.
    pub async fn total(&self, range: &DateRange, metric: Metric) -> Result<f64> {
        let rows = self
            .repository
            .meter_deltas(range, metric, FACILITY_METERS)
            .await?;
        Ok(round1(rows.iter().map(|r| r.delta).sum()))
    }

    /// Whole-window consumption of every display meter that has readings.
    pub async fn meters(&self, range: &DateRange, metric: Metric) -> Result<Vec<MeterDelta>> {
        self.repository
            .meter_deltas(range, metric, DISPLAY_METERS)
            .await
    }

    /// Hourly consumption per meter, for one zone or all display meters.
    pub async fn zone_hourly(
        &self,
        range: &DateRange,
        metric: Metric,
        zone: Option<i32>,
    ) -> Result<Vec<HourlyMeterDelta>> {
        let meters = match zone {
            Some(id) if id < 1 => {
                return Err(AppError::InvalidInput(format!(
                    "zone must be a positive meter id, got {}",
                    id
                )))
            }
            Some(id) => id..=id,
            None => DISPLAY_METERS,
        };
        self.repository
            .hourly_meter_deltas(range, metric, meters)
            .await
    }

    /// Earliest hour with the highest facility kVAh, if any readings exist.
    pub async fn peak_demand(&self, range: &DateRange) -> Result<Option<PeakDemand>> {
        let hourly = self.hourly(range, Unit::Kvah).await?;
        let peak = hourly
            .into_iter()
            .fold(None::<PeakDemand>, |best, (hour, kva)| match best {
                Some(b) if b.kva >= kva => Some(b),
                _ => Some(PeakDemand { hour, kva }),
            });
        Ok(peak)
    }

    pub async fn cost(&self, range: &DateRange) -> Result<Cost> {
        let kvah = self.total(range, Metric::Kvah).await?;
        Ok(Cost {
            total: round2(kvah * self.tariff.rate_per_kvah),
            currency: self.tariff.currency.clone(),
        })
    }

    /// Facility kVAh per (day, hour of day) inside `days`, only for cells
    /// with readings.
    pub async fn heatmap(&self, days: &DayRange) -> Result<Vec<DayHourCell>> {
        let hourly = self.hourly(&days.to_date_range(), Unit::Kvah).await?;
        Ok(hourly
            .into_iter()
            .filter(|(hour, _)| days.contains(hour.date()))
            .map(|(hour, total)| DayHourCell {
                day: hour.date(),
                hour: hour.hour(),
                total,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MeterReading;
    use crate::repositories::LocalRepository;
    use pretty_assertions::assert_eq;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn reading(meter: i32, at: &str, kwh: f64, kvah: f64) -> MeterReading {
        MeterReading::new(meter, ts(at), kwh, kvah)
    }

    fn service(readings: Vec<MeterReading>, rate: f64) -> ConsumptionService {
        ConsumptionService::new(
            Arc::new(LocalRepository::new(readings)),
            TariffConfig {
                rate_per_kvah: rate,
                currency: "INR".into(),
            },
        )
    }

    fn fixture() -> Vec<MeterReading> {
        vec![
            reading(1, "2025-04-01 08:00:00", 10.0, 11.0),
            reading(1, "2025-04-01 08:45:00", 14.0, 15.5),
            reading(1, "2025-04-01 09:10:00", 15.0, 16.7),
            reading(2, "2025-04-01 08:15:00", 200.0, 220.0),
            reading(2, "2025-04-01 08:50:00", 202.25, 223.0),
            // transformer: listed per meter, not in facility totals
            reading(12, "2025-04-01 08:00:00", 1000.0, 1100.0),
            reading(12, "2025-04-01 09:30:00", 1100.0, 1210.0),
            // generator
            reading(13, "2025-04-01 08:00:00", 0.0, 0.0),
            reading(13, "2025-04-01 09:00:00", 50.0, 60.0),
        ]
    }

    fn day() -> DateRange {
        DateRange::new(ts("2025-04-01 00:00:00"), ts("2025-04-01 23:59:59")).unwrap()
    }

    #[tokio::test]
    async fn test_hourly_sums_facility_meters() {
        let svc = service(fixture(), 0.0);
        let hourly = svc.hourly(&day(), Unit::Kwh).await.unwrap();

        // meter 1: 4.0 + meter 2: round1(2.25) = 2.3
        assert_eq!(
            hourly.into_iter().collect::<Vec<_>>(),
            vec![
                (ts("2025-04-01 08:00:00"), 6.3),
                (ts("2025-04-01 09:00:00"), 1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_hourly_cost_applies_tariff_to_kvah() {
        let svc = service(fixture(), 8.5);
        let cost = svc.hourly(&day(), Unit::Currency).await.unwrap();
        // kVAh 08:00 = 4.5 + 3.0 = 7.5
        assert_eq!(cost[&ts("2025-04-01 08:00:00")], 63.75);
    }

    #[tokio::test]
    async fn test_total_excludes_transformer_and_generators() {
        let svc = service(fixture(), 0.0);
        assert_eq!(svc.total(&day(), Metric::Kwh).await.unwrap(), 7.3);
    }

    #[tokio::test]
    async fn test_total_is_zero_without_readings() {
        let svc = service(Vec::new(), 0.0);
        assert_eq!(svc.total(&day(), Metric::Kvah).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_meters_include_transformer_only() {
        let svc = service(fixture(), 0.0);
        let ids: Vec<i32> = svc
            .meters(&day(), Metric::Kvah)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.energy_meter_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 12]);
    }

    #[tokio::test]
    async fn test_zone_hourly_filters_single_zone() {
        let svc = service(fixture(), 0.0);
        let rows = svc.zone_hourly(&day(), Metric::Kwh, Some(2)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].energy_meter_id, 2);

        let unknown = svc.zone_hourly(&day(), Metric::Kwh, Some(99)).await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_zone_hourly_rejects_non_positive_zone() {
        let svc = service(fixture(), 0.0);
        let err = svc
            .zone_hourly(&day(), Metric::Kwh, Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_peak_demand_picks_highest_hour() {
        let svc = service(fixture(), 0.0);
        let peak = svc.peak_demand(&day()).await.unwrap().unwrap();
        assert_eq!(peak.hour, ts("2025-04-01 08:00:00"));
        assert_eq!(peak.kva, 7.5);

        let empty = service(Vec::new(), 0.0);
        assert_eq!(empty.peak_demand(&day()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cost_uses_tariff_currency() {
        let svc = service(fixture(), 10.0);
        let cost = svc.cost(&day()).await.unwrap();
        // kVAh: meter 1 = 5.7, meter 2 = 3.0
        assert_eq!(cost.total, 87.0);
        assert_eq!(cost.currency, "INR");
    }

    #[tokio::test]
    async fn test_heatmap_cells_by_day_and_hour() {
        let svc = service(fixture(), 0.0);
        let days = DayRange::parse(Some("2025-04-01"), Some("2025-04-02")).unwrap();
        let cells = svc.heatmap(&days).await.unwrap();
        assert_eq!(
            cells,
            vec![
                DayHourCell {
                    day: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    hour: 8,
                    total: 7.5,
                },
                DayHourCell {
                    day: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    hour: 9,
                    total: 1.2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let svc = service(fixture(), 0.0);
        let first = svc.hourly(&day(), Unit::Kvah).await.unwrap();
        let second = svc.hourly(&day(), Unit::Kvah).await.unwrap();
        assert_eq!(first, second);
    }
}
