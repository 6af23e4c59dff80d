use super::flex;
use crate::domain::range::{hour_key, DAY_FORMAT};
use crate::domain::{HourlyMeterDelta, MeterDelta, Metric};
use crate::services::{DayHourCell, PeakDemand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facility consumption keyed by `YYYY-MM-DD HH:00:00`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyConsumptionResponse {
    #[serde(default, deserialize_with = "flex::number_map")]
    pub consumption_data: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionKwhResponse {
    #[serde(rename = "consumptionkWh", deserialize_with = "flex::number")]
    pub consumption_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionKvahResponse {
    #[serde(rename = "consumptionkVAh", deserialize_with = "flex::number")]
    pub consumption_kvah: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalConsumptionResponse {
    #[serde(default, deserialize_with = "flex::number")]
    pub consumption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakDemandResponse {
    #[serde(default, deserialize_with = "flex::number")]
    pub peak_demand: f64,
    #[serde(default)]
    pub peak_hour: Option<String>,
}

impl From<Option<PeakDemand>> for PeakDemandResponse {
    fn from(peak: Option<PeakDemand>) -> Self {
        match peak {
            Some(p) => Self {
                peak_demand: p.kva,
                peak_hour: Some(hour_key(p.hour)),
            },
            None => Self {
                peak_demand: 0.0,
                peak_hour: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    #[serde(default, deserialize_with = "flex::number")]
    pub total_cost: f64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterConsumptionRecord {
    pub energy_meter_id: i32,
    #[serde(deserialize_with = "flex::number")]
    pub consumption: f64,
}

impl From<MeterDelta> for MeterConsumptionRecord {
    fn from(d: MeterDelta) -> Self {
        Self {
            energy_meter_id: d.energy_meter_id,
            consumption: d.delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterConsumptionResponse {
    #[serde(default)]
    pub consumption_data: Vec<MeterConsumptionRecord>,
}

/// Per-meter hourly record. Exactly one of the difference fields is set,
/// matching the metric the endpoint aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneHourlyRecord {
    pub energy_meter_id: i32,
    pub hour: String,
    #[serde(
        rename = "kWh_difference",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flex::optional_number"
    )]
    pub kwh_difference: Option<f64>,
    #[serde(
        rename = "kVAh_difference",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flex::optional_number"
    )]
    pub kvah_difference: Option<f64>,
}

impl ZoneHourlyRecord {
    pub fn from_delta(d: HourlyMeterDelta, metric: Metric) -> Self {
        let (kwh_difference, kvah_difference) = match metric {
            Metric::Kwh => (Some(d.delta), None),
            Metric::Kvah => (None, Some(d.delta)),
        };
        Self {
            energy_meter_id: d.energy_meter_id,
            hour: hour_key(d.hour),
            kwh_difference,
            kvah_difference,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Kwh => self.kwh_difference,
            Metric::Kvah => self.kvah_difference,
        }
        .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneHourlyResponse {
    #[serde(default)]
    pub consumption_data: Vec<ZoneHourlyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub day: String,
    pub hour: u32,
    #[serde(deserialize_with = "flex::number")]
    pub total_consumption: f64,
}

impl From<DayHourCell> for HeatmapCell {
    fn from(c: DayHourCell) -> Self {
        Self {
            day: c.day.format(DAY_FORMAT).to_string(),
            hour: c.hour,
            total_consumption: c.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResponse {
    #[serde(default)]
    pub consumption_data: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
