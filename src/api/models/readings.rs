use super::flex;
use crate::domain::range::{MINUTE_KEY_FORMAT, WIRE_FORMAT};
use crate::domain::{GeneratorEvent, MeterReading, MinuteDemand, ReadingBounds};
use crate::services::Alerts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest power and time of one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorReading {
    #[serde(rename = "total_kW", default, deserialize_with = "flex::optional_number")]
    pub total_kw: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Generator readings keyed by meter id, e.g. `{"13": {...}, "14": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorStatusResponse {
    pub generators: BTreeMap<String, GeneratorReading>,
}

impl GeneratorStatusResponse {
    pub fn get(&self, meter: i32) -> Option<&GeneratorReading> {
        self.generators.get(&meter.to_string())
    }
}

impl FromIterator<MeterReading> for GeneratorStatusResponse {
    fn from_iter<I: IntoIterator<Item = MeterReading>>(iter: I) -> Self {
        Self {
            generators: iter
                .into_iter()
                .map(|r| {
                    (
                        r.energy_meter_id.to_string(),
                        GeneratorReading {
                            total_kw: Some(r.total_kw),
                            timestamp: Some(r.timestamp.format(WIRE_FORMAT).to_string()),
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedReading {
    pub timestamp: String,
    #[serde(rename = "kWh", default, deserialize_with = "flex::number")]
    pub kwh: f64,
    #[serde(rename = "kVAh", default, deserialize_with = "flex::number")]
    pub kvah: f64,
}

impl From<&MeterReading> for LoggedReading {
    fn from(r: &MeterReading) -> Self {
        Self {
            timestamp: r.timestamp.format(WIRE_FORMAT).to_string(),
            kwh: r.kwh,
            kvah: r.kvah,
        }
    }
}

/// First (`min`) and last (`max`) reading of one meter in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterLogEntry {
    pub zone: i32,
    #[serde(default)]
    pub min: Option<LoggedReading>,
    #[serde(default)]
    pub max: Option<LoggedReading>,
}

impl From<ReadingBounds> for MeterLogEntry {
    fn from(b: ReadingBounds) -> Self {
        Self {
            zone: b.energy_meter_id,
            min: Some(LoggedReading::from(&b.first)),
            max: Some(LoggedReading::from(&b.last)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterLogResponse {
    #[serde(default)]
    pub data: Vec<MeterLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakAlert {
    pub minute: String,
    #[serde(rename = "total_kVA", deserialize_with = "flex::number")]
    pub total_kva: f64,
}

impl From<MinuteDemand> for PeakAlert {
    fn from(m: MinuteDemand) -> Self {
        Self {
            minute: m.minute.format(MINUTE_KEY_FORMAT).to_string(),
            total_kva: m.kva,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorActivation {
    pub status: String,
    pub timestamp: String,
    pub meter: i32,
    #[serde(rename = "kWh", deserialize_with = "flex::number")]
    pub kwh: f64,
    #[serde(
        rename = "startKWh",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "flex::optional_number"
    )]
    pub start_kwh: Option<f64>,
}

impl From<GeneratorEvent> for GeneratorActivation {
    fn from(e: GeneratorEvent) -> Self {
        Self {
            status: e.status.as_str().to_string(),
            timestamp: e.timestamp.format(WIRE_FORMAT).to_string(),
            meter: e.energy_meter_id,
            kwh: e.kwh,
            start_kwh: e.start_kwh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    #[serde(default, deserialize_with = "flex::number")]
    pub threshold_kva: f64,
    #[serde(default)]
    pub peak_demand_above_threshold: Vec<PeakAlert>,
    #[serde(default)]
    pub dg_activations: Vec<GeneratorActivation>,
}

impl From<Alerts> for AlertsResponse {
    fn from(a: Alerts) -> Self {
        Self {
            threshold_kva: a.threshold_kva,
            peak_demand_above_threshold: a.peak_demand.into_iter().map(Into::into).collect(),
            dg_activations: a.generator_events.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generator_status_is_keyed_by_meter() {
        let body: GeneratorStatusResponse = serde_json::from_value(json!({
            "13": {"total_kW": "42.5", "timestamp": "2025-04-01 08:00:00"},
            "14": {"total_kW": null, "timestamp": null}
        }))
        .unwrap();
        assert_eq!(body.get(13).and_then(|g| g.total_kw), Some(42.5));
        assert_eq!(body.get(14).and_then(|g| g.timestamp.clone()), None);
        assert!(body.get(15).is_none());
    }

    #[test]
    fn test_stop_without_start_omits_start_kwh() {
        let activation = GeneratorActivation {
            status: "DG stopped".into(),
            timestamp: "2025-04-01 09:00:00".into(),
            meter: 14,
            kwh: 510.0,
            start_kwh: None,
        };
        assert_eq!(
            serde_json::to_value(&activation).unwrap(),
            json!({"status": "DG stopped", "timestamp": "2025-04-01 09:00:00", "meter": 14, "kWh": 510.0})
        );
    }
}
