use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Cumulative counter column aggregated by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "kWh")]
    Kwh,
    #[serde(rename = "kVAh")]
    Kvah,
}

impl Metric {
    /// Column name in `modbus_data`. Only these two literals are ever
    /// interpolated into SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Kwh => "kwh",
            Metric::Kvah => "kvah",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Kwh => "kWh",
            Metric::Kvah => "kVAh",
        }
    }

    /// Field name used by the per-zone hourly records on the wire.
    pub fn difference_field(&self) -> &'static str {
        match self {
            Metric::Kwh => "kWh_difference",
            Metric::Kvah => "kVAh_difference",
        }
    }
}

/// Unit selected on a dashboard screen. Picking a unit picks an endpoint;
/// nothing is converted client-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kWh")]
    Kwh,
    #[default]
    #[serde(rename = "kVAh")]
    Kvah,
    #[serde(rename = "INR")]
    Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit '{0}' (expected kWh, kVAh or INR)")]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kWh" => Ok(Unit::Kwh),
            "kVAh" => Ok(Unit::Kvah),
            "INR" => Ok(Unit::Currency),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kwh => "kWh",
            Unit::Kvah => "kVAh",
            Unit::Currency => "INR",
        }
    }

    /// Counter the unit is derived from. Cost is billed on apparent energy.
    pub fn metric(&self) -> Metric {
        match self {
            Unit::Kwh => Metric::Kwh,
            Unit::Kvah | Unit::Currency => Metric::Kvah,
        }
    }

    /// Cycle order of the unit toggle.
    pub fn next(&self) -> Self {
        match self {
            Unit::Kvah => Unit::Kwh,
            Unit::Kwh => Unit::Currency,
            Unit::Currency => Unit::Kvah,
        }
    }
}
