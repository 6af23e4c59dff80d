pub mod consumption;
pub mod health;
pub mod readings;
pub mod zones;

use crate::domain::{DateRange, DayRange};
use crate::error::{AppError, Result};
use serde::Deserialize;

/// Query parameters shared by the consumption endpoints. Everything is
/// optional here so that missing or malformed values produce the API's own
/// JSON 400 rather than the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    #[serde(rename = "startDateTime")]
    pub start_date_time: Option<String>,
    #[serde(rename = "endDateTime")]
    pub end_date_time: Option<String>,
    pub zone: Option<String>,
}

impl RangeParams {
    pub fn range(&self) -> Result<DateRange> {
        Ok(DateRange::parse(
            self.start_date_time.as_deref(),
            self.end_date_time.as_deref(),
        )?)
    }

    pub fn zone(&self) -> Result<i32> {
        let raw = self
            .zone
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("missing query parameter: zone".into()))?;
        raw.trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("invalid zone: '{}'", raw)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DayParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DayParams {
    pub fn days(&self) -> Result<DayRange> {
        Ok(DayRange::parse(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_parsing() {
        let params = RangeParams {
            zone: Some(" 7 ".into()),
            ..Default::default()
        };
        assert_eq!(params.zone().unwrap(), 7);

        let params = RangeParams {
            zone: Some("seven".into()),
            ..Default::default()
        };
        assert!(matches!(params.zone(), Err(AppError::InvalidInput(_))));

        assert!(matches!(
            RangeParams::default().zone(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_range_requires_both_bounds() {
        let params = RangeParams {
            start_date_time: Some("2025-04-01 00:00:00".into()),
            ..Default::default()
        };
        assert!(matches!(params.range(), Err(AppError::InvalidInput(_))));
    }
}
