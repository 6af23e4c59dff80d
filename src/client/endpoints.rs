use super::http::{ApiClient, ApiError};
use crate::api::models::{
    AlertsResponse, ConsumptionKvahResponse, ConsumptionKwhResponse, CostResponse,
    GeneratorStatusResponse, HeatmapResponse, HourlyConsumptionResponse,
    MeterConsumptionResponse, MeterLogResponse, PeakDemandResponse, TotalConsumptionResponse,
    ZoneHourlyResponse,
};
use crate::domain::{DateRange, DayRange, Metric, Unit};

pub fn hourly_path(unit: Unit) -> &'static str {
    match unit {
        Unit::Kwh => "/api/hconsumption",
        Unit::Kvah => "/api/hkVAhconsumption",
        Unit::Currency => "/api/hcostconsumption",
    }
}

pub fn facility_total_path(metric: Metric) -> &'static str {
    match metric {
        Metric::Kwh => "/api/mccons",
        Metric::Kvah => "/api/mcapcons",
    }
}

pub fn zone_path(metric: Metric, single_zone: bool) -> &'static str {
    match (metric, single_zone) {
        (Metric::Kwh, true) => "/api/zconsumption",
        (Metric::Kvah, true) => "/api/zkVAhconsumption",
        (Metric::Kwh, false) => "/api/zkWhAZconsumption",
        (Metric::Kvah, false) => "/api/zkVAhAZconsumption",
    }
}

impl ApiClient {
    /// Facility consumption per hour in the selected unit
    pub async fn get_hourly(
        &self,
        range: &DateRange,
        unit: Unit,
    ) -> Result<HourlyConsumptionResponse, ApiError> {
        self.get(hourly_path(unit), &range.query_pairs()).await
    }

    /// Facility consumption over the whole range
    pub async fn get_facility_total(
        &self,
        range: &DateRange,
        metric: Metric,
    ) -> Result<f64, ApiError> {
        let body: TotalConsumptionResponse = self
            .get(facility_total_path(metric), &range.query_pairs())
            .await?;
        Ok(body.consumption)
    }

    /// Landing screen totals
    pub async fn get_landing_kwh(&self, range: &DateRange) -> Result<f64, ApiError> {
        let body: ConsumptionKwhResponse = self.get("/api/lconskWh", &range.query_pairs()).await?;
        Ok(body.consumption_kwh)
    }

    pub async fn get_landing_kvah(&self, range: &DateRange) -> Result<f64, ApiError> {
        let body: ConsumptionKvahResponse =
            self.get("/api/lconskVAh", &range.query_pairs()).await?;
        Ok(body.consumption_kvah)
    }

    /// Apparent energy per display meter
    pub async fn get_meter_consumption(
        &self,
        range: &DateRange,
    ) -> Result<MeterConsumptionResponse, ApiError> {
        self.get("/api/econsumption", &range.query_pairs()).await
    }

    /// Hourly consumption per meter, for one zone or all of them
    pub async fn get_zone_hourly(
        &self,
        range: &DateRange,
        metric: Metric,
        zone: Option<i32>,
    ) -> Result<ZoneHourlyResponse, ApiError> {
        let mut query = range.query_pairs().to_vec();
        if let Some(id) = zone {
            query.push(("zone", id.to_string()));
        }
        self.get(zone_path(metric, zone.is_some()), &query).await
    }

    pub async fn get_peak_demand(&self, range: &DateRange) -> Result<PeakDemandResponse, ApiError> {
        self.get("/api/mcpeak", &range.query_pairs()).await
    }

    pub async fn get_cost(&self, range: &DateRange) -> Result<CostResponse, ApiError> {
        self.get("/api/cc", &range.query_pairs()).await
    }

    pub async fn get_heatmap(&self, days: &DayRange) -> Result<HeatmapResponse, ApiError> {
        self.get("/api/ehconsumption", &days.query_pairs()).await
    }

    /// Latest reading of each diesel generator
    pub async fn get_generator_status(
        &self,
        range: &DateRange,
    ) -> Result<GeneratorStatusResponse, ApiError> {
        self.get("/api/dgdc", &range.query_pairs()).await
    }

    /// First and last reading per meter
    pub async fn get_meter_log(&self, range: &DateRange) -> Result<MeterLogResponse, ApiError> {
        self.get("/api/meterreading", &range.query_pairs()).await
    }

    pub async fn get_alerts(&self, range: &DateRange) -> Result<AlertsResponse, ApiError> {
        self.get("/api/apd", &range.query_pairs()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_selects_hourly_endpoint() {
        assert_eq!(hourly_path(Unit::Kwh), "/api/hconsumption");
        assert_eq!(hourly_path(Unit::Kvah), "/api/hkVAhconsumption");
        assert_eq!(hourly_path(Unit::Currency), "/api/hcostconsumption");
    }

    #[test]
    fn test_zone_endpoint_depends_on_scope() {
        assert_eq!(zone_path(Metric::Kvah, false), "/api/zkVAhAZconsumption");
        assert_eq!(zone_path(Metric::Kwh, true), "/api/zconsumption");
    }
}
