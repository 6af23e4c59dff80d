use super::RangeParams;
use crate::api::models::{ZoneHourlyRecord, ZoneHourlyResponse};
use crate::domain::Metric;
use crate::error::Result;
use crate::services::ConsumptionService;
use axum::{
    extract::{Query, State},
    response::Json,
};

async fn zone_hourly(
    service: &ConsumptionService,
    params: &RangeParams,
    metric: Metric,
    single: bool,
) -> Result<Json<ZoneHourlyResponse>> {
    let range = params.range()?;
    let zone = if single { Some(params.zone()?) } else { None };
    let rows = service.zone_hourly(&range, metric, zone).await?;

    Ok(Json(ZoneHourlyResponse {
        consumption_data: rows
            .into_iter()
            .map(|d| ZoneHourlyRecord::from_delta(d, metric))
            .collect(),
    }))
}

pub async fn zone_kwh(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ZoneHourlyResponse>> {
    zone_hourly(&service, &params, Metric::Kwh, true).await
}

pub async fn zone_kvah(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ZoneHourlyResponse>> {
    zone_hourly(&service, &params, Metric::Kvah, true).await
}

pub async fn all_zones_kwh(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ZoneHourlyResponse>> {
    zone_hourly(&service, &params, Metric::Kwh, false).await
}

pub async fn all_zones_kvah(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ZoneHourlyResponse>> {
    zone_hourly(&service, &params, Metric::Kvah, false).await
}
