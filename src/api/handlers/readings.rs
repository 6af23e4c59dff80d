use super::RangeParams;
use crate::api::models::{AlertsResponse, GeneratorStatusResponse, MeterLogResponse};
use crate::error::Result;
use crate::services::ConsumptionService;
use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::debug;

pub async fn generator_status(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<GeneratorStatusResponse>> {
    let range = params.range()?;
    let latest = service.generator_status(&range).await?;
    Ok(Json(latest.into_iter().collect()))
}

pub async fn meter_log(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<MeterLogResponse>> {
    let range = params.range()?;
    let bounds = service.meter_log(&range).await?;
    Ok(Json(MeterLogResponse {
        data: bounds.into_iter().map(Into::into).collect(),
    }))
}

pub async fn alerts(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<AlertsResponse>> {
    let range = params.range()?;
    let alerts = service.alerts(&range).await?;
    debug!(
        peaks = alerts.peak_demand.len(),
        generator_events = alerts.generator_events.len(),
        "alerts"
    );
    Ok(Json(alerts.into()))
}
