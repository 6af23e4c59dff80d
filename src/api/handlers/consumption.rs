use super::{DayParams, RangeParams};
use crate::api::models::{
    ConsumptionKvahResponse, ConsumptionKwhResponse, CostResponse, HeatmapResponse,
    HourlyConsumptionResponse, MeterConsumptionResponse, PeakDemandResponse,
    TotalConsumptionResponse,
};
use crate::domain::range::hour_key;
use crate::domain::{Metric, Unit};
use crate::error::Result;
use crate::services::ConsumptionService;
use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::debug;

async fn hourly(
    service: &ConsumptionService,
    params: &RangeParams,
    unit: Unit,
) -> Result<Json<HourlyConsumptionResponse>> {
    let range = params.range()?;
    let hourly = service.hourly(&range, unit).await?;
    debug!(unit = unit.as_str(), buckets = hourly.len(), "hourly consumption");

    Ok(Json(HourlyConsumptionResponse {
        consumption_data: hourly
            .into_iter()
            .map(|(hour, value)| (hour_key(hour), value))
            .collect(),
    }))
}

pub async fn hourly_kwh(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<HourlyConsumptionResponse>> {
    hourly(&service, &params, Unit::Kwh).await
}

pub async fn hourly_kvah(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<HourlyConsumptionResponse>> {
    hourly(&service, &params, Unit::Kvah).await
}

pub async fn hourly_cost(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<HourlyConsumptionResponse>> {
    hourly(&service, &params, Unit::Currency).await
}

pub async fn total_kwh(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ConsumptionKwhResponse>> {
    let range = params.range()?;
    let consumption_kwh = service.total(&range, Metric::Kwh).await?;
    Ok(Json(ConsumptionKwhResponse { consumption_kwh }))
}

pub async fn total_kvah(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ConsumptionKvahResponse>> {
    let range = params.range()?;
    let consumption_kvah = service.total(&range, Metric::Kvah).await?;
    Ok(Json(ConsumptionKvahResponse { consumption_kvah }))
}

pub async fn facility_kwh(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TotalConsumptionResponse>> {
    let range = params.range()?;
    let consumption = service.total(&range, Metric::Kwh).await?;
    Ok(Json(TotalConsumptionResponse { consumption }))
}

pub async fn facility_kvah(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<TotalConsumptionResponse>> {
    let range = params.range()?;
    let consumption = service.total(&range, Metric::Kvah).await?;
    Ok(Json(TotalConsumptionResponse { consumption }))
}

pub async fn peak_demand(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<PeakDemandResponse>> {
    let range = params.range()?;
    let peak = service.peak_demand(&range).await?;
    Ok(Json(peak.into()))
}

pub async fn cost(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<CostResponse>> {
    let range = params.range()?;
    let cost = service.cost(&range).await?;
    Ok(Json(CostResponse {
        total_cost: cost.total,
        currency: cost.currency,
    }))
}

/// Apparent energy per display meter.
pub async fn meter_consumption(
    State(service): State<ConsumptionService>,
    Query(params): Query<RangeParams>,
) -> Result<Json<MeterConsumptionResponse>> {
    let range = params.range()?;
    let meters = service.meters(&range, Metric::Kvah).await?;
    Ok(Json(MeterConsumptionResponse {
        consumption_data: meters.into_iter().map(Into::into).collect(),
    }))
}

pub async fn heatmap(
    State(service): State<ConsumptionService>,
    Query(params): Query<DayParams>,
) -> Result<Json<HeatmapResponse>> {
    let days = params.days()?;
    let cells = service.heatmap(&days).await?;
    Ok(Json(HeatmapResponse {
        consumption_data: cells.into_iter().map(Into::into).collect(),
    }))
}
