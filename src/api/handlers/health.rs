use crate::api::models::HealthResponse;
use crate::services::ConsumptionService;
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::warn;

pub async fn health(
    State(service): State<ConsumptionService>,
) -> (StatusCode, Json<HealthResponse>) {
    match service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".into(),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".into(),
                }),
            )
        }
    }
}
