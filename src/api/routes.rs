use crate::api::handlers::{consumption, health, readings, zones};
use crate::services::ConsumptionService;
use axum::{extract::Request, routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::Level;

pub fn create_router(service: ConsumptionService) -> Router {
    // Public routes (authentication is not part of this service)
    let public_routes = Router::new().route("/health", get(health::health));

    let api_routes = Router::new()
        .route("/api/hconsumption", get(consumption::hourly_kwh))
        .route("/api/hkVAhconsumption", get(consumption::hourly_kvah))
        .route("/api/hcostconsumption", get(consumption::hourly_cost))
        .route("/api/lconskWh", get(consumption::total_kwh))
        .route("/api/lconskVAh", get(consumption::total_kvah))
        .route("/api/mccons", get(consumption::facility_kwh))
        .route("/api/mcapcons", get(consumption::facility_kvah))
        .route("/api/mcpeak", get(consumption::peak_demand))
        .route("/api/cc", get(consumption::cost))
        .route("/api/econsumption", get(consumption::meter_consumption))
        .route("/api/ehconsumption", get(consumption::heatmap))
        .route("/api/zconsumption", get(zones::zone_kwh))
        .route("/api/zkVAhconsumption", get(zones::zone_kvah))
        .route("/api/zkWhAZconsumption", get(zones::all_zones_kwh))
        .route("/api/zkVAhAZconsumption", get(zones::all_zones_kvah))
        .route("/api/dgdc", get(readings::generator_status))
        .route("/api/meterreading", get(readings::meter_log))
        .route("/api/apd", get(readings::alerts));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(service)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|_request: &Request, _span: &tracing::Span| {
                    tracing::event!(Level::DEBUG, "received request");
                })
                .on_response(
                    |response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(
                            Level::INFO,
                            status = response.status().as_u16(),
                            latency = ?latency,
                            "request completed"
                        );
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::ERROR, error = %error, "request failed");
                    },
                ),
        )
}
