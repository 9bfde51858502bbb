//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::parse_timestamp;
use crate::planner::{PlanError, PlanRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trip/plan", get(plan_trip))
        .route("/stops/nearby", get(nearby_stops))
        .route("/transfers", get(transfers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Plan a trip between two stops.
async fn plan_trip(
    State(state): State<AppState>,
    Query(req): Query<PlanTripRequest>,
) -> Result<Json<PlanTripResponse>, AppError> {
    let departure = match req.time.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => parse_timestamp(t).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => Local::now().fixed_offset(),
    };

    let request = PlanRequest::new(req.from.trim(), req.to.trim(), departure)
        .accessible(req.accessible);
    let plan = state.planner.plan_trip(&request).await?;

    Ok(Json(PlanTripResponse::from_plan(&plan)))
}

/// Stops near a point, nearest first.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyRequest>,
) -> Result<Json<NearbyResponse>, AppError> {
    let results = state.planner.find_nearby_stations(&req.to_query()).await?;
    Ok(Json(NearbyResponse::from_results(&results)))
}

/// Transfer points between two sets of routes.
async fn transfers(
    State(state): State<AppState>,
    Query(req): Query<TransfersRequest>,
) -> Result<Json<TransfersResponse>, AppError> {
    let from_routes = parse_route_list(&req.from_routes);
    let to_routes = parse_route_list(&req.to_routes);
    if from_routes.is_empty() || to_routes.is_empty() {
        return Err(AppError::BadRequest {
            message: "from_routes and to_routes must each name at least one route".to_string(),
        });
    }

    let points = state
        .planner
        .find_transfer_points(&from_routes, &to_routes)
        .await?;

    Ok(Json(TransfersResponse {
        transfers: points.iter().map(TransferResult::from_point).collect(),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Plan(PlanError),
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        AppError::Plan(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Plan(e) => match e {
                PlanError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PlanError::NotFound(_) | PlanError::NoTripFound { .. } => StatusCode::NOT_FOUND,
                PlanError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                PlanError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                PlanError::Unauthorized | PlanError::Network(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest { message } => message.clone(),
            AppError::Plan(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
