use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::serve;
use axum::{Json, Router as ApiRouter};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};
use trail_router::common::bbox::BBox;
use trail_router::common::config::{
    EditRequest, PlanRequest, RouteEdit, RouterConfig, ServiceConfig,
};
use trail_router::common::error::{LoadError, RouteError};
use trail_router::elevation::client::OpenElevationClient;
use trail_router::elevation::profile::build_elevation_profile;
use trail_router::loading::petgraph::create_graph;
use trail_router::loading::postgres::{PostgresTrailSource, TrailSource};
use trail_router::routing::route::Route;
use trail_router::routing::router::Router;

#[derive(Clone)]
struct AppState {
    trails: PostgresTrailSource,
    elevation: OpenElevationClient,
    config: Arc<RouterConfig>,
}

/// Failures which are reported back to the caller
#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Route(#[from] RouteError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Load(LoadError::InvalidBounds(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Load(LoadError::Database(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Route(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        error!(error = %self, %status, "request failed");

        let body = json!({
            "status": "error",
            "message": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}

/// Fetch the trail data for the requested area and build a router over it
async fn load_router(state: &AppState, bbox: &BBox) -> Result<Router, ApiError> {
    let data = state.trails.fetch(bbox).await?;
    let graph = create_graph(data.nodes, &data.ways, state.config.max_segment_length);
    Ok(Router::new(graph))
}

/// Attach a freshly calculated elevation profile to the route, if it has
/// enough points to chart
async fn attach_elevation(state: &AppState, route: Route) -> Route {
    match build_elevation_profile(&route, &state.elevation, &state.config).await {
        Some(profile) => route.with_elevation(profile),
        None => route,
    }
}

async fn plan_route(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<Route>, ApiError> {
    let now = Instant::now();

    let router = load_router(&state, &request.bbox).await?;
    let radius = request.snap_radius.unwrap_or(state.config.snap_radius);

    let waypoints = request
        .waypoints
        .iter()
        .map(|point| router.snap(point.lat, point.lon, radius))
        .collect();
    let route = Route::from_waypoints(waypoints, &router);
    let route = attach_elevation(&state, route).await;

    info!(
        waypoints = route.len(),
        distance = route.total_distance(),
        elapsed = ?now.elapsed(),
        "route planned"
    );
    Ok(Json(route))
}

async fn edit_route(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> Result<Json<Route>, ApiError> {
    let now = Instant::now();

    let router = load_router(&state, &request.bbox).await?;
    let radius = request.snap_radius.unwrap_or(state.config.snap_radius);
    let route = request.route;

    let edited = match request.edit.clone() {
        RouteEdit::Add { lat, lon } => {
            route.add_waypoint(router.snap(lat, lon, radius), &router)
        }
        RouteEdit::Delete { index } => route.delete_waypoint(index, &router)?,
        RouteEdit::Move { index, lat, lon } => {
            route.move_waypoint(index, router.snap(lat, lon, radius), &router)?
        }
        RouteEdit::Recalculate => route.recalculate_all_segments(&router),
    };
    let edited = attach_elevation(&state, edited).await;

    info!(
        edit = ?request.edit,
        waypoints = edited.len(),
        distance = edited.total_distance(),
        elapsed = ?now.elapsed(),
        "route edited"
    );
    Ok(Json(edited))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "success"
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    info!(bind_addr = %config.bind_addr, "starting trail router");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let state = AppState {
        trails: PostgresTrailSource::new(pool),
        elevation: OpenElevationClient::new(&config.elevation_url),
        config: Arc::new(config.router),
    };

    let app = ApiRouter::new()
        .route("/healthcheck", get(health_check))
        .route("/route", post(plan_route))
        .route("/route/edit", post(edit_route))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    serve(listener, app).await?;
    Ok(())
}
