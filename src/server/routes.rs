//! HTTP API routes
//!
//! JSON endpoints under `/api`, static files for everything else. Every
//! response allows any origin and must not be cached.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::region::LocationInfo;
use crate::server::state::{lock_store, AppState};
use crate::service::{local_now, ReportError, TideReport, TideService};
use crate::store::{AreaStats, HistoryEntry, LocationRecord};
use crate::tide::DataSourceKind;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files =
        ServeDir::new(state.static_dir()).append_index_html_on_directories(true);

    Router::new()
        .route("/api/tide", get(tide_handler))
        .route("/api/classify", get(classify_handler))
        .route("/api/status", get(status_handler))
        .route("/api/locations/popular", get(popular_handler))
        .route("/api/history", get(history_handler))
        .route("/api/stats", get(stats_handler))
        .fallback_service(static_files)
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    /// Present when the location was classified before being rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
}

type ApiFailure = (StatusCode, Json<ApiError>);
type ApiResult<T> = Result<Json<T>, ApiFailure>;

fn failure(status: StatusCode, code: &str, error: impl ToString) -> ApiFailure {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
            code: code.to_string(),
            location: None,
        }),
    )
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Store(_) => "STORE_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            location: None,
        }
    }
}

fn internal(err: Error) -> ApiFailure {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError::from(err)))
}

/// Map a failed lookup to its response: rejections are 400, no data is 503
fn report_failure(err: ReportError) -> ApiFailure {
    let (status, location) = match &err {
        ReportError::Invalid(e) => (StatusCode::BAD_REQUEST, e.location_info().cloned()),
        ReportError::Unavailable { location } => {
            (StatusCode::SERVICE_UNAVAILABLE, Some(location.as_ref().clone()))
        }
    };
    (
        status,
        Json(ApiError {
            error: err.to_string(),
            code: err.code().to_string(),
            location,
        }),
    )
}

/// Coordinate query parameters
#[derive(Debug, Deserialize)]
pub struct CoordQuery {
    pub lat: f64,
    pub lon: f64,
}

impl CoordQuery {
    fn validated(&self) -> Result<Coordinates, ApiFailure> {
        let coords = Coordinates::new(self.lat, self.lon);
        coords
            .validate()
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(ApiError::from(e))))?;
        Ok(coords)
    }
}

/// Tide report for a location
///
/// GET /api/tide?lat=..&lon=..
///
/// Classification, geocoding and the provider all block, so the whole lookup
/// runs on the blocking pool. Successful lookups are recorded.
async fn tide_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordQuery>,
) -> ApiResult<TideReport> {
    let coords = query.validated()?;
    let config = state.config().await;
    let store = state.store_handle();
    let writer = state.writer_handle();

    let outcome = tokio::task::spawn_blocking(move || {
        let service = TideService::from_config(&config);
        let now = local_now();
        let report = service.report(coords.lat, coords.lng, now)?;

        // The lock covers the in-memory update only; the file is written after
        let recorded = lock_store(&store)
            .and_then(|mut store| {
                store.record_report(&report, now);
                store.prepare_save()
            })
            .and_then(|pending| writer.write(pending));
        if let Err(e) = recorded {
            tracing::warn!("Failed to record query: {}", e);
        }
        Ok::<_, ReportError>(report)
    })
    .await
    .map_err(|e| internal(Error::Server(format!("Lookup task failed: {}", e))))?;

    outcome.map(Json).map_err(report_failure)
}

/// Classification response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Classify a location without fetching tide data
///
/// GET /api/classify?lat=..&lon=..
async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordQuery>,
) -> ApiResult<ClassifyResponse> {
    let coords = query.validated()?;
    let config = state.config().await;

    let result = tokio::task::spawn_blocking(move || {
        TideService::from_config(&config).classify(coords.lat, coords.lng)
    })
    .await
    .map_err(|e| internal(Error::Server(format!("Classify task failed: {}", e))))?;

    Ok(Json(match result {
        Ok(info) => ClassifyResponse {
            valid: true,
            location: Some(info),
            error: None,
            code: None,
        },
        Err(e) => ClassifyResponse {
            valid: false,
            location: e.location_info().cloned(),
            error: Some(e.to_string()),
            code: Some(e.code().to_string()),
        },
    }))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Where tide data comes from
    pub data_source: DataSourceKind,
    /// Region name
    pub region: String,
    /// Whether reverse geocoding is attempted
    pub geocoding: bool,
    /// Recorded queries
    pub records: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let config = state.config().await;
    let records = state.store().map_err(internal)?.record_count();

    Ok(Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_source: DataSourceKind::configured(&config.provider),
        region: config.region.name,
        geocoding: config.geocoding.enabled,
        records,
        uptime_secs: state.uptime_secs(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PopularResponse {
    pub locations: Vec<LocationRecord>,
    pub count: usize,
}

/// Most queried locations
///
/// GET /api/locations/popular?limit=..
async fn popular_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<PopularResponse> {
    let limit = query
        .limit
        .unwrap_or(state.config().await.defaults.popular_limit);
    let locations = state.store().map_err(internal)?.most_queried(limit);

    Ok(Json(PopularResponse {
        count: locations.len(),
        locations,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub count: usize,
}

/// Recorded queries, for one location when `lat` and `lon` are given
///
/// GET /api/history?lat=..&lon=..&limit=..
async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<HistoryResponse> {
    let limit = query
        .limit
        .unwrap_or(state.config().await.defaults.history_limit);

    let entries = {
        let store = state.store().map_err(internal)?;
        match (query.lat, query.lon) {
            (Some(lat), Some(lon)) => store.location_history(Coordinates::new(lat, lon), limit),
            (None, None) => store.recent(limit),
            _ => {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "INVALID_COORDINATES",
                    "Both lat and lon are required",
                ))
            }
        }
    };

    Ok(Json(HistoryResponse {
        count: entries.len(),
        entries,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub days: i64,
    pub areas: Vec<AreaStats>,
}

/// Per-area height statistics
///
/// GET /api/stats?days=..
async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<StatsResponse> {
    let days = query
        .days
        .unwrap_or(state.config().await.defaults.stats_days);
    if days <= 0 {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "INVALID_DAYS",
            format!("Days must be positive, got {}", days),
        ));
    }

    let areas = state.store().map_err(internal)?.statistics(days, local_now());
    Ok(Json(StatsResponse { days, areas }))
}
