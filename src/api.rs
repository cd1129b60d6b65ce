// REST API with Axum
//
// JSON surface over the location store. Every response uses the same
// envelope: {success, data?, error?}.

use crate::db::{Event, SqliteStore};
use crate::entities::{Location, LocationCategory, Sale};
use crate::error::{FormError, StoreError};
use crate::form::LocationForm;
use crate::performance::{aggregate, RankedLocation};
use crate::store::LocationStore;
use crate::view::dashboard_route;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, SqliteStore>, ApiError> {
        self.store.lock().map_err(|_| ApiError::from(StoreError::Poisoned))
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            tracing::error!(error = %err, "store error");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::EmptyName => Self {
                status: StatusCode::BAD_REQUEST,
                message: FormError::EmptyName.to_string(),
            },
            FormError::Store(inner) => inner.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::failure(self.message))).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data))))
}

/// Body of create and edit requests
#[derive(Debug, Deserialize)]
pub struct LocationInput {
    pub name: String,
    pub category: LocationCategory,
}

/// Location dashboard: ranked entry, its sales and its audit trail
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub location: RankedLocation,
    pub route: String,
    pub sales: Vec<Sale>,
    pub history: Vec<Event>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/locations - Ranked locations, busiest first
async fn list_locations(State(state): State<AppState>) -> ApiResult<Vec<RankedLocation>> {
    let store = state.store()?;
    let snapshot = store.snapshot()?;

    ok(aggregate(&snapshot.locations, &snapshot.sales))
}

/// GET /api/locations/:id - Location dashboard
async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DashboardResponse> {
    let store = state.store()?;
    let snapshot = store.snapshot()?;

    let location = aggregate(&snapshot.locations, &snapshot.sales)
        .into_iter()
        .find(|r| r.location.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
    let sales = store.sales_for_location(&location.location.name)?;
    let history = store.history(&id)?;

    ok(DashboardResponse {
        route: dashboard_route(&id),
        location,
        sales,
        history,
    })
}

/// POST /api/locations - Create a location
async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<LocationInput>,
) -> ApiResult<Location> {
    let store = state.store()?;
    let saved = LocationForm::with_values(None, input.name, input.category).submit(&*store)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(saved))))
}

/// PUT /api/locations/:id - Full-record edit
async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LocationInput>,
) -> ApiResult<Location> {
    let store = state.store()?;
    let existing = store
        .location(&id)?
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;

    let saved =
        LocationForm::with_values(Some(&existing), input.name, input.category).submit(&*store)?;

    ok(saved)
}

/// DELETE /api/locations/:id - Irreversible delete
async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let store = state.store()?;
    store.delete_location(&id)?;

    ok(id)
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/:id",
            get(get_dashboard).put(update_location).delete(delete_location),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
