use axum::Json;
use axum::extract::{Query, State};
use axum::{Router, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::gateway::RequestOptions;
use crate::models::Course;
use crate::state::AppState;
use crate::views::{Dashboard, DashboardRender};

#[derive(Deserialize)]
struct DashboardQueryParams {
    #[serde(default)]
    refresh: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses))
        .route("/api/dashboard", get(dashboard))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Pass-through of the backend's course list.
async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.api.list_courses(&RequestOptions::no_cache()).await?;
    Ok(Json(courses))
}

/// Dashboard projection over the shared store. Fetch failures are part of the
/// rendered state, not an error response.
async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQueryParams>,
) -> Result<Json<DashboardRender>, AppError> {
    let mut dashboard = Dashboard::new(&state.store);
    let loaded = if params.refresh {
        dashboard.grid().collection().view().refresh().await
    } else {
        dashboard.mount().await
    };
    if let Err(e) = loaded {
        tracing::debug!("dashboard load failed: {}", e);
    }

    dashboard
        .render()
        .map(Json)
        .ok_or_else(|| AppError::Render("dashboard could not be rendered".to_string()))
}
