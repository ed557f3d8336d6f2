use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/eligible", get(list_eligible_drivers))
        .route("/drivers/:id", get(get_driver))
}

async fn list_eligible_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriverSummary>>, AppError> {
    let drivers = state.lifecycle.list_eligible_drivers().await?;
    Ok(Json(drivers))
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, AppError> {
    let driver = state.lifecycle.get_driver(id).await?;
    Ok(Json(driver))
}
