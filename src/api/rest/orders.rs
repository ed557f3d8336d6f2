use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::ApiJson;
use crate::engine::review::ReviewSubmission;
use crate::engine::WorkflowOutcome;
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/assign", post(assign_driver))
        .route("/orders/:id/status", post(advance_status))
        .route("/orders/:id/review", post(record_review))
}

#[derive(Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

#[derive(Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items_total: u64,
    pub total_amount: u64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let totals = order.totals();
        Self {
            order,
            items_total: totals.items_total,
            total_amount: totals.total_amount,
        }
    }
}

#[derive(Serialize)]
pub struct WarningView {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
pub struct WorkflowResponse {
    pub order: OrderView,
    pub notification_id: Option<Uuid>,
    pub warnings: Vec<WarningView>,
}

impl From<WorkflowOutcome> for WorkflowResponse {
    fn from(outcome: WorkflowOutcome) -> Self {
        Self {
            order: outcome.order.into(),
            notification_id: outcome.notification_id,
            warnings: outcome
                .warnings
                .iter()
                .map(|warning| WarningView {
                    kind: warning.kind(),
                    message: warning.to_string(),
                })
                .collect(),
        }
    }
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, AppError> {
    let order = state.lifecycle.get_order(id).await?;
    Ok(Json(order.into()))
}

async fn assign_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<AssignDriverRequest>,
) -> Result<Json<WorkflowResponse>, AppError> {
    let outcome = state.lifecycle.assign_driver(id, payload.driver_id).await?;
    Ok(Json(outcome.into()))
}

async fn advance_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<AdvanceStatusRequest>,
) -> Result<Json<WorkflowResponse>, AppError> {
    let outcome = state.lifecycle.advance_status(id, payload.status).await?;
    Ok(Json(outcome.into()))
}

async fn record_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ReviewSubmission>,
) -> Result<Json<OrderView>, AppError> {
    let order = state.lifecycle.record_review(id, payload).await?;
    Ok(Json(order.into()))
}
