//! Control Routes
//!
//! - POST /api/v1/controls/reconcile - Apply one selector event to a state

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ReconcileRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::controls::{transition, SelectorState};

/// POST /api/v1/controls/reconcile
///
/// Stateless: the client sends its current widget values and the change,
/// and gets the reconciled values back. "Select all" expands to the full
/// country universe.
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> ApiResult<Json<SelectorState>> {
    let Json(req) = payload?;
    Ok(Json(transition(&state.universe, &req.state, req.event)))
}
