//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::bank::filter_task_bank;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(goal = %body.goal, mode = ?body.mode, band = ?body.score.band))]
pub async fn http_post_plan(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PlanRequest>,
) -> impl IntoResponse {
  let (plan, origin) = state
    .choose_plan(&body.score, &body.goal, &body.context, body.mode)
    .await;
  info!(target: "plan", weeks = plan.duration_weeks, daily = plan.meta.daily_minutes, %origin, "HTTP plan served");
  Json(PlanOut { plan, origin })
}

#[instrument(level = "info", skip(state, q), fields(skill = ?q.skill, level = ?q.level))]
pub async fn http_get_bank(
  State(state): State<Arc<AppState>>,
  Query(q): Query<BankQuery>,
) -> impl IntoResponse {
  let tasks: Vec<_> = filter_task_bank(&state.bank, q.skill_filter(), q.level_filter(), q.query())
    .into_iter()
    .cloned()
    .collect();
  let total = tasks.len();
  info!(target: "plan", total, "HTTP bank served");
  Json(BankOut { tasks, total })
}
