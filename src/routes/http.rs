//! HTTP endpoint handlers. These are thin wrappers that forward to the orchestrator.
//! Each handler is instrumented and logs the user and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::UserId;
use crate::error::{ServiceError, ServiceResult};
use crate::protocol::*;
use crate::state::AppState;

fn user_from_path(raw: &str) -> ServiceResult<UserId> {
  UserId::parse(raw).ok_or(ServiceError::InvalidUser)
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_today(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> ServiceResult<Json<TodayOut>> {
  let user = user_from_path(&user_id)?;
  let picks = state.orchestrator.today_selection(&user).await?;
  info!(target: "leetdaily", %user, count = picks.len(), "HTTP today served");
  let problems = picks.iter().map(|p| to_out(p, &state.problems_url)).collect();
  Ok(Json(TodayOut { problems }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_refresh(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> ServiceResult<Json<RefreshOut>> {
  let user = user_from_path(&user_id)?;
  let counts = state.orchestrator.refresh_catalog(&user).await?;
  info!(target: "leetdaily", %user, not_solved = counts.not_solved, solved = counts.solved, "HTTP refresh done");
  Ok(Json(counts.into()))
}

#[instrument(level = "info", skip(state, body), fields(easy = body.easy, medium = body.medium, hard = body.hard))]
pub async fn http_put_preference(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  Json(body): Json<PreferenceIn>,
) -> ServiceResult<Json<AckOut>> {
  let user = user_from_path(&user_id)?;
  state.orchestrator.set_preference(&user, body.into()).await?;
  Ok(Json(AckOut { ok: true }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_credential(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  Json(body): Json<CredentialIn>,
) -> ServiceResult<Json<AckOut>> {
  let user = user_from_path(&user_id)?;
  state.orchestrator.set_credential(&user, &body.token).await?;
  Ok(Json(AckOut { ok: true }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_solved(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> ServiceResult<Json<SolvedOut>> {
  let user = user_from_path(&user_id)?;
  Ok(Json(state.orchestrator.solved_counts(&user).await))
}
