//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::{header::CONTENT_TYPE, StatusCode},
  response::IntoResponse,
  Json,
};
use tracing::{debug, info, instrument};

use crate::bank::ValidationReport;
use crate::error::SessionError;
use crate::explain::Explanation;
use crate::logic;
use crate::protocol::*;
use crate::session::Progress;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogOut> {
  Json(logic::catalog(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_validation(State(state): State<Arc<AppState>>) -> Json<ValidationReport> {
  let report = state.bank.validate();
  info!(target: "quiz", checked = report.checked, valid = report.is_valid(), invalid = report.invalid.len(), "HTTP catalog validation served");
  Json(report)
}

#[instrument(level = "info", skip(state, body), fields(categories = ?body.config.categories, difficulties = ?body.config.difficulties, count = body.config.count))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartQuizIn>,
) -> Result<(StatusCode, Json<StartQuizOut>), SessionError> {
  let id = state.create_session(body.config).await?;
  let question = state.with_session(&id, |s| logic::question_out(&state, s, body.view)).await?;
  let total = question.progress.total;
  info!(target: "quiz", session = %id, total, "HTTP quiz started");
  Ok((StatusCode::CREATED, Json(StartQuizOut { session_id: id, total, question })))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Progress>, SessionError> {
  Ok(Json(state.with_session(&id, |s| Ok(s.progress())).await?))
}

#[instrument(level = "info", skip(state), fields(view = ?q.view))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ViewQuery>,
) -> Result<Json<QuestionOut>, SessionError> {
  let question = state.with_session(&id, |s| logic::question_out(&state, s, q.view)).await?;
  Ok(Json(question))
}

/// Raw structure: `image/svg+xml` for drawings, `text/plain` for the condensed formula.
#[instrument(level = "info", skip(state), fields(view = ?q.view))]
pub async fn http_get_structure(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ViewQuery>,
) -> Result<axum::response::Response, SessionError> {
  let rendered = state.with_session(&id, |s| logic::render_current(&state, s, q.view)).await?;
  Ok(match rendered {
    Ok(r) => ([(CONTENT_TYPE, r.content_type())], r.as_str().to_string()).into_response(),
    Err(e) => {
      let body = serde_json::json!({ "message": e.to_string(), "status": 422 });
      (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
  })
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, SessionError> {
  let judged = state.with_session(&id, |s| logic::judge(s, &body.answer)).await?;

  let explanation = explain_and_remember(&state, &id, &judged).await;
  info!(target: "quiz", session = %id, correct = judged.result.correct, "HTTP submit_answer evaluated");
  Ok(Json(logic::answer_out(judged, explanation)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_explanation(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ExplanationOut>, SessionError> {
  let (compound_id, pending) = state
    .with_session(&id, |s| {
      let compound_id = s.current_question()?.id.clone();
      Ok((compound_id, logic::wrong_answer_on_current(s)?))
    })
    .await?;

  let explanation = match pending {
    None => None,
    Some(judged) => explain_and_remember(&state, &id, &judged).await,
  };
  Ok(Json(ExplanationOut { compound_id, explanation }))
}

#[instrument(level = "info", skip(state), fields(view = ?q.view))]
pub async fn http_post_next(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ViewQuery>,
) -> Result<Json<NextOut>, SessionError> {
  let next = state.with_session(&id, |s| logic::next_out(&state, s, q.view)).await?;
  Ok(Json(next))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_results(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ResultsOut>, SessionError> {
  let results = state.with_session(&id, |s| logic::results_out(s)).await?;
  info!(target: "quiz", session = %id, score = results.summary.score, total = results.summary.total, "HTTP results served");
  Ok(Json(results))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, SessionError> {
  state.remove_session(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Resolve the explanation without holding the store lock, then cache it.
async fn explain_and_remember(state: &AppState, id: &str, judged: &logic::Judged) -> Option<Explanation> {
  let explanation = logic::resolve_explanation(state, judged).await;
  if let Some(e) = &explanation {
    let cached = state.with_session(id, |s| { logic::remember_explanation(s, judged, e); Ok(()) }).await;
    if let Err(err) = cached {
      debug!(target: "quiz", session = %id, error = %err, "Session gone before explanation could be cached");
    }
  }
  explanation
}
