//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Everything here works on a `&mut QuizSession` so the HTTP store (behind a
//! lock) and a WebSocket connection (owning its session) drive the same code.
//! The only async step, the explanation call, takes no session at all.

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::{Compound, ViewKind};
use crate::error::{RenderError, SessionError};
use crate::explain::{self, Explanation};
use crate::protocol::{AnswerOut, CatalogOut, NextOut, OptionOut, QuestionOut, RenderingOut, ResultsOut};
use crate::render::Rendering;
use crate::smiles;
use crate::session::{AnswerResult, Phase, Progress, QuestionState, QuizSession};
use crate::state::AppState;

const SKIPPED_MESSAGE: &str = "This structure could not be drawn, so the question was skipped. Please continue with the next one.";

pub fn catalog(state: &AppState) -> CatalogOut {
  let (categories, difficulties) = state.bank.options();
  CatalogOut {
    categories: categories.iter().map(|c| OptionOut { value: wire_name(c), label: c.label() }).collect(),
    difficulties: difficulties.iter().map(|d| OptionOut { value: wire_name(d), label: d.label() }).collect(),
    views: ViewKind::ALL.iter().map(|v| OptionOut { value: wire_name(v), label: v.label() }).collect(),
    total: state.bank.len(),
  }
}

/// "Problem i of n (Score: s)"
pub fn progress_text(p: &Progress) -> String {
  format!("Problem {} of {} (Score: {})", p.question_number, p.total, p.score)
}

/// Render the current question. A broken descriptor skips the question;
/// a missing condensed formula is only reported.
pub fn render_current(
  state: &AppState,
  session: &mut QuizSession,
  view: ViewKind,
) -> Result<Result<Rendering, RenderError>, SessionError> {
  let compound = session.current_question()?.clone();
  let rendered = state.renderer.render(&compound, view);
  if let Err(e) = &rendered {
    if !matches!(e, RenderError::MissingCondensed(_)) {
      error!(target: "quiz", id = %compound.id, smiles = %compound.smiles, error = %e, "Render failed");
      session.skip_current(&e.to_string())?;
    }
  }
  Ok(rendered)
}

#[instrument(level = "info", skip(state, session), fields(position = session.position()))]
pub fn question_out(state: &AppState, session: &mut QuizSession, view: ViewKind) -> Result<QuestionOut, SessionError> {
  let mut rendering = None;
  let mut message = None;
  if !matches!(session.current_state()?, QuestionState::Skipped(_)) {
    match render_current(state, session, view)? {
      Ok(r) => rendering = Some(RenderingOut::from(&r)),
      Err(RenderError::MissingCondensed(_)) => {
        message = Some("No condensed formula is recorded for this compound. Try another view.".to_string())
      }
      Err(_) => {}
    }
  }

  let (skipped, answered) = match session.current_state()? {
    QuestionState::Skipped(reason) => {
      message = Some(SKIPPED_MESSAGE.to_string());
      (Some(reason.clone()), false)
    }
    QuestionState::Answered(_) => (None, true),
    QuestionState::Unanswered => (None, false),
  };
  let compound = session.current_question()?;
  let progress = session.progress();
  Ok(QuestionOut {
    compound_id: compound.id.clone(),
    category: compound.category,
    difficulty: compound.difficulty,
    view,
    formula: smiles::parse(&compound.smiles).ok().map(|m| m.formula()),
    progress_text: progress_text(&progress),
    progress,
    answered,
    rendering,
    skipped,
    message,
  })
}

/// A verdict plus what is needed to explain it without touching the session.
#[derive(Clone, Debug)]
pub struct Judged {
  pub result: AnswerResult,
  pub compound: Compound,
  /// Explanation available without an external call (cached or authored).
  pub known: Option<Explanation>,
  pub progress: Progress,
  pub is_last: bool,
}

fn judged(session: &QuizSession, result: AnswerResult) -> Result<Judged, SessionError> {
  let compound = session.current_question()?.clone();
  let known = if result.correct {
    None
  } else {
    session
      .cached_explanation(&compound.id, &result.input)
      .cloned()
      .or_else(|| explain::authored(&compound, &result.input))
  };
  Ok(Judged { result, compound, known, progress: session.progress(), is_last: session.is_last() })
}

pub fn judge(session: &mut QuizSession, answer: &str) -> Result<Judged, SessionError> {
  let result = session.submit_answer(answer)?;
  judged(session, result)
}

/// The current question's verdict, if it was answered wrongly.
pub fn wrong_answer_on_current(session: &QuizSession) -> Result<Option<Judged>, SessionError> {
  match session.current_state()? {
    QuestionState::Answered(r) if !r.correct => judged(session, r.clone()).map(Some),
    _ => Ok(None),
  }
}

/// Explanation for a wrong answer: known one if any, otherwise the AI (with
/// fallback). `None` for correct answers.
pub async fn resolve_explanation(state: &AppState, judged: &Judged) -> Option<Explanation> {
  if judged.result.correct {
    return None;
  }
  if let Some(known) = &judged.known {
    return Some(known.clone());
  }
  let e = explain::explain(
    state.openai.as_ref(),
    &state.prompts,
    &judged.compound,
    &judged.result.input,
    state.explanation_timeout,
  )
  .await;
  Some(e)
}

/// Cache a freshly fetched AI explanation on the session. Fallbacks are not
/// cached so a later request can try again.
pub fn remember_explanation(session: &mut QuizSession, judged: &Judged, explanation: &Explanation) {
  if judged.known.is_none() && explanation.is_cacheable() {
    session.cache_explanation(&judged.compound.id, &judged.result.input, explanation.clone());
  }
}

pub fn feedback_text(result: &AnswerResult, compound: &Compound) -> String {
  if result.correct {
    return format!("Correct! The name is {}.", compound.preferred_name());
  }
  let mut text = format!("Incorrect. Your answer: {}. Correct answer(s): {}", result.input.trim(), compound.preferred_name());
  let alternatives = compound.alternative_names();
  if !alternatives.is_empty() {
    text.push_str(" or ");
    text.push_str(&alternatives.join(", "));
  }
  text
}

pub fn answer_out(judged: Judged, explanation: Option<Explanation>) -> AnswerOut {
  let feedback = feedback_text(&judged.result, &judged.compound);
  info!(target: "quiz", id = %judged.compound.id, correct = judged.result.correct, explained = explanation.is_some(), "Answer feedback ready");
  AnswerOut {
    correct: judged.result.correct,
    input: judged.result.input,
    matched: judged.result.matched,
    accepted_names: judged.compound.names,
    feedback,
    explanation,
    progress: judged.progress,
    is_last: judged.is_last,
  }
}

pub fn results_out(session: &QuizSession) -> Result<ResultsOut, SessionError> {
  Ok(ResultsOut::from(session.summary()?))
}

/// Advance and describe where the session landed.
#[instrument(level = "info", skip(state, session), fields(position = session.position()))]
pub fn next_out(state: &AppState, session: &mut QuizSession, view: ViewKind) -> Result<NextOut, SessionError> {
  match session.advance()? {
    Phase::Completed => Ok(NextOut::Completed { results: results_out(session)? }),
    _ => Ok(NextOut::Question { question: question_out(state, session, view)? }),
  }
}

/// Name of a unit enum variant exactly as serde writes it.
fn wire_name<T: Serialize>(v: &T) -> String {
  match serde_json::to_value(v) {
    Ok(serde_json::Value::String(s)) => s,
    _ => String::new(),
  }
}
