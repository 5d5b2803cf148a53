//! Error kinds surfaced by the quiz core.
//!
//! Only `SessionError` reaches HTTP clients directly; render and explanation
//! failures are degraded into user-visible messages by the callers.

use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::session::Phase;

/// The user's quiz configuration cannot produce a quiz.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
  #[error("No problems match your combination of categories and difficulties. Please broaden your selection.")]
  NoMatchingCompounds,
  #[error("Number of problems must be at least 1 (got {0}).")]
  InvalidQuestionCount(usize),
}

/// A structure descriptor could not be turned into a drawing.
///
/// With a validated catalog this is a data-authoring defect, never user error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
  #[error("empty structure descriptor")]
  Empty,
  #[error("syntax error at position {pos}: {message}")]
  Syntax { pos: usize, message: String },
  #[error("unsupported descriptor feature at position {pos}: {feature}")]
  Unsupported { pos: usize, feature: String },
  #[error("atom {atom} ({element}) exceeds its valence of {max}")]
  Valence { atom: usize, element: &'static str, max: u8 },
  #[error("no condensed formula recorded for compound {0}")]
  MissingCondensed(String),
}

/// The AI collaborator could not produce a usable explanation.
#[derive(Debug, Error)]
pub enum ExplanationError {
  #[error("explanation service is not configured")]
  Disabled,
  #[error("request failed: {0}")]
  Transport(String),
  #[error("explanation service returned HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("no explanation within {0:?}")]
  Timeout(Duration),
  #[error("explanation service returned an empty response")]
  Empty,
}

impl From<reqwest::Error> for ExplanationError {
  fn from(e: reqwest::Error) -> Self {
    ExplanationError::Transport(e.to_string())
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),
  #[error("quiz is {actual}, this action needs it to be {expected}")]
  WrongPhase { expected: Phase, actual: Phase },
  #[error("question {0} could not be loaded and was skipped")]
  QuestionUnavailable(usize),
  #[error("unknown quiz session: {0}")]
  UnknownSession(String),
}

impl IntoResponse for SessionError {
  fn into_response(self) -> axum::response::Response {
    let status = match &self {
      SessionError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
      SessionError::WrongPhase { .. } | SessionError::QuestionUnavailable(_) => StatusCode::CONFLICT,
      SessionError::UnknownSession(_) => StatusCode::NOT_FOUND,
    };
    let body = serde_json::json!({
      "message": self.to_string(),
      "status": status.as_u16(),
    });
    (status, Json(body)).into_response()
  }
}
