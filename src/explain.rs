//! Explanations for wrong answers.
//!
//! Three sources, tried in order by the caller:
//! 1. an authored common-error note attached to the compound,
//! 2. the AI tutor (bounded by a timeout),
//! 3. a fixed fallback message when the AI is disabled or fails.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Prompts;
use crate::domain::Compound;
use crate::error::ExplanationError;
use crate::matcher;
use crate::openai::OpenAI;
use crate::util::fill_template;

pub const FALLBACK_MESSAGE: &str = "AI explanation is unavailable right now.";

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
  Authored,
  Ai,
  Fallback,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Explanation {
  pub source: ExplanationSource,
  /// Full text, exactly as authored or returned by the model.
  pub text: String,
  /// Step lines marked ❌ and their comments, in order.
  pub flagged_steps: Vec<String>,
}

impl Explanation {
  pub fn fallback() -> Self {
    Self {
      source: ExplanationSource::Fallback,
      text: FALLBACK_MESSAGE.to_string(),
      flagged_steps: Vec::new(),
    }
  }

  pub fn is_cacheable(&self) -> bool {
    self.source != ExplanationSource::Fallback
  }
}

/// Authored note for a known wrong name, if the compound has one.
pub fn authored(compound: &Compound, answer: &str) -> Option<Explanation> {
  compound
    .common_errors
    .iter()
    .find(|e| matcher::matches(answer, std::slice::from_ref(&e.incorrect_name)))
    .map(|e| Explanation {
      source: ExplanationSource::Authored,
      text: e.explanation.clone(),
      flagged_steps: Vec::new(),
    })
}

pub fn build_prompt(prompts: &Prompts, compound: &Compound, answer: &str) -> String {
  let alternatives = compound.alternative_names();
  let alternatives = if alternatives.is_empty() { "none".to_string() } else { alternatives.join(", ") };
  let condensed = compound.condensed.as_deref().unwrap_or("not recorded");
  fill_template(
    &prompts.explanation_user_template,
    &[
      ("student_answer", answer.trim()),
      ("correct_name", compound.preferred_name()),
      ("alternatives", &alternatives),
      ("smiles", &compound.smiles),
      ("condensed", condensed),
    ],
  )
}

/// Pull the failed steps out of a tutor reply.
///
/// A step line starts with `Step` and is flagged when it ends with ❌; a
/// `Comment:` line is kept only when it follows a flagged step. Leading list
/// markers are ignored.
pub fn flagged_steps(text: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut in_flagged = false;
  for raw in text.lines() {
    let line = raw.trim().trim_start_matches(&['-', '*'][..]).trim().trim_matches('"').trim();
    if line.starts_with("Step") {
      in_flagged = line.ends_with('❌');
      if in_flagged {
        out.push(line.to_string());
      }
    } else if in_flagged && line.starts_with("Comment:") && line.len() > "Comment:".len() {
      out.push(line.to_string());
    }
  }
  out
}

/// Ask the AI tutor, bounded by `timeout`.
#[instrument(level = "info", skip(openai, prompts, compound, answer), fields(compound = %compound.id))]
pub async fn request(
  openai: Option<&OpenAI>,
  prompts: &Prompts,
  compound: &Compound,
  answer: &str,
  timeout: Duration,
) -> Result<Explanation, ExplanationError> {
  let oa = openai.ok_or(ExplanationError::Disabled)?;
  let user = build_prompt(prompts, compound, answer);
  let text = tokio::time::timeout(timeout, oa.chat_plain(&prompts.explanation_system, &user, 0.2))
    .await
    .map_err(|_| ExplanationError::Timeout(timeout))??;
  if text.trim().is_empty() {
    return Err(ExplanationError::Empty);
  }
  let flagged = flagged_steps(&text);
  info!(target: "quiz", flagged = flagged.len(), "AI explanation ready");
  Ok(Explanation { source: ExplanationSource::Ai, text, flagged_steps: flagged })
}

/// Authored note first, then the AI, then the fallback. Never fails.
pub async fn explain(
  openai: Option<&OpenAI>,
  prompts: &Prompts,
  compound: &Compound,
  answer: &str,
  timeout: Duration,
) -> Explanation {
  if let Some(note) = authored(compound, answer) {
    return note;
  }
  match request(openai, prompts, compound, answer, timeout).await {
    Ok(e) => e,
    Err(err) => {
      warn!(target: "quiz", compound = %compound.id, error = %err, "Explanation degraded to fallback");
      Explanation::fallback()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CommonError;
  use crate::seeds::seed_compounds;

  fn compound(id: &str) -> Compound {
    seed_compounds().into_iter().find(|c| c.id == id).unwrap()
  }

  #[test]
  fn flags_only_failed_steps_and_their_comments() {
    let reply = "\
You got the chain length right but misplaced the locant.
- \"Step 1: Identify the principal functional group (hydroxyl). ✅\"
- \"Comment: \"
- Step 2: Identify the longest chain (butane). ✅
- Comment:
* Step 3: Number from the end nearest the OH. ❌
* Comment: You numbered from the wrong end, giving 3 instead of 2.
Step 4: Assemble the name. ❌
Comment:";
    let flagged = flagged_steps(reply);
    assert_eq!(
      flagged,
      vec![
        "Step 3: Number from the end nearest the OH. ❌".to_string(),
        "Comment: You numbered from the wrong end, giving 3 instead of 2.".to_string(),
        "Step 4: Assemble the name. ❌".to_string(),
      ]
    );
  }

  #[test]
  fn no_steps_means_nothing_flagged() {
    assert!(flagged_steps("Looks good overall.").is_empty());
  }

  #[test]
  fn prompt_carries_answer_and_structure() {
    let c = compound("alkane-05");
    let p = build_prompt(&Prompts::default(), &c, "  wrong name ");
    assert!(p.contains("\"wrong name\""));
    assert!(p.contains(c.preferred_name()));
    assert!(p.contains(&c.smiles));
    assert!(!p.contains("{student_answer}"));
  }

  #[test]
  fn placeholders_typed_by_the_student_stay_literal() {
    let c = compound("alkane-05");
    let p = build_prompt(&Prompts::default(), &c, "{correct_name} {smiles}");
    assert!(p.contains("\"{correct_name} {smiles}\""));
  }

  #[test]
  fn authored_note_matches_normalized() {
    let mut c = compound("alkane-05");
    c.common_errors = vec![CommonError { incorrect_name: "2-ethylpropane".into(), explanation: "Longest chain.".into() }];
    let note = authored(&c, "  2-Ethyl Propane").map(|e| e.source);
    assert_eq!(note, None);
    let note = authored(&c, " 2-ETHYLPROPANE ").unwrap();
    assert_eq!(note.source, ExplanationSource::Authored);
    assert_eq!(note.text, "Longest chain.");
  }

  #[test]
  fn fallback_is_not_cacheable() {
    let e = Explanation::fallback();
    assert_eq!(e.text, FALLBACK_MESSAGE);
    assert!(!e.is_cacheable());
  }

  #[tokio::test]
  async fn missing_client_is_disabled() {
    let c = compound("alkane-05");
    let err = request(None, &Prompts::default(), &c, "x", Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, ExplanationError::Disabled));
    let e = explain(None, &Prompts::default(), &c, "x", Duration::from_secs(1)).await;
    assert_eq!(e.source, ExplanationSource::Fallback);
  }

  #[tokio::test]
  async fn unreachable_service_falls_back() {
    let oa = OpenAI::new("k".into(), "http://127.0.0.1:9".into(), "m".into(), Duration::from_secs(2)).unwrap();
    let c = compound("alkane-05");
    let e = explain(Some(&oa), &Prompts::default(), &c, "x", Duration::from_secs(3)).await;
    assert_eq!(e.source, ExplanationSource::Fallback);
  }

  #[tokio::test]
  async fn slow_service_times_out() {
    // Accepts the connection but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((sock, _)) = listener.accept().await {
        held.push(sock);
      }
    });
    let oa = OpenAI::new("k".into(), format!("http://{}", addr), "m".into(), Duration::from_secs(30)).unwrap();
    let c = compound("alkane-05");
    let err = request(Some(&oa), &Prompts::default(), &c, "x", Duration::from_millis(200)).await.unwrap_err();
    assert!(matches!(err, ExplanationError::Timeout(_)));
  }
}
