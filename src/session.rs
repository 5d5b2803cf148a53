//! Quiz session state machine: `Configuring -> InProgress -> Completed`.
//!
//! A session is a plain value owned by whoever drives it (the HTTP session
//! store or a single WebSocket connection). Nothing here is shared or global.

use std::{collections::HashMap, fmt};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::bank::QuestionBank;
use crate::domain::{Category, Compound, Difficulty};
use crate::error::{ConfigurationError, SessionError};
use crate::explain::Explanation;
use crate::matcher;

pub const DEFAULT_QUESTION_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Configuring,
  InProgress,
  Completed,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Phase::Configuring => "being configured",
      Phase::InProgress => "in progress",
      Phase::Completed => "completed",
    })
  }
}

/// What the student asked for. Fixed for the lifetime of a session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizConfig {
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(default)]
  pub difficulties: Vec<Difficulty>,
  #[serde(default = "default_count")]
  pub count: usize,
}

pub fn default_count() -> usize {
  DEFAULT_QUESTION_COUNT
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self { categories: Vec::new(), difficulties: Vec::new(), count: DEFAULT_QUESTION_COUNT }
  }
}

/// Verdict for one submission.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AnswerResult {
  pub correct: bool,
  /// The accepted name the input matched, if any.
  pub matched: Option<String>,
  pub input: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionState {
  Unanswered,
  Answered(AnswerResult),
  /// Could not be displayed; carries the reason.
  Skipped(String),
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Perfect,
  Great,
  GoodEffort,
  NeedsPractice,
}

impl Tier {
  fn for_percentage(p: f64) -> Self {
    if p >= 100.0 {
      Tier::Perfect
    } else if p >= 75.0 {
      Tier::Great
    } else if p >= 50.0 {
      Tier::GoodEffort
    } else {
      Tier::NeedsPractice
    }
  }

  pub fn message(self) -> &'static str {
    match self {
      Tier::Perfect => "Excellent! Perfect score!",
      Tier::Great => "Great job!",
      Tier::GoodEffort => "Good effort, keep practicing!",
      Tier::NeedsPractice => "Needs more practice. Don't give up!",
    }
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Summary {
  pub score: usize,
  pub total: usize,
  pub answered: usize,
  pub percentage: f64,
  pub tier: Tier,
  /// What the quiz was drawn from.
  pub config: QuizConfig,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Progress {
  pub phase: Phase,
  /// 1-based number of the question on screen (equals `total` once completed).
  pub question_number: usize,
  pub total: usize,
  pub score: usize,
  pub answered: usize,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  phase: Phase,
  config: Option<QuizConfig>,
  questions: Vec<Compound>,
  states: Vec<QuestionState>,
  position: usize,
  score: usize,
  explanations: HashMap<(String, String), Explanation>,
}

impl Default for QuizSession {
  fn default() -> Self {
    Self::new()
  }
}

impl QuizSession {
  pub fn new() -> Self {
    Self {
      phase: Phase::Configuring,
      config: None,
      questions: Vec::new(),
      states: Vec::new(),
      position: 0,
      score: 0,
      explanations: HashMap::new(),
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  pub fn score(&self) -> usize {
    self.score
  }

  pub fn answered(&self) -> usize {
    self.states.iter().filter(|s| matches!(s, QuestionState::Answered(_))).count()
  }

  pub fn is_last(&self) -> bool {
    self.position + 1 >= self.questions.len()
  }

  pub fn progress(&self) -> Progress {
    Progress {
      phase: self.phase,
      question_number: (self.position + 1).min(self.questions.len()),
      total: self.questions.len(),
      score: self.score,
      answered: self.answered(),
    }
  }

  /// Start the quiz with compounds drawn from `bank`.
  pub fn configure(&mut self, bank: &QuestionBank, config: QuizConfig) -> Result<usize, SessionError> {
    self.configure_with_rng(bank, config, &mut rand::thread_rng())
  }

  /// Filter the bank, sample `min(count, matches)` compounds and move to
  /// `InProgress`. On a configuration error the session stays `Configuring`.
  #[instrument(level = "info", skip(self, bank, rng), fields(categories = ?config.categories, difficulties = ?config.difficulties, count = config.count))]
  pub fn configure_with_rng<R: Rng + ?Sized>(
    &mut self,
    bank: &QuestionBank,
    config: QuizConfig,
    rng: &mut R,
  ) -> Result<usize, SessionError> {
    self.expect_phase(Phase::Configuring)?;
    if config.count == 0 {
      return Err(ConfigurationError::InvalidQuestionCount(0).into());
    }

    let mut picked = bank.filter(&config.categories, &config.difficulties);
    if picked.is_empty() {
      warn!(target: "quiz", "No compounds match the selected filters");
      return Err(ConfigurationError::NoMatchingCompounds.into());
    }
    picked.shuffle(rng);
    picked.truncate(config.count);

    self.questions = picked.into_iter().cloned().collect();
    self.states = vec![QuestionState::Unanswered; self.questions.len()];
    self.position = 0;
    self.score = 0;
    self.config = Some(config);
    self.phase = Phase::InProgress;
    info!(target: "quiz", total = self.questions.len(), "Quiz started");
    Ok(self.questions.len())
  }

  pub fn current_question(&self) -> Result<&Compound, SessionError> {
    self.expect_phase(Phase::InProgress)?;
    Ok(&self.questions[self.position])
  }

  pub fn current_state(&self) -> Result<&QuestionState, SessionError> {
    self.expect_phase(Phase::InProgress)?;
    Ok(&self.states[self.position])
  }

  /// Judge `input` against the current question. Only the first submission
  /// counts; later ones return the stored verdict unchanged.
  #[instrument(level = "info", skip(self, input), fields(position = self.position, input_len = input.len()))]
  pub fn submit_answer(&mut self, input: &str) -> Result<AnswerResult, SessionError> {
    self.expect_phase(Phase::InProgress)?;
    let idx = self.position;
    match &self.states[idx] {
      QuestionState::Answered(previous) => return Ok(previous.clone()),
      QuestionState::Skipped(_) => return Err(SessionError::QuestionUnavailable(idx + 1)),
      QuestionState::Unanswered => {}
    }

    let compound = &self.questions[idx];
    let matched = matcher::matched_variant(input, &compound.names).map(str::to_string);
    let result = AnswerResult { correct: matched.is_some(), matched, input: input.to_string() };
    if result.correct {
      self.score += 1;
    }
    info!(target: "quiz", id = %compound.id, correct = result.correct, score = self.score, "Answer judged");
    self.states[idx] = QuestionState::Answered(result.clone());
    Ok(result)
  }

  /// Mark the current question as impossible to show. No-op once answered.
  pub fn skip_current(&mut self, reason: &str) -> Result<(), SessionError> {
    self.expect_phase(Phase::InProgress)?;
    let idx = self.position;
    if matches!(self.states[idx], QuestionState::Unanswered) {
      warn!(target: "quiz", id = %self.questions[idx].id, %reason, "Question skipped");
      self.states[idx] = QuestionState::Skipped(reason.to_string());
    }
    Ok(())
  }

  /// Move to the next question, or to `Completed` after the last one.
  pub fn advance(&mut self) -> Result<Phase, SessionError> {
    self.expect_phase(Phase::InProgress)?;
    self.position += 1;
    if self.position >= self.questions.len() {
      self.phase = Phase::Completed;
      info!(target: "quiz", score = self.score, total = self.questions.len(), "Quiz completed");
    }
    Ok(self.phase)
  }

  pub fn summary(&self) -> Result<Summary, SessionError> {
    self.expect_phase(Phase::Completed)?;
    let total = self.questions.len();
    let percentage = if total == 0 { 0.0 } else { self.score as f64 * 100.0 / total as f64 };
    Ok(Summary {
      score: self.score,
      total,
      answered: self.answered(),
      percentage,
      tier: Tier::for_percentage(percentage),
      config: self.config.clone().unwrap_or_default(),
    })
  }

  pub fn cached_explanation(&self, compound_id: &str, answer: &str) -> Option<&Explanation> {
    self.explanations.get(&(compound_id.to_string(), matcher::normalize(answer)))
  }

  pub fn cache_explanation(&mut self, compound_id: &str, answer: &str, explanation: Explanation) {
    self.explanations.insert((compound_id.to_string(), matcher::normalize(answer)), explanation);
  }

  fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
    if self.phase == expected {
      Ok(())
    } else {
      Err(SessionError::WrongPhase { expected, actual: self.phase })
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::explain::ExplanationSource;
  use crate::seeds::seed_compounds;

  fn bank() -> QuestionBank {
    QuestionBank::new(seed_compounds())
  }

  fn started(count: usize) -> QuizSession {
    let mut s = QuizSession::new();
    let cfg = QuizConfig { count, ..QuizConfig::default() };
    s.configure_with_rng(&bank(), cfg, &mut StdRng::seed_from_u64(7)).unwrap();
    s
  }

  #[test]
  fn empty_match_stays_configuring() {
    let alkanes_only = QuestionBank::new(seed_compounds().into_iter().filter(|c| c.category == Category::Alkane).collect());
    let mut s = QuizSession::new();
    let cfg = QuizConfig { categories: vec![Category::Alkene], ..QuizConfig::default() };
    let err = s.configure(&alkanes_only, cfg).unwrap_err();
    assert_eq!(err, SessionError::Configuration(ConfigurationError::NoMatchingCompounds));
    assert_eq!(s.phase(), Phase::Configuring);
    assert_eq!(s.total(), 0);
    assert!(s.current_question().is_err());
  }

  #[test]
  fn zero_count_is_rejected() {
    let mut s = QuizSession::new();
    let cfg = QuizConfig { count: 0, ..QuizConfig::default() };
    assert_eq!(
      s.configure(&bank(), cfg),
      Err(SessionError::Configuration(ConfigurationError::InvalidQuestionCount(0)))
    );
    assert_eq!(s.phase(), Phase::Configuring);
  }

  #[test]
  fn sequence_respects_filters_and_count() {
    let mut s = QuizSession::new();
    let cfg = QuizConfig { categories: vec![Category::Alkene], difficulties: vec![Difficulty::Easy], count: 50 };
    let n = s.configure_with_rng(&bank(), cfg, &mut StdRng::seed_from_u64(1)).unwrap();
    let expected = bank().filter(&[Category::Alkene], &[Difficulty::Easy]).len();
    assert_eq!(n, expected);
    for _ in 0..n {
      let q = s.current_question().unwrap();
      assert_eq!((q.category, q.difficulty), (Category::Alkene, Difficulty::Easy));
      s.advance().unwrap();
    }
    assert_eq!(s.phase(), Phase::Completed);
  }

  #[test]
  fn cannot_configure_twice() {
    let mut s = started(3);
    let err = s.configure(&bank(), QuizConfig::default()).unwrap_err();
    assert!(matches!(err, SessionError::WrongPhase { expected: Phase::Configuring, actual: Phase::InProgress }));
  }

  #[test]
  fn three_of_five_end_to_end() {
    let mut s = started(5);
    assert_eq!(s.total(), 5);
    for i in 0..5 {
      let names = s.current_question().unwrap().names.clone();
      let answer = if i < 3 { names[0].to_uppercase() } else { "definitely wrong".to_string() };
      let r = s.submit_answer(&answer).unwrap();
      assert_eq!(r.correct, i < 3);
      assert!(s.score() <= s.answered());
      let phase = s.advance().unwrap();
      if i < 4 {
        assert_eq!(phase, Phase::InProgress);
      }
    }
    assert_eq!(s.phase(), Phase::Completed);
    let summary = s.summary().unwrap();
    assert_eq!((summary.score, summary.total, summary.answered), (3, 5, 5));
    assert!((summary.percentage - 60.0).abs() < 1e-9);
    assert_eq!(summary.tier, Tier::GoodEffort);
  }

  #[test]
  fn resubmission_does_not_double_count() {
    let mut s = started(2);
    let name = s.current_question().unwrap().preferred_name().to_string();
    let first = s.submit_answer(&name).unwrap();
    let again = s.submit_answer(&name).unwrap();
    let different = s.submit_answer("nonsense").unwrap();
    assert_eq!(first, again);
    assert_eq!(first, different);
    assert_eq!(s.score(), 1);
  }

  #[test]
  fn completed_rejects_mutation() {
    let mut s = started(1);
    s.advance().unwrap();
    assert_eq!(s.phase(), Phase::Completed);
    assert!(matches!(s.submit_answer("methane"), Err(SessionError::WrongPhase { .. })));
    assert!(matches!(s.advance(), Err(SessionError::WrongPhase { .. })));
    assert_eq!(s.summary().unwrap().answered, 0);
    assert_eq!(s.summary().unwrap().tier, Tier::NeedsPractice);
  }

  #[test]
  fn summary_only_when_completed() {
    let s = started(2);
    assert!(matches!(s.summary(), Err(SessionError::WrongPhase { expected: Phase::Completed, .. })));
  }

  #[test]
  fn skipped_question_cannot_be_answered() {
    let mut s = started(2);
    s.skip_current("bad descriptor").unwrap();
    assert_eq!(s.submit_answer("anything"), Err(SessionError::QuestionUnavailable(1)));
    assert_eq!(s.advance().unwrap(), Phase::InProgress);
    assert!(matches!(s.current_state().unwrap(), QuestionState::Unanswered));
  }

  #[test]
  fn progress_counts_from_one() {
    let mut s = started(2);
    assert_eq!(s.progress().question_number, 1);
    s.advance().unwrap();
    assert!(s.is_last());
    assert_eq!(s.progress().question_number, 2);
    s.advance().unwrap();
    assert_eq!(s.progress().question_number, 2);
    assert_eq!(s.progress().phase, Phase::Completed);
  }

  #[test]
  fn explanation_cache_keys_on_normalized_answer() {
    let mut s = started(1);
    let e = Explanation { source: ExplanationSource::Ai, text: "Step 1".into(), flagged_steps: vec![] };
    s.cache_explanation("alkane-01", "2-Methyl Propane", e.clone());
    assert_eq!(s.cached_explanation("alkane-01", "  2-methyl   propane "), Some(&e));
    assert_eq!(s.cached_explanation("alkane-02", "2-methyl propane"), None);
  }

  #[test]
  fn tiers_follow_thresholds() {
    assert_eq!(Tier::for_percentage(100.0), Tier::Perfect);
    assert_eq!(Tier::for_percentage(75.0), Tier::Great);
    assert_eq!(Tier::for_percentage(50.0), Tier::GoodEffort);
    assert_eq!(Tier::for_percentage(49.9), Tier::NeedsPractice);
  }
}
