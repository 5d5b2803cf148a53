//! Question bank: the immutable compound catalog plus filtering and
//! validation over it.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::{Category, Compound, Difficulty};
use crate::smiles;

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  compounds: Vec<Compound>,
}

/// One malformed catalog entry.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct InvalidEntry {
  pub id: String,
  pub smiles: String,
  pub name: String,
  pub error: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ValidationReport {
  pub checked: usize,
  pub invalid: Vec<InvalidEntry>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.invalid.is_empty()
  }
}

impl QuestionBank {
  pub fn new(compounds: Vec<Compound>) -> Self {
    Self { compounds }
  }

  /// Merge `extra` over `base`: an extra entry with an existing id replaces it
  /// in place, new ids are appended.
  pub fn merged(base: Vec<Compound>, extra: Vec<Compound>) -> Self {
    let mut compounds = base;
    for c in extra {
      match compounds.iter_mut().find(|e| e.id == c.id) {
        Some(slot) => *slot = c,
        None => compounds.push(c),
      }
    }
    Self { compounds }
  }

  pub fn len(&self) -> usize {
    self.compounds.len()
  }

  pub fn is_empty(&self) -> bool {
    self.compounds.is_empty()
  }

  pub fn all(&self) -> &[Compound] {
    &self.compounds
  }

  /// Compounds whose category is in `categories` and whose difficulty is in
  /// `difficulties`. An empty set does not filter on that axis.
  pub fn filter(&self, categories: &[Category], difficulties: &[Difficulty]) -> Vec<&Compound> {
    self
      .compounds
      .iter()
      .filter(|c| categories.is_empty() || categories.contains(&c.category))
      .filter(|c| difficulties.is_empty() || difficulties.contains(&c.difficulty))
      .collect()
  }

  /// Categories and difficulties in order of first appearance.
  pub fn options(&self) -> (Vec<Category>, Vec<Difficulty>) {
    let mut cats = Vec::new();
    let mut diffs = Vec::new();
    for c in &self.compounds {
      if !cats.contains(&c.category) {
        cats.push(c.category);
      }
      if !diffs.contains(&c.difficulty) {
        diffs.push(c.difficulty);
      }
    }
    (cats, diffs)
  }

  /// Parse every descriptor and report the ones that cannot be drawn.
  pub fn validate(&self) -> ValidationReport {
    let mut seen = HashSet::new();
    let invalid = self
      .compounds
      .iter()
      .filter_map(|c| {
        entry_problem(c, &mut seen).map(|error| InvalidEntry {
          id: c.id.clone(),
          smiles: c.smiles.clone(),
          name: c.preferred_name().to_string(),
          error,
        })
      })
      .collect();
    ValidationReport { checked: self.compounds.len(), invalid }
  }

  /// Drop entries that fail validation, logging each one.
  #[instrument(level = "info", skip(self), fields(total = self.compounds.len()))]
  pub fn into_validated(self) -> Self {
    let total = self.compounds.len();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(total);
    for c in self.compounds {
      match entry_problem(&c, &mut seen) {
        None => kept.push(c),
        Some(problem) => {
          error!(target: "quiz", id = %c.id, smiles = %c.smiles, error = %problem, "Excluding invalid compound from the bank");
        }
      }
    }
    info!(target: "quiz", checked = total, kept = kept.len(), "Question bank validated");
    Self { compounds: kept }
  }
}

/// Why `c` cannot be served, if anything. Records the id in `seen`; only the
/// first entry with a given id is valid.
fn entry_problem(c: &Compound, seen: &mut HashSet<String>) -> Option<String> {
  if !seen.insert(c.id.clone()) {
    return Some(format!("duplicate id '{}'", c.id));
  }
  if c.names.iter().all(|n| n.trim().is_empty()) {
    return Some("no accepted names".to_string());
  }
  smiles::parse(&c.smiles).err().map(|e| e.to_string())
}
