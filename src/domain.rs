//! Domain models used by the backend: compound records, their tags, and the
//! closed set of structure views.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Functional-group family a compound is filed under.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Alkane,
  Alkene,
  Alkanol,
  Haloalkane,
  CarboxylicAcid,
  /// More than one functional group on the same chain.
  Mixed,
}

impl Category {
  pub fn label(self) -> &'static str {
    match self {
      Category::Alkane => "Alkane",
      Category::Alkene => "Alkene",
      Category::Alkanol => "Alkanol",
      Category::Haloalkane => "Haloalkane",
      Category::CarboxylicAcid => "Carboxylic Acid",
      Category::Mixed => "Mixed Functional Groups",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  /// Older catalogs call the top tier "difficult".
  #[serde(alias = "difficult")]
  Hard,
}

impl Difficulty {
  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// How the structure of a compound is shown to the student.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
  /// Line-angle drawing, carbons implicit.
  #[default]
  Skeletal,
  /// Every atom and bond drawn, hydrogens included.
  Full,
  /// Text-only condensed formula.
  Condensed,
}

impl ViewKind {
  pub const ALL: [ViewKind; 3] = [ViewKind::Skeletal, ViewKind::Full, ViewKind::Condensed];

  pub fn label(self) -> &'static str {
    match self {
      ViewKind::Skeletal => "Skeletal Structure",
      ViewKind::Full => "Full Structure",
      ViewKind::Condensed => "Condensed Formula",
    }
  }
}

/// A wrong name that deserves hand-written feedback instead of an AI call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommonError {
  pub incorrect_name: String,
  pub explanation: String,
}

/// One entry of the question bank. Immutable once the bank is built.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Compound {
  pub id: String,
  /// Structure descriptor (acyclic SMILES).
  pub smiles: String,
  /// Accepted names; the first one is the preferred IUPAC name.
  pub names: Vec<String>,
  #[serde(default)]
  pub condensed: Option<String>,
  pub category: Category,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub common_errors: Vec<CommonError>,
}

impl Compound {
  /// Preferred IUPAC name.
  pub fn preferred_name(&self) -> &str {
    self.names.first().map(String::as_str).unwrap_or_default()
  }

  /// Accepted names other than the preferred one.
  pub fn alternative_names(&self) -> &[String] {
    self.names.get(1..).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_accepts_legacy_label() {
    let d: Difficulty = serde_json::from_str("\"difficult\"").unwrap();
    assert_eq!(d, Difficulty::Hard);
  }

  #[test]
  fn view_kind_is_snake_case_and_defaults_to_skeletal() {
    let v: ViewKind = serde_json::from_str("\"condensed\"").unwrap();
    assert_eq!(v, ViewKind::Condensed);
    assert_eq!(ViewKind::default(), ViewKind::Skeletal);
    assert!(serde_json::from_str::<ViewKind>("\"ball_and_stick\"").is_err());
  }

  #[test]
  fn preferred_and_alternative_names() {
    let c = Compound {
      id: "x".into(),
      smiles: "CC(O)C".into(),
      names: vec!["propan-2-ol".into(), "2-propanol".into()],
      condensed: None,
      category: Category::Alkanol,
      difficulty: Difficulty::Medium,
      common_errors: vec![],
    };
    assert_eq!(c.preferred_name(), "propan-2-ol");
    assert_eq!(c.alternative_names(), ["2-propanol".to_string()]);
  }
}
