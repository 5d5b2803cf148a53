//! Answer matching: normalize a typed IUPAC name and compare it against the
//! accepted variants of a compound.
//!
//! Matching is exact after normalization. There is no fuzzy or partial
//! matching and no stereochemistry inference.

/// Bring a name into canonical form:
/// lowercase, trimmed, single spaces, typographic dashes folded to `-`,
/// and no whitespace around `,` or `-` (so "2, 2 - dimethyl" == "2,2-dimethyl").
pub fn normalize(name: &str) -> String {
  let lowered = name.to_lowercase();
  let mut out = String::with_capacity(lowered.len());
  let mut pending_space = false;

  for ch in lowered.chars() {
    let ch = match ch {
      '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
      other => other,
    };

    if ch.is_whitespace() {
      pending_space = !out.is_empty();
      continue;
    }

    if is_locant_punct(ch) {
      // Drop any space that preceded the punctuation, and any that follows.
      pending_space = false;
      out.push(ch);
      continue;
    }

    if pending_space && !out.ends_with(is_locant_punct) {
      out.push(' ');
    }
    pending_space = false;
    out.push(ch);
  }

  out
}

fn is_locant_punct(ch: char) -> bool {
  ch == ',' || ch == '-'
}

/// True if `input` names the same thing as any of `accepted` after
/// normalization. Empty input never matches.
pub fn matches<S: AsRef<str>>(input: &str, accepted: &[S]) -> bool {
  matched_variant(input, accepted).is_some()
}

/// Like [`matches`], but returns the accepted variant that matched.
pub fn matched_variant<'a, S: AsRef<str>>(input: &str, accepted: &'a [S]) -> Option<&'a str> {
  let needle = normalize(input);
  if needle.is_empty() {
    return None;
  }
  accepted
    .iter()
    .map(AsRef::as_ref)
    .find(|name| normalize(name) == needle)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_compounds;

  #[test]
  fn every_accepted_name_matches_itself() {
    for c in seed_compounds() {
      for name in &c.names {
        assert!(matches(name, &c.names), "{} should match its own variants", name);
      }
    }
  }

  #[test]
  fn case_insensitive() {
    assert!(matches("Methane", &["methane"]));
    assert!(matches("ETHANOIC ACID", &["ethanoic acid"]));
  }

  #[test]
  fn punctuation_spacing_is_normalized() {
    assert!(matches("2, 2 -dimethylpropane", &["2,2-dimethylpropane"]));
    assert!(matches("2 , 2 - dimethylpropane", &["2,2-dimethylpropane"]));
    assert!(matches("but\u{2013}2\u{2013}ene", &["but-2-ene"]));
  }

  #[test]
  fn whitespace_is_trimmed_and_collapsed() {
    assert_eq!(normalize("   Propanoic \t   Acid  "), "propanoic acid");
    assert!(matches("  propanoic    acid ", &["propanoic acid"]));
  }

  #[test]
  fn word_boundaries_still_matter() {
    // Collapsing is not removal: a missing space is a different name.
    assert!(!matches("propanoicacid", &["propanoic acid"]));
  }

  #[test]
  fn rejects_unrelated_and_empty() {
    assert!(!matches("ethanol", &["methanol"]));
    assert!(!matches("", &["methanol"]));
    assert!(!matches("   ", &["methanol"]));
    assert!(!matches("methan", &["methanol"]));
  }

  #[test]
  fn reports_matched_alternative() {
    let names = ["propan-2-ol", "2-propanol"];
    assert_eq!(matched_variant("2-Propanol", &names), Some("2-propanol"));
    assert_eq!(matched_variant("propan-1-ol", &names), None);
  }
}
