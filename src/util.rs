//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values in a
/// single left-to-right pass, so placeholder text inside a value is kept as is.
/// Unknown keys are left untouched.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let value = after
      .find('}')
      .and_then(|close| pairs.iter().find(|(k, _)| *k == &after[..close]).map(|(_, v)| (close, *v)));
    match value {
      Some((close, v)) => {
        out.push_str(v);
        rest = &after[close + 1..];
      }
      None => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_every_occurrence() {
    assert_eq!(fill_template("{a} and {a} or {b}", &[("a", "x"), ("b", "y")]), "x and x or y");
    assert_eq!(fill_template("{missing}", &[("a", "x")]), "{missing}");
    assert_eq!(fill_template("{{a}}", &[("a", "x")]), "{x}");
  }

  #[test]
  fn values_are_not_expanded_again() {
    let out = fill_template("{a} / {b}", &[("a", "{b}"), ("b", "y")]);
    assert_eq!(out, "{b} / y");
  }

  #[test]
  fn truncates_on_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert_eq!(trunc_for_log("✅✅✅", 1), "✅… (9 bytes total)");
  }
}
