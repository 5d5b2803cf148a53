//! Loading agent configuration (prompts + optional extra compounds) from TOML,
//! plus the few scalar settings read straight from the environment.
//!
//! Expected TOML shape:
//!
//! ```toml
//! [prompts]
//! explanation_system = "..."
//! explanation_user_template = "... {student_answer} ... {correct_name} ..."
//!
//! [[compounds]]
//! id = "custom-01"
//! smiles = "CCCCCCCCC"
//! names = ["nonane"]
//! condensed = "CH3(CH2)7CH3"
//! category = "alkane"
//! difficulty = "hard"
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Compound;

pub const DEFAULT_EXPLANATION_TIMEOUT: Duration = Duration::from_secs(10);
/// Idle time after which an HTTP quiz session is dropped from the store.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub compounds: Vec<Compound>,
}

/// Prompts used by the explanation client. Any field left out of the TOML
/// keeps its default.
///
/// Template placeholders: `{student_answer}`, `{correct_name}`,
/// `{alternatives}`, `{smiles}`, `{condensed}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub explanation_system: String,
  pub explanation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      explanation_system: "You are an expert chemistry tutor evaluating a student's IUPAC nomenclature attempt for an organic compound. Address the student as \"you\".".into(),
      explanation_user_template: r#"The student's answer is: "{student_answer}"
The correct preferred IUPAC name is: "{correct_name}"
Other accepted names: {alternatives}
Structure (SMILES): {smiles}
Condensed formula: {condensed}

Give a one-sentence general comment first. Then break down, step by step, how to name this compound correctly, and for each step say whether the student's answer reflects understanding of that step. Use exactly this format for every step:
- "Step X: [description of the nomenclature step] [✅ if the student got it right, ❌ if not]"
- "Comment: [if ❌, one concise sentence on what the student likely did wrong in THIS step, referring to their answer and the correct name; if ✅ leave blank]"

Adapt these common steps to the molecule:
1. Identify the principal functional group.
2. Identify the longest continuous carbon chain.
3. Number the parent chain to give the principal functional group the lowest possible number.
4. Identify all substituents (alkyl groups, halogens, etc.) attached to the parent chain.
5. Name and number each substituent.
6. Assemble the name in the correct order.
7. Check for special cases such as redundant locants.

Be specific, referring to parts of the student's answer and the correct name."#
        .into(),
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "nomenquiz", %path, compounds = cfg.compounds.len(), "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "nomenquiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "nomenquiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// EXPLANATION_TIMEOUT_SECS, falling back to the default on absence or garbage.
pub fn explanation_timeout_from_env() -> Duration {
  secs_from_env("EXPLANATION_TIMEOUT_SECS", DEFAULT_EXPLANATION_TIMEOUT)
}

/// SESSION_TTL_SECS, same fallback rules.
pub fn session_ttl_from_env() -> Duration {
  secs_from_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL)
}

fn secs_from_env(var: &str, default: Duration) -> Duration {
  match std::env::var(var) {
    Ok(raw) => parse_timeout_secs(&raw).unwrap_or_else(|| {
      warn!(target: "nomenquiz", var, value = %raw, "Ignoring invalid duration");
      default
    }),
    Err(_) => default,
  }
}

fn parse_timeout_secs(raw: &str) -> Option<Duration> {
  raw.trim().parse::<u64>().ok().filter(|s| *s > 0).map(Duration::from_secs)
}
