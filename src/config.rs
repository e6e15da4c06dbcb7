//! Loading plan configuration (AI prompts + optional custom task bank)
//! from TOML.
//!
//! See `PlanConfig` and `PlanPrompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Band, Skill};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PlanConfig {
  #[serde(default)]
  pub prompts: PlanPrompts,
  #[serde(default)]
  pub tasks: Vec<TaskCfg>,
}

/// Task-bank entry accepted in TOML configuration. Entries with an id that
/// matches a built-in replace it; others extend the bank.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskCfg {
  #[serde(default)]
  pub id: Option<String>,
  pub skill: Skill,
  pub level: Band,
  pub minutes: u32,
  pub label: String,
  #[serde(default)]
  pub subskill: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
}

/// Prompts used by the AI plan provider. Defaults are sensible for exam
/// coaching; override them in TOML to tune tone or structure.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanPrompts {
  pub plan_system: String,
  pub plan_user_template: String,
}

impl Default for PlanPrompts {
  fn default() -> Self {
    Self {
      plan_system: "You are an IELTS coach. Create a concise, practical study plan.\n\n\
LANGUAGE POLICY (STRICT):\n\
- If firstLanguage != \"en\": write ALL content in the student's first language (task titles and lists).\n\
- If firstLanguage == \"en\": English only.\n\n\
PLANNING RULES:\n\
- 3-5 tasks per study day, total ~minutesPerDay.\n\
- Prioritize weak areas first.\n\
- Respect selected study days (leave other days empty)."
        .into(),
      plan_user_template: "Create IELTS study plan:\n\
Target: {target} | Deadline: {deadline} | Daily: {daily}min | Days: {days} | Lang: {lang} | Bilingual: {bilingual} | Weak: {weak}\n\n\
Rules: Empty tasks on non-study days. 3-5 tasks/day totaling ~{daily}min. Prioritize weak areas first. \
12 weeks default or match deadline. Keep IELTS terms in English. {schema}"
        .into(),
    }
  }
}

/// Attempt to load `PlanConfig` from PLAN_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in defaults apply.
pub fn load_plan_config_from_env() -> Option<PlanConfig> {
  let path = std::env::var("PLAN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<PlanConfig>(&s) {
      Ok(cfg) => {
        info!(target: "bandplan_backend", %path, "Loaded plan config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bandplan_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bandplan_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_entries_parse_from_toml() {
    let cfg: PlanConfig = toml::from_str(
      r#"
        [[tasks]]
        skill = "vocab"
        level = "B2"
        minutes = 25
        label = "Vocabulary: 15 phrasal verbs in context"
        tags = ["lexis"]
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.tasks.len(), 1);
    assert_eq!(cfg.tasks[0].skill, Skill::Vocab);
    assert_eq!(cfg.tasks[0].level, Band::B2);
    assert!(cfg.tasks[0].id.is_none());
    // Prompts fall back to defaults when absent.
    assert!(cfg.prompts.plan_system.contains("IELTS coach"));
  }
}
