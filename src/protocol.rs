//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Band, Plan, Score, Skill, TaskBankItem};

/// Which generator to use for a plan request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
  #[default]
  Template,
  Ai,
}

/// POST /api/v1/plan request body.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
  pub score: Score,
  /// Exam goal, e.g. "ielts". Unknown goals still get a plan, targeted one
  /// band up from the current approximation.
  #[serde(default = "default_goal")]
  pub goal: String,
  #[serde(default)]
  pub context: crate::domain::PlanContext,
  #[serde(default)]
  pub mode: PlanMode,
}

fn default_goal() -> String {
  "ielts".into()
}

/// POST /api/v1/plan response body.
#[derive(Debug, Serialize)]
pub struct PlanOut {
  pub plan: Plan,
  /// Which generator produced the plan: "template", "ai_generated", or
  /// "template_fallback".
  pub origin: &'static str,
}

/// GET /api/v1/bank query string. "all"/"any" act as wildcards so the
/// frontend can always send both parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BankQuery {
  #[serde(default)]
  pub skill: Option<String>,
  #[serde(default)]
  pub level: Option<String>,
  #[serde(default)]
  pub q: Option<String>,
}

impl BankQuery {
  pub fn skill_filter(&self) -> Option<Skill> {
    self.skill.as_deref().and_then(|s| s.parse().ok())
  }

  pub fn level_filter(&self) -> Option<Band> {
    self.level.as_deref().and_then(|s| s.parse().ok())
  }

  pub fn query(&self) -> &str {
    self.q.as_deref().unwrap_or("").trim()
  }
}

/// GET /api/v1/bank response body.
#[derive(Debug, Serialize)]
pub struct BankOut {
  pub tasks: Vec<TaskBankItem>,
  pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Band;

  #[test]
  fn plan_request_defaults_goal_context_and_mode() {
    let req: PlanRequest =
      serde_json::from_str(r#"{"score": {"band": "B1"}}"#).expect("parse");
    assert_eq!(req.goal, "ielts");
    assert_eq!(req.mode, PlanMode::Template);
    assert!(req.context.target_score.is_none());
    assert_eq!(req.score.subs.reading, 50.0);
  }

  #[test]
  fn plan_mode_parses_snake_case() {
    let req: PlanRequest =
      serde_json::from_str(r#"{"score": {"band": "A2"}, "mode": "ai"}"#).expect("parse");
    assert_eq!(req.mode, PlanMode::Ai);
  }

  #[test]
  fn bank_query_wildcards_mean_no_filter() {
    let q = BankQuery {
      skill: Some("all".into()),
      level: Some("any".into()),
      q: Some("  maps ".into()),
    };
    assert!(q.skill_filter().is_none());
    assert!(q.level_filter().is_none());
    assert_eq!(q.query(), "maps");

    let q = BankQuery { skill: Some("reading".into()), level: Some("b2".into()), q: None };
    assert_eq!(q.skill_filter(), Some(Skill::Reading));
    assert_eq!(q.level_filter(), Some(Band::B2));
  }
}
