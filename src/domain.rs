//! Domain models: skills, proficiency bands, task-bank items, assessment
//! scores, plan context and the generated plan itself.

use serde::{Deserialize, Serialize};

/// The six skill categories every task and sub-score belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
  Vocab,
  Listening,
  Reading,
  Grammar,
  Writing,
  Speaking,
}

impl Skill {
  /// Fixed default iteration order used when merging prioritized skills.
  pub const DEFAULT_ORDER: [Skill; 6] = [
    Skill::Vocab,
    Skill::Listening,
    Skill::Reading,
    Skill::Grammar,
    Skill::Writing,
    Skill::Speaking,
  ];

  /// Student-facing English label, also the prefix of bank task titles.
  pub fn label(self) -> &'static str {
    match self {
      Skill::Vocab => "Vocabulary",
      Skill::Listening => "Listening",
      Skill::Reading => "Reading",
      Skill::Grammar => "Grammar",
      Skill::Writing => "Writing",
      Skill::Speaking => "Speaking",
    }
  }
}

impl std::str::FromStr for Skill {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "vocab" | "vocabulary" => Ok(Skill::Vocab),
      "listening" => Ok(Skill::Listening),
      "reading" => Ok(Skill::Reading),
      "grammar" => Ok(Skill::Grammar),
      "writing" => Ok(Skill::Writing),
      "speaking" => Ok(Skill::Speaking),
      _ => Err(()),
    }
  }
}

/// CEFR-like proficiency band, ordered A1 < A2 < B1 < B2 < C1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
  A1,
  A2,
  B1,
  B2,
  C1,
}

impl Band {
  /// The next band up, if any (C1 is the ceiling).
  pub fn one_up(self) -> Option<Band> {
    match self {
      Band::A1 => Some(Band::A2),
      Band::A2 => Some(Band::B1),
      Band::B1 => Some(Band::B2),
      Band::B2 => Some(Band::C1),
      Band::C1 => None,
    }
  }
}

impl std::str::FromStr for Band {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A1" => Ok(Band::A1),
      "A2" => Ok(Band::A2),
      "B1" => Ok(Band::B1),
      "B2" => Ok(Band::B2),
      "C1" => Ok(Band::C1),
      _ => Err(()),
    }
  }
}

/// One entry of the static task catalogue. The bank is read-only: built
/// once at startup (config + built-ins) and injected into the generator,
/// never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskBankItem {
  pub id: String,
  pub skill: Skill,
  pub level: Band,
  pub minutes: u32,
  pub label: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subskill: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
}

/// Percentile-like sub-scores (0..100) produced by the assessment step.
/// Missing fields default to 50 so a partial score still yields a plan.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SubScores {
  #[serde(default = "mid_pct")]
  pub reading: f64,
  #[serde(default = "mid_pct")]
  pub listening: f64,
  #[serde(default = "mid_pct")]
  pub grammar: f64,
  #[serde(default = "mid_pct")]
  pub vocab: f64,
  #[serde(default = "mid_pct")]
  pub writing: f64,
}

fn mid_pct() -> f64 {
  50.0
}

impl Default for SubScores {
  fn default() -> Self {
    Self { reading: 50.0, listening: 50.0, grammar: 50.0, vocab: 50.0, writing: 50.0 }
  }
}

/// Assessment result consumed read-only by the plan generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Score {
  pub band: Band,
  #[serde(default)]
  pub subs: SubScores,
  #[serde(default, rename = "overallPct")]
  pub overall_pct: Option<f64>,
}

/// Scheduling context collected during onboarding. Every field is optional;
/// missing or malformed values fall back to deterministic defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanContext {
  #[serde(default)]
  pub target_score: Option<f64>,
  /// ISO date, e.g. "2026-11-01", or a full RFC 3339 timestamp.
  #[serde(default)]
  pub target_deadline: Option<String>,
  /// JSON array of weekday indices, 0=Sun..6=Sat, e.g. "[1,3,5]".
  #[serde(default)]
  pub study_days_json: Option<String>,
  #[serde(default)]
  pub first_language: Option<String>,
  /// 'yes' | 'no'
  #[serde(default)]
  pub plan_native_language: Option<String>,
}

impl PlanContext {
  pub fn wants_native(&self) -> bool {
    self.plan_native_language.as_deref() == Some("yes") && self.first_language.is_some()
  }
}

/// A single study activity on the calendar.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTask {
  pub title: String,
  pub minutes: u32,
}

/// One calendar day (day = 1..=7, 1=Sun). `tasks` is empty on excluded
/// weekdays.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDay {
  pub day: u8,
  pub tasks: Vec<PlanTask>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanWeek {
  pub week: u32,
  pub days: Vec<PlanDay>,
}

/// Computed figures attached to the plan for downstream display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
  pub current_level: Band,
  #[serde(rename = "currentApproxIELTS")]
  pub current_approx_ielts: f64,
  #[serde(rename = "targetIELTS")]
  pub target_ielts: f64,
  pub daily_minutes: u32,
  pub estimated_months: u32,
  pub rationale: String,
  pub target_deadline: Option<String>,
  #[serde(rename = "startDateISO")]
  pub start_date_iso: String,
  pub first_language: Option<String>,
  pub plan_native_language: Option<String>,
  pub study_days: Vec<u32>,
}

/// The generated multi-week study plan. Constructed fresh on every call,
/// never mutated after return; persistence belongs to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub duration_weeks: u32,
  pub weekly: Vec<PlanWeek>,
  pub highlights: Vec<String>,
  pub quick_wins: Vec<String>,
  pub meta: PlanMeta,
}
