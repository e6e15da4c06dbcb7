//! Application state: the assembled task bank, plan prompts, and optional
//! AI client.
//!
//! The bank is assembled once at startup (config entries merged over the
//! built-ins) and shared read-only; plan generation never mutates state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::ai::AiClient;
use crate::bank::builtin_task_bank;
use crate::config::{load_plan_config_from_env, PlanPrompts, TaskCfg};
use crate::domain::{Plan, PlanContext, Score, TaskBankItem};
use crate::plan;
use crate::protocol::PlanMode;

#[derive(Clone)]
pub struct AppState {
  pub bank: Arc<Vec<TaskBankItem>>,
  pub prompts: PlanPrompts,
  pub ai: Option<AiClient>,
}

impl AppState {
  /// Build state from env: load config, assemble the task bank, init the
  /// AI client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg_opt = load_plan_config_from_env();
    let prompts = cfg_opt
      .as_ref()
      .map(|c| c.prompts.clone())
      .unwrap_or_default();

    let cfg_tasks = cfg_opt.map(|c| c.tasks).unwrap_or_default();
    let bank = assemble_bank(&cfg_tasks);

    // Inventory summary by skill.
    let mut count_by_skill: HashMap<&'static str, usize> = HashMap::new();
    for item in &bank {
      *count_by_skill.entry(plan::skill_wire_name(item.skill)).or_insert(0) += 1;
    }
    for (skill, count) in count_by_skill {
      info!(target: "plan", %skill, count, "Startup task bank inventory");
    }

    let ai = AiClient::from_env();
    if ai.is_some() {
      info!(target: "bandplan_backend", "AI plan provider enabled.");
    } else {
      info!(target: "bandplan_backend", "AI plan provider disabled (no DEEPSEEK_API_KEY / GEMINI_API_KEY). Template generator only.");
    }

    Self { bank: Arc::new(bank), prompts, ai }
  }

  /// Selection policy: the AI provider when requested and available,
  /// otherwise (or on any provider failure) the deterministic template
  /// generator.
  #[instrument(level = "info", skip(self, score, ctx), fields(%goal, ?mode))]
  pub async fn choose_plan(
    &self,
    score: &Score,
    goal: &str,
    ctx: &PlanContext,
    mode: PlanMode,
  ) -> (Plan, &'static str) {
    let now = Utc::now();

    if mode == PlanMode::Ai {
      if let Some(ai) = &self.ai {
        match ai.generate_plan(&self.prompts, score, goal, ctx, now).await {
          Ok(p) => {
            info!(target: "plan", weeks = p.duration_weeks, source = "ai_generated", "Generated AI plan");
            return (p, "ai_generated");
          }
          Err(e) => {
            error!(target: "plan", error = %e, "AI plan generation failed; using template fallback");
          }
        }
      } else {
        warn!(target: "plan", "AI plan requested but no provider configured; using template fallback");
      }
      let p = plan::generate_template_plan(&self.bank, score, goal, ctx, now);
      return (p, "template_fallback");
    }

    let p = plan::generate_template_plan(&self.bank, score, goal, ctx, now);
    (p, "template")
  }
}

/// Merge config task entries over the built-in bank. An entry whose id
/// matches a built-in replaces it in place; new ids append in config order,
/// so selection stays deterministic run to run.
fn assemble_bank(cfg_tasks: &[TaskCfg]) -> Vec<TaskBankItem> {
  let mut bank = builtin_task_bank();
  let mut index: HashMap<String, usize> =
    bank.iter().enumerate().map(|(i, t)| (t.id.clone(), i)).collect();

  for (i, cc) in cfg_tasks.iter().enumerate() {
    if cc.minutes == 0 || cc.label.trim().is_empty() {
      error!(target: "plan", position = i, "Skipping bank item: empty label or zero minutes.");
      continue;
    }
    let id = cc.id.clone().unwrap_or_else(|| format!("cfg-{i}"));
    let item = TaskBankItem {
      id: id.clone(),
      skill: cc.skill,
      level: cc.level,
      minutes: cc.minutes,
      label: cc.label.clone(),
      subskill: cc.subskill.clone(),
      tags: cc.tags.clone(),
    };
    match index.get(&id) {
      Some(&pos) => bank[pos] = item,
      None => {
        index.insert(id, bank.len());
        bank.push(item);
      }
    }
  }

  bank
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Band, Skill};

  fn cfg(id: Option<&str>, minutes: u32, label: &str) -> TaskCfg {
    TaskCfg {
      id: id.map(str::to_string),
      skill: Skill::Vocab,
      level: Band::B1,
      minutes,
      label: label.to_string(),
      subskill: None,
      tags: Vec::new(),
    }
  }

  #[test]
  fn config_entries_replace_builtins_by_id_and_append_otherwise() {
    let builtin = builtin_task_bank();
    let first_id = builtin[0].id.clone();

    let tasks = vec![
      cfg(Some(&first_id), 42, "Replaced entry"),
      cfg(Some("extra-1"), 20, "Appended entry"),
    ];
    let bank = assemble_bank(&tasks);

    assert_eq!(bank.len(), builtin.len() + 1);
    assert_eq!(bank[0].label, "Replaced entry");
    assert_eq!(bank[0].minutes, 42);
    assert_eq!(bank.last().unwrap().id, "extra-1");
  }

  #[test]
  fn invalid_config_entries_are_skipped() {
    let builtin_len = builtin_task_bank().len();
    let tasks = vec![cfg(None, 0, "Zero minutes"), cfg(None, 15, "  ")];
    let bank = assemble_bank(&tasks);
    assert_eq!(bank.len(), builtin_len);
  }

  #[test]
  fn anonymous_entries_get_positional_ids() {
    let tasks = vec![cfg(None, 15, "Anon")];
    let bank = assemble_bank(&tasks);
    assert_eq!(bank.last().unwrap().id, "cfg-0");
  }
}
