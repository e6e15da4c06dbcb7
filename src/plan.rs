//! Deterministic study-plan generation.
//!
//! Flow:
//! 1) Translate the aggregate percentile into an approximate IELTS value.
//! 2) Resolve target score and available weeks (deadline or 12-week default).
//! 3) Compute the daily minutes needed to close the band gap.
//! 4) Fill a week-by-week calendar with seeded, reproducible task picks.
//! 5) Compose highlights/quick wins and localize when requested.
//!
//! The whole module is pure and total: malformed dates, missing scores and
//! empty task pools all degrade to fixed defaults rather than erroring.
//! Randomness is seeded by day position, never wall-clock time.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
  Band, Plan, PlanContext, PlanDay, PlanMeta, PlanTask, PlanWeek, Score, Skill, TaskBankItem,
};
use crate::locale;
use crate::rng::Mulberry32;

/// Base seed for daily task selection, XOR'd with `day_index + 1`.
const DAY_SEED: u32 = 0x9E37_79B9;

/// From this zero-based day on, tasks one band above the learner's own
/// become eligible.
const LEVEL_UP_DAY: u32 = 14;

/// Baseline effort model: one half-band step takes 4 weeks at 60 min/day.
const MINUTES_PER_HALF_BAND: u32 = 4 * 7 * 60;

const MIN_DAILY_MINUTES: u32 = 30;
const MAX_DAILY_MINUTES: u32 = 180;

pub const DEFAULT_WEEKS: u32 = 12;
pub const MAX_WEEKS: u32 = 26;

const FALLBACK_TASK_TITLE: &str = "Review: flashcards & error log";
const FALLBACK_TASK_MINUTES: u32 = 10;

/// Map an aggregate percentile-like score onto the IELTS-ish scale.
/// Total over all numeric input; out-of-range values land in the last arm.
pub fn ielts_from_pct(pct: f64) -> f64 {
  if pct < 25.0 {
    3.5
  } else if pct < 40.0 {
    4.5
  } else if pct < 56.0 {
    5.5
  } else if pct < 70.0 {
    6.5
  } else if pct < 86.0 {
    7.5
  } else {
    8.0
  }
}

/// Daily study minutes needed to close the gap within `weeks_available`.
/// Linear proportionality model, not a calibrated pedagogical formula; the
/// constants are policy and must stay put for plan stability.
pub fn required_daily_minutes(current_approx: f64, target: f64, weeks_available: u32) -> u32 {
  let half_band_steps = ((target - current_approx) * 2.0).ceil().max(0.0) as u32;
  if half_band_steps == 0 {
    return MIN_DAILY_MINUTES; // maintain
  }
  let total_minutes = half_band_steps * MINUTES_PER_HALF_BAND;
  let minutes_per_week = f64::from(total_minutes) / f64::from(weeks_available.max(1));
  let per_day = (minutes_per_week / 7.0).ceil() as u32;
  per_day.clamp(MIN_DAILY_MINUTES, MAX_DAILY_MINUTES)
}

/// Pick 3..=5 tasks for one day. Deterministic in `day_index`: the PRNG is
/// seeded from the day position only, so the same day always produces the
/// same list. Empty pools degrade to the fallback review task.
pub fn build_daily_tasks(
  bank: &[TaskBankItem],
  band: Band,
  day_index: u32,
  minutes: u32,
  prioritized: &[Skill],
) -> Vec<PlanTask> {
  let mut rng = Mulberry32::new(DAY_SEED ^ (day_index + 1));
  let budget = minutes.max(45);

  // Own band always; one band up once the learner is two weeks in.
  let mut allowed = vec![band];
  if day_index >= LEVEL_UP_DAY {
    allowed.extend(band.one_up());
  }

  // Prioritized skills first (weakest-first, deduped), then the rest of
  // the default order.
  let mut order: Vec<Skill> = Vec::with_capacity(6);
  for s in prioritized.iter().chain(Skill::DEFAULT_ORDER.iter()) {
    if !order.contains(s) {
      order.push(*s);
    }
  }

  let pools: Vec<Vec<&TaskBankItem>> = order
    .iter()
    .map(|skill| {
      bank
        .iter()
        .filter(|t| t.skill == *skill && allowed.contains(&t.level))
        .collect()
    })
    .collect();

  let start = rng.pick_index(order.len());
  let mut tasks: Vec<PlanTask> = Vec::new();
  let mut used_titles: HashSet<&str> = HashSet::new();
  let mut time = 0u32;

  // Round-robin over skills from a seeded offset. Bounded so exhausted or
  // over-budget pools cannot loop forever.
  let max_rounds = order.len() * 5;
  for i in 0..max_rounds {
    if tasks.len() >= 5 {
      break;
    }
    let pool = &pools[(start + i) % order.len()];
    if pool.is_empty() {
      continue;
    }
    let candidate = pool[rng.pick_index(pool.len())];
    if used_titles.contains(candidate.label.as_str()) {
      continue;
    }
    if time + candidate.minutes > budget {
      continue;
    }
    used_titles.insert(candidate.label.as_str());
    time += candidate.minutes;
    tasks.push(PlanTask { title: candidate.label.clone(), minutes: candidate.minutes });
    if budget - time < 5 {
      break;
    }
  }

  while tasks.len() < 3 {
    tasks.push(PlanTask {
      title: FALLBACK_TASK_TITLE.to_string(),
      minutes: FALLBACK_TASK_MINUTES,
    });
  }
  tasks
}

/// Tolerant parse of the study-days JSON ("[1,3,5]", numbers or numeric
/// strings). Any failure means "no restriction": study every day.
pub fn parse_study_days(raw: Option<&str>) -> Vec<u32> {
  let Some(raw) = raw else { return Vec::new() };
  let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
    return Vec::new();
  };
  let Some(items) = value.as_array() else { return Vec::new() };
  items
    .iter()
    .filter_map(|v| {
      if let Some(n) = v.as_u64() {
        u32::try_from(n).ok()
      } else {
        v.as_str().and_then(|s| s.trim().parse::<u32>().ok())
      }
    })
    .collect()
}

fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Whole weeks between now and the deadline, rounded up, at least 1.
/// Unparseable deadlines return None and the caller keeps the default.
pub fn weeks_until(deadline: &str, now: DateTime<Utc>) -> Option<u32> {
  const WEEK_SECS: i64 = 7 * 24 * 60 * 60;
  let dt = parse_deadline(deadline)?;
  let secs = (dt - now).num_seconds();
  let weeks = (secs + WEEK_SECS - 1).div_euclid(WEEK_SECS);
  Some(weeks.max(1) as u32)
}

/// Rank the six skills weakest-first from the sub-scores. Speaking has no
/// sub-score and always trails; the merge in `build_daily_tasks` appends it
/// from the default order.
pub fn prioritize_skills(score: &Score) -> Vec<Skill> {
  let subs = &score.subs;
  let mut pairs: [(Skill, f64); 5] = [
    (Skill::Reading, subs.reading),
    (Skill::Listening, subs.listening),
    (Skill::Grammar, subs.grammar),
    (Skill::Vocab, subs.vocab),
    (Skill::Writing, subs.writing),
  ];
  pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
  pairs.iter().map(|(s, _)| *s).collect()
}

fn weakest_sub(score: &Score) -> (Skill, f64) {
  let subs = &score.subs;
  let pairs = [
    (Skill::Reading, subs.reading),
    (Skill::Listening, subs.listening),
    (Skill::Grammar, subs.grammar),
    (Skill::Vocab, subs.vocab),
    (Skill::Writing, subs.writing),
  ];
  pairs
    .into_iter()
    .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    .unwrap_or((Skill::Speaking, 50.0))
}

/// Generate the full study plan. Pure and total; `now` is injected so the
/// deadline math and start timestamp are testable.
pub fn generate_template_plan(
  bank: &[TaskBankItem],
  score: &Score,
  goal: &str,
  ctx: &PlanContext,
  now: DateTime<Utc>,
) -> Plan {
  let current_approx = ielts_from_pct(score.overall_pct.unwrap_or(50.0));
  let target = if goal.eq_ignore_ascii_case("ielts") {
    ctx.target_score.unwrap_or(7.0)
  } else {
    ctx.target_score.unwrap_or(current_approx + 1.0)
  };

  let mut duration_weeks = DEFAULT_WEEKS;
  if let Some(deadline) = ctx.target_deadline.as_deref() {
    if let Some(weeks) = weeks_until(deadline, now) {
      duration_weeks = weeks;
    }
  }
  // Pacing uses the uncapped window: a two-year deadline should relax the
  // daily load even though the rendered calendar stops at 26 weeks.
  let recommended_daily_minutes = required_daily_minutes(current_approx, target, duration_weeks);
  duration_weeks = duration_weeks.min(MAX_WEEKS);
  let estimated_months = ((f64::from(duration_weeks) / 4.0).round() as u32).max(1);

  let study_days = parse_study_days(ctx.study_days_json.as_deref());
  let prioritized = prioritize_skills(score);

  let weekly: Vec<PlanWeek> = (0..duration_weeks)
    .map(|wi| PlanWeek {
      week: wi + 1,
      days: (0..7u32)
        .map(|di| PlanDay {
          day: (di + 1) as u8,
          tasks: if study_days.is_empty() || study_days.contains(&di) {
            build_daily_tasks(bank, score.band, wi * 7 + di, recommended_daily_minutes, &prioritized)
          } else {
            Vec::new()
          },
        })
        .collect(),
    })
    .collect();

  let (weakest, weakest_pct) = weakest_sub(score);
  let study_days_text = if study_days.is_empty() {
    "daily".to_string()
  } else {
    format!("{} days/week", study_days.len())
  };
  let deadline_text = ctx
    .target_deadline
    .as_deref()
    .map(|d| {
      let shown = parse_deadline(d).map(|dt| dt.format("%Y-%m-%d").to_string());
      format!(" by {}", shown.unwrap_or_else(|| d.to_string()))
    })
    .unwrap_or_default();

  let tips = locale::language_specific_tips(ctx.first_language.as_deref());

  let mut highlights = vec![
    format!("Starting level: {:?} (≈ IELTS {:.1})", score.band, current_approx),
    format!("Target: IELTS {target:.1}{deadline_text}"),
    format!("Study plan: {recommended_daily_minutes} min/day, {study_days_text}"),
    format!("Priority focus: {} ({}%)", skill_wire_name(weakest), weakest_pct),
  ];
  highlights.extend(tips.highlights);

  let mut quick_wins = vec![
    format!("Practice {} for 15 min daily with immediate feedback", skill_wire_name(weakest)),
    "Record yourself speaking for 1 min daily, compare to model answers".to_string(),
    "Learn 10 collocations per day from your weak areas".to_string(),
  ];
  quick_wins.extend(tips.quick_wins);

  if ctx.wants_native() {
    if let Some(lang) = ctx.first_language.as_deref() {
      highlights.insert(
        0,
        format!("Note: Double-click any word during practice for {lang} translation"),
      );
    }
  }

  let mut plan = Plan {
    duration_weeks,
    weekly,
    highlights,
    quick_wins,
    meta: PlanMeta {
      current_level: score.band,
      current_approx_ielts: current_approx,
      target_ielts: target,
      daily_minutes: recommended_daily_minutes,
      estimated_months,
      rationale: format!(
        "Personalized for {} studying {study_days_text}, targeting {:.1} band improvement",
        ctx.first_language.as_deref().unwrap_or("English learner"),
        target - current_approx
      ),
      target_deadline: ctx.target_deadline.clone(),
      start_date_iso: now.to_rfc3339(),
      first_language: ctx.first_language.clone(),
      plan_native_language: ctx.plan_native_language.clone(),
      study_days,
    },
  };

  if ctx.wants_native() {
    if let Some(native) = ctx.first_language.as_deref().and_then(locale::native_language) {
      locale::localize_plan(&mut plan, native);
    }
  }

  plan
}

/// Wire-facing lowercase name of a skill ("vocab", "reading", ...).
pub fn skill_wire_name(skill: Skill) -> &'static str {
  match skill {
    Skill::Vocab => "vocab",
    Skill::Listening => "listening",
    Skill::Reading => "reading",
    Skill::Grammar => "grammar",
    Skill::Writing => "writing",
    Skill::Speaking => "speaking",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bank::builtin_task_bank;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
  }

  fn score_b1(overall: f64) -> Score {
    Score {
      band: Band::B1,
      subs: crate::domain::SubScores {
        reading: 40.0,
        listening: 55.0,
        grammar: 60.0,
        vocab: 45.0,
        writing: 50.0,
      },
      overall_pct: Some(overall),
    }
  }

  #[test]
  fn pct_translation_breakpoints() {
    assert_eq!(ielts_from_pct(0.0), 3.5);
    assert_eq!(ielts_from_pct(24.9), 3.5);
    assert_eq!(ielts_from_pct(25.0), 4.5);
    assert_eq!(ielts_from_pct(39.9), 4.5);
    assert_eq!(ielts_from_pct(40.0), 5.5);
    assert_eq!(ielts_from_pct(55.9), 5.5);
    assert_eq!(ielts_from_pct(56.0), 6.5);
    assert_eq!(ielts_from_pct(69.9), 6.5);
    assert_eq!(ielts_from_pct(70.0), 7.5);
    assert_eq!(ielts_from_pct(85.9), 7.5);
    assert_eq!(ielts_from_pct(86.0), 8.0);
    assert_eq!(ielts_from_pct(150.0), 8.0);
    assert_eq!(ielts_from_pct(-5.0), 3.5);
  }

  #[test]
  fn pacing_maintains_and_clamps() {
    // No gap: fixed maintenance value.
    assert_eq!(required_daily_minutes(7.0, 7.0, 12), 30);
    assert_eq!(required_daily_minutes(7.5, 6.0, 12), 30);
    // 1.5 bands over 12 weeks: 3 steps * 1680 / 12 / 7 = 60.
    assert_eq!(required_daily_minutes(5.5, 7.0, 12), 60);
    // Huge gap, tiny window: clamped to the ceiling.
    assert_eq!(required_daily_minutes(3.5, 8.0, 1), 180);
    // Tiny gap, huge window: clamped to the floor.
    assert_eq!(required_daily_minutes(6.5, 7.0, 52), 30);
  }

  #[test]
  fn pacing_is_monotonic_in_gap() {
    let mut last = 0;
    for step in 0..10 {
      let target = 4.0 + f64::from(step) * 0.5;
      let m = required_daily_minutes(4.0, target, 12);
      assert!(m >= last, "pacing decreased: {last} -> {m}");
      last = m;
    }
  }

  #[test]
  fn daily_tasks_are_deterministic() {
    let bank = builtin_task_bank();
    let prio = [Skill::Reading, Skill::Vocab];
    let a = build_daily_tasks(&bank, Band::B1, 9, 60, &prio);
    let b = build_daily_tasks(&bank, Band::B1, 9, 60, &prio);
    assert_eq!(a, b);
  }

  #[test]
  fn daily_tasks_respect_count_and_budget() {
    let bank = builtin_task_bank();
    for day in 0..60 {
      for minutes in [30, 45, 60, 120, 180] {
        let tasks = build_daily_tasks(&bank, Band::B1, day, minutes, &[]);
        assert!(
          (3..=5).contains(&tasks.len()),
          "day {day}: {} tasks",
          tasks.len()
        );
        let total: u32 = tasks.iter().map(|t| t.minutes).sum();
        // The minimum-three padding may push past the budget, but picked
        // bank tasks never do.
        if tasks.iter().all(|t| t.title != FALLBACK_TASK_TITLE) {
          assert!(total <= minutes.max(45), "day {day}: {total} > budget");
        }
      }
    }
  }

  #[test]
  fn daily_tasks_gate_level_progression() {
    let bank = builtin_task_bank();
    let level_of = |title: &str| {
      bank
        .iter()
        .find(|t| t.label == title)
        .map(|t| t.level)
    };
    for day in 0..14 {
      for task in build_daily_tasks(&bank, Band::B1, day, 90, &[]) {
        if let Some(level) = level_of(&task.title) {
          assert!(level <= Band::B1, "day {day} drew {level:?}: {}", task.title);
        }
      }
    }
    for day in 14..42 {
      for task in build_daily_tasks(&bank, Band::B1, day, 90, &[]) {
        if let Some(level) = level_of(&task.title) {
          assert!(level <= Band::B2, "day {day} drew {level:?}: {}", task.title);
        }
      }
    }
  }

  #[test]
  fn empty_bank_degrades_to_review_tasks() {
    let tasks = build_daily_tasks(&[], Band::A1, 0, 60, &[]);
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t.title == FALLBACK_TASK_TITLE));
  }

  #[test]
  fn default_plan_shape_for_b1_at_50pct() {
    let bank = builtin_task_bank();
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &PlanContext::default(), now());
    assert_eq!(plan.duration_weeks, 12);
    assert_eq!(plan.weekly.len(), 12);
    assert!(plan.weekly.iter().all(|w| w.days.len() == 7));
    assert_eq!(plan.meta.current_approx_ielts, 5.5);
    assert_eq!(plan.meta.target_ielts, 7.0);
    assert_eq!(plan.meta.daily_minutes, 60);
    assert_eq!(plan.meta.estimated_months, 3);
    // No study-day restriction: every day carries tasks.
    assert!(plan
      .weekly
      .iter()
      .all(|w| w.days.iter().all(|d| !d.tasks.is_empty())));
  }

  #[test]
  fn deadline_seven_days_out_gives_one_week() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      target_deadline: Some("2026-03-09".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    assert_eq!(plan.duration_weeks, 1);
    assert_eq!(plan.weekly.len(), 1);
  }

  #[test]
  fn distant_deadline_caps_calendar_but_relaxes_pacing() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      target_deadline: Some("2027-03-02".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    assert_eq!(plan.duration_weeks, 26);
    // 3 steps * 1680 over 52 weeks is under the floor.
    assert_eq!(plan.meta.daily_minutes, 30);
  }

  #[test]
  fn past_deadline_clamps_to_one_week() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      target_deadline: Some("2025-01-01".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    assert_eq!(plan.duration_weeks, 1);
  }

  #[test]
  fn malformed_study_days_mean_every_day() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      study_days_json: Some("not json".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    assert!(plan.meta.study_days.is_empty());
    assert!(plan
      .weekly
      .iter()
      .all(|w| w.days.iter().all(|d| !d.tasks.is_empty())));
  }

  #[test]
  fn study_days_exclude_other_weekdays() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      study_days_json: Some("[1,3,5]".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    for week in &plan.weekly {
      for (di, day) in week.days.iter().enumerate() {
        if [1, 3, 5].contains(&di) {
          assert!(!day.tasks.is_empty(), "week {} day {di} should study", week.week);
        } else {
          assert!(day.tasks.is_empty(), "week {} day {di} should rest", week.week);
        }
      }
    }
  }

  #[test]
  fn study_days_accept_numeric_strings() {
    assert_eq!(parse_study_days(Some("[\"1\", 3]")), vec![1, 3]);
    assert_eq!(parse_study_days(Some("{}")), Vec::<u32>::new());
    assert_eq!(parse_study_days(None), Vec::<u32>::new());
  }

  #[test]
  fn non_ielts_goal_targets_one_band_up() {
    let bank = builtin_task_bank();
    let plan =
      generate_template_plan(&bank, &score_b1(50.0), "general", &PlanContext::default(), now());
    assert_eq!(plan.meta.target_ielts, 6.5);
  }

  #[test]
  fn weakest_skill_leads_the_highlights() {
    let bank = builtin_task_bank();
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &PlanContext::default(), now());
    assert!(plan
      .highlights
      .iter()
      .any(|h| h.contains("Priority focus: reading (40%)")));
  }

  #[test]
  fn korean_plan_gets_bilingual_titles() {
    let bank = builtin_task_bank();
    let ctx = PlanContext {
      first_language: Some("Korean".to_string()),
      plan_native_language: Some("yes".to_string()),
      ..Default::default()
    };
    let plan = generate_template_plan(&bank, &score_b1(50.0), "ielts", &ctx, now());
    let korean_labels = ["어휘", "리스닝", "리딩", "문법", "라이팅", "스피킹", "복습"];
    for week in &plan.weekly {
      for day in &week.days {
        for task in &day.tasks {
          assert!(task.title.ends_with(')'), "missing English original: {}", task.title);
          let english_markers = [
            "(Vocabulary:", "(Listening:", "(Reading:", "(Grammar:",
            "(Writing:", "(Speaking:", "(Review:",
          ];
          assert!(
            english_markers.iter().any(|m| task.title.contains(m)),
            "missing English original: {}",
            task.title
          );
          assert!(
            korean_labels.iter().any(|l| task.title.starts_with(l)),
            "missing Korean label: {}",
            task.title
          );
        }
      }
    }
    assert!(plan
      .highlights
      .iter()
      .any(|h| h.contains("Korean translation")));
  }
}
