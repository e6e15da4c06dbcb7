//! AI plan provider (DeepSeek / Gemini) with deterministic normalization.
//!
//! The model is asked for the exact plan JSON shape we serve; whatever comes
//! back is parsed tolerantly, backfilled from the figures we computed
//! ourselves, cleared on non-study days and stretched or trimmed to the
//! deadline. A response we cannot salvage is an `Err` so the caller can fall
//! back to the template generator.
//!
//! Calls are instrumented and log provider names, latencies, and response
//! sizes (not contents). We never log API keys.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::PlanPrompts;
use crate::domain::{Band, Plan, PlanContext, PlanDay, PlanMeta, PlanTask, PlanWeek, Score};
use crate::plan;
use crate::util::{fill_template, trunc_for_log};

const PLAN_SCHEMA: &str = r#"Return ONLY JSON, no prose. Schema:
{
  "durationWeeks": number,
  "weekly": [
    {"week": number, "days": [{"day": number, "tasks": [{"title": string, "minutes": number}]}]}
  ],
  "highlights": string[],
  "quickWins": string[],
  "meta": {
    "currentLevel": string,
    "currentApproxIELTS": number,
    "targetIELTS": number,
    "dailyMinutes": number,
    "estimatedMonths": number,
    "rationale": string
  }
}"#;

const DEFAULT_TASK_MINUTES: u32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
  DeepSeek,
  Gemini,
}

impl Provider {
  pub fn name(self) -> &'static str {
    match self {
      Provider::DeepSeek => "deepseek",
      Provider::Gemini => "gemini",
    }
  }
}

#[derive(Clone)]
pub struct AiClient {
  client: reqwest::Client,
  deepseek_key: Option<String>,
  gemini_key: Option<String>,
  deepseek_base: String,
  deepseek_model: String,
  gemini_model: String,
}

/// Scheduling figures we compute locally and trust over anything the model
/// claims about itself.
struct Figures {
  current_approx: f64,
  target: f64,
  daily_minutes: u32,
  study_days: Vec<u32>,
  want_native: bool,
}

fn figures(score: &Score, goal: &str, ctx: &PlanContext, now: DateTime<Utc>) -> Figures {
  let current_approx = plan::ielts_from_pct(score.overall_pct.unwrap_or(50.0));
  let target = if goal.eq_ignore_ascii_case("ielts") {
    ctx.target_score.unwrap_or(7.0)
  } else {
    ctx.target_score.unwrap_or(current_approx + 1.0)
  };
  let window_weeks = ctx
    .target_deadline
    .as_deref()
    .and_then(|d| plan::weeks_until(d, now))
    .unwrap_or(plan::DEFAULT_WEEKS);
  let daily_minutes = plan::required_daily_minutes(current_approx, target, window_weeks);
  Figures {
    current_approx,
    target,
    daily_minutes,
    study_days: plan::parse_study_days(ctx.study_days_json.as_deref()),
    want_native: ctx.wants_native(),
  }
}

impl AiClient {
  /// Construct the client if at least one provider key is configured;
  /// otherwise return None and the template generator runs alone.
  pub fn from_env() -> Option<Self> {
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty());
    let gemini_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
    if deepseek_key.is_none() && gemini_key.is_none() {
      return None;
    }

    let deepseek_base =
      std::env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| "https://api.deepseek.com/v1".into());
    let deepseek_model =
      std::env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| "deepseek-chat".into());
    let gemini_model =
      std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, deepseek_key, gemini_key, deepseek_base, deepseek_model, gemini_model })
  }

  /// Primary provider: DeepSeek when its key is present, Gemini otherwise.
  fn providers(&self) -> (Provider, Option<Provider>) {
    match (&self.deepseek_key, &self.gemini_key) {
      (Some(_), Some(_)) => (Provider::DeepSeek, Some(Provider::Gemini)),
      (Some(_), None) => (Provider::DeepSeek, None),
      _ => (Provider::Gemini, None),
    }
  }

  /// Generate a plan via the model. The returned plan already satisfies the
  /// same shape invariants as the template generator's output.
  #[instrument(level = "info", skip_all, fields(goal = %goal, band = ?score.band))]
  pub async fn generate_plan(
    &self,
    prompts: &PlanPrompts,
    score: &Score,
    goal: &str,
    ctx: &PlanContext,
    now: DateTime<Utc>,
  ) -> Result<Plan, String> {
    let fig = figures(score, goal, ctx, now);
    let weak = plan::prioritize_skills(score)
      .into_iter()
      .take(3)
      .map(plan::skill_wire_name)
      .collect::<Vec<_>>()
      .join(", ");
    let days_text = fig
      .study_days
      .iter()
      .map(|d| d.to_string())
      .collect::<Vec<_>>()
      .join(",");

    let system = prompts.plan_system.clone();
    let user = fill_template(
      &prompts.plan_user_template,
      &[
        ("target", &format!("{:.1}", fig.target)),
        ("deadline", ctx.target_deadline.as_deref().unwrap_or("none")),
        ("daily", &fig.daily_minutes.to_string()),
        ("days", &days_text),
        ("lang", ctx.first_language.as_deref().unwrap_or("en")),
        ("bilingual", if fig.want_native { "yes" } else { "no" }),
        ("weak", &weak),
        ("schema", PLAN_SCHEMA),
      ],
    );

    let (primary, fallback) = self.providers();
    let start = std::time::Instant::now();
    let content = match self.chat(primary, &system, &user).await {
      Ok(text) => text,
      Err(primary_err) => {
        warn!(provider = primary.name(), error = %primary_err, "Primary provider failed, attempting fallback");
        let Some(fb) = fallback else { return Err(primary_err) };
        self.chat(fb, &system, &user).await?
      }
    };
    info!(elapsed = ?start.elapsed(), response_len = content.len(), "Model response received");

    let raw = parse_plan_json(&content)?;
    normalize_ai_plan(raw, score, ctx, &fig, now)
  }

  async fn chat(&self, provider: Provider, system: &str, user: &str) -> Result<String, String> {
    match provider {
      Provider::DeepSeek => self.chat_deepseek(system, user).await,
      Provider::Gemini => self.chat_gemini(&format!("{system}\n\n{user}")).await,
    }
  }

  /// OpenAI-style chat completion against the DeepSeek endpoint.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.deepseek_model))]
  async fn chat_deepseek(&self, system: &str, user: &str) -> Result<String, String> {
    let key = self.deepseek_key.as_deref().ok_or("DeepSeek not configured")?;
    let url = format!("{}/chat/completions", self.deepseek_base);
    let req = ChatCompletionRequest {
      model: self.deepseek_model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: 0.1,
      max_tokens: Some(2000),
      stream: false,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "bandplan-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {key}"))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      error!(%status, body = %trunc_for_log(&body, 200), "DeepSeek HTTP error");
      return Err(format!("DeepSeek HTTP {status}"));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, "DeepSeek usage");
    }
    Ok(
      body
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default()
        .trim()
        .to_string(),
    )
  }

  /// Gemini generateContent with a merged system+user prompt and a JSON
  /// response mime type.
  #[instrument(level = "info", skip(self, text), fields(model = %self.gemini_model, text_len = text.len()))]
  async fn chat_gemini(&self, text: &str) -> Result<String, String> {
    let key = self.gemini_key.as_deref().ok_or("Gemini not configured")?;
    let url = format!(
      "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
      self.gemini_model, key
    );
    let req = GeminiRequest {
      contents: vec![GeminiContent { parts: vec![GeminiPart { text: text.into() }] }],
      generation_config: GeminiConfig {
        temperature: 0.1,
        max_output_tokens: 1800,
        response_mime_type: "application/json".into(),
      },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "bandplan-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      error!(%status, body = %trunc_for_log(&body, 200), "Gemini HTTP error");
      return Err(format!("Gemini HTTP {status}"));
    }

    let body: GeminiResponse = res.json().await.map_err(|e| e.to_string())?;
    Ok(
      body
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.trim().to_string())
        .unwrap_or_default(),
    )
  }
}

/// Parse the model output as JSON; when it arrives wrapped in prose or code
/// fences, retry on the outermost brace span.
fn parse_plan_json(text: &str) -> Result<RawPlan, String> {
  if let Ok(raw) = serde_json::from_str::<RawPlan>(text) {
    return Ok(raw);
  }
  let start = text.find('{');
  let end = text.rfind('}');
  if let (Some(s), Some(e)) = (start, end) {
    if s < e {
      return serde_json::from_str::<RawPlan>(&text[s..=e])
        .map_err(|e| format!("Model JSON parse error: {e}"));
    }
  }
  Err("Model returned no JSON object".into())
}

/// Backfill and repair the model's plan so it honors the figures and the
/// schedule the student actually chose.
fn normalize_ai_plan(
  raw: RawPlan,
  score: &Score,
  ctx: &PlanContext,
  fig: &Figures,
  now: DateTime<Utc>,
) -> Result<Plan, String> {
  let raw_weekly = raw.weekly.unwrap_or_default();
  if raw_weekly.is_empty() {
    return Err("Model returned no weekly schedule".into());
  }

  let mut weekly: Vec<PlanWeek> = raw_weekly
    .into_iter()
    .enumerate()
    .map(|(wi, w)| PlanWeek {
      week: (wi + 1) as u32,
      days: (0..7usize)
        .map(|di| {
          let raw_day = w.days.get(di);
          // Excluded-weekday check prefers the model's own day number,
          // clamped to 0..6, and falls back to the position.
          let day_index = raw_day
            .and_then(|d| d.day)
            .map(|n| (n.round() as i64).clamp(1, 7) as u32 - 1)
            .unwrap_or(di as u32);
          let excluded = !fig.study_days.is_empty() && !fig.study_days.contains(&day_index);
          let tasks = if excluded {
            Vec::new()
          } else {
            raw_day
              .map(|d| {
                d.tasks
                  .iter()
                  .filter(|t| !t.title.trim().is_empty())
                  .map(|t| PlanTask {
                    title: t.title.trim().to_string(),
                    minutes: t
                      .minutes
                      .map(|m| (m.round() as i64).max(1) as u32)
                      .unwrap_or(DEFAULT_TASK_MINUTES),
                  })
                  .collect()
              })
              .unwrap_or_default()
          };
          PlanDay { day: (di + 1) as u8, tasks }
        })
        .collect(),
    })
    .collect();

  let meta = raw.meta.unwrap_or_default();
  let start_date_iso = meta
    .start_date_iso
    .clone()
    .unwrap_or_else(|| now.to_rfc3339());
  let start = DateTime::parse_from_rfc3339(&start_date_iso)
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or(now);

  // Stretch or trim the calendar to the deadline; otherwise trust the
  // weeks the model actually produced.
  let mut duration_weeks = weekly.len() as u32;
  if let Some(deadline) = ctx.target_deadline.as_deref() {
    if let Some(needed) = plan::weeks_until(deadline, start) {
      duration_weeks = needed;
    }
  }
  duration_weeks = duration_weeks.clamp(1, plan::MAX_WEEKS);

  if (weekly.len() as u32) < duration_weeks {
    let template = weekly
      .last()
      .cloned()
      .unwrap_or(PlanWeek { week: 0, days: Vec::new() });
    for w in weekly.len() as u32..duration_weeks {
      let mut next = template.clone();
      next.week = w + 1;
      weekly.push(next);
    }
  } else {
    weekly.truncate(duration_weeks as usize);
  }

  let estimated_months = meta
    .estimated_months
    .map(|m| (m.round() as i64).max(1) as u32)
    .unwrap_or_else(|| ((f64::from(duration_weeks) / 4.0).round() as u32).max(1));

  Ok(Plan {
    duration_weeks,
    weekly,
    highlights: raw.highlights.unwrap_or_default(),
    quick_wins: raw.quick_wins.unwrap_or_default(),
    meta: PlanMeta {
      current_level: meta
        .current_level
        .as_deref()
        .and_then(|s| s.parse::<Band>().ok())
        .unwrap_or(score.band),
      current_approx_ielts: meta.current_approx.unwrap_or(fig.current_approx),
      target_ielts: fig.target,
      daily_minutes: fig.daily_minutes,
      estimated_months,
      rationale: meta
        .rationale
        .unwrap_or_else(|| "AI-generated, prioritized by weak areas and schedule.".into()),
      target_deadline: ctx.target_deadline.clone(),
      start_date_iso,
      first_language: ctx.first_language.clone(),
      plan_native_language: ctx.plan_native_language.clone(),
      study_days: fig.study_days.clone(),
    },
  })
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  stream: bool,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
}

#[derive(Serialize)]
struct GeminiRequest {
  contents: Vec<GeminiContent>,
  #[serde(rename = "generationConfig")]
  generation_config: GeminiConfig,
}
#[derive(Serialize)]
struct GeminiContent { parts: Vec<GeminiPart> }
#[derive(Serialize, Deserialize)]
struct GeminiPart { text: String }
#[derive(Serialize)]
struct GeminiConfig {
  temperature: f32,
  #[serde(rename = "maxOutputTokens")]
  max_output_tokens: u32,
  #[serde(rename = "responseMimeType")]
  response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
  #[serde(default)]
  candidates: Vec<GeminiCandidate>,
}
#[derive(Deserialize)]
struct GeminiCandidate { content: GeminiCandidateContent }
#[derive(Deserialize)]
struct GeminiCandidateContent {
  #[serde(default)]
  parts: Vec<GeminiPart>,
}

// --- Model plan DTOs (tolerant) ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
  #[serde(default)]
  weekly: Option<Vec<RawWeek>>,
  #[serde(default)]
  highlights: Option<Vec<String>>,
  #[serde(default)]
  quick_wins: Option<Vec<String>>,
  #[serde(default)]
  meta: Option<RawMeta>,
}
#[derive(Deserialize)]
struct RawWeek {
  #[serde(default)]
  days: Vec<RawDay>,
}
#[derive(Deserialize)]
struct RawDay {
  #[serde(default)]
  day: Option<f64>,
  #[serde(default)]
  tasks: Vec<RawTask>,
}
#[derive(Deserialize)]
struct RawTask {
  title: String,
  #[serde(default)]
  minutes: Option<f64>,
}
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
  #[serde(default)]
  current_level: Option<String>,
  #[serde(default, rename = "currentApproxIELTS")]
  current_approx: Option<f64>,
  #[serde(default)]
  estimated_months: Option<f64>,
  #[serde(default)]
  rationale: Option<String>,
  #[serde(default, rename = "startDateISO")]
  start_date_iso: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SubScores;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
  }

  fn score() -> Score {
    Score { band: Band::B1, subs: SubScores::default(), overall_pct: Some(50.0) }
  }

  fn raw_week_json(days: usize) -> String {
    let day_objs: Vec<String> = (0..days)
      .map(|d| {
        format!(
          r#"{{"day": {}, "tasks": [{{"title": "Vocabulary: 12 academic words", "minutes": 20}}]}}"#,
          d + 1
        )
      })
      .collect();
    format!(r#"{{"week": 1, "days": [{}]}}"#, day_objs.join(","))
  }

  #[test]
  fn parses_plain_and_prose_wrapped_json() {
    let body = format!(r#"{{"weekly": [{}]}}"#, raw_week_json(7));
    assert!(parse_plan_json(&body).is_ok());

    let wrapped = format!("Here is your plan:\n```json\n{body}\n```\nGood luck!");
    let raw = parse_plan_json(&wrapped).expect("brace extraction");
    assert_eq!(raw.weekly.unwrap().len(), 1);

    assert!(parse_plan_json("no json here").is_err());
  }

  #[test]
  fn normalize_rejects_missing_weekly() {
    let raw = parse_plan_json(r#"{"highlights": ["x"]}"#).unwrap();
    let ctx = PlanContext::default();
    let fig = figures(&score(), "ielts", &ctx, now());
    assert!(normalize_ai_plan(raw, &score(), &ctx, &fig, now()).is_err());
  }

  #[test]
  fn normalize_clears_non_study_days_and_pads_weeks_to_seven_days() {
    let body = format!(r#"{{"weekly": [{}]}}"#, raw_week_json(5));
    let raw = parse_plan_json(&body).unwrap();
    let ctx = PlanContext {
      study_days_json: Some("[1,3]".into()),
      ..PlanContext::default()
    };
    let fig = figures(&score(), "ielts", &ctx, now());
    let plan = normalize_ai_plan(raw, &score(), &ctx, &fig, now()).expect("plan");

    assert_eq!(plan.weekly[0].days.len(), 7);
    for day in &plan.weekly[0].days {
      let idx = u32::from(day.day) - 1;
      if idx == 1 || idx == 3 {
        assert!(!day.tasks.is_empty(), "study day {idx} should keep tasks");
      } else {
        assert!(day.tasks.is_empty(), "day {idx} should be cleared");
      }
    }
  }

  #[test]
  fn normalize_extends_calendar_to_the_deadline() {
    let body = format!(r#"{{"weekly": [{}], "durationWeeks": 1}}"#, raw_week_json(7));
    let raw = parse_plan_json(&body).unwrap();
    let ctx = PlanContext {
      target_deadline: Some("2026-05-25".into()),
      ..PlanContext::default()
    };
    let fig = figures(&score(), "ielts", &ctx, now());
    let plan = normalize_ai_plan(raw, &score(), &ctx, &fig, now()).expect("plan");

    assert_eq!(plan.duration_weeks, 12);
    assert_eq!(plan.weekly.len(), 12);
    // Extension clones the last produced week.
    assert_eq!(plan.weekly[11].week, 12);
    assert_eq!(plan.weekly[11].days[0].tasks, plan.weekly[0].days[0].tasks);
  }

  #[test]
  fn normalize_backfills_meta_from_local_figures() {
    let body = format!(
      r#"{{"weekly": [{}], "meta": {{"currentLevel": "b2", "currentApproxIELTS": 6.0}}}}"#,
      raw_week_json(7)
    );
    let raw = parse_plan_json(&body).unwrap();
    let ctx = PlanContext { target_score: Some(7.5), ..PlanContext::default() };
    let fig = figures(&score(), "ielts", &ctx, now());
    let plan = normalize_ai_plan(raw, &score(), &ctx, &fig, now()).expect("plan");

    assert_eq!(plan.meta.current_level, Band::B2);
    assert_eq!(plan.meta.current_approx_ielts, 6.0);
    assert_eq!(plan.meta.target_ielts, 7.5);
    assert_eq!(plan.meta.daily_minutes, fig.daily_minutes);
    assert!(plan.meta.rationale.contains("AI-generated"));
    assert_eq!(plan.meta.start_date_iso, now().to_rfc3339());
  }
}
