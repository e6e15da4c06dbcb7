//! Built-in task bank and bank filtering.
//!
//! The bank is a hand-curated catalogue of atomic, measurable study
//! activities tagged by skill and CEFR band. Labels are student-facing
//! English and avoid shorthand like "8 Q". Deployments can extend or
//! override entries through the TOML config; the built-ins below keep the
//! generator useful with zero configuration.

use crate::domain::{Band, Skill, TaskBankItem};

struct BankDef {
  id: &'static str,
  skill: Skill,
  level: Band,
  minutes: u32,
  label: &'static str,
  subskill: &'static str,
  tags: &'static [&'static str],
}

macro_rules! task {
  ($id:expr, $skill:expr, $level:expr, $minutes:expr, $label:expr, $subskill:expr, $tags:expr) => {
    BankDef {
      id: $id,
      skill: $skill,
      level: $level,
      minutes: $minutes,
      label: $label,
      subskill: $subskill,
      tags: $tags,
    }
  };
}

use Band::{A1, A2, B1, B2, C1};
use Skill::{Grammar, Listening, Reading, Speaking, Vocab, Writing};

const BANK: &[BankDef] = &[
  // Vocabulary
  task!("vocab-academic-12", Vocab, B1, 20, "Vocabulary: learn 12 academic words with collocations", "academic", &["lexis", "collocations"]),
  task!("vocab-collocations-10", Vocab, B1, 20, "Vocabulary: 10 collocations — write 5 example sentences", "collocations", &["production"]),
  task!("vocab-review-8", Vocab, A2, 20, "Vocabulary: review deck and add 8 new words", "review", &["spaced-repetition"]),
  task!("vocab-word-formation-12", Vocab, B2, 20, "Vocabulary: word formation (noun/verb/adjective/adverb) — 12 items", "word-formation", &[]),
  task!("vocab-synonym-precision-10", Vocab, B2, 20, "Vocabulary: synonym precision in context — 10 sentences", "precision", &[]),
  task!("vocab-error-log-15", Vocab, B1, 15, "Vocabulary: review error log and rebuild 15 cards", "review", &[]),
  task!("vocab-a1-picture-10", Vocab, A1, 15, "Vocabulary: picture cues — 10 new words", "foundation", &[]),
  task!("vocab-c1-academic-phrasing-12", Vocab, C1, 20, "Vocabulary: academic phrasing — replace 12 informal phrases", "register", &[]),
  // Listening
  task!("list-section1-details-10", Listening, A2, 20, "Listening: Section 1 details (forms, dates, numbers) — 10 questions", "detail", &[]),
  task!("list-paraphrase-gist-8", Listening, B1, 20, "Listening: paraphrase and gist (short talk) — 8 questions", "gist", &[]),
  task!("list-map-plan-10", Listening, B1, 20, "Listening: map/plan completion — 10 questions", "visual", &[]),
  task!("list-note-completion-10", Listening, B1, 20, "Listening: note completion — 10 questions", "note", &[]),
  task!("list-sentence-completion-10", Listening, B1, 20, "Listening: sentence completion — 10 questions", "sentence", &[]),
  task!("list-mc-gist-8", Listening, B2, 20, "Listening: multiple choice (section 2 gist) — 8 questions", "mcq", &[]),
  task!("list-a1-words-numbers-10", Listening, A1, 15, "Listening: words and numbers dictation — 10 items", "dictation", &[]),
  task!("list-c1-lecture-structure-8", Listening, C1, 20, "Listening: lecture structure and signposting — 8 questions", "structure", &[]),
  // Reading
  task!("read-tfng-8", Reading, A2, 20, "Reading: True/False/Not Given (short passage) — 8 questions", "TFNG", &[]),
  task!("read-reference-inference-10", Reading, B1, 20, "Reading: reference and inference — 10 questions", "inference", &[]),
  task!("read-headings-paras-8", Reading, B1, 20, "Reading: match headings to paragraphs — 8 questions", "matching-headings", &[]),
  task!("read-summary-completion-8", Reading, B1, 20, "Reading: summary completion — 8 questions", "summary", &[]),
  task!("read-matching-information-10", Reading, B2, 20, "Reading: matching information — 10 questions", "matching-info", &[]),
  task!("read-mc-single-8", Reading, B2, 20, "Reading: multiple choice (single answer) — 8 questions", "mcq", &[]),
  task!("read-a1-sentences-10", Reading, A1, 15, "Reading: sentence ordering — 10 items", "ordering", &[]),
  task!("read-c1-paraphrase-12", Reading, C1, 20, "Reading: paraphrase complex sentences — 12 items", "paraphrase", &[]),
  // Grammar
  task!("gram-articles-prep-12", Grammar, A2, 15, "Grammar: articles and prepositions — 12 items", "articles", &[]),
  task!("gram-tense-sva-12", Grammar, B1, 15, "Grammar: tense control and subject–verb agreement — 12 items", "tense", &[]),
  task!("gram-complex-linkers-10", Grammar, B1, 15, "Grammar: complex sentences and linking words — 10 items", "linkers", &[]),
  task!("gram-conditionals-10", Grammar, B1, 15, "Grammar: conditionals (0, 1st, 2nd) — 10 items", "conditionals", &[]),
  task!("gram-relative-clauses-10", Grammar, B1, 15, "Grammar: relative clauses — 10 items", "relative-clauses", &[]),
  task!("gram-modifiers-12", Grammar, B2, 15, "Grammar: modifiers and parallel structure — 12 items", "modifiers", &[]),
  task!("gram-a1-simple-present-12", Grammar, A1, 15, "Grammar: simple present with be/do — 12 items", "simple-present", &[]),
  task!("gram-c1-subordination-12", Grammar, C1, 15, "Grammar: subordination and clause packaging — 12 items", "advanced", &[]),
  // Writing
  task!("write-task1-outline", Writing, B1, 20, "Writing: Task 1 outline (select key data and comparisons)", "task1", &[]),
  task!("write-task2-paragraph", Writing, B1, 20, "Writing: Task 2 paragraph (claim + reason + example)", "task2", &[]),
  task!("write-summary-120", Writing, B1, 20, "Writing: 120-word summary using cohesion markers", "cohesion", &[]),
  task!("write-task2-plan-12", Writing, B1, 20, "Writing: Task 2 plan — brainstorm and 12-minute outline", "planning", &[]),
  task!("write-intro-paraphrase-4", Writing, B1, 20, "Writing: introduce and paraphrase the question — 4 versions", "paraphrase", &[]),
  task!("write-coherence-linking-15", Writing, B2, 20, "Writing: coherence — refine linking devices in a paragraph (15 edits)", "coherence", &[]),
  task!("write-a1-sentences-12", Writing, A1, 15, "Writing: build 12 simple sentences with be/have", "foundation", &[]),
  task!("write-c1-hedging-12", Writing, C1, 20, "Writing: academic hedging and stance — 12 rewrites", "register", &[]),
  // Speaking
  task!("speak-part1-2prompts", Speaking, A2, 10, "Speaking: Part 1 — answer 2 prompts (40 seconds) with feedback", "part1", &[]),
  task!("speak-part2-cuecard", Speaking, B1, 15, "Speaking: Part 2 cue card (prep 15s + speak 40s)", "part2", &[]),
  task!("speak-mimic-shadow-3", Speaking, A2, 10, "Speaking: mimic and shadow 3 sentences (pronunciation)", "pronunciation", &[]),
  task!("speak-part3-followups-6", Speaking, B1, 12, "Speaking: Part 3 — 6 follow-up questions with reasons and examples", "part3", &[]),
  task!("speak-intonation-stress-10", Speaking, B1, 10, "Speaking: intonation and word stress — record and compare 10 lines", "pronunciation", &[]),
  task!("speak-a1-introduce-yourself", Speaking, A1, 10, "Speaking: introduce yourself — 6 lines with recording", "foundation", &[]),
  task!("speak-c1-issue-stance-10", Speaking, C1, 15, "Speaking: take a stance on an issue — 10 lines with hedging", "fluency", &[]),
];

/// Materialize the built-in catalogue as owned items.
pub fn builtin_task_bank() -> Vec<TaskBankItem> {
  BANK
    .iter()
    .map(|d| TaskBankItem {
      id: d.id.to_string(),
      skill: d.skill,
      level: d.level,
      minutes: d.minutes,
      label: d.label.to_string(),
      subskill: if d.subskill.is_empty() { None } else { Some(d.subskill.to_string()) },
      tags: d.tags.iter().map(|t| (*t).to_string()).collect(),
    })
    .collect()
}

/// Browse filter: optional skill, optional "at or below this level", and a
/// case-insensitive substring query over label, subskill and tags.
pub fn filter_task_bank<'a>(
  bank: &'a [TaskBankItem],
  skill: Option<Skill>,
  level: Option<Band>,
  query: &str,
) -> Vec<&'a TaskBankItem> {
  let q = query.trim().to_lowercase();
  bank
    .iter()
    .filter(|t| skill.map_or(true, |s| t.skill == s))
    .filter(|t| level.map_or(true, |l| t.level <= l))
    .filter(|t| {
      if q.is_empty() {
        return true;
      }
      let hay = format!(
        "{} {} {}",
        t.label,
        t.subskill.as_deref().unwrap_or(""),
        t.tags.join(" ")
      )
      .to_lowercase();
      hay.contains(&q)
    })
    .collect()
}
