//! First-language localization: study tips per language background, the
//! bilingual plan packs, and the closed Korean phrase-substitution table.
//!
//! Everything here is data plus lookup. Adding a language means adding
//! table rows, not logic; the substitution routine is generic over any
//! ordered (pattern, replacement) list.

use crate::domain::Plan;

/// Languages with a full bilingual plan pack and localized skill labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeLanguage {
  Korean,
  Japanese,
  Chinese,
  Spanish,
  Portuguese,
  French,
  German,
  Russian,
  Hindi,
  Vietnamese,
}

/// Resolve a first-language string (English name, ISO code, or endonym)
/// to a supported plan language. Unknown input localizes nothing.
pub fn native_language(first_language: &str) -> Option<NativeLanguage> {
  use NativeLanguage::*;
  match first_language.trim().to_lowercase().as_str() {
    "korean" | "ko" | "ko-kr" | "한국어" => Some(Korean),
    "japanese" | "ja" | "ja-jp" | "日本語" => Some(Japanese),
    "chinese" | "zh" | "zh-cn" | "zh-hans" | "zh-hant" | "cn" | "中文" => Some(Chinese),
    "spanish" | "es" | "es-es" | "español" => Some(Spanish),
    "portuguese" | "pt" | "pt-pt" | "português" => Some(Portuguese),
    "french" | "fr" | "fr-fr" | "français" => Some(French),
    "german" | "de" | "de-de" | "deutsch" => Some(German),
    "russian" | "ru" | "ru-ru" | "русский" => Some(Russian),
    "hindi" | "hi" | "hi-in" | "हिन्दी" => Some(Hindi),
    "vietnamese" | "vi" | "vi-vn" | "tiếng việt" => Some(Vietnamese),
    _ => None,
  }
}

/// Highlights and quick wins tailored to a language background.
pub struct TipPack {
  pub highlights: Vec<String>,
  pub quick_wins: Vec<String>,
}

struct TipDef {
  language: &'static str,
  highlights: [&'static str; 2],
  quick_wins: [&'static str; 2],
}

const TIPS: &[TipDef] = &[
  TipDef {
    language: "chinese",
    highlights: ["Focus on articles (a/an/the) and plural forms", "Practice linking words in speaking"],
    quick_wins: ["Master 20 common article patterns", "Record yourself using linking words (however, therefore, etc.)"],
  },
  TipDef {
    language: "arabic",
    highlights: ["Focus on word order and tense consistency", "Practice vowel sounds in pronunciation"],
    quick_wins: ["Drill subject-verb-object patterns daily", "Shadow native speakers for vowel clarity"],
  },
  TipDef {
    language: "spanish",
    highlights: ["Focus on false friends and phrasal verbs", "Practice writing without literal translation"],
    quick_wins: ["Learn 10 phrasal verbs weekly", "Write summaries using English thought patterns"],
  },
  TipDef {
    language: "french",
    highlights: ["Focus on false cognates and prepositions", "Practice formal vs. informal register"],
    quick_wins: ["Master 15 key preposition differences", "Study IELTS register requirements"],
  },
  TipDef {
    language: "japanese",
    highlights: ["Focus on articles and subject-verb agreement", "Practice direct communication style"],
    quick_wins: ["Drill article usage in context", "Practice stating opinions directly"],
  },
  TipDef {
    language: "korean",
    highlights: ["Focus on articles and relative clauses", "Practice paragraph structure"],
    quick_wins: ["Master basic article rules", "Outline before writing to improve coherence"],
  },
  TipDef {
    language: "russian",
    highlights: ["Focus on articles and continuous tenses", "Practice natural word stress"],
    quick_wins: ["Learn article patterns in common contexts", "Shadow audio for natural rhythm"],
  },
  TipDef {
    language: "portuguese",
    highlights: ["Focus on false friends and phrasal verbs", "Practice question formation"],
    quick_wins: ["Study 10 misleading cognates weekly", "Drill question word order"],
  },
  TipDef {
    language: "hindi",
    highlights: ["Focus on articles and prepositions", "Practice writing complex sentences"],
    quick_wins: ["Master article usage rules", "Study compound-complex sentence patterns"],
  },
  TipDef {
    language: "vietnamese",
    highlights: ["Focus on verb tenses and word order", "Practice consonant clusters"],
    quick_wins: ["Drill past/present/future markers", "Practice consonant combinations daily"],
  },
];

/// Static tips lookup keyed by first-language name. Unknown languages fall
/// back to a generic pack, no language means no tips at all.
pub fn language_specific_tips(first_language: Option<&str>) -> TipPack {
  let Some(lang) = first_language.map(str::trim).filter(|s| !s.is_empty()) else {
    return TipPack { highlights: Vec::new(), quick_wins: Vec::new() };
  };
  let key = lang.to_lowercase();
  for def in TIPS {
    if def.language == key {
      return TipPack {
        highlights: def.highlights.iter().map(|s| (*s).to_string()).collect(),
        quick_wins: def.quick_wins.iter().map(|s| (*s).to_string()).collect(),
      };
    }
  }
  TipPack {
    highlights: vec![format!("Tailored for {lang} speakers")],
    quick_wins: vec!["Focus on areas where your language differs from English".to_string()],
  }
}

/// English title prefix ("Vocabulary", ...) to local skill label. Missing
/// entries keep the English prefix; several languages deliberately keep
/// the IELTS section names in English.
fn skill_label(native: NativeLanguage, prefix: &str) -> Option<&'static str> {
  use NativeLanguage::*;
  let row: &[(&str, &str)] = match native {
    Chinese => &[
      ("Vocabulary", "词汇"), ("Listening", "听力"), ("Reading", "阅读"),
      ("Grammar", "语法"), ("Writing", "写作"), ("Speaking", "口语"), ("Review", "复习"),
    ],
    Korean => &[
      ("Vocabulary", "어휘"), ("Listening", "리스닝"), ("Reading", "리딩"),
      ("Grammar", "문법"), ("Writing", "라이팅"), ("Speaking", "스피킹"), ("Review", "복습"),
    ],
    Japanese => &[
      ("Vocabulary", "語彙"), ("Listening", "リスニング"), ("Reading", "リーディング"),
      ("Grammar", "文法"), ("Writing", "ライティング"), ("Speaking", "スピーキング"), ("Review", "復習"),
    ],
    Spanish => &[("Vocabulary", "Vocabulario"), ("Grammar", "Gramática")],
    Portuguese => &[("Vocabulary", "Vocabulário"), ("Grammar", "Gramática")],
    French => &[("Vocabulary", "Vocabulaire"), ("Grammar", "Grammaire")],
    German => &[("Vocabulary", "Wortschatz"), ("Grammar", "Grammatik")],
    Russian => &[
      ("Vocabulary", "Лексика"), ("Listening", "Аудирование"), ("Reading", "Чтение"),
      ("Grammar", "Грамматика"), ("Writing", "Письмо"), ("Speaking", "Говорение"),
    ],
    Hindi => &[("Vocabulary", "शब्दावली"), ("Grammar", "व्याकरण")],
    Vietnamese => &[("Vocabulary", "Từ vựng"), ("Grammar", "Ngữ pháp")],
  };
  row.iter().find(|(en, _)| *en == prefix).map(|(_, local)| *local)
}

/// Bilingual plan pack prefixed onto highlights / quick wins when the
/// learner asked for a native-language plan.
fn bilingual_pack(native: NativeLanguage) -> (&'static [&'static str], &'static [&'static str]) {
  use NativeLanguage::*;
  match native {
    Korean => (
      &["학습 플랜이 현재 레벨에 맞춰 생성되었습니다 (plan matched to your level)",
        "매일 학습 시간을 지키는 것이 점수 향상의 핵심입니다 (daily consistency drives the score)"],
      &["취약 영역을 매일 15분씩 먼저 연습하세요 (hit your weakest skill first)",
        "과제 옆의 영어 원문으로 시험 용어를 익히세요 (use the English originals to learn exam terms)"],
    ),
    Japanese => (
      &["学習プランは現在のレベルに合わせて作成されています (plan matched to your level)",
        "毎日の学習時間を守ることがスコアアップの鍵です (daily consistency drives the score)"],
      &["弱点スキルを毎日15分練習しましょう (hit your weakest skill first)",
        "英語の原文で試験用語に慣れましょう (use the English originals to learn exam terms)"],
    ),
    Chinese => (
      &["学习计划已根据你的当前水平生成 (plan matched to your level)",
        "每天坚持学习时间是提分的关键 (daily consistency drives the score)"],
      &["每天先练习 15 分钟最薄弱的技能 (hit your weakest skill first)",
        "借助英文原文熟悉考试术语 (use the English originals to learn exam terms)"],
    ),
    Spanish => (
      &["Plan de estudio ajustado a tu nivel actual (plan matched to your level)",
        "La constancia diaria es la clave para subir de banda (daily consistency drives the score)"],
      &["Practica tu destreza más débil 15 minutos al día (hit your weakest skill first)",
        "Usa los títulos en inglés para aprender el vocabulario del examen (use the English originals)"],
    ),
    Portuguese => (
      &["Plano de estudo ajustado ao seu nível atual (plan matched to your level)",
        "A consistência diária é a chave para subir de banda (daily consistency drives the score)"],
      &["Pratique sua habilidade mais fraca 15 minutos por dia (hit your weakest skill first)",
        "Use os títulos em inglês para aprender os termos do exame (use the English originals)"],
    ),
    French => (
      &["Plan d'étude ajusté à votre niveau actuel (plan matched to your level)",
        "La régularité quotidienne est la clé de la progression (daily consistency drives the score)"],
      &["Travaillez votre compétence la plus faible 15 minutes par jour (hit your weakest skill first)",
        "Servez-vous des intitulés anglais pour retenir les termes de l'examen (use the English originals)"],
    ),
    German => (
      &["Der Lernplan ist auf dein aktuelles Niveau zugeschnitten (plan matched to your level)",
        "Tägliche Konstanz ist der Schlüssel zu einer besseren Band (daily consistency drives the score)"],
      &["Übe deine schwächste Fertigkeit täglich 15 Minuten (hit your weakest skill first)",
        "Nutze die englischen Originaltitel, um Prüfungsbegriffe zu lernen (use the English originals)"],
    ),
    Russian => (
      &["План занятий подстроен под ваш текущий уровень (plan matched to your level)",
        "Ежедневная регулярность — главный фактор роста балла (daily consistency drives the score)"],
      &["Каждый день начинайте с самого слабого навыка, 15 минут (hit your weakest skill first)",
        "Используйте английские названия заданий, чтобы выучить экзаменационные термины (use the English originals)"],
    ),
    Hindi => (
      &["अध्ययन योजना आपके वर्तमान स्तर के अनुसार बनाई गई है (plan matched to your level)",
        "रोज़ाना नियमित अभ्यास ही स्कोर बढ़ाने की कुंजी है (daily consistency drives the score)"],
      &["अपने सबसे कमज़ोर कौशल का रोज़ 15 मिनट अभ्यास करें (hit your weakest skill first)",
        "परीक्षा की शब्दावली सीखने के लिए अंग्रेज़ी शीर्षकों का उपयोग करें (use the English originals)"],
    ),
    Vietnamese => (
      &["Kế hoạch học tập được điều chỉnh theo trình độ hiện tại của bạn (plan matched to your level)",
        "Duy trì học đều mỗi ngày là chìa khóa tăng điểm (daily consistency drives the score)"],
      &["Luyện kỹ năng yếu nhất 15 phút mỗi ngày (hit your weakest skill first)",
        "Dùng tiêu đề tiếng Anh để học thuật ngữ bài thi (use the English originals)"],
    ),
  }
}

/// Curated English-to-Korean phrase substitutions applied to task bodies.
/// A closed, hand-maintained list of literal replacements, not general
/// translation. Longer phrases come first so they win over fragments.
const KOREAN_PHRASES: &[(&str, &str)] = &[
  ("learn 12 academic words with collocations", "연어와 함께 학업 어휘 12개 학습"),
  ("review deck and add 8 new words", "복습 덱에 새 단어 8개 추가"),
  ("review error log and rebuild 15 cards", "오답 노트 복습 후 카드 15장 재구성"),
  ("flashcards & error log", "플래시카드와 오답 노트"),
  ("write 5 example sentences", "예문 5개 작성"),
  ("short passage", "짧은 지문"),
  ("with feedback", "피드백 포함"),
  ("with recording", "녹음 포함"),
  ("academic words", "학업 어휘"),
  ("collocations", "연어"),
  ("cue card", "큐 카드"),
  ("pronunciation", "발음"),
  ("questions", "문항"),
  ("items", "문제"),
  ("sentences", "문장"),
  ("new words", "새 단어"),
];

/// Ordered literal substitution. First pair wins on overlap because it
/// rewrites the text before later pairs see it.
pub fn apply_substitutions(text: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = text.to_string();
  for (pattern, replacement) in pairs {
    out = out.replace(pattern, replacement);
  }
  out
}

/// Rewrite a task title as `<local label>: <body> (<original title>)`.
/// Korean bodies additionally go through the phrase table.
pub fn localize_title(native: NativeLanguage, title: &str) -> String {
  let (prefix, body) = title.split_once(": ").unwrap_or((title, ""));
  let local = skill_label(native, prefix).unwrap_or(prefix);
  let body = if matches!(native, NativeLanguage::Korean) {
    apply_substitutions(body, KOREAN_PHRASES)
  } else {
    body.to_string()
  };
  if body.is_empty() {
    format!("{local} ({title})")
  } else {
    format!("{local}: {body} ({title})")
  }
}

/// Apply the native-language pack in place: bilingual lines lead the
/// highlights / quick wins and every task title becomes bilingual.
pub fn localize_plan(plan: &mut Plan, native: NativeLanguage) {
  let (highlights, quick_wins) = bilingual_pack(native);
  for (i, line) in highlights.iter().enumerate() {
    plan.highlights.insert(i, (*line).to_string());
  }
  for (i, line) in quick_wins.iter().enumerate() {
    plan.quick_wins.insert(i, (*line).to_string());
  }
  for week in &mut plan.weekly {
    for day in &mut week.days {
      for task in &mut day.tasks {
        task.title = localize_title(native, &task.title);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn language_resolution_accepts_names_codes_and_endonyms() {
    assert_eq!(native_language("Korean"), Some(NativeLanguage::Korean));
    assert_eq!(native_language("ko"), Some(NativeLanguage::Korean));
    assert_eq!(native_language("한국어"), Some(NativeLanguage::Korean));
    assert_eq!(native_language("ZH-CN"), Some(NativeLanguage::Chinese));
    assert_eq!(native_language("English"), None);
    assert_eq!(native_language(""), None);
  }

  #[test]
  fn tips_cover_known_unknown_and_missing_languages() {
    let known = language_specific_tips(Some("Korean"));
    assert_eq!(known.highlights[0], "Focus on articles and relative clauses");
    assert_eq!(known.quick_wins.len(), 2);

    let unknown = language_specific_tips(Some("Swahili"));
    assert_eq!(unknown.highlights, vec!["Tailored for Swahili speakers".to_string()]);

    let none = language_specific_tips(None);
    assert!(none.highlights.is_empty() && none.quick_wins.is_empty());
  }

  #[test]
  fn korean_title_is_bilingual_with_phrase_substitutions() {
    let original = "Reading: reference and inference — 10 questions";
    let localized = localize_title(NativeLanguage::Korean, original);
    assert!(localized.starts_with("리딩: "), "got {localized}");
    assert!(localized.contains("문항"), "got {localized}");
    assert!(localized.ends_with(&format!("({original})")), "got {localized}");
  }

  #[test]
  fn unlabeled_prefix_keeps_english_but_stays_bilingual() {
    let original = "Review: flashcards & error log";
    let ko = localize_title(NativeLanguage::Korean, original);
    assert!(ko.starts_with("복습: "), "got {ko}");
    let vi = localize_title(NativeLanguage::Vietnamese, original);
    assert!(vi.starts_with("Review: "), "got {vi}");
    assert!(vi.ends_with(&format!("({original})")));
  }

  #[test]
  fn substitution_order_prefers_longer_phrases() {
    let out = apply_substitutions(
      "learn 12 academic words with collocations",
      KOREAN_PHRASES,
    );
    assert_eq!(out, "연어와 함께 학업 어휘 12개 학습");
  }
}
