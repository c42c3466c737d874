//! Keyword-based feedback categorisation.
//!
//! The lexicon is closed and hand-curated: each [`Theme`] owns a fixed list of
//! lower-case keywords, and a review belongs to every theme whose keywords
//! appear anywhere in its text (substring containment, not tokenisation).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

// ─── Themes ──────────────────────────────────────────────────────────────────

/// Subject-matter label for review feedback. Declaration order is the
/// presentation order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  IntoStaticStr,
)]
pub enum Theme {
  #[serde(rename = "Wait Time")]
  #[strum(serialize = "Wait Time")]
  WaitTime,
  #[serde(rename = "Staff Behavior")]
  #[strum(serialize = "Staff Behavior")]
  StaffBehavior,
  Cleanliness,
  Billing,
  #[serde(rename = "Medical Care")]
  #[strum(serialize = "Medical Care")]
  MedicalCare,
  Facility,
  /// Fallback when no keyword matches.
  General,
}

impl Theme {
  pub fn label(self) -> &'static str { self.into() }

  /// Keywords that place a text in this theme. Empty for [`Theme::General`].
  pub fn keywords(self) -> &'static [&'static str] {
    match self {
      Self::WaitTime => &["wait", "time"],
      Self::StaffBehavior => &["staff", "rude", "helpful"],
      Self::Cleanliness => &["clean", "dirty"],
      Self::Billing => &["price", "expensive", "bill"],
      Self::MedicalCare => &["doctor", "treatment"],
      Self::Facility => &[
        "parking",
        "facility",
        "facilities",
        "seating",
        "equipment",
        "infrastructure",
      ],
      Self::General => &[],
    }
  }

  /// Every theme that has keywords, i.e. all but the fallback.
  pub fn keyworded() -> impl Iterator<Item = Theme> {
    Theme::iter().filter(|t| *t != Theme::General)
  }
}

// ─── Categorisation ──────────────────────────────────────────────────────────

/// Classify free text into one or more themes. Never returns an empty set:
/// text matching nothing (including empty text) yields `{General}`.
pub fn categorize(text: &str) -> BTreeSet<Theme> {
  let lower = text.to_lowercase();
  let mut themes: BTreeSet<Theme> = Theme::keyworded()
    .filter(|theme| theme.keywords().iter().any(|kw| lower.contains(kw)))
    .collect();
  if themes.is_empty() {
    themes.insert(Theme::General);
  }
  themes
}

// ─── Sentiment keywords ──────────────────────────────────────────────────────

const POSITIVE_KEYWORDS: &[&str] = &[
  "clean",
  "professional",
  "friendly",
  "helpful",
  "excellent",
  "great",
  "best",
  "recommend",
  "quick",
  "hygienic",
  "polite",
  "caring",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
  "wait",
  "waiting",
  "long",
  "rude",
  "dirty",
  "expensive",
  "overpriced",
  "unprofessional",
  "wrong",
  "uncomfortable",
];

/// Lexicon hits found in a text. Diagnostic only; categorisation does not
/// consult it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentKeywords {
  pub positive: Vec<&'static str>,
  pub negative: Vec<&'static str>,
}

/// Report which positive and negative lexicon entries occur in `text`, in
/// lexicon order.
pub fn extract_sentiment_keywords(text: &str) -> SentimentKeywords {
  let lower = text.to_lowercase();
  let hits = |lexicon: &[&'static str]| -> Vec<&'static str> {
    lexicon.iter().copied().filter(|kw| lower.contains(kw)).collect()
  };
  SentimentKeywords {
    positive: hits(POSITIVE_KEYWORDS),
    negative: hits(NEGATIVE_KEYWORDS),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_text_is_general() {
    assert_eq!(categorize(""), BTreeSet::from([Theme::General]));
  }

  #[test]
  fn multi_label_match() {
    let themes = categorize("Doctor was rude and the wait was too long");
    assert_eq!(
      themes,
      BTreeSet::from([Theme::StaffBehavior, Theme::WaitTime, Theme::MedicalCare])
    );
  }

  #[test]
  fn matching_ignores_case() {
    assert_eq!(
      categorize("DIRTY floors, no PARKING"),
      BTreeSet::from([Theme::Cleanliness, Theme::Facility])
    );
  }

  #[test]
  fn substring_containment_not_tokens() {
    // "billing" contains "bill"; "waiting" contains "wait".
    let themes = categorize("billing desk kept me waiting");
    assert!(themes.contains(&Theme::Billing));
    assert!(themes.contains(&Theme::WaitTime));
  }

  #[test]
  fn near_synonyms_do_not_match() {
    for text in ["long queue", "very hygienic", "wrong medicine", "they charge a lot"] {
      assert_eq!(categorize(text), BTreeSet::from([Theme::General]), "{text}");
    }
  }

  #[test]
  fn unmatched_text_is_general() {
    assert_eq!(categorize("Lovely experience"), BTreeSet::from([Theme::General]));
  }

  #[test]
  fn labels_are_display_names() {
    assert_eq!(Theme::WaitTime.label(), "Wait Time");
    assert_eq!(Theme::MedicalCare.to_string(), "Medical Care");
    assert_eq!(
      serde_json::to_string(&Theme::StaffBehavior).unwrap(),
      "\"Staff Behavior\""
    );
  }

  #[test]
  fn general_has_no_keywords() {
    assert!(Theme::General.keywords().is_empty());
    assert_eq!(Theme::keyworded().count(), 6);
  }

  #[test]
  fn sentiment_keywords_in_lexicon_order() {
    let kw = extract_sentiment_keywords("Great doctor, but a LONG wait and rude staff");
    assert_eq!(kw.positive, vec!["great"]);
    assert_eq!(kw.negative, vec!["wait", "long", "rude"]);
  }

  #[test]
  fn sentiment_keywords_empty_text() {
    assert_eq!(extract_sentiment_keywords(""), SentimentKeywords::default());
  }
}
