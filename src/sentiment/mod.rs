//! Polarity classification of review fragments.

pub mod lexicon;

pub use lexicon::LexiconScorer;

use crate::extract::TextFragment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Produces a polarity score in `[-1, 1]` for a piece of text.
pub trait PolarityScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Neutral,
    Negative,
}

impl Label {
    /// Derives the label from a score using the fixed thresholds.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Label::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Positive => "positive",
            Label::Neutral => "neutral",
            Label::Negative => "negative",
        };
        write!(f, "{}", name)
    }
}

/// A fragment with its polarity score and label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    pub fragment: TextFragment,
    pub score: f64,
    pub label: Label,
}

/// Classifies fragments with a [`PolarityScorer`].
#[derive(Debug, Clone, Default)]
pub struct SentimentClassifier<P = LexiconScorer> {
    scorer: P,
}

impl<P: PolarityScorer> SentimentClassifier<P> {
    pub fn new(scorer: P) -> Self {
        Self { scorer }
    }

    /// Scores a fragment. Blank text is neutral at 0.0 without consulting
    /// the scorer; out-of-range scores are clamped and NaN counts as 0.0.
    pub fn classify(&self, fragment: &TextFragment) -> SentimentResult {
        let score = if fragment.text.trim().is_empty() {
            0.0
        } else {
            let raw = self.scorer.score(&fragment.text);
            if raw.is_nan() {
                0.0
            } else {
                raw.clamp(-1.0, 1.0)
            }
        };

        SentimentResult { fragment: fragment.clone(), score, label: Label::from_score(score) }
    }

    pub fn classify_all<'a>(
        &self,
        fragments: impl IntoIterator<Item = &'a TextFragment>,
    ) -> Vec<SentimentResult> {
        fragments.into_iter().map(|f| self.classify(f)).collect()
    }
}
