//! Word-list polarity scorer tuned for short product reviews.
//!
//! The score is the mean polarity of the lexicon words found in the text.
//! A preceding intensifier scales a word's polarity and a negation within
//! the two preceding tokens flips it at half strength.

use super::PolarityScorer;
use std::collections::HashMap;
use std::sync::LazyLock;

static POLARITY: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    [
        // Positive
        ("excellent", 1.0),
        ("perfect", 1.0),
        ("best", 1.0),
        ("awesome", 1.0),
        ("wonderful", 1.0),
        ("superb", 1.0),
        ("impressive", 1.0),
        ("brilliant", 0.9),
        ("beautiful", 0.85),
        ("great", 0.8),
        ("happy", 0.8),
        ("loved", 0.7),
        ("good", 0.7),
        ("amazing", 0.6),
        ("nice", 0.6),
        ("loving", 0.6),
        ("outstanding", 0.5),
        ("love", 0.5),
        ("satisfied", 0.5),
        ("fantastic", 0.4),
        ("recommend", 0.4),
        ("recommended", 0.4),
        ("fine", 0.4),
        ("smooth", 0.4),
        ("sturdy", 0.4),
        ("reliable", 0.4),
        ("comfortable", 0.4),
        ("easy", 0.43),
        ("quick", 0.33),
        ("worth", 0.3),
        ("solid", 0.3),
        ("affordable", 0.3),
        ("useful", 0.3),
        ("helpful", 0.3),
        ("fast", 0.2),
        ("decent", 0.17),
        ("okay", 0.1),
        ("ok", 0.1),
        // Negative
        ("terrible", -1.0),
        ("horrible", -1.0),
        ("awful", -1.0),
        ("worst", -1.0),
        ("hated", -0.9),
        ("hate", -0.8),
        ("annoying", -0.8),
        ("disappointed", -0.75),
        ("bad", -0.7),
        ("disappointing", -0.6),
        ("defective", -0.6),
        ("unhappy", -0.6),
        ("useless", -0.5),
        ("faulty", -0.5),
        ("waste", -0.5),
        ("fail", -0.5),
        ("failed", -0.5),
        ("flimsy", -0.5),
        ("fake", -0.5),
        ("overpriced", -0.5),
        ("expensive", -0.5),
        ("uncomfortable", -0.5),
        ("damaged", -0.5),
        ("sad", -0.5),
        ("poor", -0.4),
        ("broken", -0.4),
        ("worse", -0.4),
        ("laggy", -0.4),
        ("weak", -0.375),
        ("slow", -0.3),
        ("problem", -0.3),
        ("mediocre", -0.3),
        ("fragile", -0.3),
        ("lag", -0.3),
        ("issue", -0.2),
        ("issues", -0.2),
        ("noisy", -0.2),
        ("dead", -0.2),
        ("average", -0.15),
        ("pricey", -0.1),
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    [
        ("extremely", 1.5),
        ("absolutely", 1.5),
        ("highly", 1.4),
        ("very", 1.3),
        ("really", 1.3),
        ("super", 1.3),
        ("totally", 1.3),
        ("so", 1.2),
        ("too", 1.2),
        ("quite", 1.1),
        ("pretty", 1.1),
        ("somewhat", 0.7),
        ("slightly", 0.5),
    ]
    .into_iter()
    .collect()
});

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "isn't",
    "isnt", "wasn't", "wasnt", "aren't", "won't", "can't", "cant", "cannot", "hardly",
];

/// Default [`PolarityScorer`] backed by a built-in English lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut polarities = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = POLARITY.get(*token) else {
                continue;
            };

            let mut polarity = base;

            if let Some(factor) = i.checked_sub(1).and_then(|j| INTENSIFIERS.get(tokens[j])) {
                polarity *= factor;
            }

            let window = &tokens[i.saturating_sub(2)..i];
            if window.iter().any(|t| NEGATIONS.contains(t)) {
                polarity *= -0.5;
            }

            polarities.push(polarity);
        }

        if polarities.is_empty() {
            return 0.0;
        }

        let mean = polarities.iter().sum::<f64>() / polarities.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Label;

    fn label(text: &str) -> Label {
        Label::from_score(LexiconScorer.score(text))
    }

    #[test]
    fn test_positive_review() {
        assert_eq!(label("Great product"), Label::Positive);
        assert_eq!(label("Excellent camera, highly recommended!"), Label::Positive);
    }

    #[test]
    fn test_negative_review() {
        assert_eq!(label("Terrible battery"), Label::Negative);
        assert_eq!(label("Worst purchase, totally useless"), Label::Negative);
    }

    #[test]
    fn test_mixed_review_is_neutral() {
        assert_eq!(LexiconScorer.score("Okay but pricey"), 0.0);
        assert_eq!(label("Okay but pricey"), Label::Neutral);
    }

    #[test]
    fn test_no_lexicon_words() {
        assert_eq!(LexiconScorer.score("The box arrived on Tuesday"), 0.0);
        assert_eq!(LexiconScorer.score(""), 0.0);
    }

    #[test]
    fn test_negation_flips_at_half_strength() {
        let score = LexiconScorer.score("not good");
        assert!((score - (-0.35)).abs() < 1e-9);
        assert_eq!(label("It doesn\u{2019}t feel sturdy"), Label::Negative);
        assert_eq!(label("Not bad at all"), Label::Positive);
    }

    #[test]
    fn test_intensifier_scales() {
        assert!(LexiconScorer.score("very good") > LexiconScorer.score("good"));
        assert!(LexiconScorer.score("slightly slow") > LexiconScorer.score("slow"));
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(LexiconScorer.score("Absolutely perfect"), 1.0);
        assert_eq!(LexiconScorer.score("Extremely awful"), -1.0);
    }
}
