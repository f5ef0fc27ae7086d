//! Trimming, length filtering and exact-string deduplication.

use super::{Origin, TextFragment};
use serde::Serialize;
use std::collections::HashSet;

/// Trims each string and drops those shorter than `min_length` characters.
pub fn normalize<I, S>(raw: I, origin: Origin, min_length: usize) -> Vec<TextFragment>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|text| {
            let text = text.as_ref().trim();
            (!text.is_empty() && text.chars().count() >= min_length)
                .then(|| TextFragment::new(text, origin))
        })
        .collect()
}

/// Unique fragments accumulated across the pages of one product.
///
/// Membership is exact string equality after trimming; the first copy seen
/// is kept.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ReviewSet {
    fragments: Vec<TextFragment>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl ReviewSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the fragments not already present and returns the newly added ones.
    pub fn dedupe(&mut self, incoming: impl IntoIterator<Item = TextFragment>) -> Vec<TextFragment> {
        let mut added = Vec::new();

        for mut fragment in incoming {
            let trimmed = fragment.text.trim();
            if trimmed.len() != fragment.text.len() {
                fragment.text = trimmed.to_string();
            }

            if self.seen.insert(fragment.text.clone()) {
                self.fragments.push(fragment.clone());
                added.push(fragment);
            }
        }

        added
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(text.trim())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextFragment> {
        self.fragments.iter()
    }

    /// Fragment texts in first-seen order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.text.as_str())
    }
}

impl FromIterator<TextFragment> for ReviewSet {
    fn from_iter<T: IntoIterator<Item = TextFragment>>(iter: T) -> Self {
        let mut set = ReviewSet::new();
        set.dedupe(iter);
        set
    }
}
