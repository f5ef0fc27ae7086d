//! Review text extraction: rule-ordered location, normalization and dedup.

pub mod locator;
pub mod normalize;

pub use locator::{Located, PageContentLocator};
pub use normalize::{normalize, ReviewSet};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where on the page a fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Title,
    Body,
    /// Free text picked up when no review markup matched.
    GeneralText,
    RatingSummary,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::Title => "title",
            Origin::Body => "body",
            Origin::GeneralText => "general-text",
            Origin::RatingSummary => "rating-summary",
        };
        write!(f, "{}", name)
    }
}

/// A single unit of extracted review text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub origin: Origin,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self { text: text.into(), origin }
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Title)
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Body)
    }
}
