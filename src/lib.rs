//! review-verdict - Buy / Don't Buy verdicts from retail product reviews
//!
//! Extracts review titles and bodies from Amazon and Flipkart product pages,
//! classifies their sentiment and reduces the labels to a single decision.

pub mod commands;
pub mod config;
pub mod extract;
pub mod format;
pub mod pagination;
pub mod pipeline;
pub mod sentiment;
pub mod session;
pub mod site;
pub mod verdict;

pub use config::Config;
pub use extract::{Origin, ReviewSet, TextFragment};
pub use pipeline::{PipelineError, PipelineOptions, ProductTarget, ReviewPipeline, ReviewReport};
pub use sentiment::{Label, LexiconScorer, PolarityScorer, SentimentResult};
pub use site::Site;
pub use verdict::{Decision, DecisionLabel, Policy, VerdictAggregator};
