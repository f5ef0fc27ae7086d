//! CLI command implementations.

pub mod analyze;

pub use analyze::AnalyzeCommand;
