//! Reduction of per-fragment sentiment labels into a buying decision.

use crate::sentiment::{Label, SentimentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percentage of positive fragments at or above which the verdict is Buy.
pub const BUY_PERCENT: usize = 60;
/// Percentage of negative fragments at or above which the verdict is Don't Buy.
pub const DONT_BUY_PERCENT: usize = 40;

/// Aggregation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Buy at >= 60% positive, Don't Buy at >= 40% negative, else Caution.
    #[default]
    Percentage,
    /// Buy when positives outnumber negatives, Don't Buy on the reverse,
    /// Neutral on a tie.
    CountMajority,
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "percentage" | "pct" => Ok(Policy::Percentage),
            "count-majority" | "majority" => Ok(Policy::CountMajority),
            _ => Err(format!("Unknown policy: {}. Use: percentage, count-majority", s)),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Percentage => write!(f, "percentage"),
            Policy::CountMajority => write!(f, "count-majority"),
        }
    }
}

/// Label counts over a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl Tally {
    pub fn from_results(results: &[SentimentResult]) -> Self {
        results.iter().fold(Tally::default(), |mut tally, r| {
            match r.label {
                Label::Positive => tally.positive += 1,
                Label::Negative => tally.negative += 1,
                Label::Neutral => tally.neutral += 1,
            }
            tally.total += 1;
            tally
        })
    }

    fn pct(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn positive_pct(&self) -> f64 {
        self.pct(self.positive)
    }

    pub fn negative_pct(&self) -> f64 {
        self.pct(self.negative)
    }

    pub fn neutral_pct(&self) -> f64 {
        self.pct(self.neutral)
    }

    /// `count / total >= percent / 100`, compared in integers.
    fn reaches(&self, count: usize, percent: usize) -> bool {
        count * 100 >= percent * self.total
    }
}

/// Why no verdict could be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InconclusiveReason {
    NoContent,
    NavigationFailed,
}

/// Structured decision label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionLabel {
    Buy,
    DontBuy,
    Caution,
    Neutral,
    Inconclusive,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLabel::Buy => "Buy",
            DecisionLabel::DontBuy => "Don't Buy",
            DecisionLabel::Caution => "Caution",
            DecisionLabel::Neutral => "Neutral",
            DecisionLabel::Inconclusive => "Inconclusive",
        }
    }
}

/// Final verdict for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum Decision {
    Buy { count: usize, total: usize, pct: f64 },
    DontBuy { count: usize, total: usize, pct: f64 },
    Caution { positive_pct: f64, negative_pct: f64, neutral_pct: f64, total: usize },
    Neutral { positive_pct: f64, negative_pct: f64, neutral_pct: f64, total: usize },
    Inconclusive { reason: InconclusiveReason },
}

impl Decision {
    pub fn label(&self) -> DecisionLabel {
        match self {
            Decision::Buy { .. } => DecisionLabel::Buy,
            Decision::DontBuy { .. } => DecisionLabel::DontBuy,
            Decision::Caution { .. } => DecisionLabel::Caution,
            Decision::Neutral { .. } => DecisionLabel::Neutral,
            Decision::Inconclusive { .. } => DecisionLabel::Inconclusive,
        }
    }

    /// Number of fragments the decision was computed from.
    pub fn total(&self) -> usize {
        match self {
            Decision::Buy { total, .. }
            | Decision::DontBuy { total, .. }
            | Decision::Caution { total, .. }
            | Decision::Neutral { total, .. } => *total,
            Decision::Inconclusive { .. } => 0,
        }
    }

    pub fn navigation_failed() -> Self {
        Decision::Inconclusive { reason: InconclusiveReason::NavigationFailed }
    }
}

/// Legacy text form; callers match on the "Buy ✅" / "Don't Buy ❌" prefixes.
impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Buy { count, total, pct } => {
                write!(f, "Buy ✅ ({}/{} or {:.1}% reviews are positive)", count, total, pct)
            }
            Decision::DontBuy { count, total, pct } => {
                write!(f, "Don't Buy ❌ ({}/{} or {:.1}% reviews are negative)", count, total, pct)
            }
            Decision::Caution { positive_pct, negative_pct, neutral_pct, .. } => write!(
                f,
                "Consider with Caution ⚠️ (Mixed reviews - {:.1}% positive, {:.1}% negative, {:.1}% neutral)",
                positive_pct, negative_pct, neutral_pct
            ),
            Decision::Neutral { positive_pct, negative_pct, neutral_pct, .. } => write!(
                f,
                "Neutral 😐 (Balanced reviews - {:.1}% positive, {:.1}% negative, {:.1}% neutral)",
                positive_pct, negative_pct, neutral_pct
            ),
            Decision::Inconclusive { reason: InconclusiveReason::NoContent } => {
                write!(f, "Inconclusive (no content to analyze)")
            }
            Decision::Inconclusive { reason: InconclusiveReason::NavigationFailed } => {
                write!(f, "Inconclusive (navigation failed)")
            }
        }
    }
}

/// Reduces sentiment results to a [`Decision`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictAggregator {
    policy: Policy,
}

impl VerdictAggregator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn aggregate(&self, results: &[SentimentResult]) -> Decision {
        let tally = Tally::from_results(results);
        if tally.total == 0 {
            return Decision::Inconclusive { reason: InconclusiveReason::NoContent };
        }

        match self.policy {
            Policy::Percentage => Self::by_percentage(&tally),
            Policy::CountMajority => Self::by_majority(&tally),
        }
    }

    fn by_percentage(tally: &Tally) -> Decision {
        if tally.reaches(tally.positive, BUY_PERCENT) {
            Decision::Buy { count: tally.positive, total: tally.total, pct: tally.positive_pct() }
        } else if tally.reaches(tally.negative, DONT_BUY_PERCENT) {
            Decision::DontBuy {
                count: tally.negative,
                total: tally.total,
                pct: tally.negative_pct(),
            }
        } else {
            Decision::Caution {
                positive_pct: tally.positive_pct(),
                negative_pct: tally.negative_pct(),
                neutral_pct: tally.neutral_pct(),
                total: tally.total,
            }
        }
    }

    fn by_majority(tally: &Tally) -> Decision {
        use std::cmp::Ordering;

        match tally.positive.cmp(&tally.negative) {
            Ordering::Greater => Decision::Buy {
                count: tally.positive,
                total: tally.total,
                pct: tally.positive_pct(),
            },
            Ordering::Less => Decision::DontBuy {
                count: tally.negative,
                total: tally.total,
                pct: tally.negative_pct(),
            },
            Ordering::Equal => Decision::Neutral {
                positive_pct: tally.positive_pct(),
                negative_pct: tally.negative_pct(),
                neutral_pct: tally.neutral_pct(),
                total: tally.total,
            },
        }
    }
}
