//! Bounded walk over successive review pages.

use crate::extract::TextFragment;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// A sequence of pages the walker can read from and move through.
#[async_trait]
pub trait PageSource: Send {
    /// Extracts the new fragments of the current page (1-based `page`).
    /// A page that is not ready yields nothing.
    async fn extract(&mut self, page: u32) -> Vec<TextFragment>;

    /// Moves to the following page. Returns false when there is no usable
    /// "next" control or activating it failed.
    async fn advance(&mut self) -> bool;
}

/// Walker state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    AtPage(u32),
    Exhausted,
    Capped,
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalkEnd {
    /// No further page was available.
    Exhausted,
    /// The page cap was reached.
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub page: u32,
    pub page_cap: u32,
    pub more_available: bool,
}

impl PaginationState {
    fn new(page_cap: u32) -> Self {
        Self { page: 1, page_cap, more_available: true }
    }
}

/// Everything collected by one walk.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    pub fragments: Vec<TextFragment>,
    pub pages_visited: u32,
    pub end: WalkEnd,
    /// Number of new fragments contributed by each visited page.
    pub per_page: Vec<usize>,
    pub state: PaginationState,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationWalker {
    page_cap: u32,
}

impl PaginationWalker {
    /// A cap of 0 is treated as 1.
    pub fn new(page_cap: u32) -> Self {
        Self { page_cap: page_cap.max(1) }
    }

    pub fn page_cap(&self) -> u32 {
        self.page_cap
    }

    pub async fn walk<P: PageSource + ?Sized>(&self, source: &mut P) -> WalkOutcome {
        let mut pagination = PaginationState::new(self.page_cap);
        let mut fragments = Vec::new();
        let mut per_page = Vec::new();
        let mut state = WalkState::AtPage(1);

        loop {
            match state {
                WalkState::AtPage(n) => {
                    pagination.page = n;

                    let found = source.extract(n).await;
                    debug!("Page {} yielded {} new fragments", n, found.len());
                    per_page.push(found.len());
                    fragments.extend(found);

                    state = if n >= self.page_cap {
                        WalkState::Capped
                    } else if source.advance().await {
                        WalkState::AtPage(n + 1)
                    } else {
                        WalkState::Exhausted
                    };
                    pagination.more_available = matches!(state, WalkState::AtPage(_));
                }
                WalkState::Exhausted | WalkState::Capped => {
                    let end = if state == WalkState::Capped {
                        WalkEnd::Capped
                    } else {
                        WalkEnd::Exhausted
                    };
                    debug!("Walk ended {:?} after {} pages", end, pagination.page);

                    return WalkOutcome {
                        fragments,
                        pages_visited: pagination.page,
                        end,
                        per_page,
                        state: pagination,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source with a fixed list of pages; `always_next` pretends there is
    /// always one more.
    struct ScriptedSource {
        pages: Vec<Vec<&'static str>>,
        always_next: bool,
        current: usize,
        extracted: Vec<u32>,
        advances: u32,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self { pages, always_next: false, current: 0, extracted: Vec::new(), advances: 0 }
        }

        fn endless() -> Self {
            Self { always_next: true, ..Self::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn extract(&mut self, page: u32) -> Vec<TextFragment> {
            self.extracted.push(page);
            self.pages
                .get(self.current)
                .map(|texts| texts.iter().map(|t| TextFragment::body(*t)).collect())
                .unwrap_or_else(|| vec![TextFragment::body(format!("review on page {}", page))])
        }

        async fn advance(&mut self) -> bool {
            self.advances += 1;
            if self.always_next || self.current + 1 < self.pages.len() {
                self.current += 1;
                true
            } else {
                false
            }
        }
    }

    #[tokio::test]
    async fn test_cap_stops_endless_source() {
        let mut source = ScriptedSource::endless();
        let outcome = PaginationWalker::new(3).walk(&mut source).await;

        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(outcome.end, WalkEnd::Capped);
        assert_eq!(source.extracted, vec![1, 2, 3]);
        // No "next" lookup once the cap is reached
        assert_eq!(source.advances, 2);
        assert_eq!(outcome.fragments.len(), 3);
        assert!(!outcome.state.more_available);
    }

    #[tokio::test]
    async fn test_exhausted_before_cap() {
        let mut source = ScriptedSource::new(vec![
            vec!["Great product", "Terrible battery"],
            vec!["Okay but pricey"],
        ]);
        let outcome = PaginationWalker::new(5).walk(&mut source).await;

        assert_eq!(outcome.end, WalkEnd::Exhausted);
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.per_page, vec![2, 1]);
        let texts: Vec<_> = outcome.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Great product", "Terrible battery", "Okay but pricey"]);
    }

    #[tokio::test]
    async fn test_zero_cap_visits_one_page() {
        let mut source = ScriptedSource::endless();
        let walker = PaginationWalker::new(0);
        assert_eq!(walker.page_cap(), 1);

        let outcome = walker.walk(&mut source).await;
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.end, WalkEnd::Capped);
        assert_eq!(source.advances, 0);
    }

    #[tokio::test]
    async fn test_empty_page_still_counts() {
        let mut source = ScriptedSource::new(vec![vec![], vec!["Battery lasts two days"]]);
        let outcome = PaginationWalker::new(3).walk(&mut source).await;

        assert_eq!(outcome.per_page, vec![0, 1]);
        assert_eq!(outcome.fragments.len(), 1);
        assert_eq!(outcome.end, WalkEnd::Exhausted);
    }
}
