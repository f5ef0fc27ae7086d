//! First-match-wins lookup over an ordered list of candidate rules.

use crate::session::{CandidateRule, Element, RenderingSession};
use tracing::{debug, trace, warn};

/// Result of one locate call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    /// Index of the winning rule, `None` when nothing matched.
    pub rule_index: Option<usize>,
    /// Trimmed text of each visible, non-empty match of the winning rule.
    pub texts: Vec<String>,
}

impl Located {
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Locates page content by trying rules strictly in order.
#[derive(Debug, Clone)]
pub struct PageContentLocator {
    scroll_offset: i64,
}

impl PageContentLocator {
    pub fn new(scroll_offset: i64) -> Self {
        Self { scroll_offset }
    }

    /// Returns the usable texts of the first rule with at least one visible,
    /// non-empty match. Results are never merged across rules.
    pub async fn locate<S: RenderingSession>(
        &self,
        session: &mut S,
        rules: &[CandidateRule],
    ) -> Located {
        if self.scroll_offset != 0 {
            if let Err(e) = session.scroll(self.scroll_offset).await {
                debug!("Scroll failed, querying anyway: {}", e);
            }
        }

        for (index, rule) in rules.iter().enumerate() {
            let elements = match session.query(rule).await {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Skipping rule `{}`: {}", rule, e);
                    continue;
                }
            };

            let texts: Vec<String> = elements
                .into_iter()
                .filter(|e| e.visible)
                .map(|e| e.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();

            if !texts.is_empty() {
                debug!("Rule #{} `{}` matched {} elements", index, rule, texts.len());
                return Located { rule_index: Some(index), texts };
            }

            trace!("Rule #{} `{}` matched nothing usable", index, rule);
        }

        Located::default()
    }

    /// Returns the first visible element across `rules` whose text contains
    /// `label` (any visible element when `label` is `None`).
    pub async fn find_control<S: RenderingSession>(
        &self,
        session: &mut S,
        rules: &[CandidateRule],
        label: Option<&str>,
    ) -> Option<Element> {
        for rule in rules {
            let elements = match session.query(rule).await {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Skipping rule `{}`: {}", rule, e);
                    continue;
                }
            };

            let found = elements
                .into_iter()
                .find(|e| e.visible && label.is_none_or(|label| e.text.contains(label)));

            if let Some(element) = found {
                debug!("Control found with `{}`: {}", rule, element.text);
                return Some(element);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Session answering queries from a fixed rule → elements table.
    #[derive(Default)]
    struct TableSession {
        answers: HashMap<String, Result<Vec<Element>, SessionError>>,
        queries: Vec<String>,
        scrolls: Vec<i64>,
    }

    impl TableSession {
        fn answer(mut self, rule: &str, elements: Vec<Element>) -> Self {
            self.answers.insert(rule.to_string(), Ok(elements));
            self
        }

        fn fail(mut self, rule: &str) -> Self {
            self.answers.insert(
                rule.to_string(),
                Err(SessionError::InvalidRule { rule: rule.to_string(), reason: "bad".into() }),
            );
            self
        }
    }

    #[async_trait]
    impl RenderingSession for TableSession {
        async fn navigate(&mut self, _url: &str) -> Result<(), SessionError> {
            Ok(())
        }

        async fn wait_for_ready(
            &mut self,
            _rule: &CandidateRule,
            _timeout: Duration,
        ) -> Result<(), SessionError> {
            Ok(())
        }

        async fn query(&mut self, rule: &CandidateRule) -> Result<Vec<Element>, SessionError> {
            self.queries.push(rule.to_string());
            self.answers.get(rule.as_str()).cloned().unwrap_or(Ok(Vec::new()))
        }

        async fn activate(&mut self, _element: &Element) -> Result<(), SessionError> {
            Ok(())
        }

        async fn scroll(&mut self, offset: i64) -> Result<(), SessionError> {
            self.scrolls.push(offset);
            Ok(())
        }

        fn current_url(&self) -> Option<&str> {
            None
        }

        fn release(&mut self) {}
    }

    fn rules(exprs: &[&'static str]) -> Vec<CandidateRule> {
        exprs.iter().map(|e| CandidateRule::from_static(e)).collect()
    }

    #[tokio::test]
    async fn test_first_rule_with_results_wins() {
        let mut session = TableSession::default()
            .answer(".b", vec![Element::new("from b", true)])
            .answer(".c", vec![Element::new("from c", true)]);

        let located =
            PageContentLocator::new(500).locate(&mut session, &rules(&[".a", ".b", ".c"])).await;

        assert_eq!(located.rule_index, Some(1));
        assert_eq!(located.texts, vec!["from b"]);
        // .c is never consulted once .b wins
        assert_eq!(session.queries, vec![".a", ".b"]);
        assert_eq!(session.scrolls, vec![500]);
    }

    #[tokio::test]
    async fn test_invisible_and_empty_matches_do_not_count() {
        let mut session = TableSession::default()
            .answer(".a", vec![Element::new("hidden", false), Element::new("   ", true)])
            .answer(".b", vec![Element::new(" shown ", true), Element::new("hidden", false)]);

        let located = PageContentLocator::new(0).locate(&mut session, &rules(&[".a", ".b"])).await;

        assert_eq!(located.rule_index, Some(1));
        assert_eq!(located.texts, vec!["shown"]);
        assert!(session.scrolls.is_empty());
    }

    #[tokio::test]
    async fn test_failed_query_is_skipped() {
        let mut session = TableSession::default()
            .fail(".broken")
            .answer(".ok", vec![Element::new("still found", true)]);

        let located =
            PageContentLocator::new(0).locate(&mut session, &rules(&[".broken", ".ok"])).await;

        assert_eq!(located.rule_index, Some(1));
    }

    #[tokio::test]
    async fn test_nothing_found_is_empty() {
        let mut session = TableSession::default();
        let located = PageContentLocator::new(0).locate(&mut session, &rules(&[".a", ".b"])).await;

        assert!(located.is_empty());
        assert_eq!(located.rule_index, None);
    }

    #[tokio::test]
    async fn test_find_control_with_label() {
        let mut session = TableSession::default().answer(
            "a.page",
            vec![
                Element::new("Previous", true).with_handle("/p1"),
                Element::new("Next", false).with_handle("/p3"),
            ],
        );
        session = session
            .answer("nav a", vec![Element::new("Next", true).with_handle("/p3")]);

        let locator = PageContentLocator::new(0);
        let control = locator
            .find_control(&mut session, &rules(&["a.page", "nav a"]), Some("Next"))
            .await
            .unwrap();

        assert_eq!(control.handle.as_deref(), Some("/p3"));
        assert!(control.visible);

        let any = locator.find_control(&mut session, &rules(&["a.page"]), None).await.unwrap();
        assert_eq!(any.text, "Previous");

        assert!(locator.find_control(&mut session, &rules(&[".none"]), None).await.is_none());
    }
}
