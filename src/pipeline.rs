//! Orchestrates one product analysis: session → pages → sentiment → verdict.

use crate::config::Config;
use crate::extract::{normalize, Origin, PageContentLocator, ReviewSet, TextFragment};
use crate::pagination::{PageSource, PaginationWalker, WalkEnd};
use crate::sentiment::{LexiconScorer, PolarityScorer, SentimentClassifier, SentimentResult};
use crate::session::{RenderingSession, SessionError, SessionFactory, SessionGuard};
use crate::site::{Site, SiteStrategy};
use crate::verdict::{Decision, Policy, Tally, VerdictAggregator};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prefix of fragments produced from a product's aggregate rating.
pub const RATING_SUMMARY_PREFIX: &str = "Product Rating: ";

/// Errors surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No rendering session could be acquired; nothing was attempted.
    #[error("Rendering session unavailable: {0}")]
    SessionUnavailable(#[source] SessionError),

    #[error("Unsupported product URL: {0}. Supported sites: amazon.*, flipkart.com")]
    UnsupportedTarget(String),
}

/// A product page to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTarget {
    pub url: String,
    pub site: Site,
}

impl ProductTarget {
    /// Detects the site from the URL host.
    pub fn parse(url: &str) -> Result<Self, PipelineError> {
        let url = url.trim();
        Site::from_url(url)
            .map(|site| Self::with_site(url, site))
            .ok_or_else(|| PipelineError::UnsupportedTarget(url.to_string()))
    }

    /// Uses `site` regardless of the URL host.
    pub fn with_site(url: impl Into<String>, site: Site) -> Self {
        Self { url: url.into(), site }
    }
}

/// Tunables for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub page_cap: u32,
    pub min_title_len: usize,
    pub min_body_len: usize,
    pub min_general_len: usize,
    pub ready_timeout: Duration,
    pub scroll_offset: i64,
    pub policy: Policy,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_cap: config.effective_page_cap(),
            min_title_len: config.min_title_len,
            min_body_len: config.min_body_len,
            min_general_len: config.min_general_len,
            ready_timeout: config.ready_timeout(),
            scroll_offset: config.scroll_offset,
            policy: config.policy,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome category of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    Ok,
    NoContent,
    NavigationFailed,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DiagnosticCode::Ok => "ok",
            DiagnosticCode::NoContent => "no-content",
            DiagnosticCode::NavigationFailed => "navigation-failed",
        };
        write!(f, "{}", code)
    }
}

/// What happened on one visited page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub page: u32,
    pub url: Option<String>,
    /// False when the readiness wait failed or timed out.
    pub ready: bool,
    /// Newly added titles.
    pub titles: usize,
    /// Newly added bodies, including general-text and rating-summary fragments.
    pub bodies: usize,
    pub general_text: bool,
    pub rating_summary: bool,
}

/// Run diagnostics, returned as a value for the caller to surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub code: DiagnosticCode,
    pub site: Site,
    pub target: String,
    /// Review listing reached through the product page's reviews link.
    pub reviews_page: Option<String>,
    pub pages_visited: u32,
    pub walk_end: Option<WalkEnd>,
    pub pages: Vec<PageReport>,
    /// Direct review URL tried after an empty walk.
    pub fallback_url: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostics {
    fn new(target: &ProductTarget) -> Self {
        Self {
            code: DiagnosticCode::Ok,
            site: target.site,
            target: target.url.clone(),
            reviews_page: None,
            pages_visited: 0,
            walk_end: None,
            pages: Vec::new(),
            fallback_url: None,
            notes: Vec::new(),
        }
    }
}

/// Product details read from the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductInfo {
    pub name: Option<String>,
    /// Price as displayed, currency symbol included.
    pub price: Option<String>,
}

/// Result of [`ReviewPipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub product: ProductInfo,
    /// Review bodies and rating-summary fragments.
    pub reviews: ReviewSet,
    pub titles: ReviewSet,
    /// Bodies first, then titles.
    pub results: Vec<SentimentResult>,
    pub decision: Decision,
    pub diagnostics: Diagnostics,
}

impl ReviewReport {
    fn navigation_failed(diagnostics: Diagnostics) -> Self {
        Self {
            product: ProductInfo::default(),
            reviews: ReviewSet::new(),
            titles: ReviewSet::new(),
            results: Vec::new(),
            decision: Decision::navigation_failed(),
            diagnostics,
        }
    }

    pub fn tally(&self) -> Tally {
        Tally::from_results(&self.results)
    }
}

/// Runs the extraction, classification and verdict steps for one product.
pub struct ReviewPipeline<F, P = LexiconScorer> {
    factory: F,
    options: PipelineOptions,
    classifier: SentimentClassifier<P>,
    aggregator: VerdictAggregator,
}

impl<F: SessionFactory> ReviewPipeline<F> {
    pub fn new(factory: F, options: PipelineOptions) -> Self {
        let aggregator = VerdictAggregator::new(options.policy);
        Self { factory, options, classifier: SentimentClassifier::default(), aggregator }
    }
}

impl<F: SessionFactory, P: PolarityScorer> ReviewPipeline<F, P> {
    /// Replaces the polarity scorer.
    pub fn with_scorer<Q: PolarityScorer>(self, scorer: Q) -> ReviewPipeline<F, Q> {
        ReviewPipeline {
            factory: self.factory,
            options: self.options,
            classifier: SentimentClassifier::new(scorer),
            aggregator: self.aggregator,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Analyzes one product.
    ///
    /// Only a failure to acquire a session is an error. Every other failure
    /// is reported through the decision and the diagnostics. The session is
    /// released before this returns, on every path.
    pub async fn run(&self, target: &ProductTarget) -> Result<ReviewReport, PipelineError> {
        let session = self.factory.open().await.map_err(PipelineError::SessionUnavailable)?;
        let mut session = SessionGuard::new(session);
        let strategy = target.site.strategy();
        let mut diagnostics = Diagnostics::new(target);

        info!("Analyzing {} product: {}", target.site, target.url);

        if let Err(e) = session.navigate(&target.url).await {
            warn!("Initial navigation failed: {}", e);
            diagnostics.code = DiagnosticCode::NavigationFailed;
            diagnostics.notes.push(e.to_string());
            return Ok(ReviewReport::navigation_failed(diagnostics));
        }

        let controls = PageContentLocator::new(0);
        let product = product_info(&mut *session, strategy, &controls).await;
        if let Some(name) = &product.name {
            debug!("Product: {}", name);
        }

        open_reviews(&mut *session, strategy, &controls, &mut diagnostics).await;

        let mut pages = ReviewPages {
            session: &mut *session,
            strategy,
            options: &self.options,
            content: PageContentLocator::new(self.options.scroll_offset),
            controls,
            titles: ReviewSet::new(),
            reviews: ReviewSet::new(),
            pages: Vec::new(),
        };

        let outcome = PaginationWalker::new(self.options.page_cap).walk(&mut pages).await;
        diagnostics.pages_visited = outcome.pages_visited;
        diagnostics.walk_end = Some(outcome.end);

        if pages.is_empty() {
            pages.try_direct_reviews(target, outcome.pages_visited + 1, &mut diagnostics).await;
        }

        let ReviewPages { titles, reviews, pages, .. } = pages;
        diagnostics.pages = pages;

        if titles.is_empty() && reviews.is_empty() {
            diagnostics.code = DiagnosticCode::NoContent;
        }

        let results = self.classifier.classify_all(reviews.iter().chain(titles.iter()));
        let decision = self.aggregator.aggregate(&results);

        info!(
            "Classified {} reviews and {} titles: {}",
            reviews.len(),
            titles.len(),
            decision.label().as_str()
        );

        Ok(ReviewReport { product, reviews, titles, results, decision, diagnostics })
    }
}

async fn product_info<S: RenderingSession>(
    session: &mut S,
    strategy: &dyn SiteStrategy,
    locator: &PageContentLocator,
) -> ProductInfo {
    let name = locator.locate(session, strategy.product_name()).await.texts.into_iter().next();
    let price = locator.locate(session, strategy.product_price()).await.texts.into_iter().next();
    ProductInfo { name, price }
}

/// Follows the product page's reviews link when the target is not already
/// a review listing. Stays on the current page when there is none.
async fn open_reviews<S: RenderingSession>(
    session: &mut S,
    strategy: &dyn SiteStrategy,
    locator: &PageContentLocator,
    diagnostics: &mut Diagnostics,
) {
    let current = session.current_url().unwrap_or(&diagnostics.target).to_string();
    if strategy.is_reviews_page(&current) {
        debug!("Already on a review listing");
        return;
    }

    let Some(link) = locator.find_control(session, strategy.reviews_link(), None).await else {
        debug!("No reviews link, extracting from the product page");
        return;
    };

    match session.activate(&link).await {
        Ok(()) => {
            diagnostics.reviews_page = session.current_url().map(str::to_string);
            debug!("Opened review listing: {:?}", diagnostics.reviews_page);
        }
        Err(e) => {
            warn!("Could not open the reviews link: {}", e);
            diagnostics.notes.push(format!("reviews link: {}", e));
        }
    }
}

/// Review pages of one run, with the cumulative sets they feed.
struct ReviewPages<'a, S: RenderingSession> {
    session: &'a mut S,
    strategy: &'static dyn SiteStrategy,
    options: &'a PipelineOptions,
    content: PageContentLocator,
    controls: PageContentLocator,
    titles: ReviewSet,
    reviews: ReviewSet,
    pages: Vec<PageReport>,
}

impl<S: RenderingSession> ReviewPages<'_, S> {
    fn is_empty(&self) -> bool {
        self.titles.is_empty() && self.reviews.is_empty()
    }

    async fn wait_until_ready(&mut self) -> bool {
        let rule = self.strategy.ready();
        let timeout = self.options.ready_timeout;

        match tokio::time::timeout(timeout, self.session.wait_for_ready(rule, timeout)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!("Page not ready: {}", e);
                false
            }
            Err(_) => {
                debug!("Page not ready after {:?}", timeout);
                false
            }
        }
    }

    /// Navigates to the site's direct review URL and extracts once more.
    async fn try_direct_reviews(
        &mut self,
        target: &ProductTarget,
        page: u32,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(url) = self.strategy.reviews_url(&target.url) else {
            return;
        };
        if self.session.current_url() == Some(url.as_str()) {
            return;
        }

        info!("Nothing found, trying direct review URL: {}", url);
        diagnostics.fallback_url = Some(url.clone());

        match self.session.navigate(&url).await {
            Ok(()) => {
                self.extract(page).await;
            }
            Err(e) => {
                warn!("Direct review URL failed: {}", e);
                diagnostics.notes.push(format!("direct reviews: {}", e));
            }
        }
    }
}

#[async_trait]
impl<'a, S: RenderingSession> PageSource for ReviewPages<'a, S> {
    async fn extract(&mut self, page: u32) -> Vec<TextFragment> {
        let mut report = PageReport {
            page,
            url: self.session.current_url().map(str::to_string),
            ready: self.wait_until_ready().await,
            titles: 0,
            bodies: 0,
            general_text: false,
            rating_summary: false,
        };

        if !report.ready {
            self.pages.push(report);
            return Vec::new();
        }

        let located = self.content.locate(&mut *self.session, self.strategy.review_titles()).await;
        let titles = normalize(located.texts, Origin::Title, self.options.min_title_len);

        let located = self.content.locate(&mut *self.session, self.strategy.review_bodies()).await;
        let mut bodies = normalize(located.texts, Origin::Body, self.options.min_body_len);

        if bodies.is_empty() {
            let rules = self.strategy.general_text();
            let located = self.content.locate(&mut *self.session, rules).await;
            bodies = normalize(located.texts, Origin::GeneralText, self.options.min_general_len);
            report.general_text = !bodies.is_empty();
        }

        if bodies.is_empty() {
            let rules = self.strategy.rating_summary();
            let summary = self.content.locate(&mut *self.session, rules).await;
            bodies = summary
                .texts
                .into_iter()
                .map(|text| format!("{}{}", RATING_SUMMARY_PREFIX, text))
                .map(|text| TextFragment::new(text, Origin::RatingSummary))
                .collect();
            report.rating_summary = !bodies.is_empty();
        }

        let mut added = self.reviews.dedupe(bodies);
        let added_titles = self.titles.dedupe(titles);

        report.bodies = added.len();
        report.titles = added_titles.len();
        debug!("Page {}: {} new bodies, {} new titles", page, report.bodies, report.titles);
        self.pages.push(report);

        added.extend(added_titles);
        added
    }

    async fn advance(&mut self) -> bool {
        let control = self
            .controls
            .find_control(&mut *self.session, self.strategy.next_page(), self.strategy.next_label())
            .await;

        let Some(control) = control else {
            debug!("No next page control");
            return false;
        };

        match self.session.activate(&control).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Next page failed: {}", e);
                false
            }
        }
    }
}
