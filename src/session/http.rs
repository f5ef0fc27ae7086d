//! HTTP-backed rendering session using wreq for TLS fingerprint emulation.
//!
//! Pages are fetched once per navigation and queried with CSS selectors.
//! No script runs, so scrolling is a no-op and readiness is decided by the
//! fetched document alone.

use super::{CandidateRule, Element, RenderingSession, SessionError, SessionFactory};
use crate::config::Config;
use async_trait::async_trait;
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Opens [`HttpSession`]s configured from [`Config`].
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    proxy: Option<String>,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpSessionFactory {
    /// Creates a factory with the network settings from `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            proxy: config.proxy.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, SessionError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &self.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)
                .map_err(|e| SessionError::Unavailable(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| SessionError::Unavailable(e.to_string()))?;

        Ok(HttpSession {
            client: Some(client),
            delay_ms: self.delay_ms,
            delay_jitter_ms: self.delay_jitter_ms,
            current_url: None,
            document: String::new(),
            requests: 0,
        })
    }
}

/// A rendering session over plain HTTP fetches.
pub struct HttpSession {
    client: Option<Client>,
    delay_ms: u64,
    delay_jitter_ms: u64,
    current_url: Option<String>,
    document: String,
    requests: u32,
}

impl HttpSession {
    /// Adds a random delay between requests to mimic human browsing.
    async fn delay(&self) {
        if self.delay_ms == 0 || self.requests == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    /// Resolves a link target against the current page.
    fn resolve(&self, href: &str) -> Result<String, SessionError> {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            return Ok(href.to_string());
        }
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return Err(SessionError::Activation(format!("not a navigable link: '{}'", href)));
        }

        let base = self
            .current_url
            .as_deref()
            .ok_or_else(|| SessionError::Activation("no page loaded".to_string()))?;

        if let Some(rest) = href.strip_prefix("//") {
            let scheme = base.split("://").next().unwrap_or("https");
            return Ok(format!("{}://{}", scheme, rest));
        }

        if href.starts_with('/') {
            return Ok(format!("{}{}", origin(base), href));
        }

        let path_end = base.split(['?', '#']).next().unwrap_or(base);
        match path_end.rfind('/') {
            Some(idx) if idx >= origin(base).len() => Ok(format!("{}{}", &path_end[..=idx], href)),
            _ => Ok(format!("{}/{}", origin(base), href)),
        }
    }
}

#[async_trait]
impl RenderingSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.delay().await;

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| SessionError::navigation(url, "session already released"))?;

        info!("Fetching page: {}", url);

        let response = client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| SessionError::navigation(url, e))?;

        self.requests += 1;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). Consider using a proxy or increasing delay.");
        }

        if !status.is_success() {
            return Err(SessionError::navigation(url, format!("status {}", status)));
        }

        let final_url = response.uri().to_string();
        let body = response.text().await.map_err(|e| SessionError::navigation(url, e))?;

        self.current_url = Some(final_url);
        self.document = body;
        Ok(())
    }

    async fn wait_for_ready(
        &mut self,
        rule: &CandidateRule,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        // A fetched document never changes, so an absent match cannot appear later.
        if select(&self.document, rule)?.is_empty() {
            return Err(SessionError::Timeout { rule: rule.to_string(), timeout });
        }
        Ok(())
    }

    async fn query(&mut self, rule: &CandidateRule) -> Result<Vec<Element>, SessionError> {
        select(&self.document, rule)
    }

    async fn activate(&mut self, element: &Element) -> Result<(), SessionError> {
        let href = element
            .handle
            .as_deref()
            .ok_or_else(|| SessionError::Activation(format!("'{}' has no link", element.text)))?;
        let url = self.resolve(href)?;
        self.navigate(&url).await
    }

    async fn scroll(&mut self, offset: i64) -> Result<(), SessionError> {
        trace!("Scroll by {} ignored for static document", offset);
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    fn release(&mut self) {
        self.client = None;
        self.current_url = None;
        self.document.clear();
        debug!("HTTP session closed after {} requests", self.requests);
    }
}

/// Evaluates a CSS rule against an HTML document.
fn select(document: &str, rule: &CandidateRule) -> Result<Vec<Element>, SessionError> {
    let selector = Selector::parse(rule.as_str()).map_err(|e| SessionError::InvalidRule {
        rule: rule.to_string(),
        reason: e.to_string(),
    })?;

    let html = Html::parse_document(document);
    let elements = html
        .select(&selector)
        .map(|e| Element {
            text: e.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" "),
            visible: is_visible(e),
            handle: link_target(e),
        })
        .collect();

    Ok(elements)
}

/// An element is visible when neither it nor any ancestor is hidden, and it
/// is not disabled.
fn is_visible(element: ElementRef) -> bool {
    let value = element.value();
    if value.attr("disabled").is_some() || value.attr("aria-disabled") == Some("true") {
        return false;
    }

    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|e| !is_hidden(e))
}

fn is_hidden(element: ElementRef) -> bool {
    let value = element.value();

    if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
        return true;
    }

    if matches!(value.name(), "script" | "style" | "template" | "noscript") {
        return true;
    }

    value.attr("style").is_some_and(|style| {
        let style: String =
            style.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

/// Link target of the element itself or of its nearest enclosing anchor.
fn link_target(element: ElementRef) -> Option<String> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find_map(|e| e.value().attr("href"))
        .map(String::from)
}

/// `scheme://host[:port]` part of an absolute URL.
pub(crate) fn origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(idx) => &url[..after_scheme + idx],
        None => url,
    }
}
