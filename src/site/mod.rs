//! Supported retail sites and the per-site rule strategies.

pub mod selectors;

use crate::session::http::origin;
use crate::session::CandidateRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supplies the ordered rule lists the pipeline uses on one site.
pub trait SiteStrategy: Send + Sync {
    fn site(&self) -> Site;

    /// Rule that matches once review content has rendered.
    fn ready(&self) -> &CandidateRule;

    fn review_titles(&self) -> &[CandidateRule];

    fn review_bodies(&self) -> &[CandidateRule];

    /// Broad rules for substantial free text, tried when a page yields no
    /// review bodies.
    fn general_text(&self) -> &[CandidateRule];

    /// Tried only when a page yields neither review bodies nor general text.
    fn rating_summary(&self) -> &[CandidateRule];

    fn next_page(&self) -> &[CandidateRule];

    /// Text the "next" control must contain, for sites whose pagination
    /// rules also match the "previous" control.
    fn next_label(&self) -> Option<&str> {
        None
    }

    /// Link from a product page to its full review listing.
    fn reviews_link(&self) -> &[CandidateRule];

    fn product_name(&self) -> &[CandidateRule];

    fn product_price(&self) -> &[CandidateRule];

    /// Returns true if `url` already points at a review listing.
    fn is_reviews_page(&self, url: &str) -> bool {
        url.contains("/product-reviews/")
    }

    /// Review listing URL derived from a product URL, when the site has one.
    fn reviews_url(&self, product_url: &str) -> Option<String>;
}

/// Supported sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Amazon,
    Flipkart,
}

impl Site {
    /// Detects the site from a product URL's host.
    pub fn from_url(url: &str) -> Option<Self> {
        let host = host(url)?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        if host.starts_with("amazon.") || host.contains(".amazon.") {
            Some(Site::Amazon)
        } else if host == "flipkart.com" || host.ends_with(".flipkart.com") {
            Some(Site::Flipkart)
        } else {
            None
        }
    }

    /// Returns the domain family this site is recognised by.
    pub fn domain(&self) -> &'static str {
        match self {
            Site::Amazon => "amazon.*",
            Site::Flipkart => "flipkart.com",
        }
    }

    /// Returns the rule strategy for this site.
    pub fn strategy(&self) -> &'static dyn SiteStrategy {
        match self {
            Site::Amazon => &Amazon,
            Site::Flipkart => &Flipkart,
        }
    }

    /// Returns all supported sites.
    pub fn all() -> &'static [Site] {
        &[Site::Amazon, Site::Flipkart]
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Site::Amazon => "amazon",
            Site::Flipkart => "flipkart",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Site {
    type Err = SiteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amazon" | "amz" => Ok(Site::Amazon),
            "flipkart" | "fk" => Ok(Site::Flipkart),
            _ => Err(SiteParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteParseError(String);

impl fmt::Display for SiteParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown site '{}'. Valid sites: amazon, flipkart", self.0)
    }
}

impl std::error::Error for SiteParseError {}

/// Amazon (any regional storefront).
pub struct Amazon;

impl SiteStrategy for Amazon {
    fn site(&self) -> Site {
        Site::Amazon
    }

    fn ready(&self) -> &CandidateRule {
        &selectors::amazon::READY
    }

    fn review_titles(&self) -> &[CandidateRule] {
        selectors::amazon::REVIEW_TITLES
    }

    fn review_bodies(&self) -> &[CandidateRule] {
        selectors::amazon::REVIEW_BODIES
    }

    fn general_text(&self) -> &[CandidateRule] {
        selectors::amazon::GENERAL_TEXT
    }

    fn rating_summary(&self) -> &[CandidateRule] {
        selectors::amazon::RATING_SUMMARY
    }

    fn next_page(&self) -> &[CandidateRule] {
        selectors::amazon::NEXT_PAGE
    }

    fn reviews_link(&self) -> &[CandidateRule] {
        selectors::amazon::REVIEWS_LINK
    }

    fn product_name(&self) -> &[CandidateRule] {
        selectors::amazon::PRODUCT_NAME
    }

    fn product_price(&self) -> &[CandidateRule] {
        selectors::amazon::PRODUCT_PRICE
    }

    fn reviews_url(&self, product_url: &str) -> Option<String> {
        let asin = asin_from_url(product_url)?;
        Some(format!("{}/product-reviews/{}", origin(product_url), asin))
    }
}

/// Flipkart.
pub struct Flipkart;

impl SiteStrategy for Flipkart {
    fn site(&self) -> Site {
        Site::Flipkart
    }

    fn ready(&self) -> &CandidateRule {
        &selectors::flipkart::READY
    }

    fn review_titles(&self) -> &[CandidateRule] {
        selectors::flipkart::REVIEW_TITLES
    }

    fn review_bodies(&self) -> &[CandidateRule] {
        selectors::flipkart::REVIEW_BODIES
    }

    fn general_text(&self) -> &[CandidateRule] {
        selectors::flipkart::GENERAL_TEXT
    }

    fn rating_summary(&self) -> &[CandidateRule] {
        selectors::flipkart::RATING_SUMMARY
    }

    fn next_page(&self) -> &[CandidateRule] {
        selectors::flipkart::NEXT_PAGE
    }

    fn next_label(&self) -> Option<&str> {
        Some(selectors::flipkart::NEXT_LABEL)
    }

    fn reviews_link(&self) -> &[CandidateRule] {
        selectors::flipkart::REVIEWS_LINK
    }

    fn product_name(&self) -> &[CandidateRule] {
        selectors::flipkart::PRODUCT_NAME
    }

    fn product_price(&self) -> &[CandidateRule] {
        selectors::flipkart::PRODUCT_PRICE
    }

    fn reviews_url(&self, product_url: &str) -> Option<String> {
        let (_, rest) = product_url.split_once("/p/")?;
        let id = rest.split(['?', '#', '/']).next().filter(|id| !id.is_empty())?;
        Some(format!("{}/product-reviews/{}", origin(product_url), id))
    }
}

/// Extracts a 10-character ASIN following `/dp/`, `/gp/product/` or `/product-reviews/`.
fn asin_from_url(url: &str) -> Option<String> {
    ["/dp/", "/gp/product/", "/product-reviews/"].iter().find_map(|marker| {
        let (_, rest) = url.split_once(marker)?;
        let candidate = rest.split(['/', '?', '#']).next()?.to_uppercase();
        (candidate.len() == 10 && candidate.chars().all(|c| c.is_ascii_alphanumeric()))
            .then_some(candidate)
    })
}

/// Host part of an absolute URL.
fn host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.rsplit('@').next()?;
    let host = host.split(':').next()?;
    (!host.is_empty()).then_some(host)
}
