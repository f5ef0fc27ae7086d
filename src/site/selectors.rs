//! Ordered CSS rule lists for each supported site.
//!
//! Rules inside a list are tried in order and the first one that yields a
//! visible, non-empty match wins. Retail sites rename their classes often;
//! when extraction starts returning nothing, capture an HTML sample, prepend
//! the new rule and keep the old ones as fallbacks.

use crate::session::CandidateRule;

const fn rule(expr: &'static str) -> CandidateRule {
    CandidateRule::from_static(expr)
}

/// Amazon product and review pages.
pub mod amazon {
    use super::*;

    /// Present once review content (or at least the product) has rendered.
    pub static READY: CandidateRule =
        rule("[data-hook='review'], #cm_cr-review_list, #productTitle, #reviewsMedley");

    pub static REVIEW_TITLES: &[CandidateRule] = &[
        rule("a[data-hook='review-title'] > span:last-child"),
        rule("a[data-hook='review-title']"),
        rule("span[data-hook='review-title']"),
        rule(".review-title"),
    ];

    pub static REVIEW_BODIES: &[CandidateRule] = &[
        rule("span[data-hook='review-body'] > span"),
        rule("span[data-hook='review-body']"),
        rule(".review-text-content span"),
        rule(".review-text"),
    ];

    /// Any block of free text, for pages whose review markup is unknown.
    pub static GENERAL_TEXT: &[CandidateRule] = &[
        rule("#cm_cr-review_list div.a-row > span"),
        rule("div[id^='customer_review'] span"),
        rule("div.a-section > p"),
    ];

    pub static RATING_SUMMARY: &[CandidateRule] = &[
        rule("span[data-hook='rating-out-of-text']"),
        rule("i[data-hook='average-star-rating'] span.a-icon-alt"),
        rule("#acrPopover span.a-icon-alt"),
    ];

    pub static NEXT_PAGE: &[CandidateRule] =
        &[rule("li.a-last a"), rule(".a-pagination .a-last a")];

    pub static REVIEWS_LINK: &[CandidateRule] = &[
        rule("a[data-hook='see-all-reviews-link-foot']"),
        rule("#reviews-medley-footer a"),
        rule("a[href*='/product-reviews/']"),
    ];

    pub static PRODUCT_NAME: &[CandidateRule] =
        &[rule("#productTitle"), rule("#title span"), rule(".product-title-word-break")];

    pub static PRODUCT_PRICE: &[CandidateRule] = &[
        rule("#corePrice_feature_div .a-price .a-offscreen"),
        rule("#priceblock_ourprice"),
        rule("#priceblock_dealprice"),
        rule(".a-price .a-offscreen"),
    ];
}

/// Flipkart product and review pages.
pub mod flipkart {
    use super::*;

    pub static READY: CandidateRule =
        rule("div.t-ZTKy, div._6K-7Co, div._27M-vq, span.B_NuCI, h1.yhB1nd");

    pub static REVIEW_TITLES: &[CandidateRule] = &[
        rule("p._2-N8zT"),
        rule("div._2sc7ZR._2V5EHH"),
        rule("div[class*='_2sc7ZR']"),
        rule("p[class*='_2-N8zT']"),
        rule("div[class*='t-ZTKy'] > div:first-child"),
    ];

    pub static REVIEW_BODIES: &[CandidateRule] = &[
        rule("div.t-ZTKy"),
        rule("div._6K-7Co"),
        rule("div[class*='t-ZTKy']"),
        rule("div[class*='_6K-7Co']"),
    ];

    pub static GENERAL_TEXT: &[CandidateRule] = &[
        rule("div.col > div > div"),
        rule("div[class*='col'] div"),
        rule("div > p"),
    ];

    pub static RATING_SUMMARY: &[CandidateRule] =
        &[rule("div._3LWZlK"), rule("div[class*='_3LWZlK']")];

    /// Previous and Next share these classes; see [`NEXT_LABEL`].
    pub static NEXT_PAGE: &[CandidateRule] = &[
        rule("a._1LKTO3"),
        rule("nav a[class*='_1LKTO3']"),
        rule("nav a"),
    ];

    pub const NEXT_LABEL: &str = "Next";

    pub static REVIEWS_LINK: &[CandidateRule] = &[
        rule("a[href*='/product-reviews/']"),
        rule("div._3UAT2v"),
        rule("div[class*='_3UAT2v']"),
    ];

    pub static PRODUCT_NAME: &[CandidateRule] = &[
        rule("span.B_NuCI"),
        rule("h1.yhB1nd"),
        rule("span[class*='B_NuCI']"),
        rule("h1[class*='yhB1nd']"),
    ];

    pub static PRODUCT_PRICE: &[CandidateRule] = &[
        rule("div._30jeq3._16Jk6d"),
        rule("div[class*='_30jeq3']"),
        rule("div[class*='price']"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn all_rules() -> Vec<&'static CandidateRule> {
        let lists: [&[CandidateRule]; 16] = [
            amazon::REVIEW_TITLES,
            amazon::REVIEW_BODIES,
            amazon::GENERAL_TEXT,
            amazon::RATING_SUMMARY,
            amazon::NEXT_PAGE,
            amazon::REVIEWS_LINK,
            amazon::PRODUCT_NAME,
            amazon::PRODUCT_PRICE,
            flipkart::REVIEW_TITLES,
            flipkart::REVIEW_BODIES,
            flipkart::GENERAL_TEXT,
            flipkart::RATING_SUMMARY,
            flipkart::NEXT_PAGE,
            flipkart::REVIEWS_LINK,
            flipkart::PRODUCT_NAME,
            flipkart::PRODUCT_PRICE,
        ];
        let mut rules: Vec<_> = lists.iter().flat_map(|l| l.iter()).collect();
        rules.push(&amazon::READY);
        rules.push(&flipkart::READY);
        rules
    }

    #[test]
    fn test_selectors_compile() {
        for rule in all_rules() {
            assert!(Selector::parse(rule.as_str()).is_ok(), "rule does not parse: {}", rule);
        }
    }

    #[test]
    fn test_amazon_review_matching() {
        let html = Html::parse_document(
            r#"<div data-hook="review">
                <a data-hook="review-title"><i class="a-icon-star"><span class="a-icon-alt">5.0 out of 5 stars</span></i><span>Excellent build</span></a>
                <span data-hook="review-body"><span>Battery lasts two days.</span></span>
            </div>"#,
        );

        let selector = Selector::parse(amazon::REVIEW_TITLES[0].as_str()).unwrap();
        let titles: Vec<String> =
            html.select(&selector).map(|e| e.text().collect::<String>()).collect();
        assert_eq!(titles, vec!["Excellent build"]);
    }
}
