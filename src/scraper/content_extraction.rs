//! Content extraction rules for company pages
//!
//! Each rule looks at one aspect of the parsed document and returns an optional
//! value. Rules never fail: a missing element, a selector that does not parse or
//! unexpected markup simply leaves the corresponding field empty.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::scraper::{CompanyDetails, CompanyInfo, ContactInfo, SocialPlatform};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?[\d\s-]{10,}").expect("phone pattern"));

static FOUNDED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:founded|established|since)\s+in\s+(\d{4})").expect("founded pattern")
});

/// Elements whose text is never shown to a visitor
const HIDDEN_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

const INDUSTRY_KEYWORDS: [&str; 3] = ["industry", "sector", "about us"];

/// Extract structured company information from a page
///
/// # Arguments
///
/// * `html` - The HTML of the company page
///
/// # Returns
///
/// The extracted information. Fields the page does not provide are left empty.
#[instrument(skip(html), fields(html_len = html.len()))]
pub fn extract_company_info(html: &str) -> CompanyInfo {
    let document = Html::parse_document(html);
    let text: Vec<&str> = visible_text_nodes(document.root_element()).collect();

    let info = CompanyInfo {
        title: extract_title(&document).unwrap_or_default(),
        description: extract_description(&document).unwrap_or_default(),
        contact_info: extract_contact_info(&document, &text),
        social_links: extract_social_links(&document),
        metadata: extract_metadata(&document),
        company_details: CompanyDetails {
            industry: extract_industry(&document),
            founded_year: extract_founded_year(&text),
        },
    };

    debug!(
        title = %info.title,
        social_links = info.social_links.len(),
        metadata = info.metadata.len(),
        "Extracted company info"
    );
    info
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", css, e);
            None
        }
    }
}

/// Trimmed, non-empty text nodes under `root` that are not inside script-like elements
fn visible_text_nodes<'a>(root: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    root.descendants().filter_map(|node| {
        let text: &str = node.value().as_text()?;
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_TEXT_ELEMENTS.contains(&e.name()))
        });
        let text = text.trim();
        (!hidden && !text.is_empty()).then_some(text)
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;
    let title = document.select(&title_selector).next()?;
    non_empty(collapse_whitespace(&title.text().collect::<String>()))
}

fn extract_description(document: &Html) -> Option<String> {
    meta_description(document).or_else(|| leading_paragraphs(document))
}

fn meta_description(document: &Html) -> Option<String> {
    let description_selector = selector("meta[name='description']")?;
    let content = document
        .select(&description_selector)
        .next()?
        .value()
        .attr("content")?;
    non_empty(content.trim().to_string())
}

/// Text of the first three paragraphs of the main content region
fn leading_paragraphs(document: &Html) -> Option<String> {
    let region_selector = selector("main, article")?;
    let paragraph_selector = selector("p")?;

    let paragraph_text = |p: ElementRef| p.text().collect::<String>().trim().to_string();
    let paragraphs: Vec<String> = match document.select(&region_selector).next() {
        Some(region) => region
            .select(&paragraph_selector)
            .take(3)
            .map(paragraph_text)
            .collect(),
        None => document
            .select(&paragraph_selector)
            .take(3)
            .map(paragraph_text)
            .collect(),
    };

    let joined = paragraphs.join(" ");
    (!joined.trim().is_empty()).then_some(joined)
}

fn extract_contact_info(document: &Html, text: &[&str]) -> ContactInfo {
    let mut emails = BTreeSet::new();
    let mut phones = BTreeSet::new();

    for chunk in text {
        emails.extend(
            EMAIL_PATTERN
                .find_iter(chunk)
                .map(|m| m.as_str().to_string()),
        );
        phones.extend(
            PHONE_PATTERN
                .find_iter(chunk)
                .map(|m| m.as_str().trim())
                .filter(|phone| phone.chars().any(|c| c.is_ascii_digit()))
                .map(str::to_string),
        );
    }

    ContactInfo {
        emails,
        phones,
        address: extract_address(document),
    }
}

fn extract_address(document: &Html) -> Option<String> {
    let class_selector = selector("[class]")?;
    let element = document.select(&class_selector).find(|element| {
        element
            .value()
            .attr("class")
            .is_some_and(|class| class.to_lowercase().contains("address"))
    })?;
    non_empty(collapse_whitespace(&element.text().collect::<String>()))
}

fn extract_social_links(document: &Html) -> BTreeMap<SocialPlatform, String> {
    let mut links = BTreeMap::new();
    let Some(anchor_selector) = selector("a[href]") else {
        return links;
    };

    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let lowered = href.to_lowercase();
        for platform in SocialPlatform::ALL {
            if lowered.contains(platform.host()) {
                links.entry(platform).or_insert_with(|| href.to_string());
            }
        }
    }
    links
}

fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    // Twitter Card tags are collected after Open Graph ones and win on shared keys
    collect_prefixed_meta(document, "property", "og:", &mut metadata);
    collect_prefixed_meta(document, "name", "twitter:", &mut metadata);
    metadata
}

fn collect_prefixed_meta(
    document: &Html,
    attribute: &str,
    prefix: &str,
    metadata: &mut BTreeMap<String, String>,
) {
    let Some(meta_selector) = selector(&format!("meta[{}]", attribute)) else {
        return;
    };

    for tag in document.select(&meta_selector) {
        let Some(key) = tag
            .value()
            .attr(attribute)
            .and_then(|value| value.strip_prefix(prefix))
            .filter(|key| !key.is_empty())
        else {
            continue;
        };
        let content = tag.value().attr("content").unwrap_or_default();
        metadata.insert(key.to_string(), content.to_string());
    }
}

fn extract_industry(document: &Html) -> Option<String> {
    let section_selector = selector("div, section")?;
    document.select(&section_selector).find_map(|section| {
        let text = visible_text_nodes(section).collect::<Vec<_>>().join(" ");
        let lowered = text.to_lowercase();
        INDUSTRY_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
            .then(|| collapse_whitespace(&text))
    })
}

fn extract_founded_year(text: &[&str]) -> Option<String> {
    text.iter().find_map(|chunk| {
        FOUNDED_PATTERN
            .captures(chunk)
            .and_then(|captures| captures.get(1))
            .map(|year| year.as_str().to_string())
    })
}
