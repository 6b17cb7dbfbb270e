//! # Company Website Scraper
//!
//! This module retrieves a company's website and turns it into a structured
//! [`CompanyInfo`] record. It is the only part of the pipeline that talks to the
//! company's own servers.
//!
//! ## Key Components
//!
//! - `ScraperService`: Fetches pages behind a shared throttle and caches the
//!   extracted records in memory
//! - `ScraperConfig`: Cache lifetime, capacity, throttle interval and HTTP options
//! - `extract_company_info`: Heuristic extraction rules over the fetched HTML
//! - `ResponseCache`: On-disk cache of raw HTTP responses that survives restarts
//!
//! ## Features
//!
//! - One global minimum interval between outbound fetches, across all hosts
//! - Time-bounded, capacity-bounded in-memory cache keyed by URL
//! - Best-effort extraction: every rule degrades to an empty field instead of failing

mod cache;
mod config;
mod content_extraction;
mod error;
mod fetcher;
pub mod http_cache;

pub use cache::CompanyInfoCache;
pub use config::{ScraperConfig, ScraperConfigBuilder};
pub use content_extraction::extract_company_info;
pub use error::ScrapeError;
pub use fetcher::ScraperService;
pub use http_cache::{CachedResponse, ResponseCache, ResponseCacheConfig};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Social networks recognised in page links
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Linkedin,
    Twitter,
    Facebook,
    Instagram,
}

impl SocialPlatform {
    /// All recognised platforms, in lookup order
    pub const ALL: [SocialPlatform; 4] = [
        SocialPlatform::Linkedin,
        SocialPlatform::Twitter,
        SocialPlatform::Facebook,
        SocialPlatform::Instagram,
    ];

    /// Host fragment identifying links to this platform
    pub fn host(self) -> &'static str {
        match self {
            SocialPlatform::Linkedin => "linkedin.com",
            SocialPlatform::Twitter => "twitter.com",
            SocialPlatform::Facebook => "facebook.com",
            SocialPlatform::Instagram => "instagram.com",
        }
    }
}

/// Contact details found on a company page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Email addresses, de-duplicated
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub emails: BTreeSet<String>,

    /// Phone numbers, de-duplicated
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub phones: BTreeSet<String>,

    /// Street address from the first address-like element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Company facts inferred from page text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<String>,
}

/// Structured information extracted from a company's website
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Page title, whitespace-collapsed; empty when the page has none
    pub title: String,

    /// Meta description or leading paragraphs; empty when neither exists
    pub description: String,

    pub contact_info: ContactInfo,

    /// First link found per social platform
    pub social_links: BTreeMap<SocialPlatform, String>,

    /// Open Graph and Twitter Card tags with their prefixes stripped
    pub metadata: BTreeMap<String, String>,

    pub company_details: CompanyDetails,
}
