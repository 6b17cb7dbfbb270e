//! # Sales Assistant - Company Research and Sales Strategy Pipeline
//!
//! This crate turns a product description and a prospect's website into a
//! sales-enablement report. The website is scraped into a structured company
//! record, a language model analyses the company, and a second call builds a
//! sales strategy for the product from that analysis.
//!
//! ## Features
//!
//! - Request validation before any network work
//! - Website scraping with a global fetch throttle, an in-memory TTL cache and
//!   an on-disk response cache that survives restarts
//! - Best-effort heuristic extraction (title, description, contacts, social
//!   links, metadata, industry, founding year)
//! - Rate-limited JSON-mode completion calls through `rig`
//! - Axum HTTP API with multipart and urlencoded form support
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sales_assistant::analysis::AnalysisService;
//! use sales_assistant::insight::InsightGenerator;
//! use sales_assistant::request::{AnalysisForm, validate_request};
//! use sales_assistant::scraper::{ScraperConfig, ScraperService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = sales_assistant::model::new_openai_from_env()?;
//!     let scraper = Arc::new(ScraperService::new(ScraperConfig::default())?);
//!     let service = AnalysisService::new(scraper, InsightGenerator::new(client.into_completion()));
//!
//!     let request = validate_request(AnalysisForm {
//!         product_name: Some("AI Analytics Platform".to_string()),
//!         product_description: Some("Advanced analytics solution".to_string()),
//!         price: Some("999.99".to_string()),
//!         company_url: Some("https://www.example.com".to_string()),
//!         ..Default::default()
//!     })?;
//!
//!     let report = service.run(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

mod error;

pub mod analysis;
pub mod insight;
pub mod model;
pub mod report;
pub mod request;
pub mod scraper;
pub mod server;

pub use error::{Error, Result};
