//! # Analysis Pipeline
//!
//! Runs one validated request through scrape → company analysis → sales
//! strategy → report. Steps are strictly sequential within a request; many
//! requests can run concurrently against the same service, sharing the
//! scraper's cache and throttle.

use std::sync::Arc;

use rig::completion::CompletionModel;
use tracing::{info, instrument};

use crate::error::Result;
use crate::insight::{InsightGenerator, ProductFields};
use crate::report::{AnalysisReport, assemble};
use crate::request::AnalysisRequest;
use crate::scraper::ScraperService;

impl From<&AnalysisRequest> for ProductFields {
    fn from(request: &AnalysisRequest) -> Self {
        Self {
            name: request.product_name().to_string(),
            description: request.product_description().to_string(),
            price: request.price(),
            competitors: request
                .competitor_hosts()
                .into_iter()
                .map(str::to_string)
                .collect(),
            additional_notes: request.additional_notes().map(str::to_string),
        }
    }
}

/// The sales analysis pipeline
pub struct AnalysisService<M: CompletionModel> {
    scraper: Arc<ScraperService>,
    insights: InsightGenerator<M>,
}

impl<M: CompletionModel> AnalysisService<M> {
    pub fn new(scraper: Arc<ScraperService>, insights: InsightGenerator<M>) -> Self {
        Self { scraper, insights }
    }

    /// Produce the full report for a request
    ///
    /// Fails without a partial result if any step fails. If the returned
    /// future is dropped, no further fetch or completion call is started.
    #[instrument(skip_all, fields(url = %request.company_url(), product = %request.product_name()))]
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        if let Some(file) = request.file() {
            info!(
                "Ignoring uploaded file {} ({} bytes)",
                file.filename,
                file.bytes.len()
            );
        }

        info!("Scraping company website");
        let company = self
            .scraper
            .scrape_company_info(request.company_url())
            .await?;

        info!("Analyzing company");
        let analysis = self.insights.analyze_company(&company).await?;

        info!("Generating sales strategy");
        let product = ProductFields::from(request);
        let strategy = self.insights.generate_strategy(&analysis, &product).await?;

        Ok(assemble(analysis, strategy).with_ids(
            request.company_id().map(str::to_string),
            request.product_id().map(str::to_string),
        ))
    }
}
