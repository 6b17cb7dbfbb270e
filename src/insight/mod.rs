//! # Insight Generator
//!
//! Turns a scraped [`CompanyInfo`] and the product being sold into a company
//! analysis and a sales strategy. Each step is one completion call in JSON mode
//! whose output must be a JSON object carrying the required keys; there is no
//! retry and no partial result.
//!
//! The strategy prompt embeds the analysis, so [`InsightGenerator::generate_strategy`]
//! can only run once [`InsightGenerator::analyze_company`] has produced one.

mod error;
pub mod prompts;

pub use error::InsightError;

use rig::completion::{AssistantContent, CompletionModel};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::scraper::CompanyInfo;

/// Company analysis returned by the first completion call
///
/// Only the keys the strategy step depends on are typed. Everything else the
/// model returns (`painPoints`, `decisionFactors` and so on) is kept in `extra`
/// exactly as received, nulls included, and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAnalysis {
    pub challenges: Vec<String>,
    pub opportunities: Vec<String>,
    pub market_position: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sales strategy returned by the second completion call
///
/// `recommendedApproach`, `potentialObjections` and `nextSteps` vary in shape
/// between models, so they live untyped in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStrategy {
    pub value_proposition: String,
    pub key_points: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The product half of the strategy prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub competitors: Vec<String>,
    pub additional_notes: Option<String>,
}

/// Sampling parameters shared by both completion calls
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub temperature: f64,
    pub max_tokens: u64,
    /// Ask the provider for a JSON object response
    pub json_mode: bool,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            json_mode: true,
        }
    }
}

/// Builder for InsightConfig
#[derive(Debug, Default)]
pub struct InsightConfigBuilder {
    config: InsightConfig,
}

impl InsightConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn json_mode(mut self, json_mode: bool) -> Self {
        self.config.json_mode = json_mode;
        self
    }

    pub fn build(self) -> InsightConfig {
        self.config
    }
}

impl InsightConfig {
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder::new()
    }
}

/// Generates company analyses and sales strategies with a completion model
#[derive(Clone)]
pub struct InsightGenerator<M: CompletionModel> {
    model: M,
    config: InsightConfig,
}

impl<M: CompletionModel> InsightGenerator<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, InsightConfig::default())
    }

    pub fn with_config(model: M, config: InsightConfig) -> Self {
        Self { model, config }
    }

    /// Analyse a company from its scraped information
    #[instrument(skip_all, fields(company = %info.title))]
    pub async fn analyze_company(&self, info: &CompanyInfo) -> Result<CompanyAnalysis, InsightError> {
        let prompt = prompts::company_analysis(info);
        let text = self
            .complete(prompts::COMPANY_ANALYST_PREAMBLE, prompt)
            .await?;
        let analysis: CompanyAnalysis = serde_json::from_str(&text)?;
        info!(
            "Company analysis ready ({} challenges, {} opportunities)",
            analysis.challenges.len(),
            analysis.opportunities.len()
        );
        Ok(analysis)
    }

    /// Build a sales strategy for `product` from a finished company analysis
    #[instrument(skip_all, fields(product = %product.name))]
    pub async fn generate_strategy(
        &self,
        analysis: &CompanyAnalysis,
        product: &ProductFields,
    ) -> Result<SalesStrategy, InsightError> {
        let prompt = prompts::sales_strategy(analysis, product)?;
        let text = self
            .complete(prompts::SALES_STRATEGIST_PREAMBLE, prompt)
            .await?;
        let strategy: SalesStrategy = serde_json::from_str(&text)?;
        info!("Sales strategy ready ({} key points)", strategy.key_points.len());
        Ok(strategy)
    }

    async fn complete(&self, preamble: &str, prompt: String) -> Result<String, InsightError> {
        let mut request = self
            .model
            .completion_request(prompt)
            .preamble(preamble.to_string())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);
        if self.config.json_mode {
            request = request.additional_params(json!({
                "response_format": { "type": "json_object" }
            }));
        }

        let response = request.send().await?;
        let text = response
            .choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(InsightError::EmptyResponse);
        }
        debug!("Completion returned {} bytes", text.len());
        Ok(text)
    }
}
