//! Prompt templates for the two insight calls

use std::fmt::Write;

use crate::insight::{CompanyAnalysis, ProductFields};
use crate::scraper::CompanyInfo;

pub const COMPANY_ANALYST_PREAMBLE: &str =
    "You are an expert business analyst providing structured analysis of companies.";

pub const SALES_STRATEGIST_PREAMBLE: &str =
    "You are an expert sales strategist providing structured sales recommendations.";

const COMPANY_ANALYSIS_SHAPE: &str = r#"{
    "challenges": ["challenge1", "challenge2", ...],
    "opportunities": ["opportunity1", "opportunity2", ...],
    "marketPosition": "detailed market position analysis",
    "painPoints": ["point1", "point2", ...],
    "decisionFactors": ["factor1", "factor2", ...]
}"#;

const SALES_STRATEGY_SHAPE: &str = r#"{
    "valueProposition": "detailed value proposition",
    "keyPoints": ["point1", "point2", ...],
    "recommendedApproach": ["step1", "step2", ...],
    "potentialObjections": [
        {"objection": "objection1", "response": "response1"},
        {"objection": "objection2", "response": "response2"}
    ],
    "nextSteps": ["step1", "step2", ...]
}"#;

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Prompt for the first call: analyse the scraped company
pub fn company_analysis(info: &CompanyInfo) -> String {
    let details = &info.company_details;
    let mut prompt = String::from(
        "Analyze the following company information and provide detailed insights in JSON format:\n\n",
    );

    prompt.push_str("Company Information:\n");
    let _ = writeln!(prompt, "- Name: {}", or_placeholder(&info.title, "Unknown"));
    let _ = writeln!(
        prompt,
        "- Industry: {}",
        or_placeholder(details.industry.as_deref().unwrap_or_default(), "Unknown")
    );
    let _ = writeln!(
        prompt,
        "- Description: {}",
        or_placeholder(&info.description, "No description provided")
    );
    if let Some(year) = &details.founded_year {
        let _ = writeln!(prompt, "- Founded: {}", year);
    }
    if let Some(site_name) = info.metadata.get("site_name") {
        let _ = writeln!(prompt, "- Site name: {}", site_name);
    }

    let _ = write!(
        prompt,
        "\nPlease provide a JSON response with the following structure:\n{}\n",
        COMPANY_ANALYSIS_SHAPE
    );
    prompt
}

/// Prompt for the second call: build a strategy from the analysis and product
pub fn sales_strategy(
    analysis: &CompanyAnalysis,
    product: &ProductFields,
) -> Result<String, serde_json::Error> {
    let analysis_json = serde_json::to_string_pretty(analysis)?;
    let mut prompt = String::from(
        "Based on the following information, generate a detailed sales strategy in JSON format:\n\n",
    );

    let _ = writeln!(prompt, "Company Analysis: {}\n", analysis_json);
    prompt.push_str("Product Information:\n");
    let _ = writeln!(
        prompt,
        "- Name: {}",
        or_placeholder(&product.name, "Unknown")
    );
    let _ = writeln!(
        prompt,
        "- Description: {}",
        or_placeholder(&product.description, "No description provided")
    );
    let _ = writeln!(prompt, "- Price: {}", product.price);
    if !product.competitors.is_empty() {
        let _ = writeln!(prompt, "- Competitors: {}", product.competitors.join(", "));
    }
    if let Some(notes) = &product.additional_notes {
        let _ = writeln!(prompt, "- Additional notes: {}", notes);
    }

    let _ = write!(
        prompt,
        "\nPlease provide a JSON response with the following structure:\n{}\n",
        SALES_STRATEGY_SHAPE
    );
    Ok(prompt)
}
