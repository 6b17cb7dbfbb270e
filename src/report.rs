//! Final report returned to the caller

use serde::{Deserialize, Serialize};

use crate::insight::{CompanyAnalysis, SalesStrategy};

/// Company analysis and sales strategy for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub company_analysis: CompanyAnalysis,
    pub sales_strategy: SalesStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl AnalysisReport {
    /// Echo caller-supplied identifiers into the report
    pub fn with_ids(mut self, company_id: Option<String>, product_id: Option<String>) -> Self {
        self.company_id = company_id;
        self.product_id = product_id;
        self
    }
}

pub fn assemble(analysis: CompanyAnalysis, strategy: SalesStrategy) -> AnalysisReport {
    AnalysisReport {
        company_analysis: analysis,
        sales_strategy: strategy,
        company_id: None,
        product_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts() -> (CompanyAnalysis, SalesStrategy) {
        (
            serde_json::from_value(json!({
                "challenges": ["c1"],
                "opportunities": ["o1"],
                "marketPosition": "mid"
            }))
            .unwrap(),
            serde_json::from_value(json!({"valueProposition": "vp", "keyPoints": ["k1"]})).unwrap(),
        )
    }

    #[test]
    fn test_assemble_keeps_both_halves_unchanged() {
        let (analysis, strategy) = parts();
        let report = assemble(analysis, strategy);

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "companyAnalysis": {
                    "challenges": ["c1"],
                    "opportunities": ["o1"],
                    "marketPosition": "mid"
                },
                "salesStrategy": {"valueProposition": "vp", "keyPoints": ["k1"]}
            })
        );
    }

    #[test]
    fn test_ids_are_echoed() {
        let (analysis, strategy) = parts();
        let report = assemble(analysis, strategy)
            .with_ids(Some("c-42".to_string()), Some("p-7".to_string()));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["companyId"], "c-42");
        assert_eq!(value["productId"], "p-7");
    }
}
