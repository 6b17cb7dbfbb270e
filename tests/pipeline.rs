use std::sync::Arc;
use std::time::Duration;

use mockito::Server;
use sales_assistant::Error;
use sales_assistant::analysis::AnalysisService;
use sales_assistant::insight::InsightGenerator;
use sales_assistant::insight::prompts::{COMPANY_ANALYST_PREAMBLE, SALES_STRATEGIST_PREAMBLE};
use sales_assistant::model::MockCompletionModel;
use sales_assistant::request::{AnalysisForm, ValidationError, validate_request};
use sales_assistant::scraper::{ScraperConfig, ScraperService};
use serde_json::json;

const ANALYSIS: &str = r#"{"challenges":["c1"],"opportunities":["o1"],"marketPosition":"mid"}"#;
const STRATEGY: &str = r#"{"valueProposition":"vp","keyPoints":["k1"]}"#;

fn scraper() -> Arc<ScraperService> {
    Arc::new(
        ScraperService::new(
            ScraperConfig::builder()
                .http_cache_dir(None)
                .min_request_interval(Duration::ZERO)
                .build(),
        )
        .unwrap(),
    )
}

fn form(url: &str) -> AnalysisForm {
    AnalysisForm {
        product_name: Some("AI Analytics Platform".to_string()),
        product_description: Some("Advanced analytics solution".to_string()),
        price: Some("999.99".to_string()),
        company_url: Some(url.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn end_to_end_report_contains_both_completions_unchanged() {
    let mut server = Server::new_async().await;
    let site = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<title>Example Inc</title>")
        .expect(1)
        .create_async()
        .await;

    let mock = MockCompletionModel::with_texts([ANALYSIS, STRATEGY]).await;
    let service = AnalysisService::new(scraper(), InsightGenerator::new(mock.clone()));

    let request = validate_request(form(&format!("{}/", server.url()))).unwrap();
    let report = service.run(&request).await.unwrap();

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "companyAnalysis": {"challenges": ["c1"], "opportunities": ["o1"], "marketPosition": "mid"},
            "salesStrategy": {"valueProposition": "vp", "keyPoints": ["k1"]}
        })
    );

    // The analysis call comes first and its output feeds the strategy prompt
    let requests = mock.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].preamble.as_deref(), Some(COMPANY_ANALYST_PREAMBLE));
    assert!(requests[0].prompt.contains("Example Inc"));
    assert_eq!(requests[1].preamble.as_deref(), Some(SALES_STRATEGIST_PREAMBLE));
    assert!(requests[1].prompt.contains("marketPosition"));
    assert!(requests[1].prompt.contains("AI Analytics Platform"));
    site.assert_async().await;
}

#[tokio::test]
async fn empty_product_name_fails_before_any_network_call() {
    let mut server = Server::new_async().await;
    let site = server
        .mock("GET", "/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let mut bad = form(&format!("{}/", server.url()));
    bad.product_name = Some("   ".to_string());

    let err = validate_request(bad).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Invalid { ref field, .. }) if field == "productName"
    ));
    site.assert_async().await;
}

#[tokio::test]
async fn non_positive_price_fails_before_fetch() {
    let mut server = Server::new_async().await;
    let site = server
        .mock("GET", "/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    for price in ["0", "-5", "-0.01"] {
        let mut bad = form(&format!("{}/", server.url()));
        bad.price = Some(price.to_string());
        assert!(matches!(validate_request(bad), Err(Error::Validation(_))));
    }
    site.assert_async().await;
}

#[tokio::test]
async fn repeated_analysis_reuses_cached_company_info() {
    let mut server = Server::new_async().await;
    let site = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<title>Example Inc</title>")
        .expect(1)
        .create_async()
        .await;

    let mock = MockCompletionModel::with_texts([ANALYSIS, STRATEGY, ANALYSIS, STRATEGY]).await;
    let service = AnalysisService::new(scraper(), InsightGenerator::new(mock.clone()));
    let request = validate_request(form(&format!("{}/", server.url()))).unwrap();

    let first = service.run(&request).await.unwrap();
    let second = service.run(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.call_count().await, 4);
    site.assert_async().await;
}

#[tokio::test]
async fn concurrent_requests_share_one_scraper() {
    let mut server = Server::new_async().await;
    let mut sites = Vec::new();
    for i in 0..4 {
        sites.push(
            server
                .mock("GET", format!("/company-{}", i).as_str())
                .with_status(200)
                .with_body(format!("<title>Company {}</title>", i))
                .expect(1)
                .create_async()
                .await,
        );
    }

    // One reply that satisfies both result shapes, so interleaved flows can
    // take replies from the shared queue in any order
    let both = r#"{"challenges":["c1"],"opportunities":["o1"],"marketPosition":"mid","valueProposition":"vp","keyPoints":["k1"]}"#;
    let mock = MockCompletionModel::with_texts(std::iter::repeat_n(both, 8)).await;
    let scraper = scraper();
    let service = Arc::new(AnalysisService::new(
        scraper.clone(),
        InsightGenerator::new(mock.clone()),
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        let url = format!("{}/company-{}", server.url(), i);
        handles.push(tokio::spawn(async move {
            let request = validate_request(form(&url)).unwrap();
            service.run(&request).await
        }));
    }

    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.sales_strategy.value_proposition, "vp");
    }

    assert_eq!(mock.call_count().await, 8);
    assert_eq!(scraper.cache().len().await, 4);
    for site in sites {
        site.assert_async().await;
    }
}
