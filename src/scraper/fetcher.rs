//! Fetching company pages behind a shared throttle and cache

use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, debug_span, info, instrument, warn, Instrument};

use crate::request::validate_url;
use crate::scraper::cache::CompanyInfoCache;
use crate::scraper::content_extraction::extract_company_info;
use crate::scraper::error::ScrapeError;
use crate::scraper::http_cache::{CachedResponse, ResponseCache, ResponseCacheConfig};
use crate::scraper::{CompanyInfo, ScraperConfig};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";

/// Scraper for company websites
///
/// One instance owns the shared state of the fetch path: the in-memory record
/// cache, the global throttle and the on-disk response cache. Share it between
/// request flows with an `Arc`.
pub struct ScraperService {
    client: ReqwestClient,
    cache: CompanyInfoCache,
    limiter: Option<DefaultDirectRateLimiter>,
    responses: Option<ResponseCache>,
}

impl ScraperService {
    /// Create a scraper from its configuration
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        // A burst of one makes the quota behave as a minimum spacing between fetches
        let limiter = Quota::with_period(config.min_request_interval)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));

        let responses = config.http_cache_dir.clone().map(|base_path| {
            ResponseCache::with_config(ResponseCacheConfig {
                base_path,
                ttl: config.http_cache_ttl,
            })
        });

        Ok(Self {
            client,
            cache: CompanyInfoCache::new(config.cache_ttl, config.cache_capacity),
            limiter,
            responses,
        })
    }

    /// The in-memory record cache
    pub fn cache(&self) -> &CompanyInfoCache {
        &self.cache
    }

    /// Scrape structured company information from a URL
    ///
    /// A cached record younger than the cache TTL is returned without touching
    /// the network. Otherwise the page is fetched, extracted and cached.
    #[instrument(skip(self))]
    pub async fn scrape_company_info(&self, url: &str) -> Result<CompanyInfo, ScrapeError> {
        if !validate_url(url) {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        if let Some(info) = self.cache.get(url).await {
            info!("Returning cached data for {}", url);
            return Ok(info);
        }

        let html = self.fetch(url).await?;
        let info = extract_company_info(&html);
        self.cache.insert(url, info.clone()).await;
        Ok(info)
    }

    /// Fetch the raw HTML of a page
    ///
    /// Fresh responses from the on-disk cache are returned directly. Network
    /// fetches wait for the global throttle first.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        if !validate_url(url) {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        if let Some(responses) = &self.responses {
            match responses.load_fresh(url).await {
                Ok(Some(cached)) => {
                    debug!("Serving {} from the response cache", url);
                    return Ok(cached.body);
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to read cached response for {}: {}", url, e),
            }
        }

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("throttle")).await;
        }

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Error fetching {}: {}", url, e);
            ScrapeError::Http(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Failed to fetch {}: {}", url, status);
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        info!("Fetched {} ({} bytes)", url, html.len());

        if let Some(responses) = &self.responses {
            let entry = CachedResponse::new(url, status.as_u16(), html.as_str());
            if let Err(e) = responses.store(&entry).await {
                warn!("Failed to store response for {}: {}", url, e);
            }
        }

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::SocialPlatform;
    use mockito::Server;
    use std::time::{Duration, Instant};

    const PAGE: &str = r#"<html><head><title>Example Inc</title></head>
        <body><a href="https://twitter.com/acme">Follow us</a></body></html>"#;

    fn config() -> ScraperConfig {
        ScraperConfig::builder()
            .http_cache_dir(None)
            .min_request_interval(Duration::ZERO)
            .build()
    }

    #[tokio::test]
    async fn test_scrape_extracts_company_info() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .expect(1)
            .create_async()
            .await;

        let scraper = ScraperService::new(config()).unwrap();
        let info = scraper
            .scrape_company_info(&format!("{}/", server.url()))
            .await
            .unwrap();

        assert_eq!(info.title, "Example Inc");
        assert_eq!(
            info.social_links.get(&SocialPlatform::Twitter).map(String::as_str),
            Some("https://twitter.com/acme")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_scrape_is_served_from_cache() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(PAGE)
            .expect(1)
            .create_async()
            .await;

        let scraper = ScraperService::new(config()).unwrap();
        let url = format!("{}/", server.url());
        let first = scraper.scrape_company_info(&url).await.unwrap();
        let second = scraper.scrape_company_info(&url).await.unwrap();

        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let scraper = ScraperService::new(config()).unwrap();
        let result = scraper
            .scrape_company_info(&format!("{}/missing", server.url()))
            .await;

        assert!(matches!(
            result,
            Err(ScrapeError::Status { status: 404, .. })
        ));
        assert!(scraper.cache().is_empty().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let scraper = ScraperService::new(config()).unwrap();
        for url in ["not a url", "ftp://example.com", "https://example"] {
            assert!(matches!(
                scraper.fetch(url).await,
                Err(ScrapeError::InvalidUrl(_))
            ));
            assert!(matches!(
                scraper.scrape_company_info(url).await,
                Err(ScrapeError::InvalidUrl(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_http_error() {
        let scraper = ScraperService::new(config()).unwrap();
        // Port 9 (discard) is not expected to accept connections on test hosts
        let result = scraper.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(ScrapeError::Http(_))));
    }

    #[tokio::test]
    async fn test_fetches_are_spaced_by_min_interval() {
        let mut server = Server::new_async().await;
        let _a = server
            .mock("GET", "/a")
            .with_status(200)
            .with_body("<title>A</title>")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b")
            .with_status(200)
            .with_body("<title>B</title>")
            .create_async()
            .await;

        let scraper = ScraperService::new(
            ScraperConfig::builder()
                .http_cache_dir(None)
                .min_request_interval(Duration::from_millis(300))
                .build(),
        )
        .unwrap();

        let start = Instant::now();
        scraper.fetch(&format!("{}/a", server.url())).await.unwrap();
        scraper.fetch(&format!("{}/b", server.url())).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_response_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(PAGE)
            .expect(1)
            .create_async()
            .await;

        let url = format!("{}/", server.url());
        let make_scraper = || {
            ScraperService::new(
                ScraperConfig::builder()
                    .http_cache_dir(Some(dir.path().to_path_buf()))
                    .min_request_interval(Duration::ZERO)
                    .build(),
            )
            .unwrap()
        };

        let first = make_scraper().fetch(&url).await.unwrap();
        let second = make_scraper().fetch(&url).await.unwrap();

        assert_eq!(first, second);
        mock.assert_async().await;
    }
}
