//! On-disk cache of raw HTTP responses
//!
//! Each response is stored as an XML metadata file
//! `<base_path>/<host>/<sanitized path and query>.xml` next to a `.body` file
//! holding the raw body bytes, so a restarted process can reuse pages fetched
//! within the freshness window instead of hitting the site again. The body is
//! kept out of the XML because the XML reader trims surrounding whitespace.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::{de::from_str, se::to_string};
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Response cache configuration
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// Base path for cached responses
    pub base_path: PathBuf,

    /// How long a stored response is considered fresh
    pub ttl: Duration,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(".sales-assistant/http-cache"),
            ttl: Duration::from_secs(3600),
        }
    }
}

/// XML representation of a stored response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename = "response")]
pub struct CachedResponse {
    /// Requested URL
    pub url: String,

    /// HTTP status code of the stored response
    pub status: u16,

    /// When the response was fetched
    pub fetched_at: DateTime<Utc>,

    /// Response body, stored in the sidecar file
    #[serde(skip)]
    pub body: String,
}

impl CachedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            fetched_at: Utc::now(),
            body: body.into(),
        }
    }

    /// Whether the response is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.to_std().map(|age| age < ttl).unwrap_or(true)
    }
}

/// Error type for response cache operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML serialization error: {0}")]
    SerializeError(#[from] quick_xml::errors::serialize::SeError),

    #[error("XML deserialization error: {0}")]
    DeserializeError(#[from] quick_xml::errors::serialize::DeError),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL for storage: {0}")]
    InvalidUrl(String),
}

type Result<T> = std::result::Result<T, StorageError>;

/// Disk-backed response cache keyed by request URL
#[derive(Debug, Clone)]
pub struct ResponseCache {
    config: ResponseCacheConfig,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Create a new cache with default configuration
    pub fn new() -> Self {
        Self {
            config: ResponseCacheConfig::default(),
        }
    }

    /// Create a new cache with custom configuration
    pub fn with_config(config: ResponseCacheConfig) -> Self {
        Self { config }
    }

    /// Gets the storage path for a given URL
    fn get_storage_path(&self, url: &str) -> Result<PathBuf> {
        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;
        let domain = match parsed.port() {
            Some(port) => format!("{}_{}", host, port),
            None => host.to_string(),
        };

        let mut key = parsed.path().trim_matches('/').to_string();
        if let Some(query) = parsed.query() {
            key.push('?');
            key.push_str(query);
        }

        let filename = if key.is_empty() {
            "index.xml".to_string()
        } else {
            let safe_key: String = key
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect();
            format!("{}.xml", safe_key)
        };

        Ok(self.config.base_path.join(domain).join(filename))
    }

    fn body_path(storage_path: &Path) -> PathBuf {
        storage_path.with_extension("body")
    }

    /// Creates necessary directories for storage
    async fn ensure_directories(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Stores a response, replacing any previous entry for the same URL
    pub async fn store(&self, response: &CachedResponse) -> Result<()> {
        let storage_path = self.get_storage_path(&response.url)?;
        self.ensure_directories(&storage_path).await?;

        // Body first, so a metadata file always has its body beside it
        fs::write(Self::body_path(&storage_path), response.body.as_bytes()).await?;
        let xml = to_string(response)?;
        fs::write(
            storage_path,
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml),
        )
        .await?;
        Ok(())
    }

    /// Loads the stored response for a URL, fresh or not
    pub async fn load(&self, url: &str) -> Result<CachedResponse> {
        let storage_path = self.get_storage_path(url)?;
        let xml_content = fs::read_to_string(&storage_path).await?;
        let mut response: CachedResponse = from_str(&xml_content)?;
        response.body = fs::read_to_string(Self::body_path(&storage_path)).await?;
        Ok(response)
    }

    /// Loads the stored response for a URL if one exists and is still fresh
    ///
    /// A missing file is not an error; it yields `Ok(None)`.
    pub async fn load_fresh(&self, url: &str) -> Result<Option<CachedResponse>> {
        let response = match self.load(url).await {
            Ok(response) => response,
            Err(StorageError::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        // Distinct URLs can sanitize to the same file name
        if response.url != url || !response.is_fresh(self.config.ttl) {
            return Ok(None);
        }
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_in(dir: &Path) -> ResponseCache {
        ResponseCache::with_config(ResponseCacheConfig {
            base_path: dir.to_path_buf(),
            ttl: Duration::from_secs(3600),
        })
    }

    #[test]
    fn test_get_storage_path() {
        let cache = ResponseCache::with_config(ResponseCacheConfig {
            base_path: PathBuf::from("/tmp/http-cache"),
            ttl: Duration::from_secs(60),
        });

        let path = cache.get_storage_path("https://example.com/").unwrap();
        assert_eq!(path, Path::new("/tmp/http-cache/example.com/index.xml"));

        let path = cache.get_storage_path("https://example.com").unwrap();
        assert_eq!(path, Path::new("/tmp/http-cache/example.com/index.xml"));

        let path = cache
            .get_storage_path("https://example.com/dir/page?x=1")
            .unwrap();
        assert_eq!(
            path,
            Path::new("/tmp/http-cache/example.com/dir_page_x_1.xml")
        );

        let path = cache.get_storage_path("http://127.0.0.1:8080/about").unwrap();
        assert_eq!(path, Path::new("/tmp/http-cache/127.0.0.1_8080/about.xml"));
    }

    #[test]
    fn test_invalid_url() {
        let cache = ResponseCache::new();
        assert!(matches!(
            cache.get_storage_path("not-a-url"),
            Err(StorageError::UrlParse(_))
        ));
    }

    #[tokio::test]
    async fn test_store_and_load_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let response = CachedResponse::new(
            "https://example.com/about",
            200,
            "<html><title>Acme &amp; Co</title><p>a < b</p></html>",
        );

        cache.store(&response).await.unwrap();
        let loaded = cache
            .load_fresh("https://example.com/about")
            .await
            .unwrap()
            .expect("fresh entry");

        assert_eq!(loaded.url, response.url);
        assert_eq!(loaded.status, 200);
        assert_eq!(loaded.body, response.body);
    }

    #[tokio::test]
    async fn test_body_whitespace_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let body = "\n  <!DOCTYPE html>\r\n<html><body> text </body></html>\n\n";
        cache
            .store(&CachedResponse::new("https://example.com/", 200, body))
            .await
            .unwrap();

        let loaded = cache.load("https://example.com/").await.unwrap();
        assert_eq!(loaded.body, body);
        assert!(dir.path().join("example.com/index.body").exists());
    }

    #[tokio::test]
    async fn test_missing_body_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache
            .store(&CachedResponse::new("https://example.com/", 200, "<html></html>"))
            .await
            .unwrap();
        std::fs::remove_file(dir.path().join("example.com/index.body")).unwrap();

        assert!(
            cache
                .load_fresh("https://example.com/")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        assert!(
            cache
                .load_fresh("https://example.com/nothing")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_stale_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let mut response = CachedResponse::new("https://example.com/", 200, "<html></html>");
        response.fetched_at = Utc::now() - chrono::Duration::hours(2);

        cache.store(&response).await.unwrap();
        assert!(cache.load("https://example.com/").await.is_ok());
        assert!(
            cache
                .load_fresh("https://example.com/")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_freshness() {
        let mut response = CachedResponse::new("https://example.com/", 200, "");
        assert!(response.is_fresh(Duration::from_secs(3600)));

        response.fetched_at = Utc::now() - chrono::Duration::minutes(61);
        assert!(!response.is_fresh(Duration::from_secs(3600)));
    }
}
