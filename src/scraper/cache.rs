//! In-memory cache of extracted company records

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::scraper::CompanyInfo;

struct CachedCompany {
    info: CompanyInfo,
    inserted_at: Instant,
}

/// Time- and capacity-bounded cache mapping URLs to extracted [`CompanyInfo`]
///
/// Entries expire `ttl` after insertion. When an insert pushes the cache past
/// `capacity`, the oldest entries are evicted first. The cache is safe to share
/// between concurrent request flows; it does not deduplicate concurrent misses.
pub struct CompanyInfoCache {
    entries: Mutex<HashMap<String, CachedCompany>>,
    ttl: Duration,
    capacity: usize,
}

impl CompanyInfoCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Return the cached record for `url` if it has not expired
    pub async fn get(&self, url: &str) -> Option<CompanyInfo> {
        let mut entries = self.entries.lock().await;
        match entries.get(url) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.info.clone()),
            Some(_) => {
                debug!("Cache entry for {} expired", url);
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, url: &str, info: CompanyInfo) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        entries.insert(
            url.to_string(),
            CachedCompany {
                info,
                inserted_at: Instant::now(),
            },
        );

        while entries.len() > self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            debug!("Evicting {} from company cache", oldest);
            entries.remove(&oldest);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
