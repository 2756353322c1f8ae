use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::token::{Region, Token, TokenSet};
use crate::credentials::CredentialLoader;
use crate::observability::metrics::{get_metrics, OUTCOME_EMPTY, OUTCOME_ERROR, OUTCOME_OK, OUTCOME_UNSUPPORTED};
use crate::sources::TokenIssuer;

/// Refresh timing.
/// invariant: refresh_threshold < max_retention
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub refresh_threshold: Duration,
    pub max_retention: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tokens: TokenSet,
    /// when `tokens` were stored, drives hard eviction
    stored_at: Instant,
    /// last refresh cycle, drives the refresh threshold
    checked_at: Instant,
}

impl CacheEntry {
    fn new(tokens: TokenSet, now: Instant) -> Self {
        Self { tokens, stored_at: now, checked_at: now }
    }

    fn should_refresh(&self, policy: &CachePolicy, now: Instant) -> bool {
        now.duration_since(self.checked_at) > policy.refresh_threshold
    }

    fn should_remove(&self, policy: &CachePolicy, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= policy.max_retention
    }
}

/// Per-region token store with lazy refresh.
///
/// A single lock covers the whole check-refresh-read sequence for all
/// regions, so a reader never sees a refresh in progress and concurrent
/// readers of a stale region trigger one refresh cycle between them.
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<Mutex<HashMap<Region, CacheEntry>>>,
    loader: CredentialLoader,
    issuer: TokenIssuer,
    policy: CachePolicy,
}

impl TokenCache {
    pub fn new(loader: CredentialLoader, issuer: TokenIssuer, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            loader,
            issuer,
            policy,
        }
    }

    /// Tokens for `region`, refreshed first when stale. Never fails, an empty set means no usable accounts.
    pub async fn get_tokens(&self, region: &Region) -> TokenSet {
        let mut entries = self.inner.lock().await;
        let now = Instant::now();

        entries.retain(|cached_region, entry| {
            let keep = !entry.should_remove(&self.policy, now);
            if !keep {
                debug!("evicting tokens of region {} past max retention", cached_region);
            }
            keep
        });

        let needs_refresh = entries
            .get(region)
            .map(|entry| entry.should_refresh(&self.policy, now))
            .unwrap_or(true);

        if needs_refresh {
            let previous = entries.get(region).cloned();
            let entry = self.refresh(region, previous, now).await;
            get_metrics()
                .await
                .cached_tokens
                .with_label_values(&[region.as_str()])
                .set(entry.tokens.len() as i64);
            entries.insert(region.to_owned(), entry);
        }

        entries
            .get(region)
            .map(|entry| entry.tokens.clone())
            .unwrap_or_default()
    }

    async fn refresh(&self, region: &Region, previous: Option<CacheEntry>, now: Instant) -> CacheEntry {
        let metrics = get_metrics().await;

        if !self.issuer.supports(region) {
            warn!("region {} is not supported by the token issuer, no tokens", region);
            metrics.cache_refreshes.with_label_values(&[region.as_str(), OUTCOME_UNSUPPORTED]).inc();
            return CacheEntry::new(TokenSet::default(), now);
        }

        match self.collect_tokens(region).await {
            Ok(tokens) if tokens.is_empty() => {
                warn!("no valid tokens retrieved for region {}, clearing cached set", region);
                metrics.cache_refreshes.with_label_values(&[region.as_str(), OUTCOME_EMPTY]).inc();
                CacheEntry::new(TokenSet::default(), now)
            }
            Ok(tokens) => {
                info!("refreshed tokens for region {}, count: {}", region, tokens.len());
                metrics.cache_refreshes.with_label_values(&[region.as_str(), OUTCOME_OK]).inc();
                CacheEntry::new(Arc::new(tokens), now)
            }
            Err(err) => {
                error!("token refresh for region {} failed: {:#}", region, err);
                metrics.cache_refreshes.with_label_values(&[region.as_str(), OUTCOME_ERROR]).inc();
                match previous {
                    // keep serving prior tokens until their retention runs out
                    Some(entry) => CacheEntry { checked_at: now, ..entry },
                    None => CacheEntry::new(TokenSet::default(), now),
                }
            }
        }
    }

    /// One issuer call per credential; failed accounts are logged and skipped.
    /// An unreadable credential source fails the whole cycle.
    async fn collect_tokens(&self, region: &Region) -> Result<Vec<Token>> {
        let credentials = self.loader.read(region)?;
        if credentials.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = self.issuer.endpoint()?;
        let mut outcomes = Vec::with_capacity(credentials.len());
        for credential in &credentials {
            let outcome = self.issuer.issue(&endpoint, region, credential).await;
            if let Err(err) = &outcome {
                warn!("fetching token for account {} (region {}) failed: {:#}", credential.uid, region, err);
            }
            outcomes.push(outcome);
        }

        Ok(outcomes.into_iter().filter_map(Result::ok).collect())
    }
}
