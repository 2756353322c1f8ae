use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::token::{Region, Token};
use crate::cache::token_cache::TokenCache;
use crate::dispatch::headers::like_headers;
use crate::dispatch::payload::LikePayload;
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};

const LIKE_PATH: &str = "/LikeProfile";

/// Outcome of one fan-out burst
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub attempted: usize,
    pub succeeded: usize,
}

/// Replicates one like request across every cached token of a region.
#[derive(Clone)]
pub struct LikeDispatcher {
    cache: TokenCache,
    servers: Arc<BTreeMap<Region, String>>,
    payload: LikePayload,
    timeout: Duration,
}

impl LikeDispatcher {
    pub fn new(
        cache: TokenCache,
        servers: BTreeMap<Region, String>,
        payload: LikePayload,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            servers: Arc::new(servers),
            payload,
            timeout,
        }
    }

    pub fn serves(&self, region: &Region) -> bool {
        self.servers.contains_key(region)
    }

    /// Sends one like per cached token and waits for all of them.
    /// Per-token failures only lower `succeeded`; errors are reserved for
    /// an unknown region or a payload that cannot be built.
    pub async fn send_likes(&self, target_uid: &str, region: &Region) -> Result<DispatchResult> {
        let server_url = self
            .servers
            .get(region)
            .ok_or_else(|| anyhow!("region {} has no configured game server", region))?;

        let tokens = self.cache.get_tokens(region).await;
        if tokens.is_empty() {
            warn!("no tokens for region {}, cannot send likes", region);
            return Ok(DispatchResult::default());
        }

        let metrics = get_metrics().await;
        let start = get_instant();

        let body = self.payload.build(target_uid, region)?;
        let like_url = format!("{}{}", server_url, LIKE_PATH);
        // lives for this burst only
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("building like HTTP client")?;

        let calls = tokens
            .iter()
            .map(|token| send_like(&client, &like_url, body.clone(), token));
        let outcomes: Vec<Result<()>> = join_all(calls).await;

        let mut succeeded = 0;
        for outcome in &outcomes {
            match outcome {
                Ok(()) => {
                    succeeded += 1;
                    metrics.like_calls.with_label_values(&[region.as_str(), OUTCOME_OK]).inc();
                }
                Err(err) => {
                    error!("like request for uid {} on {} failed: {:#}", target_uid, region, err);
                    metrics.like_calls.with_label_values(&[region.as_str(), OUTCOME_ERROR]).inc();
                }
            }
        }

        metrics
            .dispatch_duration
            .with_label_values(&[region.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let result = DispatchResult {
            attempted: outcomes.len(),
            succeeded,
        };
        info!(
            "sent {} likes to uid {} on {}, successful: {}",
            result.attempted, target_uid, region, result.succeeded
        );
        Ok(result)
    }
}

async fn send_like(client: &Client, url: &str, body: Vec<u8>, token: &Token) -> Result<()> {
    let response = client
        .post(url)
        .headers(like_headers(token)?)
        .body(body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("like request failed: {}", response.status()));
    }
    // drain so the connection can be reused within the burst
    response.bytes().await?;
    Ok(())
}
