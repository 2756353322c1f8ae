use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::warn;

use crate::cache::token::{Region, Token};
use crate::config::settings::IssuerConfig;
use crate::credentials::Credential;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

static STATUS_MSG: &str = "status";
static TRANSPORT_MSG: &str = "transport";
static BODY_MSG: &str = "body";

#[derive(Debug, Deserialize)]
struct IssuerResponse {
    token: Option<String>,
}

/// Client of the external identity service exchanging account credentials for session tokens.
/// The underlying HTTP client is built once and shared by every refresh cycle.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    client: Client,
    endpoint: String,
    unsupported: HashSet<Region>,
}

impl TokenIssuer {
    pub fn new(cfg: &IssuerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("building token issuer HTTP client")?;

        Ok(Self {
            client,
            endpoint: cfg.url.to_owned(),
            unsupported: cfg.unsupported_regions.iter().map(|r| Region::new(r)).collect(),
        })
    }

    /// false for regions the identity service cannot issue tokens for
    pub fn supports(&self, region: &Region) -> bool {
        !self.unsupported.contains(region)
    }

    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.endpoint).with_context(|| format!("invalid issuer endpoint '{}'", self.endpoint))
    }

    /// One GET `?uid=..&password=..`, expects `{"token": "..."}`
    pub async fn issue(&self, endpoint: &Url, region: &Region, credential: &Credential) -> Result<Token> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.issuer_requests.with_label_values(&[region.as_str()]).inc();

        let result = self.request_token(endpoint, credential).await;

        metrics
            .issuer_duration
            .with_label_values(&[region.as_str()])
            .observe(start.elapsed().as_secs_f64());
        result.map_err(|(reason, err)| {
            metrics.issuer_failures.with_label_values(&[region.as_str(), reason]).inc();
            err
        })
    }

    async fn request_token(
        &self,
        endpoint: &Url,
        credential: &Credential,
    ) -> Result<Token, (&'static str, anyhow::Error)> {
        let response = self
            .client
            .get(endpoint.clone())
            .query(&[("uid", credential.uid.as_str()), ("password", credential.password.as_str())])
            .send()
            .await
            .map_err(|e| (TRANSPORT_MSG, anyhow!(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("issuer responded {} for account {}: {}", status, credential.uid, body);
            return Err((STATUS_MSG, anyhow!("token request failed: {}", status)));
        }

        let body: IssuerResponse = response.json().await.map_err(|e| (BODY_MSG, anyhow!(e)))?;
        body.token
            .filter(|token| !token.is_empty())
            .map(Token::new)
            .ok_or_else(|| (BODY_MSG, anyhow!("issuer response has no token")))
    }
}
