// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use reqwest::Client;
use serde_json::json;

use crate::cache::token_cache::{CachePolicy, TokenCache};
use crate::config::settings::IssuerConfig;
use crate::credentials::CredentialLoader;
use crate::sources::TokenIssuer;

pub const TEST_KEY: &str = "0123456789abcdef";
pub const TEST_IV: &str = "fedcba9876543210";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Full service config pointing at mock servers
pub fn config_yaml(issuer_url: &str, server_url: &str, credentials_dir: &str) -> String {
    format!(
        r#"
settings:
  server:
    host: 127.0.0.1
    port: "0"
  logging:
    level: debug
    format: json
  metrics:
    is_enabled: true
  issuer:
    url: "{issuer_url}"
    timeout_ms: 1000
  dispatch:
    timeout_ms: 1000
  payload:
    key: "{TEST_KEY}"
    iv: "{TEST_IV}"
  credentials_dir: "{credentials_dir}"
  region_policy:
    mode: fixed
    region: BR
regions:
  BR:
    server_url: "{server_url}"
  IND:
    server_url: "{server_url}"
"#
    )
}

pub fn sample_config_yaml(issuer_url: &str, server_url: &str) -> String {
    config_yaml(issuer_url, server_url, "config")
}

/// Writes `<region>_config.json` with one account per uid
pub fn write_credentials(dir: &Path, region: &str, uids: &[&str]) {
    let accounts: Vec<_> = uids
        .iter()
        .map(|uid| json!({"uid": uid, "password": format!("pw-{}", uid)}))
        .collect();
    std::fs::write(
        dir.join(format!("{}_config.json", region.to_lowercase())),
        serde_json::to_string(&accounts).unwrap(),
    )
    .expect("write credentials");
}

/// Issuer answering `jwt-<uid>` for each uid
pub async fn mock_issuer_tokens<'a>(server: &'a MockServer, uids: &[&str]) -> Vec<Mock<'a>> {
    let mut mocks = Vec::new();
    for uid in uids {
        let uid = uid.to_string();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/token").query_param("uid", uid.as_str());
                then.status(200).json_body(json!({"token": format!("jwt-{}", uid)}));
            })
            .await;
        mocks.push(mock);
    }
    mocks
}

pub fn build_cache(issuer_url: &str, credentials_dir: &Path, refresh_threshold: Duration) -> TokenCache {
    let issuer = TokenIssuer::new(&IssuerConfig {
        url: issuer_url.to_owned(),
        timeout_ms: 1_000,
        unsupported_regions: vec!["IND".to_owned()],
    })
    .expect("issuer");
    TokenCache::new(
        CredentialLoader::new(credentials_dir, BTreeMap::new()),
        issuer,
        CachePolicy {
            refresh_threshold,
            max_retention: refresh_threshold * 2,
        },
    )
}

pub async fn total_hits(mocks: &[Mock<'_>]) -> usize {
    let mut total = 0;
    for mock in mocks {
        total += mock.hits_async().await;
    }
    total
}
