use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::cache::token::Region;
use crate::cache::token_cache::{CachePolicy, TokenCache};
use crate::config::regions::RegionPolicy;
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::credentials::CredentialLoader;
use crate::dispatch::payload::LikePayload;
use crate::dispatch::LikeDispatcher;
use crate::sources::TokenIssuer;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub dispatcher: LikeDispatcher,
    pub cache: TokenCache,
    pub region_policy: RegionPolicy,
    /// configured regions, reported by the health check
    pub regions: Arc<Vec<Region>>,
}

impl AppState {
    pub fn new(
        metrics: &Metrics,
        dispatcher: LikeDispatcher,
        cache: TokenCache,
        region_policy: RegionPolicy,
        regions: Vec<Region>,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            dispatcher,
            cache,
            region_policy,
            regions: Arc::new(regions),
        }
    }

    /// Wires loader, issuer, cache and dispatcher from the service config
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let settings = &service_config.settings;
        let loader = CredentialLoader::new(&settings.credentials_dir, service_config.credential_paths());
        let issuer = TokenIssuer::new(&settings.issuer)?;
        let cache = TokenCache::new(
            loader,
            issuer,
            CachePolicy {
                refresh_threshold: service_config.refresh_threshold(),
                max_retention: service_config.max_retention(),
            },
        );
        let dispatcher = LikeDispatcher::new(
            cache.clone(),
            service_config.server_urls(),
            LikePayload::new(&settings.payload)?,
            Duration::from_millis(settings.dispatch.timeout_ms),
        );

        Ok(Self::new(
            get_metrics().await,
            dispatcher,
            cache,
            settings.region_policy.to_owned(),
            service_config.regions.keys().cloned().collect(),
        ))
    }
}

pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(routes::router())
        .with_state(state)
}

/// Start the Axum server serving like, health and metrics routes.
pub async fn start(settings_config: &SettingsConfig, state: AppState) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(settings_config, state);

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .with_context(|| format!("binding {}:{}", bind_addr, port))?;
    info!("listening on {}:{}", bind_addr, port);

    metrics.up.set(1);
    axum::serve(listener, app).await.context("http server failed")?;
    metrics.up.set(0);

    Ok(())
}
