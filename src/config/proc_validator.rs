//! Configuration validation with aggregated errors.
//! All issues are collected into one Vec<String> so a broken config
//! is reported in a single pass.

use reqwest::Url;
use tracing::{error, info};

use crate::config::service::ServiceConfig;
use crate::config::settings::{CacheConfig, IssuerConfig, SettingsConfig};
use crate::dispatch::payload::decode_key_material;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if cfg.regions.is_empty() {
        errors.push("config: 'regions' is empty; at least one region required".to_string());
    }

    for (region, region_cfg) in &cfg.regions {
        if region.as_str().is_empty() {
            errors.push("regions: region key must not be empty".to_string());
        }
        if let Err(e) = Url::parse(&region_cfg.server_url) {
            errors.push(format!("regions.{}.server_url '{}' is invalid: {}", region, region_cfg.server_url, e));
        }
        if let Some(path) = &region_cfg.credentials_path {
            if path.trim().is_empty() {
                errors.push(format!("regions.{}.credentials_path must not be empty", region));
            }
        }
    }

    let fallback = cfg.settings.region_policy.fallback();
    if !cfg.regions.contains_key(fallback) {
        errors.push(format!(
            "settings.region_policy references region '{}' missing in 'regions'",
            fallback
        ));
    }

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!("settings.server.port '{}' is not a valid port", settings.server.port));
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", settings.metrics.path));
    }
    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!("settings.logging.level '{}' is not supported", logging.level));
        }
    }

    validate_cache(&settings.cache, errors);
    validate_issuer(&settings.issuer, errors);

    if settings.dispatch.timeout_ms == 0 {
        errors.push("settings.dispatch.timeout_ms must be > 0".to_string());
    }
    if let Err(e) = decode_key_material(&settings.payload.key) {
        errors.push(format!("settings.payload.key: {}", e));
    }
    if let Err(e) = decode_key_material(&settings.payload.iv) {
        errors.push(format!("settings.payload.iv: {}", e));
    }
}

fn validate_cache(cache: &CacheConfig, errors: &mut Vec<String>) {
    if cache.refresh_threshold_seconds == 0 {
        errors.push("settings.cache.refresh_threshold_seconds must be > 0".to_string());
    }
    if cache.refresh_threshold_seconds >= cache.max_retention_seconds {
        errors.push(format!(
            "settings.cache.refresh_threshold_seconds ({}) must be lower than max_retention_seconds ({})",
            cache.refresh_threshold_seconds, cache.max_retention_seconds
        ));
    }
}

fn validate_issuer(issuer: &IssuerConfig, errors: &mut Vec<String>) {
    if let Err(e) = Url::parse(&issuer.url) {
        errors.push(format!("settings.issuer.url '{}' is invalid: {}", issuer.url, e));
    }
    if issuer.timeout_ms == 0 {
        errors.push("settings.issuer.timeout_ms must be > 0".to_string());
    }
}

#[cfg(test)]
mod tests {
    use crate::config::proc_loader::parse_config;
    use crate::tests::common::sample_config_yaml;

    #[tokio::test]
    async fn sample_config_is_valid() {
        let cfg = parse_config(sample_config_yaml("http://127.0.0.1:1/token", "http://127.0.0.1:2"))
            .await
            .expect("sample config must be valid");
        assert_eq!(cfg.regions.len(), 2);
        assert_eq!(cfg.settings.cache.refresh_threshold_seconds, 21600);
        assert_eq!(cfg.settings.issuer.unsupported_regions, vec!["IND".to_string()]);
    }

    #[tokio::test]
    async fn invalid_config_reports_all_errors() {
        let invalid_yaml = r#"
settings:
  server:
    host: 127.0.0.1
    port: not-a-port
  cache:
    refresh_threshold_seconds: 7200
    max_retention_seconds: 3600
  issuer:
    url: "not a url"
  payload:
    key: short
    iv: "hex:zz"
  region_policy:
    mode: fixed
    region: SG
regions:
  br:
    server_url: "https://client.example"
"#;
        let err = parse_config(invalid_yaml.to_string())
            .await
            .expect_err("invalid config unexpectedly validated")
            .to_string();

        assert!(err.contains("config is not valid"));
        assert!(err.contains("port"), "expected port error: {}", err);
        assert!(err.contains("max_retention_seconds"), "expected cache timing error: {}", err);
        assert!(err.contains("settings.issuer.url"), "expected issuer url error: {}", err);
        assert!(err.contains("settings.payload.key"), "expected key error: {}", err);
        assert!(err.contains("settings.payload.iv"), "expected iv error: {}", err);
        assert!(err.contains("'SG' missing"), "expected policy region error: {}", err);
    }
}
