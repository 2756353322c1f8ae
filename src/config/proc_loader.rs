use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config file {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_vars_are_expanded_with_defaults() {
        std::env::set_var("LIKE_AGENT_TEST_HOST", "10.0.0.1");
        let out = expand_env_vars("host: ${LIKE_AGENT_TEST_HOST}\nport: ${LIKE_AGENT_TEST_PORT:8080}").unwrap();
        std::env::remove_var("LIKE_AGENT_TEST_HOST");
        assert_eq!(out, "host: 10.0.0.1\nport: 8080");
    }

    #[tokio::test]
    #[serial]
    async fn file_is_read_expanded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("like-agent.yaml");
        let yaml = crate::tests::common::sample_config_yaml("http://127.0.0.1:9000/token", "${LIKE_AGENT_TEST_SERVER:http://127.0.0.1:9001}");
        tokio::fs::write(&path, yaml).await.unwrap();

        let config = file_to_config(&path).await.unwrap();
        assert_eq!(config.server_urls()[&crate::cache::token::Region::from("BR")], "http://127.0.0.1:9001");

        assert!(file_to_config(&dir.path().join("missing.yaml")).await.is_err());
    }
}
