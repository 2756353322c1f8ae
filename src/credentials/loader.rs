use std::collections::BTreeMap;
use std::path::PathBuf;
use std::{env, fmt, fs};

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::token::Region;

/// Game account used to obtain a session token
#[derive(Clone, Deserialize)]
pub struct Credential {
    #[serde(deserialize_with = "string_or_number")]
    pub uid: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("uid", &self.uid)
            .field("password", &"***")
            .finish()
    }
}

// account ids show up both quoted and as bare numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

/// Resolves per-region credential lists.
///
/// Lookup order:
/// 1. `<REGION>_CONFIG` environment variable with a JSON array
/// 2. per-region `credentials_path` from the service config
/// 3. `<credentials_dir>/<region>_config.json`
///
/// Never fails: a missing or broken source yields an empty list.
#[derive(Debug, Clone)]
pub struct CredentialLoader {
    credentials_dir: PathBuf,
    overrides: BTreeMap<Region, PathBuf>,
}

impl CredentialLoader {
    pub fn new(credentials_dir: impl Into<PathBuf>, overrides: BTreeMap<Region, String>) -> Self {
        Self {
            credentials_dir: credentials_dir.into(),
            overrides: overrides
                .into_iter()
                .map(|(region, path)| (region, PathBuf::from(path)))
                .collect(),
        }
    }

    pub fn load(&self, region: &Region) -> Vec<Credential> {
        match self.read(region) {
            Ok(credentials) => credentials,
            Err(err) => {
                error!("loading credentials for region {} failed: {:#}", region, err);
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports an unreadable or malformed source.
    /// A missing file is not an error, it means the region has no accounts.
    pub fn read(&self, region: &Region) -> Result<Vec<Credential>> {
        let env_key = region.env_key();
        if let Ok(blob) = env::var(&env_key) {
            if !blob.trim().is_empty() {
                return parse_accounts(&blob, region).with_context(|| format!("invalid credential JSON in {}", env_key));
            }
        }

        let path = self.path_for(region);
        if !path.exists() {
            warn!(
                "credential file not found for region {}: {}, no credentials loaded",
                region,
                path.display()
            );
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_accounts(&raw, region).with_context(|| format!("invalid credential JSON in {}", path.display()))
    }

    fn path_for(&self, region: &Region) -> PathBuf {
        self.overrides
            .get(region)
            .cloned()
            .unwrap_or_else(|| self.credentials_dir.join(region.file_name()))
    }
}

/// Array of accounts; entries that do not deserialize are skipped one by one
fn parse_accounts(raw: &str, region: &Region) -> Result<Vec<Credential>> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let total = entries.len();
    let credentials: Vec<Credential> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<Credential>(entry) {
            Ok(credential) => Some(credential),
            Err(err) => {
                warn!("skipping credential #{} of region {}: {}", idx, region, err);
                None
            }
        })
        .collect();
    debug!("loaded {}/{} credentials for region {}", credentials.len(), total, region);
    Ok(credentials)
}
