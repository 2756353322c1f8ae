use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::cache::token::Region;
use crate::config::regions::RegionConfig;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub regions: BTreeMap<Region, RegionConfig>,
}

impl ServiceConfig {
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.settings.cache.refresh_threshold_seconds)
    }

    pub fn max_retention(&self) -> Duration {
        Duration::from_secs(self.settings.cache.max_retention_seconds)
    }

    /// region -> game server base url
    pub fn server_urls(&self) -> BTreeMap<Region, String> {
        self.regions
            .iter()
            .map(|(region, cfg)| (region.to_owned(), cfg.server_url.trim_end_matches('/').to_owned()))
            .collect()
    }

    /// region -> credential file, only for regions overriding the default location
    pub fn credential_paths(&self) -> BTreeMap<Region, String> {
        self.regions
            .iter()
            .filter_map(|(region, cfg)| {
                cfg.credentials_path
                    .as_ref()
                    .map(|path| (region.to_owned(), path.to_owned()))
            })
            .collect()
    }
}
