use serde::Deserialize;

use crate::cache::token::Region;

/// Per-region game server endpoint and optional credential file override
#[derive(Debug, Deserialize, Clone)]
pub struct RegionConfig {
    pub server_url: String,
    pub credentials_path: Option<String>,
}

/// How the region of an inbound like request is chosen
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RegionPolicy {
    /// every request goes to one region, the request's own choice is ignored
    Fixed { region: Region },
    /// the request may name a region, otherwise `default`
    Requested { default: Region },
}

impl RegionPolicy {
    pub fn resolve(&self, requested: Option<&str>) -> Region {
        match self {
            RegionPolicy::Fixed { region } => region.to_owned(),
            RegionPolicy::Requested { default } => requested
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(Region::new)
                .unwrap_or_else(|| default.to_owned()),
        }
    }

    pub fn fallback(&self) -> &Region {
        match self {
            RegionPolicy::Fixed { region } => region,
            RegionPolicy::Requested { default } => default,
        }
    }
}
