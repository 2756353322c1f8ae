use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Game-server region key, e.g. `BR` or `US`. Always stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Environment variable holding the region's credential blob
    pub fn env_key(&self) -> String {
        format!("{}_CONFIG", self.0)
    }

    /// Default credential file name inside the credentials directory
    pub fn file_name(&self) -> String {
        format!("{}_config.json", self.0.to_lowercase())
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque bearer token issued for one account
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(len={})", self.value.len())
    }
}

/// Tokens of one region, swapped as a whole on refresh
pub type TokenSet = Arc<Vec<Token>>;
