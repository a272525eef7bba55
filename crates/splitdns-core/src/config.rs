//! Split-DNS configuration loading
//!
//! The config file is a JSON object mapping domain names to ordered lists
//! of nameserver references, e.g.
//!
//! ```json
//! {
//!     "example.com": ["svc:my-gateway"],
//!     "internal.example.com": ["192.168.1.1", "device:my-router"]
//! }
//! ```
//!
//! Reference prefixes and domain-name syntax are not validated at load
//! time; unrecognized references pass through as literal addresses.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Prefix marking a service reference
const SERVICE_PREFIX: &str = "svc:";

/// Prefix marking a device reference
const DEVICE_PREFIX: &str = "device:";

/// A single nameserver reference from the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameserverRef {
    /// `svc:` reference. Holds the full reference including the prefix,
    /// since the services directory is keyed by it.
    Service(String),
    /// `device:` reference with the prefix stripped
    Device(String),
    /// Literal address, passed through verbatim with no validation
    Literal(String),
}

impl NameserverRef {
    /// Classify a raw reference string by prefix
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(SERVICE_PREFIX) {
            Self::Service(raw.to_string())
        } else if let Some(hostname) = raw.strip_prefix(DEVICE_PREFIX) {
            Self::Device(hostname.to_string())
        } else {
            Self::Literal(raw.to_string())
        }
    }
}

/// Mapping from DNS domain to its ordered nameserver references
///
/// Loaded once per process and immutable afterward. Reference order within
/// a domain is preserved through resolution; domain order is not
/// significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitDnsConfig(HashMap<String, Vec<String>>);

impl SplitDnsConfig {
    /// Load the configuration from a JSON file
    ///
    /// Unreadable files and malformed JSON both map to [`Error::Config`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("reading {}: {}", path.display(), e)))?;
        serde_json::from_str(&data)
            .map_err(|e| Error::config(format!("parsing {}: {}", path.display(), e)))
    }

    /// Whether any domain carries a `device:` reference
    ///
    /// The resolver uses this to decide whether the device inventory needs
    /// to be fetched at all.
    pub fn needs_device_list(&self) -> bool {
        self.0
            .values()
            .flatten()
            .any(|ns| ns.starts_with(DEVICE_PREFIX))
    }

    /// Iterate over (domain, references) entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Number of configured domains
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no domains are configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for SplitDnsConfig {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
