//! Control-plane API abstraction
//!
//! The resolver and sync engine talk to the tailnet API through the
//! [`TailnetApi`] trait so tests can substitute a scripted implementation.
//! The production client lives in the `splitdns-tailnet` crate.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolved split-DNS table: domain to ordered address list
///
/// This is the output artifact of a resolution pass and the payload
/// submitted to the remote split-DNS configuration endpoint.
pub type SplitDnsTable = HashMap<String, Vec<String>>;

/// A device from the tailnet inventory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Display name, usually the fully qualified tailnet name
    pub name: String,
    /// Machine hostname
    pub hostname: String,
    /// Ordered addresses; the first entry is canonical
    pub addresses: Vec<String>,
}

/// A service directory entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    /// Service name, including the `svc:` prefix
    pub name: String,
    /// Ordered addresses; the first entry is canonical
    pub addrs: Vec<String>,
}

/// Operations the synchronizer needs from the tailnet control-plane API
///
/// All calls are sequential within a cycle; implementations do not need to
/// support concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait TailnetApi: Send + Sync {
    /// Fetch the complete device inventory
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// Look up a service by its full reference, `svc:` prefix included
    async fn get_service(&self, reference: &str) -> Result<ServiceInfo>;

    /// Replace the split-DNS table for the domains present
    async fn set_split_dns(&self, table: &SplitDnsTable) -> Result<()>;
}
