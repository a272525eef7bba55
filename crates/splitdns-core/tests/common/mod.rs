//! Test doubles shared by the splitdns-core integration tests

use async_trait::async_trait;
use splitdns_core::api::{Device, ServiceInfo, SplitDnsTable, TailnetApi};
use splitdns_core::config::SplitDnsConfig;
use splitdns_core::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared handles onto a [`ScriptedApi`]'s recorded activity
///
/// The syncer takes ownership of its API as a boxed trait object, so tests
/// keep a clone of these counters to observe calls afterwards.
#[derive(Clone, Default)]
pub struct ApiCounters {
    /// Number of device-list fetches
    pub device_list_calls: Arc<AtomicUsize>,
    /// Service references looked up, in call order
    pub service_lookups: Arc<Mutex<Vec<String>>>,
    /// Number of split-DNS submission attempts, including failed ones
    pub update_attempts: Arc<AtomicUsize>,
    /// Tables accepted by successful submissions
    pub submitted: Arc<Mutex<Vec<SplitDnsTable>>>,
}

impl ApiCounters {
    pub fn device_list_calls(&self) -> usize {
        self.device_list_calls.load(Ordering::SeqCst)
    }

    pub fn update_attempts(&self) -> usize {
        self.update_attempts.load(Ordering::SeqCst)
    }

    pub fn service_lookups(&self) -> Vec<String> {
        self.service_lookups.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<SplitDnsTable> {
        self.submitted.lock().unwrap().clone()
    }
}

/// A scripted control-plane API that records every call
#[derive(Default)]
pub struct ScriptedApi {
    devices: Vec<Device>,
    services: HashMap<String, ServiceInfo>,
    fail_device_list: bool,
    failing_updates: usize,
    counters: ApiCounters,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device to the scripted inventory
    pub fn with_device(mut self, name: &str, hostname: &str, addresses: &[&str]) -> Self {
        self.devices.push(Device {
            name: name.to_string(),
            hostname: hostname.to_string(),
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Add a service entry, keyed by its full `svc:` reference
    pub fn with_service(mut self, reference: &str, addrs: &[&str]) -> Self {
        self.services.insert(
            reference.to_string(),
            ServiceInfo {
                name: reference.to_string(),
                addrs: addrs.iter().map(|a| a.to_string()).collect(),
            },
        );
        self
    }

    /// Make every device-list fetch fail
    pub fn failing_device_list(mut self) -> Self {
        self.fail_device_list = true;
        self
    }

    /// Make the first `n` split-DNS submissions fail
    pub fn failing_first_updates(mut self, n: usize) -> Self {
        self.failing_updates = n;
        self
    }

    /// Handles for observing calls after the API is boxed away
    pub fn counters(&self) -> ApiCounters {
        self.counters.clone()
    }
}

#[async_trait]
impl TailnetApi for ScriptedApi {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.counters
            .device_list_calls
            .fetch_add(1, Ordering::SeqCst);
        if self.fail_device_list {
            return Err(Error::api(500, "device backend unavailable"));
        }
        Ok(self.devices.clone())
    }

    async fn get_service(&self, reference: &str) -> Result<ServiceInfo> {
        self.counters
            .service_lookups
            .lock()
            .unwrap()
            .push(reference.to_string());
        self.services
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::api(404, format!("unknown service {}", reference)))
    }

    async fn set_split_dns(&self, table: &SplitDnsTable) -> Result<()> {
        let attempt = self.counters.update_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failing_updates {
            return Err(Error::api(502, "bad gateway"));
        }
        self.counters.submitted.lock().unwrap().push(table.clone());
        Ok(())
    }
}

/// Build a config from (domain, references) pairs
pub fn config(entries: &[(&str, &[&str])]) -> SplitDnsConfig {
    entries
        .iter()
        .map(|(domain, refs)| {
            (
                domain.to_string(),
                refs.iter().map(|r| r.to_string()).collect(),
            )
        })
        .collect()
}
