//! The resolution pass
//!
//! Turns every nameserver reference across all domains into concrete
//! addresses in a single pass. Any resolution failure aborts the whole
//! pass; there is no per-domain partial success.

use crate::api::{Device, SplitDnsTable, TailnetApi};
use crate::config::{NameserverRef, SplitDnsConfig};
use crate::error::{Error, Result};
use tracing::info;

/// Resolve the whole config into a concrete split-DNS table
///
/// The device inventory is fetched at most once, and only when at least
/// one `device:` reference appears anywhere in the config. Output entries
/// keep the reference order of their domain.
pub async fn resolve(api: &dyn TailnetApi, config: &SplitDnsConfig) -> Result<SplitDnsTable> {
    let devices = if config.needs_device_list() {
        api.list_devices()
            .await
            .map_err(|e| Error::device_list(e.to_string()))?
    } else {
        Vec::new()
    };

    let mut table = SplitDnsTable::new();
    for (domain, nameservers) in config.iter() {
        let mut resolved = Vec::with_capacity(nameservers.len());
        for raw in nameservers {
            match NameserverRef::parse(raw) {
                NameserverRef::Service(reference) => {
                    info!("resolving service {} for domain {}", reference, domain);
                    let addr = service_addr(api, &reference).await?;
                    info!("resolved {} to {}", reference, addr);
                    resolved.push(addr);
                }
                NameserverRef::Device(hostname) => {
                    info!("resolving device {} for domain {}", hostname, domain);
                    let addr = device_addr(&devices, &hostname)?;
                    info!("resolved device:{} to {}", hostname, addr);
                    resolved.push(addr);
                }
                NameserverRef::Literal(addr) => resolved.push(addr),
            }
        }
        table.insert(domain.clone(), resolved);
    }

    Ok(table)
}

/// One remote lookup per occurrence. Repeated identical references are
/// deliberately not deduplicated, so observable call counts stay stable.
async fn service_addr(api: &dyn TailnetApi, reference: &str) -> Result<String> {
    let svc = api
        .get_service(reference)
        .await
        .map_err(|e| Error::service_resolution(reference, e.to_string()))?;

    svc.addrs
        .first()
        .cloned()
        .ok_or_else(|| Error::service_resolution(reference, "service has no addresses"))
}

/// Pick an address from the fetched device inventory
///
/// Match order: exact hostname, then exact display name, then display name
/// with the hostname as a dot-terminated prefix. First match wins.
fn device_addr(devices: &[Device], hostname: &str) -> Result<String> {
    let device = devices
        .iter()
        .find(|d| d.hostname == hostname)
        .or_else(|| devices.iter().find(|d| d.name == hostname))
        .or_else(|| {
            devices.iter().find(|d| {
                d.name
                    .strip_prefix(hostname)
                    .is_some_and(|rest| rest.starts_with('.'))
            })
        })
        .ok_or_else(|| Error::device_resolution(hostname, "device not found"))?;

    device
        .addresses
        .first()
        .cloned()
        .ok_or_else(|| Error::device_resolution(hostname, "device has no addresses"))
}
