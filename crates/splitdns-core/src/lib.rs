// # splitdns-core
//
// Core library for the tailnet split-DNS synchronizer.
//
// The synchronizer keeps a tailnet's split-DNS table in step with dynamic
// network topology: a config file maps DNS domains to symbolic nameserver
// references (service names, device hostnames, literal addresses), and
// each cycle resolves those references against the control-plane API and
// submits the resulting table.
//
// - **config**: the domain-to-references mapping and the reference grammar
// - **api**: the [`TailnetApi`] trait and its wire data types
// - **resolver**: one resolution pass, all-or-nothing
// - **sync**: the [`Syncer`] engine with one-shot and daemon modes
// - **error**: the shared error taxonomy
//
// The production API client lives in `splitdns-tailnet`; the `splitdnsd`
// binary is a thin integration layer over this crate.

pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod sync;

// Re-export core types for convenience
pub use api::{Device, ServiceInfo, SplitDnsTable, TailnetApi};
pub use config::{NameserverRef, SplitDnsConfig};
pub use error::{Error, Result};
pub use sync::Syncer;
