//! Sync engine
//!
//! Drives resolve/update cycles, either once or on a fixed-interval
//! timer. A cycle failure in daemon mode is logged and the next tick still
//! fires; one-shot mode propagates the failure to the caller.

use crate::api::TailnetApi;
use crate::config::SplitDnsConfig;
use crate::error::{Error, Result};
use crate::resolver;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Orchestrates resolution passes and split-DNS submissions
pub struct Syncer {
    api: Box<dyn TailnetApi>,
    config: SplitDnsConfig,
    dry_run: bool,
}

impl Syncer {
    /// Create a syncer over an API client and a loaded config
    pub fn new(api: Box<dyn TailnetApi>, config: SplitDnsConfig) -> Self {
        Self {
            api,
            config,
            dry_run: false,
        }
    }

    /// In dry-run mode, cycles resolve and log but skip the submission
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Perform exactly one resolve/update cycle
    pub async fn run_once(&self) -> Result<()> {
        let table = resolver::resolve(self.api.as_ref(), &self.config).await?;

        info!(
            "updating split DNS configuration with {} domain(s)",
            table.len()
        );
        for (domain, nameservers) in &table {
            info!("  {} -> {:?}", domain, nameservers);
        }

        if self.dry_run {
            info!("dry run, skipping split DNS submission");
            return Ok(());
        }

        self.api
            .set_split_dns(&table)
            .await
            .map_err(|e| Error::update(e.to_string()))?;

        info!("successfully updated split DNS configuration");
        Ok(())
    }

    /// Run cycles forever on a fixed interval, starting immediately
    ///
    /// Returns after a ctrl-c shutdown signal. Cycle failures are logged
    /// and do not stop the loop.
    pub async fn run(&self, interval: Duration) -> Result<()> {
        self.run_with_shutdown(interval, None).await
    }

    /// Daemon loop with an optional external shutdown signal
    ///
    /// `pub` so integration tests can stop the loop deterministically.
    /// Production code should call [`Syncer::run`], which shuts down on
    /// ctrl-c instead.
    pub async fn run_with_shutdown(
        &self,
        interval: Duration,
        shutdown: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        info!("running in daemon mode with interval {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        // A slow cycle delays the next tick; ticks are never queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if let Some(mut rx) = shutdown {
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn tick(&self) {
        if let Err(e) = self.run_once().await {
            error!("error updating split DNS: {}", e);
        }
    }
}
