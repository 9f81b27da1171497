use anyhow::Context;
use scaleops_core::config::Config;
use scaleops_core::sync::SyncClient;

/// Client for the configured backend; fails when `sync.base_url` is unset.
pub fn client(config: &Config) -> anyhow::Result<SyncClient> {
    SyncClient::from_config(&config.sync)
        .context("failed to build sync client")?
        .ok_or_else(|| anyhow::anyhow!("no remote configured: set sync.base_url in the project config"))
}
