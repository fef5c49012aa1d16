pub mod cli;
pub mod commands;

use std::str::FromStr;
use tzindex_demos::Package;
use tzindex_lib::config::{IndexerArgs, IndexerConfig};

/// Build the config from `--config` when given, from the remaining
/// arguments otherwise.
pub fn load_config(args: IndexerArgs) -> anyhow::Result<IndexerConfig> {
    let config = match &args.config {
        Some(path) => IndexerConfig::from_file(path)?,
        None => IndexerConfig::try_from(args)?,
    };
    Ok(config)
}

pub fn package(config: &IndexerConfig) -> anyhow::Result<Package> {
    Package::from_str(&config.package)
        .map_err(|_| anyhow::anyhow!("Unknown package `{}`", config.package))
}
