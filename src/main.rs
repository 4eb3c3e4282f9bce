use std::{env, path::PathBuf};

use anyhow::Context;
use tabular_trainer::Trainer;

const DEFAULT_CONFIG_PATH: &str = "./train.json";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path: PathBuf = env::args_os()
        .nth(1)
        .map_or_else(|| DEFAULT_CONFIG_PATH.into(), PathBuf::from);

    log::info!("loading training config from {}", path.display());
    let mut trainer = Trainer::from_config_path(&path)
        .with_context(|| format!("failed to set up training from '{}'", path.display()))?;

    let reports = trainer.run().context("training failed")?;
    log::info!("emitted {} step reports", reports.len());

    Ok(())
}
