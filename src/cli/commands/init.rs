use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::config::{CONFIG_FILE_NAME, SAMPLE_CONFIG};

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(long, default_value = CONFIG_FILE_NAME, help = "Where to write the sample config")]
    pub path: PathBuf,

    #[arg(long, help = "Overwrite an existing config file")]
    pub force: bool,
}

pub async fn handle(args: InitArgs) -> anyhow::Result<()> {
    write_sample(&args.path, args.force)?;
    tracing::info!("{} has been created successfully.", args.path.display());
    Ok(())
}

fn write_sample(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    std::fs::write(path, SAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))
}
