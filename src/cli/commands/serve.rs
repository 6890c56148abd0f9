use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::config::{AppConfig, CONFIG_FILE_NAME};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, short, default_value = CONFIG_FILE_NAME, help = "Path to the YAML config")]
    pub config: PathBuf,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    if !args.config.exists() {
        anyhow::bail!(
            "Configuration file '{}' not found; run `jsonver init` to create one",
            args.config.display()
        );
    }
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    crate::server::serve(config).await
}
