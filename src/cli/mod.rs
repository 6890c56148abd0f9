pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jsonver")]
#[command(about = "Mock REST API server backed by a single JSON document")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write a sample jsonver.yml to get started")]
    Init(commands::init::InitArgs),

    #[command(about = "Start the server")]
    Serve(commands::serve::ServeArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init(args) => commands::init::handle(args).await,
        Commands::Serve(args) => commands::serve::handle(args).await,
    }
}
