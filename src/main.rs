// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use morris::chains::{validate_definition, StoredChains};
use morris::config::{load_settings, Settings};
use morris::observability::init_tracing;
use morris::runtime::CoreRuntime;
use morris::storage::JsonFileStorage;
use morris::traits::Storage;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "morris", about = "Trigger-driven plugin chains for local and remote devices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the core and run until Ctrl-C
    Serve(ConfigArgs),

    /// Run the chain bound to one trigger and print the result
    Run(RunArgs),

    /// Validate the stored chain definitions
    Check(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Settings file (YAML, or TOML with a .toml extension)
    #[arg(long, default_value = "morris.yaml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Trigger key, e.g. webhook:sensor
    #[arg(long)]
    trigger: String,

    /// JSON payload handed to the first step
    #[arg(long, default_value = "{}")]
    payload: String,
}

fn settings(args: &ConfigArgs) -> anyhow::Result<Settings> {
    let settings = load_settings(&args.config)
        .with_context(|| format!("loading settings from {}", args.config.display()))?;
    init_tracing(&settings.logging.level);
    Ok(settings)
}

async fn serve(args: ConfigArgs) -> anyhow::Result<()> {
    let core = CoreRuntime::start(settings(&args)?).await?;
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    core.shutdown().await;
    Ok(())
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let payload: Value = serde_json::from_str(&args.payload).context("--payload is not valid JSON")?;
    let core = CoreRuntime::start(settings(&args.config)?).await?;

    let result = core.runner.run(&args.trigger, &payload).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    core.shutdown().await;
    Ok(())
}

fn check(args: ConfigArgs) -> anyhow::Result<()> {
    let settings = settings(&args)?;
    let path = settings.storage.chains_path();
    let stored = JsonFileStorage::<StoredChains>::new(&path)
        .load()
        .with_context(|| format!("reading {}", path.display()))?
        .unwrap_or_default();

    let mut invalid = 0;
    for (chain_id, definition) in &stored {
        match validate_definition(definition) {
            Ok(chain) => println!("ok      {} ({} steps, trigger '{}')", chain_id, chain.steps.len(), chain.trigger),
            Err(error) => {
                invalid += 1;
                println!("invalid {}: {}", chain_id, error);
            }
        }
    }

    if invalid > 0 {
        bail!("{} of {} chains in {} are invalid", invalid, stored.len(), path.display());
    }
    println!("{} chains valid", stored.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Commands::Serve(args) => serve(args).await,
        Commands::Run(args) => run(args).await,
        Commands::Check(args) => check(args),
    }
}
