use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use statecraft::db::{load_world, migrate};
use statecraft::flush::flush_to_jsonl;
use statecraft::{SimConfig, SimCore, World, WorldSeed};

#[derive(Parser, Debug)]
#[command(name = "simstep", about = "Advance a seeded faction world through the tick scheduler")]
struct Args {
    /// Path to the world seed JSON document.
    #[arg(long = "seed-file", value_name = "PATH")]
    seed_file: PathBuf,

    /// Optional simulation config JSON; missing fields keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the RNG seed from the config.
    #[arg(long, value_name = "NUMBER")]
    seed: Option<u64>,

    /// Number of scheduler invocations.
    #[arg(long, default_value_t = 1)]
    ticks: u64,

    /// Ticks the clock advances per invocation.
    #[arg(long, default_value_t = 1)]
    count: u64,

    /// Directory to write JSONL tables into after the run.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Postgres URL; when set the final world is migrated and loaded there.
    #[arg(long = "database-url", value_name = "URL")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let raw = fs::read_to_string(&args.seed_file)
        .with_context(|| format!("failed to read seed {:?}", args.seed_file))?;
    let seed: WorldSeed = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse seed {:?}", args.seed_file))?;
    let world = World::from_seed(seed).context("seed violates world constraints")?;

    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {path:?}"))?;
            serde_json::from_str::<SimConfig>(&raw)
                .with_context(|| format!("failed to parse config {path:?}"))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut core = SimCore::new(world, config);
    for _ in 0..args.ticks {
        let report = core.run_tick_with_report(args.count)?;
        for line in &report.messages {
            println!("{line}");
        }
        for failure in &report.failures {
            eprintln!(
                "{} failed for {}: {}",
                failure.system,
                failure.faction_id.as_deref().unwrap_or("-"),
                failure.message
            );
        }
    }
    println!("tick {}", core.current_tick()?);

    let world = core
        .into_store()
        .context("scheduler lost its store")?;

    if let Some(dir) = &args.out {
        flush_to_jsonl(&world, dir).with_context(|| format!("failed to write {dir:?}"))?;
    }

    if let Some(url) = &args.database_url {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let pool = PgPoolOptions::new()
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;
            migrate(&pool).await?;
            load_world(&pool, &world).await?;
            anyhow::Ok(())
        })?;
    }

    Ok(())
}
