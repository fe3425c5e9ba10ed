use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use billmigrate::data;
use billmigrate::migration::timestamp::Zone;

#[derive(Parser, Debug)]
#[command(name = "billmigrate", version, about = "Convert an accounts.json export into MySQL insert statements")]
struct Cli {
    /// JSON array exported from the accounts collection
    #[arg(long, default_value = "accounts.json")]
    input: PathBuf,

    #[arg(long, default_value = "accounts_migration.sql")]
    output: PathBuf,

    /// `local`, `utc` or a fixed offset such as `+08:00`
    #[arg(long, default_value = "local")]
    timezone: Zone,

    /// Print per-category counts and totals as CSV
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (migration, summary) = data::migrate(&cli.input, &cli.output, cli.timezone, Utc::now())
        .with_context(|| format!("migration from {} failed", cli.input.display()))?;

    // The CSV report owns stdout.
    if cli.report {
        eprintln!("{summary}\n- output: {}", cli.output.display());
        data::export_report(&migration)?;
    } else {
        println!("{summary}\n- output: {}", cli.output.display());
    }

    Ok(())
}
