//! DataTables request runner.
//!
//! Answers one table request from a JSON file of rows, using the table
//! settings in a TOML file, and prints the response envelope. Useful for
//! checking column configuration before wiring it into a server.

use anyhow::{Context, bail};
use clap::Parser;
use datatable::{DataTableSettings, DataTables, MemorySource};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the request runner.
#[derive(Parser, Debug)]
#[command(name = "datatable")]
#[command(about = "Run a DataTables server-side request against a JSON row file")]
#[command(version)]
struct Args {
    /// Path to the table settings file
    #[arg(short, long, default_value = "datatable.toml")]
    config: PathBuf,

    /// Path to a JSON array of rows
    #[arg(short, long)]
    rows: PathBuf,

    /// Target answering requests that do not declare one
    #[arg(short, long, default_value = "default")]
    target: String,

    /// Pretty-print the envelope
    #[arg(long)]
    pretty: bool,

    /// Request parameters as key=value (e.g. sEcho=1 iSortCol_0=2)
    params: Vec<String>,
}

fn parse_params(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => Ok((key.to_string(), value.to_string())),
            None => bail!("Parameter '{}' is not of the form key=value", pair),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(config_file = ?args.config, "Loading table settings");

    let settings = DataTableSettings::from_file(&args.config)?;
    let tables = DataTables::from_settings(&settings)?;
    info!(tables = ?tables.names().collect::<Vec<_>>(), "Tables configured");

    let content = std::fs::read_to_string(&args.rows)
        .with_context(|| format!("Failed to read rows from {}", args.rows.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of rows", args.rows.display()))?;
    debug!(rows = rows.len(), "Loaded rows");
    let source = MemorySource::new(rows);

    let payload = parse_params(&args.params)?;
    let output = tables.handle(&args.target, &payload, None, &source).await?;
    let envelope = output.into_envelope(|row| row);

    let body = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{}", body);
    Ok(())
}
