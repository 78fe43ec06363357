//! siterank command-line driver.
//!
//! Reads `siterank.toml` (or the path given with `--config`), opens the SQLite
//! catalog and runs one operation. Every command prints a JSON
//! `{status, data, message}` envelope on stdout.
//!
//! A full cycle looks like:
//!
//! ```text
//! siterank load reference.json
//! siterank insert --url https://tv.example --product tv \
//!   --keyword a=tech --keyword b="leisure time" --seniority 30 --refs 4
//! siterank rank
//! siterank search "leisure time"
//! ```

mod settings;

use std::{path::PathBuf, str::FromStr as _, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use siterank_core::{catalog::NewListing, dataset::ReferenceDataset, response::Response};
use siterank_engine::{Engine, StagingLog};
use siterank_store_sqlite::{SqliteStore, Table};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Website catalog ranking and search")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "siterank.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Bulk load a JSON reference dataset (products, ranking parameters).
  Load {
    /// Defaults to the `dataset` setting.
    dataset: Option<PathBuf>,
    /// Only load this table from the dataset.
    #[arg(long)]
    table:   Option<String>,
  },
  /// Catalog a website against a product and stage it for ranking.
  Insert {
    #[arg(long)]
    url:       String,
    #[arg(long)]
    product:   String,
    /// A `key=value` keyword; repeat for each keyword.
    #[arg(long = "keyword", value_parser = parse_keyword)]
    keywords:  Vec<(String, String)>,
    /// Age of the website in days.
    #[arg(long)]
    seniority: i64,
    /// Number of references to the website.
    #[arg(long, default_value_t = 0)]
    refs:      i64,
  },
  /// Score every staged association.
  Rank,
  /// Print the top options for a search term.
  Search { term: String },
  /// Delete websites, associations, scores and the staging log.
  Reset,
  /// Print the number of tables in the catalog.
  Tables,
}

fn parse_keyword(raw: &str) -> Result<(String, String), String> {
  raw
    .split_once('=')
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing on stderr; stdout carries the JSON output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let engine = Engine::new(Arc::new(store), StagingLog::new(&settings.staging_log));

  match cli.command {
    Command::Load { dataset, table } => {
      let only = table
        .as_deref()
        .map(Table::from_str)
        .transpose()
        .context("unknown table")?;
      let dataset = dataset
        .or_else(|| settings.dataset.clone())
        .context("no dataset given and no `dataset` setting configured")?;
      let raw = tokio::fs::read_to_string(&dataset)
        .await
        .with_context(|| format!("failed to read {dataset:?}"))?;
      let dataset = ReferenceDataset::from_json(&raw).context("invalid dataset")?;
      let inserted = engine
        .store()
        .bulk_load(&dataset, only)
        .await
        .context("bulk load failed")?;
      print(&Response::success_with(inserted, format!("{inserted} rows loaded")))?;
    }
    Command::Insert { url, product, keywords, seniority, refs } => {
      let listing = NewListing::new(url, product, keywords, seniority).with_references(refs);
      let insertion = engine
        .insert_association(listing)
        .await
        .context("insertion failed")?;
      print(&Response::success(insertion))?;
    }
    Command::Rank => print(&engine.ranking_job_response().await)?,
    Command::Search { term } => print(&engine.search_response(&term).await)?,
    Command::Reset => {
      let deleted = engine
        .store()
        .truncate(&[Table::RankingScores, Table::Associations, Table::Websites])
        .await
        .context("truncate failed")?;
      engine
        .staging()
        .clear()
        .await
        .context("failed to remove staging log")?;
      print(&Response::success_with(deleted, format!("{deleted} rows deleted")))?;
    }
    Command::Tables => {
      let count = engine.store().count_tables().await.context("count failed")?;
      print(&Response::success(count))?;
    }
  }

  Ok(())
}

fn print<T: Serialize>(response: &Response<T>) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(response)?);
  Ok(())
}
