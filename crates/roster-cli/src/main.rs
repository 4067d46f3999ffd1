//! `roster` — command-line front end for a tutor's class roster.
//!
//! Every invocation loads the roster document, applies one command and saves
//! the result if anything changed.
//!
//! # Usage
//!
//! ```
//! roster add --name "Alice Pauline" --id E1234567 --telegram alice_p --group T01
//! roster mark-all-attendance T01 --week 3 --status present
//! roster --config ~/.config/roster/roster.toml list --group T01
//! ```

mod command;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use command::Command;
use config::CliConfig;
use roster_model::{Model, RosterStore};
use roster_store_json::JsonStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Track tutorial students, groups and consultations")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// Roster document to use instead of the configured `data_path`.
  #[arg(long, env = "ROSTER_DATA")]
  data: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let default_level: LevelFilter = cfg
    .log_level
    .parse()
    .with_context(|| format!("invalid log_level {:?}", cfg.log_level))?;
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  let data_path = cli
    .data
    .map(|p| config::expand_tilde(&p))
    .unwrap_or(cfg.data_path);
  let store = JsonStore::new(&data_path);
  let roster = store
    .load()
    .with_context(|| format!("failed to load roster from {}", data_path.display()))?
    .unwrap_or_default();

  let mut model = Model::new(roster);
  let read_only = cli.command.is_query();
  for line in cli.command.run(&mut model)? {
    println!("{line}");
  }

  if !read_only {
    store
      .save(model.roster())
      .with_context(|| format!("failed to save roster to {}", data_path.display()))?;
  }
  Ok(())
}
