//! impress-aliases - resolve contributor aliases in a CSV roster
//!
//! # Usage
//!
//! ```bash
//! # Append a cluster column and print to stdout
//! impress-aliases roster.csv
//!
//! # Stricter threshold, write to a file
//! impress-aliases roster.csv -t 0.05 -o resolved.csv
//!
//! # Show why rows 3 and 7 match (or don't)
//! impress-aliases roster.csv --explain 3 7
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use impress_aliases::csv_io::{read_roster_from_path, write_resolution, write_resolution_to_path};
use impress_aliases::{AliasConfig, AliasError, AliasResolver, Linkage};

/// Group roster rows (name, email, login) that belong to the same person
#[derive(Parser)]
#[command(name = "impress-aliases", author, version, about)]
struct Cli {
    /// Input CSV with `name`, `email`, and `login` columns
    input: PathBuf,

    /// Output CSV (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Merge threshold, overrides the configuration file
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Cluster linkage, overrides the configuration file
    #[arg(long, value_enum)]
    linkage: Option<Linkage>,

    /// Print the signal breakdown for two row indices instead of resolving
    #[arg(long, num_args = 2, value_names = ["ROW_A", "ROW_B"])]
    explain: Option<Vec<usize>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AliasError> {
    let mut config = match &cli.config {
        Some(path) => AliasConfig::load(path)?,
        None => AliasConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.distance_threshold = threshold;
    }
    if let Some(linkage) = cli.linkage {
        config.linkage = linkage;
    }

    let roster = read_roster_from_path(&cli.input)?;
    let resolver = AliasResolver::new(config);

    if let Some(rows) = &cli.explain {
        let records = roster.records();
        let pick = |row: usize| {
            records.get(row).ok_or(AliasError::RowOutOfRange {
                row,
                rows: records.len(),
            })
        };
        let score = resolver.explain(pick(rows[0])?, pick(rows[1])?);
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let resolution = resolver.resolve(roster.records())?;
    match &cli.output {
        Some(path) => {
            write_resolution_to_path(path, &roster, &resolution)?;
            tracing::info!(path = %path.display(), "wrote resolution");
        }
        None => write_resolution(io::stdout().lock(), &roster, &resolution)?,
    }

    Ok(())
}
