//! Command-line interface.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_config, TraceGraphConfig};
use crate::error::Result;
use crate::hierarchy::export::{render_outline, write_json};
use crate::hierarchy::DuplicatePolicy;
use crate::pipeline::{load_types, lookup_item, run_hierarchy};
use crate::snapshot::Snapshot;

#[derive(Debug, Parser)]
#[command(name = "tracegraph", version, about = "Packaging hierarchy diagnostics")]
pub struct Cli {
    /// Config file (defaults to ./tracegraph.yaml or the user config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild the hierarchy from a snapshot and report descendant counts.
    Hierarchy {
        /// Snapshot JSON file.
        snapshot: PathBuf,
        /// Fail on duplicate composite keys instead of reporting them.
        #[arg(long)]
        strict: bool,
        /// Sort siblings by composite key.
        #[arg(long)]
        sort: bool,
        /// Print an indented outline of the tree.
        #[arg(long)]
        tree: bool,
        /// Write depth-first export rows as JSON.
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
        /// Print run metrics as JSON.
        #[arg(long)]
        metrics: bool,
    },
    /// Normalize and print one item by composite key.
    Item {
        snapshot: PathBuf,
        key: String,
    },
    /// List the type definitions in a snapshot.
    Types { snapshot: PathBuf },
}

/// Load the effective config, honouring `--config`.
pub fn resolve_config(cli: &Cli) -> Result<TraceGraphConfig> {
    load_config(cli.config.as_deref())
}

pub fn run(cli: Cli, mut config: TraceGraphConfig) -> Result<()> {
    match cli.command {
        Command::Hierarchy {
            snapshot,
            strict,
            sort,
            tree,
            export,
            metrics,
        } => {
            if strict {
                config.hierarchy.duplicates = DuplicatePolicy::Reject;
            }
            if sort {
                config.hierarchy.sort_children = true;
            }
            let snap = Snapshot::from_path(&snapshot)?;
            let run = run_hierarchy(&snap, &config)?;

            if tree {
                print!("{}", render_outline(&run.hierarchy));
            }
            if let Some(path) = export {
                let writer = BufWriter::new(File::create(&path)?);
                write_json(&run.hierarchy, Some(&run.types), writer)?;
                tracing::info!(path = %path.display(), "export written");
            }

            println!(
                "Hierarchy built in memory. Descendants: {}. Elapsed: {}ms",
                run.descendants(),
                run.metrics.total_ms()
            );
            for dup in &run.report.duplicates {
                println!(
                    "  duplicate key {} (kept node {}, dropped node {})",
                    dup.key, dup.kept_node_id, dup.dropped_node_id
                );
            }
            for key in &run.report.cycle_breaks {
                println!("  parent loop cut at {key}");
            }
            for skipped in &run.skipped {
                println!("  skipped node {}: {}", skipped.node_id, skipped.error);
            }
            if metrics {
                println!("{}", serde_json::to_string_pretty(&run.metrics.to_json())?);
            }
        }
        Command::Item { snapshot, key } => {
            let snap = Snapshot::from_path(&snapshot)?;
            let types = load_types(&snap, &config)?;
            match lookup_item(&snap, &types, &key)? {
                Some(item) => println!("{}", serde_json::to_string_pretty(&item)?),
                None => println!("No item with key {key}"),
            }
        }
        Command::Types { snapshot } => {
            let snap = Snapshot::from_path(&snapshot)?;
            let types = load_types(&snap, &config)?;
            println!("{} type definitions", types.len());
            for def in types.definitions() {
                println!("  {:>6}  {}  {}", def.id.0, def.code, def.display_code);
            }
        }
    }
    Ok(())
}
