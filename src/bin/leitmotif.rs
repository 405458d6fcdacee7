//! Leitmotif CLI — batch corpus indexer.
//!
//! Usage:
//!   leitmotif index <root> [--log path] [--min-count N]
//!   leitmotif sources <root>

use clap::{Parser, Subcommand};
use leitmotif::{FileSink, IndexWriter, LogSink, StdoutSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "leitmotif",
    version,
    about = "Corpus indexing engine for motif-annotated manuscripts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: merge, link, and write all index files
    Index {
        /// Corpus root containing full.json and biblio.json
        root: PathBuf,
        /// Write progress and summary lines to this file instead of stdout
        #[arg(long)]
        log: Option<PathBuf>,
        /// Minimum number of duplicate excerpts required to merge a group
        #[arg(long, default_value_t = leitmotif::index::DEFAULT_MIN_COUNT)]
        min_count: usize,
    },
    /// Regenerate sources/*.json from an existing entries.json (skips merging)
    Sources {
        /// Corpus root containing full.json and entries.json
        root: PathBuf,
    },
}

async fn cmd_index(root: PathBuf, log: Option<PathBuf>, min_count: usize) -> i32 {
    let sink: Arc<dyn LogSink> = match log {
        Some(path) => match FileSink::create(&path) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                eprintln!("Error: cannot open log file {}: {}", path.display(), e);
                return 1;
            }
        },
        None => Arc::new(StdoutSink),
    };

    let writer = IndexWriter::new(root).with_min_count(min_count).with_sink(sink);
    match writer.run().await {
        Ok(summary) => {
            println!(
                "Indexed {} entries ({} after merge, {} sources)",
                summary.entry_count,
                summary.merged_count,
                summary.per_source.len()
            );
            if summary.failed_sources.is_empty() {
                0
            } else {
                eprintln!("Failed sources: {}", summary.failed_sources.join(", "));
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_sources(root: PathBuf) -> i32 {
    let writer = IndexWriter::new(root);
    match writer.write_sources_only().await {
        Ok(summary) => {
            println!("Rewrote source files for {} entries", summary.merged_count);
            if summary.failed_sources.is_empty() {
                0
            } else {
                eprintln!("Failed sources: {}", summary.failed_sources.join(", "));
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Index {
            root,
            log,
            min_count,
        } => cmd_index(root, log, min_count).await,
        Commands::Sources { root } => cmd_sources(root).await,
    };
    std::process::exit(code);
}
