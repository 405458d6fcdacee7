//! Leitmotif: corpus indexing engine for motif-annotated manuscripts
//!
//! Converts a hierarchical, motif-organized document into a flat,
//! cross-referenced, deduplicated index of excerpts, annotating each excerpt
//! with inline backlinks to the other motifs it mentions.
//!
//! # Pipeline
//!
//! - **Expansion**: flatten the motif catalog into individual excerpt records
//! - **Grouping**: per-source (and per-source-per-motif) secondary indexes
//! - **Merging**: collapse duplicated excerpts within a source
//! - **Stemming + linking**: inject backlink anchors via stem-based matching
//! - **Writing**: persist `entries.json` and per-source `sources/*.json`
//!
//! # Example
//!
//! ```no_run
//! use leitmotif::IndexWriter;
//!
//! # async fn run() -> Result<(), leitmotif::IndexError> {
//! let summary = IndexWriter::new("/corpus").run().await?;
//! println!("{} entries after merge", summary.merged_count);
//! # Ok(())
//! # }
//! ```

pub mod corpus;
pub mod index;
pub mod report;

pub use corpus::{Biblio, BiblioSource, Entry, MergedEntry, Motif, MotifDict, MotifRef, SourceRef};
pub use index::{IndexError, IndexResult, IndexWriter, StemIndex};
pub use report::{FileSink, LogSink, MemorySink, RunSummary, SourceStats, StdoutSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
