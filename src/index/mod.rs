//! The indexing pipeline
//!
//! Leaves first: expansion flattens the catalog into entries, grouping builds
//! the per-source indexes, merging collapses duplicated excerpts, the stem
//! index and linker inject motif backlinks, and the writer orchestrates the
//! whole run and persists the output files.

mod expand;
mod group;
mod link;
mod merge;
mod stem;
mod writer;

pub use expand::{backfill_source_titles, expand_entries};
pub use group::{group_merged_by_source, sources_from_entries, MotifEntries, SourceIndex};
pub use link::{link_motifs, strip_motif_links};
pub use merge::{merge_entries, DEFAULT_MIN_COUNT};
pub use stem::{stem_phrase, stem_token, textify, StemIndex};
pub use writer::IndexWriter;

use crate::corpus::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during an indexing run
#[derive(Debug, Error)]
pub enum IndexError {
    /// Missing or malformed input; fatal before any output is written
    #[error("input error: {0}")]
    Input(#[from] CatalogError),

    /// One source failed to process; the run continues without it
    #[error("source {source_id}: {reason}")]
    Source { source_id: String, reason: String },

    /// Writing one output file failed; siblings already written are retained
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for pipeline operations
pub type IndexResult<T> = Result<T, IndexError>;
