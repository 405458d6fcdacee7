//! Motif catalog and bibliography: the two read-only inputs of a run
//!
//! Both documents are ordered: catalog order is the author's order, and every
//! derived index must iterate in it, so the maps here are `IndexMap`s rather
//! than `HashMap`s.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading catalog inputs
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for catalog loading
pub type CatalogResult<T> = Result<T, CatalogError>;

/// One motif in the catalog: a title plus its excerpts, keyed by source id.
///
/// The excerpt lists hold raw content strings exactly as they appear in the
/// manuscript conversion, inline markup included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motif {
    pub title: String,
    #[serde(default)]
    pub sources: IndexMap<String, Vec<String>>,
}

/// The full motif catalog, in document order. Parsed from `full.json`.
pub type MotifDict = IndexMap<String, Motif>;

/// One bibliographic work excerpts are drawn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiblioSource {
    pub id: String,
    pub title: String,
}

/// The bibliography, keyed by source id. Parsed from `biblio.json`.
pub type Biblio = IndexMap<String, BiblioSource>;

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the motif catalog from `<root>/full.json`
pub fn load_motif_dict(root: &Path) -> CatalogResult<MotifDict> {
    read_json(&root.join("full.json"))
}

/// Load the bibliography from `<root>/biblio.json`
pub fn load_biblio(root: &Path) -> CatalogResult<Biblio> {
    read_json(&root.join("biblio.json"))
}
