//! Core corpus data model
//!
//! The canonical inputs are a motif catalog (`full.json`) and a bibliography
//! (`biblio.json`). Everything downstream — flat entries, merged entries,
//! per-source indexes — is derived from these two documents.

mod catalog;
mod entry;

pub use catalog::{
    load_biblio, load_motif_dict, Biblio, BiblioSource, CatalogError, CatalogResult, Motif,
    MotifDict,
};
pub use entry::{Entry, MergedEntry, MotifRef, SourceRef};

pub(crate) use catalog::read_json;
