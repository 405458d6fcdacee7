//! Per-source grouping of entry records
//!
//! Builds the secondary indexes over a flat entry sequence: entries bucketed
//! by source, and within each source by motif ("entries in source X about
//! motif Y"). Buckets are `IndexMap`s initialized lazily on first occurrence,
//! so iteration order is first-occurrence order and rebuilds are reproducible
//! byte-for-byte.

use crate::corpus::{Entry, MergedEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Motif bucket inside a source index: raw excerpt contents per source id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotifEntries {
    pub id: String,
    pub title: String,
    pub sources: IndexMap<String, Vec<String>>,
}

/// All entries of one source, with a nested per-motif index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIndex {
    pub id: String,
    pub title: String,
    pub entries: Vec<Entry>,
    pub entries_by_motif: IndexMap<String, MotifEntries>,
}

/// Group a flat entry sequence by source, preserving insertion order.
pub fn sources_from_entries(entries: &[Entry]) -> IndexMap<String, SourceIndex> {
    let mut sources: IndexMap<String, SourceIndex> = IndexMap::new();
    for entry in entries {
        let sid = &entry.source.id;
        let bucket = sources.entry(sid.clone()).or_insert_with(|| SourceIndex {
            id: sid.clone(),
            title: entry.source.title.clone(),
            entries: Vec::new(),
            entries_by_motif: IndexMap::new(),
        });
        bucket.entries.push(entry.clone());

        let motif_bucket = bucket
            .entries_by_motif
            .entry(entry.motif.id.clone())
            .or_insert_with(|| MotifEntries {
                id: entry.motif.id.clone(),
                title: entry.motif.title.clone(),
                sources: IndexMap::new(),
            });
        motif_bucket
            .sources
            .entry(sid.clone())
            .or_default()
            .push(entry.content.clone());
    }
    sources
}

/// Group merged entries by source id, preserving insertion order.
///
/// Used after the merge phase to assemble per-source output files; also the
/// whole of sources-only mode's regrouping.
pub fn group_merged_by_source(entries: &[MergedEntry]) -> IndexMap<String, Vec<MergedEntry>> {
    let mut by_source: IndexMap<String, Vec<MergedEntry>> = IndexMap::new();
    for entry in entries {
        by_source
            .entry(entry.entry.source.id.clone())
            .or_default()
            .push(entry.clone());
    }
    by_source
}
