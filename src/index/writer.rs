//! Index writer: orchestrates a full run and persists the output files
//!
//! Sequence: load catalog + bibliography, expand, group by source, freeze the
//! stem index, then per source merge and link, and finally write the aggregate
//! `entries.json` plus one `sources/<id>.json` per source.
//!
//! The stem index freeze is a hard barrier: linking only starts once the index
//! is immutable behind an `Arc`, after which sources are linked in parallel —
//! each task owns its source's entries exclusively.

use crate::corpus::{load_biblio, load_motif_dict, read_json, MergedEntry};
use crate::index::expand::{backfill_source_titles, expand_entries};
use crate::index::group::{group_merged_by_source, sources_from_entries};
use crate::index::link::link_motifs;
use crate::index::merge::{merge_entries, DEFAULT_MIN_COUNT};
use crate::index::stem::StemIndex;
use crate::index::{IndexError, IndexResult};
use crate::report::{LogSink, RunSummary, SourceStats, StdoutSink};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Orchestrates the indexing pipeline against one corpus root directory.
///
/// The root must contain `full.json` and `biblio.json`; the writer produces
/// `entries.json` and a `sources/` directory next to them.
pub struct IndexWriter {
    root: PathBuf,
    min_count: usize,
    sink: Arc<dyn LogSink>,
}

impl IndexWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_count: DEFAULT_MIN_COUNT,
            sink: Arc::new(StdoutSink),
        }
    }

    /// Override the minimum merge-group size
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    /// Route progress and summary lines to a caller-supplied sink
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the full pipeline and write `entries.json` and `sources/*.json`.
    pub async fn run(&self) -> IndexResult<RunSummary> {
        let started = Instant::now();

        let motifs = load_motif_dict(&self.root)?;
        let biblio = load_biblio(&self.root)?;

        let mut entries = expand_entries(&motifs);
        backfill_source_titles(&mut entries, &biblio);
        let sources = sources_from_entries(&entries);

        let stems = Arc::new(StemIndex::build(&motifs));

        let mut summary = RunSummary::default();
        let mut by_source: Vec<(String, Vec<MergedEntry>)> = Vec::with_capacity(sources.len());
        let mut source_timer = Instant::now();
        for (sid, source) in &sources {
            self.sink.line(&"-".repeat(40));
            self.sink.line(sid);

            let merged = merge_entries(&source.entries, self.min_count);
            self.sink
                .line(&format!("BEFORE MERGE: {} entries", source.entries.len()));
            self.sink
                .line(&format!("AFTER MERGE: {} entries", merged.len()));
            self.sink
                .line(&format!("runtime: {} ms", source_timer.elapsed().as_millis()));
            self.sink.line("");
            source_timer = Instant::now();

            summary.entry_count += source.entries.len();
            summary.merged_count += merged.len();
            summary.per_source.push(SourceStats {
                id: sid.clone(),
                before: source.entries.len(),
                after: merged.len(),
            });
            by_source.push((sid.clone(), merged));
        }

        let linked = link_by_source(by_source, stems).await;
        self.persist(linked, &mut summary)?;

        self.sink
            .line(&format!("total runtime: {} ms", started.elapsed().as_millis()));
        self.sink
            .line(&format!("BEFORE MERGE: {} entries", summary.entry_count));
        self.sink
            .line(&format!("AFTER MERGE: {} entries", summary.merged_count));
        if !summary.failed_sources.is_empty() {
            self.sink
                .line(&format!("failed sources: {}", summary.failed_sources.join(", ")));
        }

        Ok(summary)
    }

    /// Regenerate only `sources/*.json` from an existing `entries.json`.
    ///
    /// Skips the merger entirely; linked content is recomputed from each
    /// record's raw content, so the output is byte-identical to what a full
    /// run would write for the same merged entries.
    pub async fn write_sources_only(&self) -> IndexResult<RunSummary> {
        let motifs = load_motif_dict(&self.root)?;
        let entries: Vec<MergedEntry> = read_json(&self.root.join("entries.json"))?;
        let stems = Arc::new(StemIndex::build(&motifs));

        let by_source: Vec<(String, Vec<MergedEntry>)> =
            group_merged_by_source(&entries).into_iter().collect();

        let mut summary = RunSummary {
            entry_count: entries.len(),
            merged_count: entries.len(),
            ..RunSummary::default()
        };
        for (sid, merged) in &by_source {
            summary.per_source.push(SourceStats {
                id: sid.clone(),
                before: merged.len(),
                after: merged.len(),
            });
        }
        let linked = link_by_source(by_source, stems).await;
        self.persist_sources(linked, &mut summary)?;
        Ok(summary)
    }

    /// Write the aggregate file, then the per-source files.
    ///
    /// A write failure is fatal only for the file it hits: the per-source
    /// files are still attempted after a failed aggregate write, and the
    /// first failure is returned once every file has been tried.
    fn persist(
        &self,
        linked: Vec<(String, IndexResult<Vec<MergedEntry>>)>,
        summary: &mut RunSummary,
    ) -> IndexResult<()> {
        let mut aggregate: Vec<&MergedEntry> = Vec::with_capacity(summary.merged_count);
        for (_, result) in &linked {
            if let Ok(merged) = result {
                aggregate.extend(merged.iter());
            }
        }

        let mut first_write_error = None;
        if let Err(err) = write_json(&self.root.join("entries.json"), &aggregate) {
            self.sink.line(&format!("WRITE FAILED: {}", err));
            first_write_error = Some(err);
        }
        drop(aggregate);
        if let Err(err) = self.persist_sources(linked, summary) {
            first_write_error.get_or_insert(err);
        }
        match first_write_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Write one `sources/<id>.json` per successfully linked source.
    ///
    /// A failed source is surfaced through the sink and the summary; its file
    /// is never written, not even partially. A write failure is fatal for
    /// that file only — siblings already on disk are retained.
    fn persist_sources(
        &self,
        linked: Vec<(String, IndexResult<Vec<MergedEntry>>)>,
        summary: &mut RunSummary,
    ) -> IndexResult<()> {
        let sources_dir = self.root.join("sources");
        std::fs::create_dir_all(&sources_dir).map_err(|source| IndexError::Write {
            path: sources_dir.clone(),
            source,
        })?;

        let mut first_write_error = None;
        for (sid, result) in linked {
            match result {
                Ok(merged) => {
                    let path = sources_dir.join(format!("{}.json", sid));
                    if let Err(err) = write_json(&path, &merged) {
                        self.sink.line(&format!("WRITE FAILED: {}", err));
                        first_write_error.get_or_insert(err);
                    }
                }
                Err(err) => {
                    tracing::warn!(source_id = %sid, "source failed: {}", err);
                    self.sink.line(&format!("SOURCE FAILED: {}", err));
                    // totals report persisted records only
                    if let Some((before, after)) = summary
                        .per_source
                        .iter()
                        .find(|s| s.id == sid)
                        .map(|s| (s.before, s.after))
                    {
                        summary.entry_count -= before;
                        summary.merged_count -= after;
                    }
                    summary.failed_sources.push(sid);
                }
            }
        }
        match first_write_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Link every entry of every source, sources in parallel.
///
/// The stem index is frozen before this point; tasks share it read-only.
/// Results come back in the input's source order regardless of completion
/// order. A panicked task is reported as that source's failure.
async fn link_by_source(
    by_source: Vec<(String, Vec<MergedEntry>)>,
    stems: Arc<StemIndex>,
) -> Vec<(String, IndexResult<Vec<MergedEntry>>)> {
    let sids: Vec<String> = by_source.iter().map(|(sid, _)| sid.clone()).collect();
    let mut set = JoinSet::new();
    for (pos, (sid, merged)) in by_source.into_iter().enumerate() {
        let stems = Arc::clone(&stems);
        set.spawn_blocking(move || {
            let result = link_source(&sid, merged, &stems);
            (pos, sid, result)
        });
    }

    let mut slots: Vec<Option<(String, IndexResult<Vec<MergedEntry>>)>> = Vec::new();
    slots.resize_with(sids.len(), || None);
    while let Some(joined) = set.join_next().await {
        if let Ok((pos, sid, result)) = joined {
            slots[pos] = Some((sid, result));
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(pos, slot)| {
            slot.unwrap_or_else(|| {
                let sid = sids[pos].clone();
                let err = IndexError::Source {
                    source_id: sid.clone(),
                    reason: "link task panicked".to_string(),
                };
                (sid, Err(err))
            })
        })
        .collect()
}

/// Link all entries of one source against the frozen stem index.
fn link_source(
    sid: &str,
    mut merged: Vec<MergedEntry>,
    stems: &StemIndex,
) -> IndexResult<Vec<MergedEntry>> {
    validate_source_id(sid)?;
    for entry in &mut merged {
        entry.entry.linked_content = Some(link_motifs(&entry.entry.content, stems));
    }
    Ok(merged)
}

/// A source id becomes a file name under `sources/`; reject ids that would
/// escape the directory or produce an unusable name.
fn validate_source_id(sid: &str) -> IndexResult<()> {
    let unusable = sid.is_empty()
        || sid == "."
        || sid == ".."
        || sid.contains('/')
        || sid.contains('\\')
        || sid.contains('\0');
    if unusable {
        return Err(IndexError::Source {
            source_id: sid.to_string(),
            reason: format!("source id {:?} is not a valid file name", sid),
        });
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> IndexResult<()> {
    let json = serde_json::to_string(value).map_err(|err| IndexError::Write {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;
    std::fs::write(path, json).map_err(|source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_that_escape_the_directory_are_rejected() {
        assert!(validate_source_id("BSi").is_ok());
        assert!(validate_source_id("notes.2").is_ok());
        assert!(validate_source_id("").is_err());
        assert!(validate_source_id("..").is_err());
        assert!(validate_source_id("a/b").is_err());
    }

    #[tokio::test]
    async fn missing_input_is_fatal_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let writer = IndexWriter::new(dir.path());
        let err = writer.run().await.unwrap_err();
        assert!(matches!(err, IndexError::Input(_)));
        assert!(!dir.path().join("entries.json").exists());
    }

    #[tokio::test]
    async fn failed_source_is_surfaced_not_silently_dropped() {
        let stems = Arc::new(StemIndex::build(&Default::default()));
        let linked = link_by_source(vec![("../evil".to_string(), Vec::new())], stems).await;
        assert!(matches!(
            linked[0].1,
            Err(IndexError::Source { ref source_id, .. }) if source_id == "../evil"
        ));
    }
}
