//! Entry expansion: motif catalog → flat excerpt records
//!
//! One Entry per raw excerpt, in catalog order (motif, then source, then list
//! position). Nothing is created or dropped: the output length equals the sum
//! of all raw excerpt list lengths.

use crate::corpus::{Biblio, Entry, MotifDict, MotifRef, SourceRef};

/// Flatten the motif catalog into individual excerpt records.
///
/// Source titles are left empty here; the catalog does not carry them. Use
/// [`backfill_source_titles`] once the bibliography is loaded.
pub fn expand_entries(motifs: &MotifDict) -> Vec<Entry> {
    let mut entries = Vec::new();
    for (mid, motif) in motifs {
        for (sid, excerpts) in &motif.sources {
            for (idx, content) in excerpts.iter().enumerate() {
                entries.push(Entry {
                    id: Entry::make_id(mid, sid, idx),
                    content: content.clone(),
                    linked_content: None,
                    motif: MotifRef {
                        id: mid.clone(),
                        title: motif.title.clone(),
                    },
                    source: SourceRef {
                        id: sid.clone(),
                        title: String::new(),
                    },
                });
            }
        }
    }
    entries
}

/// Fill in source titles from the bibliography.
///
/// A source id missing from the bibliography keeps its empty title; the
/// excerpt itself is still valid.
pub fn backfill_source_titles(entries: &mut [Entry], biblio: &Biblio) {
    for entry in entries {
        if let Some(source) = biblio.get(&entry.source.id) {
            entry.source.title = source.title.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{BiblioSource, Motif};
    use indexmap::IndexMap;
    use std::collections::HashSet;

    fn two_motif_catalog() -> MotifDict {
        let mut sea_sources = IndexMap::new();
        sea_sources.insert("S1".to_string(), vec!["the tide".to_string(), "salt air".to_string()]);
        sea_sources.insert("S2".to_string(), vec!["grey water".to_string()]);
        let mut grief_sources = IndexMap::new();
        grief_sources.insert("S1".to_string(), vec!["she wept".to_string()]);

        let mut motifs = MotifDict::new();
        motifs.insert(
            "sea".to_string(),
            Motif {
                title: "The Sea".to_string(),
                sources: sea_sources,
            },
        );
        motifs.insert(
            "grief".to_string(),
            Motif {
                title: "Grief".to_string(),
                sources: grief_sources,
            },
        );
        motifs
    }

    // === Scenario: no excerpt created or dropped ===
    #[test]
    fn output_length_is_sum_of_excerpt_counts() {
        let entries = expand_entries(&two_motif_catalog());
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn ids_are_pairwise_distinct() {
        let entries = expand_entries(&two_motif_catalog());
        let ids: HashSet<&String> = entries.iter().map(|e| &e.id).collect();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn iteration_follows_catalog_order() {
        let entries = expand_entries(&two_motif_catalog());
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["sea:S1:0", "sea:S1:1", "sea:S2:0", "grief:S1:0"]);
    }

    #[test]
    fn source_titles_backfill_from_biblio() {
        let mut entries = expand_entries(&two_motif_catalog());
        let mut biblio = Biblio::new();
        biblio.insert(
            "S1".to_string(),
            BiblioSource {
                id: "S1".to_string(),
                title: "Notebooks".to_string(),
            },
        );
        backfill_source_titles(&mut entries, &biblio);
        assert_eq!(entries[0].source.title, "Notebooks");
        // S2 absent from biblio keeps an empty title
        assert_eq!(entries[2].source.title, "");
    }
}
