//! Entry records: one excerpt tied to one motif and one source
//!
//! Field names serialize in camelCase because the output files are consumed
//! as-is by the browsing UI.

use serde::{Deserialize, Serialize};

/// Reference to a motif by id and title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifRef {
    pub id: String,
    pub title: String,
}

/// Reference to a source by id and title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub title: String,
}

/// One excerpt record.
///
/// `id` is deterministic: `motif_id ":" source_id ":" index`, stable across
/// runs for identical input. `linked_content` is absent until the linker has
/// run over the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_content: Option<String>,
    pub motif: MotifRef,
    pub source: SourceRef,
}

impl Entry {
    /// Build the deterministic entry id for `(motif, source, index)`.
    ///
    /// Colon-joined so adjacent components can never collide the way raw
    /// concatenation can (`m1`+`s11`+`0` vs `m1`+`s1`+`10`).
    pub fn make_id(motif_id: &str, source_id: &str, index: usize) -> String {
        format!("{}:{}:{}", motif_id, source_id, index)
    }
}

/// An entry plus merge provenance.
///
/// `count` is the number of raw excerpts the record stands for; `members`
/// lists the absorbed raw entry ids (just the entry's own id for singletons).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub count: usize,
    #[serde(default)]
    pub members: Vec<String>,
}

impl MergedEntry {
    /// Wrap a raw entry as an unmerged singleton
    pub fn singleton(entry: Entry) -> Self {
        let members = vec![entry.id.clone()];
        Self {
            entry,
            count: 1,
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_components_cannot_collide() {
        assert_ne!(Entry::make_id("m1", "s11", 0), Entry::make_id("m1", "s1", 10));
    }

    #[test]
    fn serializes_with_camel_case_and_flattened_merge_fields() {
        let merged = MergedEntry {
            entry: Entry {
                id: Entry::make_id("grief", "S1", 0),
                content: "She wept for him.".into(),
                linked_content: Some("She wept for him.".into()),
                motif: MotifRef {
                    id: "grief".into(),
                    title: "Grief".into(),
                },
                source: SourceRef {
                    id: "S1".into(),
                    title: "Notebooks".into(),
                },
            },
            count: 2,
            members: vec!["grief:S1:0".into(), "grief:S1:1".into()],
        };
        let json = serde_json::to_string(&merged).unwrap();
        assert!(json.contains("\"linkedContent\""));
        assert!(json.contains("\"count\":2"));
        assert!(!json.contains("\"linked_content\""));
    }

    #[test]
    fn unlinked_entry_omits_linked_content() {
        let entry = Entry {
            id: "m:s:0".into(),
            content: "x".into(),
            linked_content: None,
            motif: MotifRef {
                id: "m".into(),
                title: "M".into(),
            },
            source: SourceRef {
                id: "s".into(),
                title: String::new(),
            },
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("linkedContent"));
    }
}
