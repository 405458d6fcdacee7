//! Entry merging: collapse duplicated excerpts within one source
//!
//! The manuscript repeats passages across revisions; within a source the same
//! excerpt can appear many times. Two excerpts are considered the same passage
//! iff their merge keys are equal, where the merge key is the normalized form
//! of the text (tags stripped, diacritics folded, lowercased, punctuation
//! dropped, plural-folded, whitespace collapsed). Membership therefore depends
//! only on content, never on input order.
//!
//! A group only collapses when it has at least `min_count` members; smaller
//! groups pass through as singletons. The member-count sum over the output
//! always equals the raw input count.

use crate::corpus::{Entry, MergedEntry};
use crate::index::stem::stem_phrase;
use indexmap::IndexMap;

/// Minimum group size used by the production pipeline
pub const DEFAULT_MIN_COUNT: usize = 5;

/// Merge key: the excerpt's normalized token stems, joined.
fn merge_key(content: &str) -> String {
    stem_phrase(content).join(" ")
}

/// Collapse duplicate excerpts in the ordered entry list of one source.
///
/// Output order is first-occurrence order of each group; a collapsed group is
/// represented by its first member and carries the absorbed entry ids.
pub fn merge_entries(entries: &[Entry], min_count: usize) -> Vec<MergedEntry> {
    let mut groups: IndexMap<String, Vec<&Entry>> = IndexMap::new();
    for entry in entries {
        groups.entry(merge_key(&entry.content)).or_default().push(entry);
    }

    let mut merged = Vec::new();
    for (key, members) in groups {
        // excerpts that normalize to nothing carry no evidence of sameness
        if !key.is_empty() && members.len() >= min_count.max(2) {
            merged.push(MergedEntry {
                entry: members[0].clone(),
                count: members.len(),
                members: members.iter().map(|e| e.id.clone()).collect(),
            });
        } else {
            for member in members {
                merged.push(MergedEntry::singleton(member.clone()));
            }
        }
    }
    merged
}
