//! Text normalization and the stem index
//!
//! A stem is the normalized form of a word or phrase: markup stripped,
//! diacritics folded to ASCII, lowercased, punctuation dropped, a light plural
//! fold per token. The same normalization feeds both the merger (whole-excerpt
//! keys) and the linker (token windows), so "fiancée" and "Fiancee" meet in
//! the middle.
//!
//! The index itself maps each motif title's phrase to its candidate motifs in
//! catalog order. It is built once per run and frozen before any linking.

use crate::corpus::{MotifDict, MotifRef};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Remove markup tags (`<...>`) and collapse whitespace runs to single spaces.
pub fn textify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut pending_space = false;
    for c in text.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        if c == '<' {
            in_tag = true;
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Fold a character to its closest ASCII letter, if it has one.
///
/// Covers the Latin-1 and typographic range that actually occurs in the
/// manuscript; anything else passes through unchanged.
fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        'ß' => 's',
        'œ' => 'e',
        'æ' => 'e',
        '’' | '‘' => '\'',
        '“' | '”' => '"',
        _ => c,
    }
}

/// Normalize one token: ASCII-fold, drop punctuation, light plural fold.
///
/// Returns `None` when nothing survives (a token that was all punctuation).
pub fn stem_token(token: &str) -> Option<String> {
    let mut stem: String = token
        .to_lowercase()
        .chars()
        .map(fold_char)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    // "letters" meets "letter"; short words like "was" keep their s
    if stem.len() > 3 && stem.ends_with('s') && !stem.ends_with("ss") {
        stem.pop();
    }
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Normalize a phrase into its token stems, markup stripped.
pub fn stem_phrase(text: &str) -> Vec<String> {
    textify(text)
        .split_whitespace()
        .filter_map(stem_token)
        .collect()
}

/// One indexed phrase with its candidate motifs in catalog order
#[derive(Debug, Clone)]
struct PhraseEntry {
    tokens: Vec<String>,
    candidates: Vec<MotifRef>,
}

/// Frozen stem → motif lookup.
///
/// Lookup is longest-phrase-first: at a given token position the longest
/// indexed phrase starting there wins, so a motif named "love letter" is
/// never shadowed by one named "love".
#[derive(Debug, Default)]
pub struct StemIndex {
    phrases: Vec<PhraseEntry>,
    /// first token -> phrase indices, longest phrase first
    by_first: HashMap<String, Vec<usize>>,
    advisories: Vec<String>,
}

impl StemIndex {
    /// Build the index from the motif catalog.
    ///
    /// One phrase per motif title. Motifs whose titles normalize to the same
    /// phrase share an index entry; that is recorded as an advisory, not an
    /// error — the linker resolves to the first candidate in catalog order.
    pub fn build(motifs: &MotifDict) -> Self {
        let mut grouped: IndexMap<Vec<String>, Vec<MotifRef>> = IndexMap::new();
        for (mid, motif) in motifs {
            let tokens = stem_phrase(&motif.title);
            if tokens.is_empty() {
                tracing::debug!(motif = %mid, "motif title yields no stem, not indexed");
                continue;
            }
            grouped.entry(tokens).or_default().push(MotifRef {
                id: mid.clone(),
                title: motif.title.clone(),
            });
        }

        let mut advisories = Vec::new();
        let mut phrases = Vec::with_capacity(grouped.len());
        for (tokens, candidates) in grouped {
            if candidates.len() > 1 {
                let ids: Vec<&str> = candidates.iter().map(|m| m.id.as_str()).collect();
                let line = format!(
                    "ambiguous stem \"{}\" shared by motifs: {}",
                    tokens.join(" "),
                    ids.join(", ")
                );
                tracing::warn!("{}", line);
                advisories.push(line);
            }
            phrases.push(PhraseEntry { tokens, candidates });
        }

        let mut by_first: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, phrase) in phrases.iter().enumerate() {
            by_first
                .entry(phrase.tokens[0].clone())
                .or_default()
                .push(i);
        }
        for indices in by_first.values_mut() {
            indices.sort_by_key(|&i| std::cmp::Reverse(phrases[i].tokens.len()));
        }

        Self {
            phrases,
            by_first,
            advisories,
        }
    }

    /// Longest phrase in the index matching a prefix of `tokens`.
    ///
    /// Returns the match length in tokens and the resolved motif (first
    /// candidate in catalog order when ambiguous).
    pub fn longest_match(&self, tokens: &[&str]) -> Option<(usize, &MotifRef)> {
        let first = tokens.first()?;
        for &i in self.by_first.get(*first)? {
            let phrase = &self.phrases[i];
            if phrase.tokens.len() <= tokens.len()
                && phrase
                    .tokens
                    .iter()
                    .zip(tokens)
                    .all(|(p, t)| p == t)
            {
                return Some((phrase.tokens.len(), &phrase.candidates[0]));
            }
        }
        None
    }

    /// Number of distinct phrases indexed
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Ambiguity advisories recorded during the build
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Motif;

    fn catalog(entries: &[(&str, &str)]) -> MotifDict {
        entries
            .iter()
            .map(|(id, title)| {
                (
                    id.to_string(),
                    Motif {
                        title: title.to_string(),
                        sources: IndexMap::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn textify_strips_tags_and_collapses_whitespace() {
        assert_eq!(textify("a <em>love</em>  letter"), "a love letter");
        assert_eq!(textify("<div>x</div>"), "x");
    }

    #[test]
    fn stem_token_folds_case_diacritics_and_plurals() {
        assert_eq!(stem_token("Fiancée"), Some("fiancee".into()));
        assert_eq!(stem_token("letters,"), Some("letter".into()));
        assert_eq!(stem_token("was"), Some("was".into()));
        assert_eq!(stem_token("glass"), Some("glass".into()));
        assert_eq!(stem_token("—"), None);
    }

    #[test]
    fn only_catalog_motifs_are_indexed() {
        let index = StemIndex::build(&catalog(&[("love", "Love"), ("grief", "Grief")]));
        assert_eq!(index.len(), 2);
        assert!(index.longest_match(&["love"]).is_some());
        assert!(index.longest_match(&["war"]).is_none());
    }

    // === Scenario: multi-word stem beats the single-word stem it contains ===
    #[test]
    fn longest_phrase_wins() {
        let index = StemIndex::build(&catalog(&[("love", "Love"), ("ll", "Love Letter")]));
        let (len, motif) = index.longest_match(&["love", "letter", "arrive"]).unwrap();
        assert_eq!(len, 2);
        assert_eq!(motif.id, "ll");

        // bare "love" still matches the shorter phrase
        let (len, motif) = index.longest_match(&["love", "and", "war"]).unwrap();
        assert_eq!(len, 1);
        assert_eq!(motif.id, "love");
    }

    #[test]
    fn shared_stem_records_advisory_and_resolves_to_catalog_order() {
        let index = StemIndex::build(&catalog(&[("m1", "Sea"), ("m2", "Seas")]));
        assert_eq!(index.advisories().len(), 1);
        assert!(index.advisories()[0].contains("m1"));
        let (_, motif) = index.longest_match(&["sea"]).unwrap();
        assert_eq!(motif.id, "m1");
    }

    #[test]
    fn markup_in_title_does_not_leak_into_stems() {
        let index = StemIndex::build(&catalog(&[("em", "<em>Letters</em>")]));
        assert!(index.longest_match(&["letter"]).is_some());
    }
}
