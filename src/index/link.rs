//! Motif linking: inject backlink anchors into excerpt text
//!
//! Scans content left-to-right over normalized token windows and wraps the
//! longest stem-index match at each position in a backlink anchor:
//!
//! ```text
//! <a class="motif-link" href="#/motif/{id}">original span</a>
//! ```
//!
//! Matches never overlap (the cursor jumps past a matched span) and never
//! cross a markup-tag boundary, so wrapping cannot split an `<em>` pair.
//! Text already inside a motif-link anchor is skipped, which makes the pass
//! idempotent. Everything outside matched spans is passed through unchanged:
//! stripping the injected anchors restores the input byte-for-byte.

use crate::index::stem::{stem_token, StemIndex};

const LINK_OPEN_PREFIX: &str = "<a class=\"motif-link\"";

/// One word of the original text: its normalized stem, its byte span, and the
/// markup segment it sits in (segments change at every tag).
struct Token {
    stem: String,
    start: usize,
    end: usize,
    segment: u32,
}

fn is_link_open(tag: &str) -> bool {
    tag.starts_with(LINK_OPEN_PREFIX)
}

fn is_anchor_open(tag: &str) -> bool {
    let rest = tag[1..].trim_start();
    rest.starts_with("a ") || rest.starts_with("a>")
}

fn is_anchor_close(tag: &str) -> bool {
    tag[1..].trim_start().trim_end_matches('>').trim_end() == "/a"
}

/// Byte offset just past a tag's closing `>`, or `None` when the `<` at `i`
/// never closes (another `<` or end of text intervenes) and must be treated
/// as ordinary text.
fn tag_end(content: &str, i: usize) -> Option<usize> {
    let rest = &content[i + 1..];
    let close = rest.find('>')?;
    if rest[..close].contains('<') {
        return None;
    }
    Some(i + 1 + close + 1)
}

/// Split content into word tokens, skipping tags and motif-link interiors.
fn tokenize(content: &str, tokens: &mut Vec<Token>) {
    let bytes = content.as_bytes();
    let mut segment: u32 = 0;
    // anchor nesting; true entries are motif-link anchors
    let mut anchors: Vec<bool> = Vec::new();
    let mut in_link = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(close) = tag_end(content, i) {
                let tag = &content[i..close];
                if is_anchor_close(tag) {
                    if let Some(was_link) = anchors.pop() {
                        if was_link {
                            in_link -= 1;
                        }
                    }
                } else if is_anchor_open(tag) {
                    let link = is_link_open(tag);
                    anchors.push(link);
                    if link {
                        in_link += 1;
                    }
                }
                segment += 1;
                i = close;
            } else {
                // stray '<' that never closes: ordinary text
                i += 1;
            }
            continue;
        }

        let c = match content[i..].chars().next() {
            Some(c) => c,
            None => break,
        };
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }

        // word run: everything up to the next whitespace or tag
        let start = i;
        let mut end = i;
        for c in content[i..].chars() {
            if c.is_whitespace() || c == '<' {
                break;
            }
            end += c.len_utf8();
        }
        i = end;

        if in_link > 0 {
            continue;
        }
        // trim surrounding punctuation from the span so anchors hug the word
        let word = &content[start..end];
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            continue;
        }
        let lead = word.len() - word.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
        if let Some(stem) = stem_token(trimmed) {
            tokens.push(Token {
                stem,
                start: start + lead,
                end: start + lead + trimmed.len(),
                segment,
            });
        }
    }
}

/// Annotate `content` with backlinks to every motif whose stem it mentions.
///
/// Longest phrase wins at each position; ambiguous stems resolve to the first
/// catalog candidate inside the index. Returns the annotated text; `content`
/// itself is never mutated.
pub fn link_motifs(content: &str, stems: &StemIndex) -> String {
    if stems.is_empty() {
        return content.to_string();
    }

    let mut tokens = Vec::new();
    tokenize(content, &mut tokens);
    let norms: Vec<&str> = tokens.iter().map(|t| t.stem.as_str()).collect();

    let mut out = String::with_capacity(content.len());
    let mut flushed = 0;
    let mut i = 0;
    while i < tokens.len() {
        // a phrase may not cross into a different markup segment
        let segment_end = tokens[i..]
            .iter()
            .position(|t| t.segment != tokens[i].segment)
            .map(|p| i + p)
            .unwrap_or(tokens.len());

        match stems.longest_match(&norms[i..segment_end]) {
            Some((len, motif)) => {
                let span_start = tokens[i].start;
                let span_end = tokens[i + len - 1].end;
                out.push_str(&content[flushed..span_start]);
                out.push_str(LINK_OPEN_PREFIX);
                out.push_str(" href=\"#/motif/");
                out.push_str(&motif.id);
                out.push_str("\">");
                out.push_str(&content[span_start..span_end]);
                out.push_str("</a>");
                flushed = span_end;
                i += len;
            }
            None => i += 1,
        }
    }
    out.push_str(&content[flushed..]);
    out
}

/// Remove every motif-link anchor, restoring the pre-link text exactly.
pub fn strip_motif_links(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut anchors: Vec<bool> = Vec::new();
    let mut i = 0;
    let bytes = content.as_bytes();

    while i < bytes.len() {
        if bytes[i] == b'<' {
            let close = match tag_end(content, i) {
                Some(close) => close,
                None => {
                    out.push('<');
                    i += 1;
                    continue;
                }
            };
            let tag = &content[i..close];
            if is_anchor_close(tag) {
                if anchors.pop() == Some(true) {
                    // drop the closing tag of an injected anchor
                } else {
                    out.push_str(tag);
                }
            } else if is_anchor_open(tag) {
                let link = is_link_open(tag);
                anchors.push(link);
                if !link {
                    out.push_str(tag);
                }
            } else {
                out.push_str(tag);
            }
            i = close;
        } else {
            let next = content[i..].find('<').map(|p| i + p).unwrap_or(bytes.len());
            out.push_str(&content[i..next]);
            i = next;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Motif, MotifDict};
    use indexmap::IndexMap;

    fn index_of(entries: &[(&str, &str)]) -> StemIndex {
        let motifs: MotifDict = entries
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
            .collect();
        StemIndex::build(&motifs)
    }

    #[test]
    fn exact_motif_name_receives_backlink() {
        let stems = index_of(&[("grief", "Grief")]);
        let linked = link_motifs("Her grief was quiet.", &stems);
        assert_eq!(
            linked,
            "Her <a class=\"motif-link\" href=\"#/motif/grief\">grief</a> was quiet."
        );
    }

    #[test]
    fn content_without_catalog_stems_passes_through() {
        let stems = index_of(&[("grief", "Grief")]);
        let content = "Nothing of note here.";
        assert_eq!(link_motifs(content, &stems), content);
    }

    // === Scenario: longest-match precedence ===
    #[test]
    fn multi_word_phrase_is_one_span() {
        let stems = index_of(&[("love", "Love"), ("ll", "Love Letter")]);
        let linked = link_motifs("a love letter arrives", &stems);
        assert_eq!(
            linked,
            "a <a class=\"motif-link\" href=\"#/motif/ll\">love letter</a> arrives"
        );
    }

    #[test]
    fn stripping_links_restores_content_exactly() {
        let stems = index_of(&[("sea", "The Sea"), ("grief", "Grief")]);
        let content = "Grief, like the sea, <em>returns</em> — always.";
        let linked = link_motifs(content, &stems);
        assert_ne!(linked, content);
        assert_eq!(strip_motif_links(&linked), content);
    }

    // === Scenario: idempotence ===
    #[test]
    fn relinking_adds_no_markup() {
        let stems = index_of(&[("grief", "Grief"), ("sea", "Sea")]);
        let linked = link_motifs("grief by the sea", &stems);
        assert_eq!(link_motifs(&linked, &stems), linked);
    }

    #[test]
    fn matches_do_not_cross_markup_boundaries() {
        let stems = index_of(&[("ll", "Love Letter")]);
        // "love" and "letter" sit in different markup segments
        let content = "a <em>love</em> letter arrives";
        assert_eq!(link_motifs(content, &stems), content);
    }

    #[test]
    fn match_inside_emphasis_stays_nested() {
        let stems = index_of(&[("grief", "Grief")]);
        let linked = link_motifs("<em>grief endures</em>", &stems);
        assert_eq!(
            linked,
            "<em><a class=\"motif-link\" href=\"#/motif/grief\">grief</a> endures</em>"
        );
    }

    #[test]
    fn matches_never_overlap() {
        let stems = index_of(&[("ss", "Sea Salt"), ("sa", "Salt Air")]);
        let linked = link_motifs("sea salt air", &stems);
        // "sea salt" consumes its span; "salt air" cannot start inside it
        assert_eq!(
            linked,
            "<a class=\"motif-link\" href=\"#/motif/ss\">sea salt</a> air"
        );
    }

    #[test]
    fn anchors_hug_words_not_punctuation() {
        let stems = index_of(&[("grief", "Grief")]);
        let linked = link_motifs("Grief. And after?", &stems);
        assert_eq!(
            linked,
            "<a class=\"motif-link\" href=\"#/motif/grief\">Grief</a>. And after?"
        );
    }

    #[test]
    fn stray_angle_bracket_is_ordinary_text() {
        let stems = index_of(&[("grief", "Grief")]);
        let content = "wept < grief remains";
        let linked = link_motifs(content, &stems);
        assert_eq!(
            linked,
            "wept < <a class=\"motif-link\" href=\"#/motif/grief\">grief</a> remains"
        );
        assert_eq!(strip_motif_links(&linked), content);
        assert_eq!(link_motifs(&linked, &stems), linked);
    }

    #[test]
    fn plain_anchors_survive_stripping() {
        let content = "see <a href=\"/notes\">the notes</a> here";
        assert_eq!(strip_motif_links(content), content);
    }
}
