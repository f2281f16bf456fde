//! Metadata normalization
//!
//! Raw database fields are split into trimmed segments, company names lose
//! their corporate suffix, and each segment is deduplicated against the values
//! already seen for its facet by a case-insensitive hash.
//!
//! The dedup hash only covers bytes from `'0'` upward. Spaces and most ASCII
//! punctuation therefore do not distinguish values: `"Square Enix"`,
//! `"SquareEnix"` and `"Square-Enix"` are one value, displayed with whichever
//! spelling was seen first.

use crate::buffer::GrowBuf;
use crate::constants::hashing::{VALUE_HASH_FIRST, VALUE_HASH_LAST};
use crate::error::ExploreResult;
use crate::facet::{FACET_COUNT, FacetKind, FacetValue, ValueId, ValueRef};
use crate::hash_map32::{HashMap32, hash32_nocase_filtered};
use crate::index::{Index, Record};

const CORPORATE_SUFFIXES: [&[u8; 3]; 3] = [b"inc", b"ltd", b"the"];

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'/' | b',' | b'|')
}

fn trim_spaces(s: &str) -> &str {
    s.trim_matches(' ')
}

fn is_suffix_word(word: &[u8]) -> bool {
    CORPORATE_SUFFIXES.iter().any(|suffix| word.eq_ignore_ascii_case(&suffix[..]))
}

/// Whether a whole segment is a bare corporate suffix (`Inc`, `Ltd.`, ...)
fn is_bare_suffix(segment: &str) -> bool {
    let word = segment.strip_suffix('.').unwrap_or(segment).as_bytes();
    is_suffix_word(word)
}

/// Strip trailing `" Inc"`, `" Ltd."`, `" The"` and friends
///
/// Only segments longer than five bytes are touched, and the suffix must be
/// preceded by a space. Stripping repeats until nothing changes, so the result
/// is a fixed point.
pub fn strip_corporate_suffix(mut segment: &str) -> &str {
    while segment.len() > 5 {
        let bytes = segment.as_bytes();
        let cut = if bytes[bytes.len() - 1] == b'.' { 4 } else { 3 };
        let word_start = bytes.len() - cut;
        if bytes[word_start - 1] != b' ' || !is_suffix_word(&bytes[word_start..word_start + 3]) {
            break;
        }
        segment = trim_spaces(&segment[..word_start]);
    }
    segment
}

/// Hash used to deduplicate facet values
pub fn value_hash(segment: &str) -> u32 {
    hash32_nocase_filtered(segment.as_bytes(), VALUE_HASH_FIRST, VALUE_HASH_LAST)
}

/// Normalized segments of a raw field
pub fn segments(raw: &str, kind: FacetKind) -> Segments<'_> {
    Segments { raw, pos: 0, kind, after_comma: false }
}

/// Iterator over the normalized segments of a raw field
///
/// Single-valued facets yield at most one segment. Empty segments are skipped.
/// A delimiter in the first byte of the field is kept as part of the first
/// segment, so `"/Action"` yields `"/Action"`, which hashes like `"Action"`.
/// For company facets a segment that follows a comma and is nothing but a
/// corporate suffix is dropped, so `"Square Enix, Inc."` yields only
/// `"Square Enix"`.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    raw: &'a str,
    pos: usize,
    kind: FacetKind,
    after_comma: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.raw.as_bytes();
        while self.pos <= bytes.len() {
            let start = self.pos;
            let end = if self.kind.is_multi_valued() {
                // the first byte of the field never splits
                let from = if start == 0 { bytes.len().min(1) } else { start };
                bytes[from..]
                    .iter()
                    .position(|&b| is_delimiter(b))
                    .map_or(bytes.len(), |i| from + i)
            } else {
                bytes.len()
            };
            self.pos = end + 1;

            let follows_comma = self.after_comma;
            self.after_comma = bytes.get(end) == Some(&b',');

            let mut segment = trim_spaces(&self.raw[start..end]);
            if self.kind.is_company() {
                if follows_comma && is_bare_suffix(segment) {
                    continue;
                }
                segment = strip_corporate_suffix(segment);
            }
            if !segment.is_empty() {
                return Some(segment);
            }
        }
        None
    }
}

/// Per-facet dedup state for one build
#[derive(Debug, Default)]
pub struct Normalizer {
    seen: [HashMap32<ValueId>; FACET_COUNT],
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw field into facet associations on `record`
    ///
    /// A missing or empty field marks the facet as having unknown records. The
    /// first resolved segment becomes the record's primary value; later ones go
    /// to `overflow`.
    pub fn add_field(
        &mut self,
        index: &mut Index,
        record: &mut Record,
        kind: FacetKind,
        raw: Option<&str>,
        overflow: &mut GrowBuf<ValueRef>,
    ) -> ExploreResult<()> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                index.tables[kind.index()].has_unknown = true;
                return Ok(());
            }
        };

        for segment in segments(raw, kind) {
            let id = self.intern(index, kind, segment)?;
            let primary = &mut record.by[kind.index()];
            if primary.is_none() {
                *primary = Some(id);
            } else {
                overflow.push(ValueRef { facet: kind, id })?;
            }
        }

        // a field of nothing but blanks and separators counts as missing
        if record.by[kind.index()].is_none() {
            index.tables[kind.index()].has_unknown = true;
        }
        Ok(())
    }

    fn intern(&mut self, index: &mut Index, kind: FacetKind, segment: &str) -> ExploreResult<ValueId> {
        let hash = value_hash(segment);
        let seen = &mut self.seen[kind.index()];
        if let Some(id) = seen.get(hash) {
            return Ok(id);
        }

        let table = &mut index.tables[kind.index()];
        let id = ValueId(table.values.len() as u32);
        let text = index.strings.alloc_str(segment)?;
        table.values.push(FacetValue { text, rank: id.0 })?;
        seen.insert(hash, id)?;
        Ok(id)
    }
}
