//! Document segmentation for embedding
//!
//! Text is split recursively on a layered separator list (paragraph, line,
//! sentence, word), each piece keeping its trailing separator, then pieces
//! are greedily merged back into chunks that fit the character budget.
//! Because nothing is stripped, a document's chunks reconstruct it exactly
//! once overlap and source prefixes are removed.

use crate::config::{ChunkingConfig, MIN_CHUNK_CHARS};
use crate::error::{RaglineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;

/// Separators tried from coarsest to finest
pub const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

const PREFIX_OPEN: &str = "[Source: ";
const PREFIX_CLOSE: &str = "]\n";

/// A loaded source document, consumed by the segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// URL or path the document was loaded from
    pub source: String,
    /// Extracted plain text
    pub text: String,
    /// Short human-readable description, usually the title
    pub description: String,
}

impl DocumentRecord {
    pub fn new(
        source: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            description: description.into(),
        }
    }
}

/// Document chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Full chunk text including the source prefix
    pub text: String,
    /// Source of the document this chunk came from
    pub source: String,
    /// Byte offset of the chunk body in the document text
    pub position: usize,
    /// Bytes at the start of the body repeated from the previous chunk
    pub overlap: usize,
    /// Byte length of the `[Source: ...]` prefix
    pub prefix_len: usize,
}

impl Chunk {
    /// Chunk text without the source prefix
    pub fn body(&self) -> &str {
        &self.text[self.prefix_len..]
    }

    /// Body text not shared with the previous chunk
    pub fn fresh_text(&self) -> &str {
        &self.body()[self.overlap..]
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits documents into bounded, source-attributed chunks
#[derive(Debug, Clone)]
pub struct Segmenter {
    max_chars: usize,
    overlap_chars: usize,
}

impl Segmenter {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        if max_chars < MIN_CHUNK_CHARS {
            return Err(RaglineError::Config(format!(
                "chunk size {} is below the minimum of {}",
                max_chars, MIN_CHUNK_CHARS
            )));
        }
        if overlap_chars >= max_chars {
            return Err(RaglineError::Config(format!(
                "chunk overlap {} must be smaller than chunk size {}",
                overlap_chars, max_chars
            )));
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.max_chars, config.overlap_chars)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Segment documents in order. Identical input yields identical output.
    pub fn segment(&self, documents: &[DocumentRecord]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.segment_document(doc))
            .collect()
    }

    /// Segment one document
    pub fn segment_document(&self, doc: &DocumentRecord) -> Vec<Chunk> {
        let prefix = self.source_prefix(&doc.description);
        let budget = self.max_chars - prefix.chars().count();
        let overlap = self.overlap_chars.min(budget.saturating_sub(1));

        let mut ranges = Vec::new();
        split_recursive(
            &doc.text,
            0..doc.text.len(),
            &SEPARATORS,
            budget,
            overlap,
            &mut ranges,
        );

        let mut chunks = Vec::with_capacity(ranges.len());
        let mut prev_end: usize = 0;
        for range in ranges {
            let shared = prev_end.saturating_sub(range.start);
            prev_end = range.end;
            chunks.push(Chunk {
                text: format!("{}{}", prefix, &doc.text[range.clone()]),
                source: doc.source.clone(),
                position: range.start,
                overlap: shared,
                prefix_len: prefix.len(),
            });
        }
        chunks
    }

    /// Build `[Source: <description>]\n`, keeping it within half the chunk size
    fn source_prefix(&self, description: &str) -> String {
        let collapsed = description.split_whitespace().collect::<Vec<_>>().join(" ");
        let fixed = PREFIX_OPEN.chars().count() + PREFIX_CLOSE.chars().count();
        let room = (self.max_chars / 2).saturating_sub(fixed);
        let desc: String = collapsed.chars().take(room).collect();
        format!("{}{}{}", PREFIX_OPEN, desc, PREFIX_CLOSE)
    }
}

fn char_len(text: &str, range: &Range<usize>) -> usize {
    text[range.clone()].chars().count()
}

fn split_recursive(
    text: &str,
    range: Range<usize>,
    separators: &[&str],
    budget: usize,
    overlap: usize,
    out: &mut Vec<Range<usize>>,
) {
    let slice = &text[range.clone()];
    let found = separators
        .iter()
        .position(|sep| slice.contains(sep));

    let (pieces, finer) = match found {
        Some(i) => (
            split_keeping_separator(text, range, separators[i]),
            &separators[i + 1..],
        ),
        None => (split_chars(text, range), &separators[separators.len()..]),
    };

    let mut fitting: Vec<Range<usize>> = Vec::new();
    for piece in pieces {
        if char_len(text, &piece) <= budget {
            fitting.push(piece);
            continue;
        }
        merge_pieces(text, &fitting, budget, overlap, out);
        fitting.clear();
        split_recursive(text, piece, finer, budget, overlap, out);
    }
    merge_pieces(text, &fitting, budget, overlap, out);
}

/// Split on `sep`, attaching each separator to the piece before it
fn split_keeping_separator(text: &str, range: Range<usize>, sep: &str) -> Vec<Range<usize>> {
    let slice = &text[range.clone()];
    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, matched) in slice.match_indices(sep) {
        let end = idx + matched.len();
        pieces.push(range.start + last..range.start + end);
        last = end;
    }
    if last < slice.len() {
        pieces.push(range.start + last..range.end);
    }
    pieces
}

fn split_chars(text: &str, range: Range<usize>) -> Vec<Range<usize>> {
    text[range.clone()]
        .char_indices()
        .map(|(i, c)| range.start + i..range.start + i + c.len_utf8())
        .collect()
}

/// Greedily merge contiguous pieces into chunks of at most `budget` chars,
/// carrying up to `overlap` chars of trailing pieces into the next chunk
fn merge_pieces(
    text: &str,
    pieces: &[Range<usize>],
    budget: usize,
    overlap: usize,
    out: &mut Vec<Range<usize>>,
) {
    let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
    let mut total = 0;

    for piece in pieces {
        let len = char_len(text, piece);
        if total + len > budget && !window.is_empty() {
            out.push(window_span(&window));
            while total > overlap || (total + len > budget && total > 0) {
                match window.pop_front() {
                    Some((_, front_len)) => total -= front_len,
                    None => break,
                }
            }
        }
        window.push_back((piece.clone(), len));
        total += len;
    }

    if !window.is_empty() {
        out.push(window_span(&window));
    }
}

fn window_span(window: &VecDeque<(Range<usize>, usize)>) -> Range<usize> {
    match (window.front(), window.back()) {
        (Some((first, _)), Some((last, _))) => first.start..last.end,
        _ => 0..0,
    }
}
