//! Splits large design-export documents into bounded, ordered chunks.
//!
//! Figma API exports routinely run to hundreds of thousands of lines —
//! far past any model context window. The chunker first collapses
//! redundant blank-line runs (they carry no information in the export
//! format), then partitions the remaining lines into contiguous groups
//! sized for one model call each.

use figforge_shared::{FigforgeError, Result};

/// An ordered, contiguous slice of a document's lines.
///
/// Concatenating all chunks' text in index order reproduces the
/// normalized document exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position in the chunk sequence.
    pub index: usize,
    /// Total number of chunks in the sequence, fixed once chunking completes.
    pub total: usize,
    /// The chunk's lines, joined with `\n`.
    pub text: String,
}

/// Collapse every run of two or more consecutive blank lines into a
/// single blank line. Idempotent.
///
/// A line is blank when it is empty after trimming whitespace.
pub fn normalize(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut prev_blank = false;

    for line in text.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        lines.push(line);
        prev_blank = is_blank;
    }

    lines.join("\n")
}

/// Drop all blank lines from a text. Used to compact auxiliary prompt
/// inputs (theme files, convention documents) before slotting them into
/// a template.
pub fn strip_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a document into ordered chunks of at most `max_lines_per_chunk`
/// normalized lines each.
///
/// The document is normalized first (see [`normalize`]). An empty
/// document yields an empty sequence. When the line count is an exact
/// multiple of the chunk size, no trailing empty chunk is emitted.
pub fn chunk_document(text: &str, max_lines_per_chunk: usize) -> Result<Vec<Chunk>> {
    if max_lines_per_chunk == 0 {
        return Err(FigforgeError::invalid_input(
            "max_lines_per_chunk must be a positive integer",
        ));
    }

    let normalized = normalize(text);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let lines: Vec<&str> = normalized.lines().collect();
    let total = lines.len().div_ceil(max_lines_per_chunk);

    let chunks = lines
        .chunks(max_lines_per_chunk)
        .enumerate()
        .map(|(i, group)| Chunk {
            index: i + 1,
            total,
            text: group.join("\n"),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        lines = lines.len(),
        chunks = chunks.len(),
        max_lines_per_chunk,
        "document chunked"
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn normalize_collapses_blank_runs() {
        let input = "a\n\n\n\nb\n\nc";
        assert_eq!(normalize(input), "a\n\nb\n\nc");
    }

    #[test]
    fn normalize_treats_whitespace_lines_as_blank() {
        let input = "a\n  \n\t\nb";
        assert_eq!(normalize(input), "a\n  \nb");
    }

    #[test]
    fn normalize_is_idempotent() {
        let input = "a\n\n\n\nb\n\n\nc\n\nd";
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_blank_lines_drops_all_blanks() {
        let input = "a\n\nb\n   \nc";
        assert_eq!(strip_blank_lines(input), "a\nb\nc");
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        let err = chunk_document("some text", 0).unwrap_err();
        assert!(matches!(err, FigforgeError::InvalidInput { .. }));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(chunk_document("", 10).unwrap().is_empty());
    }

    #[test]
    fn chunks_cover_document_exactly_once() {
        let doc = numbered_lines(25);
        let chunks = chunk_document(&doc, 10).unwrap();

        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(rejoined, normalize(&doc));
    }

    #[test]
    fn chunks_respect_size_bound() {
        let doc = numbered_lines(25);
        let chunks = chunk_document(&doc, 10).unwrap();

        assert_eq!(chunks.len(), 3);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.text.lines().count()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn chunk_count_is_ceiling_of_line_ratio() {
        let doc = numbered_lines(20);
        assert_eq!(chunk_document(&doc, 8).unwrap().len(), 3);
        assert_eq!(chunk_document(&doc, 20).unwrap().len(), 1);
        assert_eq!(chunk_document(&doc, 100).unwrap().len(), 1);
    }

    #[test]
    fn exact_multiple_emits_no_trailing_empty_chunk() {
        let doc = numbered_lines(30);
        let chunks = chunk_document(&doc, 10).unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
        assert_eq!(chunks.last().unwrap().text.lines().count(), 10);
    }

    #[test]
    fn indices_are_one_based_with_fixed_total() {
        let doc = numbered_lines(20);
        let chunks = chunk_document(&doc, 8).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
            assert_eq!(chunk.total, 3);
        }
    }

    #[test]
    fn blank_runs_shrink_chunk_count() {
        // 12 content lines separated by triple blanks: normalization
        // leaves 12 + 11 = 23 lines instead of 45.
        let doc = (1..=12)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n\n\n\n");
        let chunks = chunk_document(&doc, 23).unwrap();
        assert_eq!(chunks.len(), 1);
    }
}
