//! Recursive chunking strategy

use std::collections::VecDeque;
use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Granularity used to split an oversized span, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitLevel {
    Paragraph,
    Line,
    Sentence,
    Word,
    Character,
}

impl SplitLevel {
    fn finer(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Line),
            Self::Line => Some(Self::Sentence),
            Self::Sentence => Some(Self::Word),
            Self::Word => Some(Self::Character),
            Self::Character => None,
        }
    }

    /// Contiguous pieces whose concatenation is exactly `text`
    fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Paragraph => text.split_inclusive("\n\n").collect(),
            Self::Line => text.split_inclusive('\n').collect(),
            Self::Sentence => text.split_sentence_bounds().collect(),
            Self::Word => text.split_inclusive(char::is_whitespace).collect(),
            Self::Character => text
                .char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect(),
        }
    }
}

/// Chunking strategy that recursively splits text hierarchically
///
/// Splitting order: paragraphs -> lines -> sentences -> words -> characters.
/// A span is only split further while it exceeds the chunk size. The
/// resulting segments are merged greedily, carrying trailing segments of at
/// most `chunk_overlap` characters into the next chunk.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl RecursiveChunker {
    /// Create a new recursive chunker
    pub fn new() -> Self {
        Self
    }

    /// Byte ranges of segments no longer than `max_chars`, in order
    fn segment(text: &str, max_chars: usize) -> Vec<Range<usize>> {
        let mut segments = Vec::new();
        Self::segment_into(text, 0, SplitLevel::Paragraph, max_chars, &mut segments);
        segments
    }

    fn segment_into(
        text: &str,
        offset: usize,
        level: SplitLevel,
        max_chars: usize,
        out: &mut Vec<Range<usize>>,
    ) {
        if text.is_empty() {
            return;
        }

        if char_len(text) <= max_chars {
            out.push(offset..offset + text.len());
            return;
        }

        let mut start = offset;
        for piece in level.split(text) {
            match level.finer() {
                Some(finer) if char_len(piece) > max_chars => {
                    Self::segment_into(piece, start, finer, max_chars, out);
                }
                // single characters always fit since max_chars >= 1
                _ => out.push(start..start + piece.len()),
            }
            start += piece.len();
        }
    }

    /// Greedily merge segments into windows of at most `chunk_size` chars
    fn merge(text: &str, segments: &[Range<usize>], config: &ChunkingConfig) -> Vec<Range<usize>> {
        let mut windows = Vec::new();
        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut total = 0;

        for segment in segments {
            let len = char_len(&text[segment.clone()]);

            // whitespace never starts a new window, it is trimmed from the flushed one
            let blank = text[segment.clone()].trim().is_empty();

            if total + len > config.chunk_size && !window.is_empty() && !blank {
                windows.push(Self::span(&window));

                while total > config.chunk_overlap
                    || (total + len > config.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((segment.clone(), len));
            total += len;
        }

        if !window.is_empty() {
            windows.push(Self::span(&window));
        }

        windows
    }

    fn span(window: &VecDeque<(Range<usize>, usize)>) -> Range<usize> {
        match (window.front(), window.back()) {
            (Some((first, _)), Some((last, _))) => first.start..last.end,
            _ => 0..0,
        }
    }

    /// Shrink a byte range to exclude leading and trailing whitespace
    fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
        let slice = &text[range.clone()];
        let leading = slice.len() - slice.trim_start().len();
        let trailing = slice.len() - slice.trim_end().len();

        if leading == slice.len() {
            return range.start..range.start;
        }

        range.start + leading..range.end - trailing
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        let segments = Self::segment(content, config.chunk_size);

        let ranges: Vec<Range<usize>> = Self::merge(content, &segments, config)
            .into_iter()
            .map(|range| Self::trim_range(content, range))
            .filter(|range| !range.is_empty())
            .collect();

        let total = ranges.len();

        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                Chunk::new(
                    &content[range.clone()],
                    ChunkMetadata::new(i, total, range.start, range.end),
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
