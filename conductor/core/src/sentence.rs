//! Sentence Splitting
//!
//! Turns a raw response into the ordered sentence cards that the reveal
//! scheduler streams to surfaces. Splitting is deliberately naive: the text is
//! cut on every `.`, blank fragments are dropped, and each surviving fragment
//! is trimmed and gets its full stop back.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Sentence delimiter
const DELIMITER: char = '.';

/// Card colours, cycled by sentence position
pub const PALETTE: [ColorTag; 6] = [
    ColorTag::Red,
    ColorTag::Blue,
    ColorTag::Green,
    ColorTag::Orange,
    ColorTag::Purple,
    ColorTag::Pink,
];

/// Display colour of a sentence card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTag {
    /// `#ff4444`
    Red,
    /// `#4488ff`
    Blue,
    /// `#44ff44`
    Green,
    /// `#ff8844`
    Orange,
    /// `#8844ff`
    Purple,
    /// `#ff4488`
    Pink,
}

impl ColorTag {
    /// Colour for the sentence at `index` (wraps around the palette)
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        PALETTE[index % PALETTE.len()]
    }

    /// RGB components
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (0xff, 0x44, 0x44),
            Self::Blue => (0x44, 0x88, 0xff),
            Self::Green => (0x44, 0xff, 0x44),
            Self::Orange => (0xff, 0x88, 0x44),
            Self::Purple => (0x88, 0x44, 0xff),
            Self::Pink => (0xff, 0x44, 0x88),
        }
    }

    /// Hex notation, e.g. `#ff4444`
    #[must_use]
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Stable identity of a sentence
///
/// `batch` comes from a process-wide counter bumped once per split, and
/// `position` is the sentence's index within that split. Two sentences with
/// the same text therefore never share an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId {
    /// Split invocation this sentence came from
    pub batch: u64,
    /// Position within the split
    pub position: u32,
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}-{}", self.batch, self.position)
    }
}

/// One delimiter-bounded unit of assistant output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Trimmed text, always ending in `.`
    pub text: String,
    /// Card colour
    pub color_tag: ColorTag,
    /// Stable identity
    pub sequence_id: SequenceId,
}

/// Split `text` into sentences
///
/// Empty or whitespace-only input yields no sentences, which callers treat as
/// "nothing to reveal".
#[must_use]
pub fn split(text: &str) -> Vec<Sentence> {
    static BATCH: AtomicU64 = AtomicU64::new(0);

    let fragments: Vec<&str> = text
        .split(DELIMITER)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    if fragments.is_empty() {
        return Vec::new();
    }

    let batch = BATCH.fetch_add(1, Ordering::Relaxed);

    fragments
        .into_iter()
        .enumerate()
        .map(|(position, fragment)| Sentence {
            text: format!("{fragment}{DELIMITER}"),
            color_tag: ColorTag::for_index(position),
            sequence_id: SequenceId {
                batch,
                position: position as u32,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_split_two_sentences() {
        let sentences = split("Hello world. This is a test.");
        assert_eq!(texts(&sentences), vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
        assert!(split(" . .. \n. ").is_empty());
    }

    #[test]
    fn test_split_without_trailing_delimiter() {
        let sentences = split("First. second without stop");
        assert_eq!(texts(&sentences), vec!["First.", "second without stop."]);
    }

    #[test]
    fn test_split_ignores_whitespace_around_delimiters() {
        let padded = split("  Hello world .   This is a test .  ");
        let tight = split("Hello world.This is a test.");
        assert_eq!(texts(&padded), texts(&tight));
    }

    #[test]
    fn test_colors_cycle_palette() {
        let sentences = split("a. b. c. d. e. f. g. h.");
        assert_eq!(sentences[0].color_tag, ColorTag::Red);
        assert_eq!(sentences[5].color_tag, ColorTag::Pink);
        assert_eq!(sentences[6].color_tag, ColorTag::Red);
        assert_eq!(sentences[7].color_tag, ColorTag::Blue);
    }

    #[test]
    fn test_identical_sentences_get_distinct_ids() {
        let sentences = split("Same. Same. Same.");
        assert_eq!(sentences.len(), 3);
        assert_ne!(sentences[0].sequence_id, sentences[1].sequence_id);
        assert_ne!(sentences[1].sequence_id, sentences[2].sequence_id);
    }

    #[test]
    fn test_batches_are_monotonic() {
        let first = split("One.");
        let second = split("One.");
        assert!(second[0].sequence_id.batch > first[0].sequence_id.batch);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(ColorTag::Red.hex(), "#ff4444");
        assert_eq!(ColorTag::Purple.hex(), "#8844ff");
    }
}
