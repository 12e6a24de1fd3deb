//! Grid Layout Generation
//!
//! Partitions a sentence count into rows of card widths. Each row entry is one
//! sentence slot; its value is the slot's relative width within the row.
//!
//! # Accounting
//!
//! A row consumes as many sentences as it has *entries*, not as much as its
//! widths add up to. `[1, 4]` places two sentences, `[5]` places one. Row
//! candidates are filtered by entry count against the remaining sentence
//! count, and every chosen row consumes between 1 and `remaining` entries, so
//! generation always ends with exactly `sentence_count` slots.
//!
//! # Viewports
//!
//! - **Standard**: rows come from a catalog whose widths all sum to
//!   [`ROW_CAPACITY`]. Fewer than five remaining sentences are handled by
//!   fallbacks whose entry count equals the remainder.
//! - **Compact**: short rows of one to three cards, widths 1 or 2.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Width budget of a standard row
pub const ROW_CAPACITY: u8 = 5;

/// Default width at or under which a viewport is compact
pub const DEFAULT_COMPACT_MAX_WIDTH: u32 = 768;

const STANDARD_ROWS: &[&[u8]] = &[
    &[1, 1, 1, 1, 1],
    &[1, 1, 1, 2],
    &[1, 1, 3],
    &[1, 2, 2],
    &[1, 4],
    &[2, 3],
    &[5],
];

const STANDARD_FOUR: &[&[u8]] = &[&[1, 1, 1, 2], &[1, 1, 1, 1]];
const STANDARD_THREE: &[&[u8]] = &[&[1, 1, 3], &[1, 2, 2]];
const STANDARD_TWO: &[&[u8]] = &[&[2, 3]];
const STANDARD_ONE: &[&[u8]] = &[&[5]];

const COMPACT_ROWS: &[&[u8]] = &[&[1, 1], &[1, 1, 1], &[1, 2], &[2]];
const COMPACT_TWO: &[&[u8]] = &[&[1, 1]];
const COMPACT_ONE: &[&[u8]] = &[&[1]];

/// Viewport class, fixed for the lifetime of one reveal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewportClass {
    /// Narrow device
    Compact,
    /// Everything wider
    #[default]
    Standard,
}

impl ViewportClass {
    /// Classify a viewport width
    #[must_use]
    pub fn from_width(width: u32, compact_max_width: u32) -> Self {
        if width <= compact_max_width {
            Self::Compact
        } else {
            Self::Standard
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Standard => "standard",
        }
    }

    /// Candidate rows when `remaining` sentences are left
    fn catalog(self, remaining: usize) -> &'static [&'static [u8]] {
        match (self, remaining) {
            (Self::Standard, 0) | (Self::Compact, 0) => &[],
            (Self::Standard, 1) => STANDARD_ONE,
            (Self::Standard, 2) => STANDARD_TWO,
            (Self::Standard, 3) => STANDARD_THREE,
            (Self::Standard, 4) => STANDARD_FOUR,
            (Self::Standard, _) => STANDARD_ROWS,
            (Self::Compact, 1) => COMPACT_ONE,
            (Self::Compact, 2) => COMPACT_TWO,
            (Self::Compact, _) => COMPACT_ROWS,
        }
    }

    /// Row that always fits one remaining sentence
    fn single_card(self) -> &'static [u8] {
        match self {
            Self::Standard => &[ROW_CAPACITY],
            Self::Compact => &[1],
        }
    }
}

/// One grid row: the relative widths of its sentence slots
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow(Vec<u8>);

impl GridRow {
    /// Create a row from widths
    #[must_use]
    pub fn new(widths: impl Into<Vec<u8>>) -> Self {
        Self(widths.into())
    }

    /// Slot widths, left to right
    #[must_use]
    pub fn widths(&self) -> &[u8] {
        &self.0
    }

    /// Number of sentence slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the slot widths
    #[must_use]
    pub fn total_width(&self) -> u32 {
        self.0.iter().map(|&w| u32::from(w)).sum()
    }
}

/// Position of one sentence inside a layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Row index, top to bottom
    pub row: usize,
    /// Column index within the row
    pub column: usize,
    /// Relative width
    pub width: u8,
}

/// Ordered grid rows; the n-th slot holds the n-th sentence
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    rows: Vec<GridRow>,
}

impl Layout {
    /// Create a layout from rows
    #[must_use]
    pub fn from_rows(rows: Vec<GridRow>) -> Self {
        Self { rows }
    }

    /// Rows, top to bottom
    #[must_use]
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Whether the layout has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of sentence slots
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.rows.iter().map(GridRow::len).sum()
    }

    /// Where sentence `index` sits, if the layout has room for it
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<Slot> {
        let mut first = 0;
        for (row, grid_row) in self.rows.iter().enumerate() {
            if index < first + grid_row.len() {
                let column = index - first;
                return Some(Slot {
                    row,
                    column,
                    width: grid_row.widths()[column],
                });
            }
            first += grid_row.len();
        }
        None
    }

    /// Rows paired with the index of their first sentence
    pub fn rows_with_offsets(&self) -> impl Iterator<Item = (usize, &GridRow)> + '_ {
        self.rows.iter().scan(0, |first, row| {
            let start = *first;
            *first += row.len();
            Some((start, row))
        })
    }
}

/// Random row selection, with an injectable random source
#[derive(Debug)]
pub struct LayoutGenerator<R: Rng = StdRng> {
    rng: R,
}

impl LayoutGenerator<StdRng> {
    /// Generator seeded from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible layouts
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Default for LayoutGenerator<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> LayoutGenerator<R> {
    /// Wrap an existing random source
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Build a layout with exactly `sentence_count` slots
    pub fn generate(&mut self, sentence_count: usize, viewport: ViewportClass) -> Layout {
        let mut rows = Vec::new();
        let mut remaining = sentence_count;

        while remaining > 0 {
            let candidates: Vec<&'static [u8]> = viewport
                .catalog(remaining)
                .iter()
                .copied()
                .filter(|row| !row.is_empty() && row.len() <= remaining)
                .collect();

            let widths = candidates
                .choose(&mut self.rng)
                .copied()
                .unwrap_or_else(|| viewport.single_card());

            remaining -= widths.len();
            rows.push(GridRow::new(widths));
        }

        let layout = Layout::from_rows(rows);
        debug_assert_eq!(layout.slot_count(), sentence_count);

        tracing::trace!(
            sentence_count,
            rows = layout.rows().len(),
            viewport = viewport.name(),
            "Generated grid layout"
        );

        layout
    }
}
