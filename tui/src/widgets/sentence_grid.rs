//! Sentence Grid Widget
//!
//! Draws a reply as rows of bordered cards. Each row is split horizontally
//! by its slot widths, so a row `[1, 1, 3]` gives its last card three fifths
//! of the line. A partial last row still spans the full width.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use humanlike_core::{CardEntrance, GridRow, Layout, Sentence};

use crate::theme::{card_color, CARD_ENTRANCE_FROM, PLACEHOLDER};

/// Height of a slot whose sentence has not arrived
const PENDING_TEXT_LINES: u16 = 1;

/// One slot in the grid
#[derive(Clone, Copy, Debug)]
pub enum GridCard<'a> {
    /// A revealed sentence drawn in `color`
    Shown {
        /// The sentence
        sentence: &'a Sentence,
        /// Border and text colour
        color: Color,
    },
    /// A slot still waiting for its sentence
    Pending,
}

impl<'a> GridCard<'a> {
    /// A settled card in its palette colour
    pub fn settled(sentence: &'a Sentence) -> Self {
        Self::Shown {
            sentence,
            color: card_color(sentence.color_tag),
        }
    }

    /// A card `elapsed` into its entrance fade
    pub fn entering(sentence: &'a Sentence, entrance: &CardEntrance, elapsed: Duration) -> Self {
        let (r, g, b) = entrance.blend(CARD_ENTRANCE_FROM, sentence.color_tag.rgb(), elapsed);
        Self::Shown {
            sentence,
            color: Color::Rgb(r, g, b),
        }
    }

    fn text_lines(&self, inner_width: u16) -> Vec<String> {
        match self {
            GridCard::Shown { sentence, .. } => {
                textwrap::wrap(&sentence.text, usize::from(inner_width.max(1)))
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect()
            }
            GridCard::Pending => Vec::new(),
        }
    }

    fn text_height(&self, inner_width: u16) -> u16 {
        match self {
            GridCard::Shown { .. } => {
                u16::try_from(self.text_lines(inner_width).len()).unwrap_or(u16::MAX)
            }
            GridCard::Pending => PENDING_TEXT_LINES,
        }
    }
}

/// Cards laid out over a reply's grid
///
/// `cards[i]` fills slot `i`. Slots past the end of `cards` are skipped.
#[derive(Debug)]
pub struct SentenceGrid<'a> {
    layout: &'a Layout,
    cards: Vec<GridCard<'a>>,
}

impl<'a> SentenceGrid<'a> {
    /// Create a grid over `layout`
    pub fn new(layout: &'a Layout, cards: Vec<GridCard<'a>>) -> Self {
        Self { layout, cards }
    }

    /// Rows needed to draw the grid at `width` columns
    pub fn required_height(&self, width: u16) -> u16 {
        self.row_heights(width).into_iter().fold(0, u16::saturating_add)
    }

    fn row_heights(&self, width: u16) -> Vec<u16> {
        self.rows()
            .map(|(first, row)| {
                let columns = split_row(row, Rect::new(0, 0, width, 1));
                self.cards_in(first, row)
                    .zip(columns.iter())
                    .map(|(card, column)| card.text_height(column.width.saturating_sub(2)) + 2)
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Rows that hold at least one card
    fn rows(&self) -> impl Iterator<Item = (usize, &'a GridRow)> + '_ {
        self.layout
            .rows_with_offsets()
            .take_while(|(first, _)| *first < self.cards.len())
    }

    fn cards_in(&self, first: usize, row: &GridRow) -> impl Iterator<Item = &GridCard<'a>> + '_ {
        let end = (first + row.len()).min(self.cards.len());
        self.cards[first..end].iter()
    }
}

/// Split `area` horizontally by the row's slot widths
fn split_row(row: &GridRow, area: Rect) -> std::rc::Rc<[Rect]> {
    let total = row.total_width().max(1);
    let constraints: Vec<Constraint> = row
        .widths()
        .iter()
        .map(|&w| Constraint::Ratio(u32::from(w), total))
        .collect();
    ratatui::layout::Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
}

impl Widget for SentenceGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let heights = self.row_heights(area.width);
        let mut y = area.y;

        for ((first, row), height) in self.rows().zip(heights) {
            if y >= area.bottom() {
                break;
            }
            let row_area = Rect::new(area.x, y, area.width, height.min(area.bottom() - y));
            let columns = split_row(row, row_area);

            for (card, column) in self.cards_in(first, row).zip(columns.iter()) {
                render_card(card, *column, buf);
            }
            y = y.saturating_add(height);
        }
    }
}

fn render_card(card: &GridCard<'_>, area: Rect, buf: &mut Buffer) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    match card {
        GridCard::Shown { color, .. } => {
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(*color));
            let lines: Vec<Line> = card
                .text_lines(area.width.saturating_sub(2))
                .into_iter()
                .map(Line::from)
                .collect();
            Paragraph::new(lines)
                .style(Style::default().fg(*color))
                .block(block)
                .render(area, buf);
        }
        GridCard::Pending => {
            Block::bordered()
                .border_type(BorderType::Plain)
                .border_style(Style::default().fg(PLACEHOLDER))
                .render(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humanlike_core::sentence::split;
    use pretty_assertions::assert_eq;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_single_row_height() {
        let sentences = split("One. Two.");
        let layout = Layout::from_rows(vec![GridRow::new(vec![2_u8, 3])]);
        let cards = sentences.iter().map(GridCard::settled).collect();
        let grid = SentenceGrid::new(&layout, cards);
        assert_eq!(grid.required_height(40), 3);
    }

    #[test]
    fn test_wrapping_grows_row() {
        let sentences = split("A fairly long sentence that will not fit on one narrow line.");
        let layout = Layout::from_rows(vec![GridRow::new(vec![5_u8])]);
        let cards = sentences.iter().map(GridCard::settled).collect();
        let grid = SentenceGrid::new(&layout, cards);
        assert!(grid.required_height(20) > 3);
    }

    #[test]
    fn test_rows_without_cards_are_skipped() {
        let sentences = split("One.");
        let layout = Layout::from_rows(vec![
            GridRow::new(vec![5_u8]),
            GridRow::new(vec![2_u8, 3]),
        ]);
        let cards = sentences.iter().map(GridCard::settled).collect();
        let grid = SentenceGrid::new(&layout, cards);
        assert_eq!(grid.required_height(30), 3);
    }

    #[test]
    fn test_pending_cards_reserve_space() {
        let layout = Layout::from_rows(vec![GridRow::new(vec![1_u8, 1])]);
        let grid = SentenceGrid::new(&layout, vec![GridCard::Pending, GridCard::Pending]);
        assert_eq!(grid.required_height(20), 3);
    }

    #[test]
    fn test_render_places_cards_by_width() {
        let sentences = split("Hi. Yo.");
        let layout = Layout::from_rows(vec![GridRow::new(vec![2_u8, 3])]);
        let cards = sentences.iter().map(GridCard::settled).collect();
        let grid = SentenceGrid::new(&layout, cards);

        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        grid.render(area, &mut buf);

        let middle = row_text(&buf, 1);
        let left: String = middle.chars().take(8).collect();
        let right: String = middle.chars().skip(8).collect();
        // 2/5 of 20 columns is 8, so the second card starts at column 8
        assert_eq!(buf[(0, 0)].symbol(), "╭");
        assert_eq!(buf[(8, 0)].symbol(), "╭");
        assert!(left.contains("Hi."));
        assert!(right.contains("Yo."));
    }

    #[test]
    fn test_card_colour_follows_palette() {
        let sentences = split("Red.");
        let layout = Layout::from_rows(vec![GridRow::new(vec![5_u8])]);
        let grid = SentenceGrid::new(&layout, vec![GridCard::settled(&sentences[0])]);

        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        grid.render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, card_color(sentences[0].color_tag));
    }

    #[test]
    fn test_entering_card_starts_dim() {
        let sentences = split("Fade.");
        let entrance = CardEntrance::default();
        match GridCard::entering(&sentences[0], &entrance, Duration::ZERO) {
            GridCard::Shown { color, .. } => {
                let (r, g, b) = CARD_ENTRANCE_FROM;
                assert_eq!(color, Color::Rgb(r, g, b));
            }
            GridCard::Pending => panic!("expected a shown card"),
        }
    }
}
