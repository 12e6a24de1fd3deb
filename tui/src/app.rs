//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize, frame ticks)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Advances the Conductor's logical clock every frame
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use humanlike_core::{CardEntrance, ConductorConfig, ConductorState, MessageId};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayMessage, DisplayState, LiveReveal};
use crate::theme::{ACCENT, DIM_GRAY, ON_ACCENT, SELECTED, USER_GREEN};
use crate::widgets::{GridCard, SentenceGrid};

/// Input box height (lines) for text wrapping
const INPUT_HEIGHT: u16 = 5;

/// Frame interval (~30 FPS, enough for the card entrance fade)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient,
    /// Display state derived from ConductorMessages
    display: DisplayState,
    /// Card fade-in
    entrance: CardEntrance,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Selected user message (index into user messages), None = latest
    selected: Option<usize>,

    /// Terminal size
    size: (u16, u16),
}

/// One vertical piece of the conversation
enum Piece<'a> {
    /// A user prompt, collapsed to a rule or expanded to its text
    Prompt {
        message: &'a DisplayMessage,
        expanded: bool,
        selected: bool,
    },
    /// A reply's card grid
    Grid(SentenceGrid<'a>),
    /// Blank line between exchanges
    Gap,
}

impl Piece<'_> {
    fn height(&self, width: u16) -> u16 {
        match self {
            Piece::Prompt {
                message, expanded, ..
            } => {
                if *expanded {
                    let lines = textwrap::wrap(&message.text, usize::from(width.max(1))).len();
                    1 + u16::try_from(lines).unwrap_or(u16::MAX)
                } else {
                    1
                }
            }
            Piece::Grid(grid) => grid.required_height(width),
            Piece::Gap => 1,
        }
    }
}

impl App {
    /// Create a new App for a terminal of `size` (columns, rows)
    pub fn new(config: ConductorConfig, size: (u16, u16)) -> Self {
        Self {
            running: true,
            conductor: ConductorClient::new(config),
            display: DisplayState::new(),
            entrance: CardEntrance::default(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            selected: None,
            size,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.conductor.start()?;
        self.conductor.resized(self.size.0, self.size.1)?;

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event)?,
                    Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                    None => self.running = false,
                },

                // Frame tick
                _ = ticker.tick() => {}
            }

            self.tick()?;
            self.render(terminal)?;
        }

        Ok(())
    }

    /// Advance the Conductor to real time and absorb its messages
    pub fn tick(&mut self) -> anyhow::Result<()> {
        self.conductor.advance()?;
        self.process_conductor_messages();
        Ok(())
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }

        if self.display.quit_requested
            || self.display.conductor_state == ConductorState::ShuttingDown
        {
            self.running = false;
        }
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => Ok(()),
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit()?,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit()?,

            // Expand/collapse
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(id) = self.toggle_target() {
                    self.conductor.toggle_message(id)?;
                }
            }

            // Selection
            KeyCode::Up if key.modifiers.contains(KeyModifiers::ALT) => self.select_previous(),
            KeyCode::Down if key.modifiers.contains(KeyModifiers::ALT) => self.select_next(),

            // Submit message
            KeyCode::Enter => {
                if !self.input_buffer.trim().is_empty() {
                    let message = std::mem::take(&mut self.input_buffer);
                    self.conductor.send_message(message)?;
                    self.scroll_offset = 0;
                    self.selected = None;
                }
            }

            // Typing
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page_size = usize::from(self.conversation_height() / 2);
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page_size).min(max_scroll);
            }
            KeyCode::PageDown => {
                let page_size = usize::from(self.conversation_height() / 2);
                self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
            }

            _ => {}
        }
        Ok(())
    }

    fn quit(&mut self) -> anyhow::Result<()> {
        self.conductor.request_quit()?;
        self.process_conductor_messages();
        self.running = false;
        Ok(())
    }

    /// Message Ctrl+T acts on: the selection, or the latest prompt
    fn toggle_target(&self) -> Option<MessageId> {
        let ids = self.display.user_message_ids();
        match self.selected {
            Some(index) => ids.get(index).cloned(),
            None => ids.last().cloned(),
        }
    }

    fn select_previous(&mut self) {
        let count = self.display.user_message_ids().len();
        if count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => index.saturating_sub(1),
            None => count - 1,
        });
    }

    fn select_next(&mut self) {
        let count = self.display.user_message_ids().len();
        self.selected = match self.selected {
            Some(index) if index + 1 < count => Some(index + 1),
            _ => None,
        };
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) -> anyhow::Result<()> {
        self.size = (width, height);
        self.conductor.resized(width, height)
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Text typed but not yet submitted
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Selected user message index, None when following the latest
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Scroll offset in lines from the bottom
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn conversation_height(&self) -> u16 {
        self.size.1.saturating_sub(INPUT_HEIGHT + 1)
    }

    /// Render the UI
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();

            let chunks = ratatui::layout::Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),
                    Constraint::Length(INPUT_HEIGHT),
                    Constraint::Length(1),
                ])
                .split(area);

            self.render_conversation(chunks[0], buf);
            self.render_input(chunks[1], buf);
            self.render_status(chunks[2], buf);
        })?;

        Ok(())
    }

    /// Lay out the conversation top to bottom
    fn pieces<'a>(
        display: &'a DisplayState,
        selected_id: Option<&MessageId>,
        now: Instant,
        entrance: &CardEntrance,
    ) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();

        for exchange in display.exchanges() {
            if let Some(message) = exchange.prompt {
                pieces.push(Piece::Prompt {
                    message,
                    expanded: display.is_expanded(&message.id),
                    selected: selected_id == Some(&message.id),
                });
            }
            if let Some(reply) = exchange.reply {
                if let Some(layout) = reply.layout.as_ref() {
                    let cards = reply.sentences.iter().map(GridCard::settled).collect();
                    pieces.push(Piece::Grid(SentenceGrid::new(layout, cards)));
                }
            }
            pieces.push(Piece::Gap);
        }

        if let Some(live) = display.live.as_ref() {
            pieces.push(Piece::Grid(live_grid(live, now, entrance)));
        }

        pieces
    }

    /// Render conversation into an off-screen buffer, then copy the visible rows
    fn render_conversation(&mut self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(1);
        if width < 10 || area.height < 3 {
            return;
        }

        let selected_id = self
            .selected
            .and_then(|index| self.display.user_message_ids().get(index).cloned());
        let pieces = Self::pieces(
            &self.display,
            selected_id.as_ref(),
            Instant::now(),
            &self.entrance,
        );

        let heights: Vec<u16> = pieces.iter().map(|p| p.height(width)).collect();
        let total = heights.iter().fold(0_u16, |acc, h| acc.saturating_add(*h));
        self.total_lines = usize::from(total);

        // Clamp scroll offset
        let height = usize::from(area.height);
        let max_scroll = self.total_lines.saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let mut canvas = Buffer::empty(Rect::new(0, 0, width, total));
        let mut y = 0_u16;
        for (piece, h) in pieces.into_iter().zip(heights) {
            let piece_area = Rect::new(0, y, width, h);
            match piece {
                Piece::Prompt {
                    message,
                    expanded,
                    selected,
                } => render_prompt(message, expanded, selected, piece_area, &mut canvas),
                Piece::Grid(grid) => grid.render(piece_area, &mut canvas),
                Piece::Gap => {}
            }
            y = y.saturating_add(h);
        }

        // Calculate visible range
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        // Anchor to the bottom when the conversation is shorter than the area
        let top_padding = height.saturating_sub(visible_end - visible_start);

        for (row, src_y) in (visible_start..visible_end).enumerate() {
            let dst_y = area.y + u16::try_from(row + top_padding).unwrap_or(u16::MAX);
            let Ok(src_y) = u16::try_from(src_y) else {
                break;
            };
            for x in 0..width {
                buf[(area.x + x, dst_y)] = canvas[(x, src_y)].clone();
            }
        }
    }

    /// Render input area
    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let separator = "─".repeat(usize::from(area.width));
        buf.set_string(area.x, area.y, &separator, Style::default().fg(DIM_GRAY));

        let text_height = usize::from(area.height.saturating_sub(1));
        let text_width = usize::from(area.width.saturating_sub(1));
        if text_width < 5 || text_height < 1 {
            return;
        }

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped = textwrap::wrap(&full_input, text_width);
        let skip = wrapped.len().saturating_sub(text_height);

        for (i, line) in wrapped.iter().skip(skip).enumerate() {
            let y = area.y + 1 + u16::try_from(i).unwrap_or(u16::MAX);
            if y < area.bottom() {
                buf.set_string(area.x, y, line, Style::default().fg(USER_GREEN));
            }
        }
    }

    /// Render status bar
    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().bg(ACCENT).fg(ON_ACCENT);
        buf.set_style(area, style);

        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines]", self.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(
            " {} | {} | Enter send | Ctrl+T expand | Alt+Up/Down select | Esc quit{}",
            self.display.conductor_state.description(),
            self.conductor.viewport_class().name(),
            scroll_info,
        );

        buf.set_stringn(area.x, area.y, &status, usize::from(area.width), style);
    }
}

/// Grid for the reply being revealed: fading cards, then placeholders
fn live_grid<'a>(live: &'a LiveReveal, now: Instant, entrance: &CardEntrance) -> SentenceGrid<'a> {
    let mut cards: Vec<GridCard<'a>> = live
        .cards
        .iter()
        .map(|card| {
            let elapsed = now.saturating_duration_since(card.revealed_at);
            GridCard::entering(&card.sentence, entrance, elapsed)
        })
        .collect();
    let slots = live.layout.slot_count().max(live.sentence_count);
    cards.resize(slots, GridCard::Pending);
    SentenceGrid::new(&live.layout, cards)
}

/// A prompt is a thin rule when collapsed and its text when expanded
fn render_prompt(
    message: &DisplayMessage,
    expanded: bool,
    selected: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let mut rule_style = Style::default().fg(if selected { SELECTED } else { DIM_GRAY });
    if selected {
        rule_style = rule_style.add_modifier(Modifier::BOLD);
    }
    let marker = if expanded { "▾ You " } else { "▸ You " };
    let rule = format!(
        "{marker}{}",
        "─".repeat(usize::from(area.width).saturating_sub(marker.width()))
    );
    buf.set_stringn(area.x, area.y, &rule, usize::from(area.width), rule_style);

    if expanded {
        let wrapped = textwrap::wrap(&message.text, usize::from(area.width.max(1)));
        for (i, line) in wrapped.iter().enumerate() {
            let y = area.y + 1 + u16::try_from(i).unwrap_or(u16::MAX);
            if y >= area.bottom() {
                break;
            }
            buf.set_string(area.x, y, line, Style::default().fg(USER_GREEN));
        }
    }
}
