//! Theme and Colors
//!
//! Card colours come from the core's sentence palette; everything else is
//! chrome around the conversation.

use ratatui::style::Color;

use humanlike_core::ColorTag;

// ============================================================================
// Card Colors
// ============================================================================

/// Terminal colour for a sentence card
#[must_use]
pub fn card_color(tag: ColorTag) -> Color {
    let (r, g, b) = tag.rgb();
    Color::Rgb(r, g, b)
}

/// Starting colour of a card's entrance fade
pub const CARD_ENTRANCE_FROM: (u8, u8, u8) = (60, 60, 60);

/// Border of a slot whose sentence has not arrived yet
pub const PLACEHOLDER: Color = Color::Rgb(70, 70, 70);

// ============================================================================
// UI Colors
// ============================================================================

/// Status bar background
pub const ACCENT: Color = Color::Rgb(0xF5, 0x49, 0x27);

/// Text drawn on the accent colour
pub const ON_ACCENT: Color = Color::Rgb(255, 255, 255);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Highlight for the selected message
pub const SELECTED: Color = Color::Rgb(255, 223, 128);
