//! Theme and Colors
//!
//! Teller's palette: calm teal for chrome, warm gold for money, clear
//! green/red for credits and debits.

use ratatui::style::Color;

// ============================================================================
// Brand
// ============================================================================

/// Primary chrome - teal
pub const PRIMARY: Color = Color::Rgb(38, 166, 154);

/// Primary, dimmed for inactive borders
pub const PRIMARY_DIM: Color = Color::Rgb(24, 100, 93);

/// Accent for amounts and highlights - warm gold
pub const ACCENT: Color = Color::Rgb(255, 202, 96);

// ============================================================================
// Feedback
// ============================================================================

/// Success toasts and completed statuses
pub const SUCCESS: Color = Color::Rgb(120, 200, 120);

/// Error toasts and failed statuses
pub const ERROR: Color = Color::Rgb(255, 100, 100);

/// Warnings and pending statuses
pub const WARNING: Color = Color::Rgb(255, 190, 90);

/// Secondary text
pub const DIM: Color = Color::Rgb(130, 140, 140);

// ============================================================================
// Money
// ============================================================================

/// Credits (money in)
pub const CREDIT: Color = Color::Rgb(120, 200, 120);

/// Debits (money out)
pub const DEBIT: Color = Color::Rgb(230, 120, 120);

/// Spinner frames for loading states and the typing indicator
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame for a given tick counter
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}
