//! Theme and Colors
//!
//! Sage's color palette - muted sage green accents over the terminal's
//! own background, with dim grays for chrome.

use ratatui::style::Color;

// ============================================================================
// Sage Palette
// ============================================================================

/// Sage's signature accent - soft sage green (assistant text, titles)
pub const SAGE_ACCENT: Color = Color::Rgb(156, 207, 168);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Reference link blue
pub const LINK_BLUE: Color = Color::Rgb(100, 160, 255);
