//! Compile-time styling for the prompt panel.
//!
//! This is the whole "stylesheet" of the program: an immutable set of
//! palette and metric constants applied once while painting. Nothing in
//! here is configurable at runtime.

use euclid::default::Size2D;

/// A straight-alpha sRGB colour. Premultiplication happens at blend time
/// inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque colour from a `0xRRGGBB` literal.
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
            a: 0xff,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

// Catppuccin Mocha, same palette the original panel shipped with.
pub const BASE: Color = Color::rgb(0x1e1e2e);
pub const SURFACE0: Color = Color::rgb(0x313244);
pub const SURFACE1: Color = Color::rgb(0x45475a);
pub const SURFACE2: Color = Color::rgb(0x585b70);
pub const TEXT: Color = Color::rgb(0xcdd6f4);
pub const OVERLAY0: Color = Color::rgb(0x6c7086);
pub const BLUE: Color = Color::rgb(0x89b4fa);
pub const GREEN: Color = Color::rgb(0xa6e3a1);
pub const TEAL: Color = Color::rgb(0x94e2d5);

pub const PANEL_BG: Color = BASE;
pub const PANEL_BORDER: Color = SURFACE0;
pub const ICON_BG: Color = SURFACE0;
pub const ICON_GLYPH: Color = BLUE;
pub const FOCUS_RING: Color = BLUE;

/// Per-state button colours, one constant per control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub normal: Color,
    pub hovered: Color,
    pub pressed: Color,
    pub label: Color,
}

pub const CANCEL_BUTTON: ButtonStyle = ButtonStyle {
    normal: SURFACE0,
    hovered: SURFACE1,
    pressed: SURFACE2,
    label: TEXT,
};

pub const CONFIRM_BUTTON: ButtonStyle = ButtonStyle {
    normal: GREEN,
    hovered: TEAL,
    pressed: TEAL,
    label: BASE,
};

/// Logical size of the panel; the compositor centres the surface because
/// no edges are anchored.
pub const PANEL_SIZE: Size2D<f32> = Size2D::new(340.0, 248.0);

pub const PANEL_RADIUS: f32 = 12.0;
pub const PANEL_BORDER_WIDTH: f32 = 1.0;
pub const PANEL_PADDING: f32 = 20.0;
pub const SECTION_SPACING: f32 = 14.0;

pub const ICON_SIZE: f32 = 48.0;
pub const ICON_FONT_SIZE: f32 = 26.0;

pub const TITLE_HEIGHT: f32 = 22.0;
pub const TITLE_FONT_SIZE: f32 = 17.0;

pub const MESSAGE_HEIGHT: f32 = 52.0;
pub const MESSAGE_FONT_SIZE: f32 = 13.0;

pub const BUTTON_HEIGHT: f32 = 34.0;
pub const BUTTON_GAP: f32 = 12.0;
pub const BUTTON_RADIUS: f32 = 6.0;
pub const BUTTON_FONT_SIZE: f32 = 14.0;

pub const FOCUS_RING_WIDTH: f32 = 2.0;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rgb_literal_splits_into_channels() {
        let c = Color::rgb(0xa6e3a1);
        assert_eq!((c.r, c.g, c.b, c.a), (0xa6, 0xe3, 0xa1, 0xff));
    }

    #[test]
    fn with_alpha_keeps_channels() {
        let c = TEXT.with_alpha(0x80);
        assert_eq!((c.r, c.g, c.b), (TEXT.r, TEXT.g, TEXT.b));
        assert_eq!(c.a, 0x80);
    }

    #[test]
    fn buttons_share_the_panel_palette() {
        // The affirmative label must stay readable on the accent fill.
        assert_eq!(CONFIRM_BUTTON.label, PANEL_BG);
        assert_eq!(CANCEL_BUTTON.normal, PANEL_BORDER);
    }
}
