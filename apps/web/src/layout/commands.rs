//! Draw commands: the output vocabulary of the layout engine.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page.
//! Commands carry everything the renderer needs; the renderer never consults
//! the `SheetSpec`.

use std::sync::Arc;

use crate::layout::font_metrics::get_metrics;

// ────────────────────────────────────────────────────────────────────────────
// Style types
// ────────────────────────────────────────────────────────────────────────────

/// The two base-14 faces used on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    /// PostScript base font name written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }
}

/// Horizontal anchoring of a text run relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

// ────────────────────────────────────────────────────────────────────────────
// Commands
// ────────────────────────────────────────────────────────────────────────────

/// Decoded logo pixels, 8 bits per component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
    /// Row-major alpha plane, present only when the source had transparency.
    pub alpha: Option<Vec<u8>>,
}

/// One primitive drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Stroked rectangle; `(x, y)` is the bottom-left corner.
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
    },
    /// Stroked, unfilled circle.
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        line_width: f32,
    },
    /// Single-line text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontFace,
        size: f32,
        align: TextAlign,
    },
    /// Image stretched to fill the box with bottom-left corner `(x, y)`.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: Arc<LogoImage>,
    },
}

impl DrawCommand {
    pub fn text(
        x: f32,
        y: f32,
        text: impl Into<String>,
        font: FontFace,
        size: f32,
        align: TextAlign,
    ) -> Self {
        DrawCommand::Text {
            x,
            y,
            text: text.into(),
            font,
            size,
            align,
        }
    }

    /// Left edge of a text run once alignment is applied.
    ///
    /// Returns `None` for non-text commands.
    pub fn text_origin_x(&self) -> Option<f32> {
        match self {
            DrawCommand::Text {
                x,
                text,
                font,
                size,
                align,
                ..
            } => {
                let width = get_metrics(*font).measure(text, *size);
                Some(match align {
                    TextAlign::Left => *x,
                    TextAlign::Center => x - width / 2.0,
                    TextAlign::Right => x - width,
                })
            }
            _ => None,
        }
    }
}
