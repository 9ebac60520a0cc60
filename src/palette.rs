//! Named colors and the per-term palette

use crate::error::{Error, Result};
use pdfium_render::prelude::PdfColor;
use std::fmt;

/// A color with a stable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

impl NamedColor {
    const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name,
            rgb: (r, g, b),
        }
    }

    /// Look a color up by name, ignoring case and surrounding whitespace
    pub fn parse(name: &str) -> Result<Self> {
        let wanted = name.trim();
        COLOR_TABLE
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| Error::UnknownColor {
                name: name.to_string(),
            })
    }

    /// Opaque PDFium color
    pub fn to_pdf_color(self) -> PdfColor {
        let (r, g, b) = self.rgb;
        PdfColor::new(r, g, b, 255)
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Colors handed out to search terms, in order
pub const PALETTE: [NamedColor; 17] = [
    NamedColor::new("yellow", 255, 255, 0),
    NamedColor::new("green", 0, 255, 0),
    NamedColor::new("pink", 255, 192, 203),
    NamedColor::new("cyan", 0, 255, 255),
    NamedColor::new("orange", 255, 165, 0),
    NamedColor::new("plum", 221, 160, 221),
    NamedColor::new("red", 255, 0, 0),
    NamedColor::new("wheat", 245, 222, 179),
    NamedColor::new("olive", 128, 128, 0),
    NamedColor::new("gold", 255, 215, 0),
    NamedColor::new("purple", 160, 32, 240),
    NamedColor::new("brown", 165, 42, 42),
    NamedColor::new("magenta", 255, 0, 255),
    NamedColor::new("beige", 245, 245, 220),
    NamedColor::new("blue", 0, 0, 255),
    NamedColor::new("lavender", 230, 230, 250),
    NamedColor::new("chartreuse", 127, 255, 0),
];

/// Every color accepted by name: the palette plus a few plain extras
const COLOR_TABLE: [NamedColor; 21] = [
    PALETTE[0],
    PALETTE[1],
    PALETTE[2],
    PALETTE[3],
    PALETTE[4],
    PALETTE[5],
    PALETTE[6],
    PALETTE[7],
    PALETTE[8],
    PALETTE[9],
    PALETTE[10],
    PALETTE[11],
    PALETTE[12],
    PALETTE[13],
    PALETTE[14],
    PALETTE[15],
    PALETTE[16],
    NamedColor::new("black", 0, 0, 0),
    NamedColor::new("white", 255, 255, 255),
    NamedColor::new("gray", 190, 190, 190),
    NamedColor::new("navy", 0, 0, 128),
];

/// Color for the search term at `index`, cycling through [`PALETTE`]
pub fn palette_color(index: usize) -> NamedColor {
    PALETTE[index % PALETTE.len()]
}

/// How colors are assigned to the terms of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Cycle through [`PALETTE`] by term index
    #[default]
    Palette,
    /// Cycle through an explicit list by term index
    Named(Vec<NamedColor>),
}

impl ColorChoice {
    /// Build from user-supplied names; `auto` (or nothing) selects the palette
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty()
            || names
                .iter()
                .any(|n| n.as_ref().trim().eq_ignore_ascii_case("auto"))
        {
            return Ok(ColorChoice::Palette);
        }

        let colors = names
            .iter()
            .map(|n| NamedColor::parse(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(ColorChoice::Named(colors))
    }

    /// Color for the term at `index`
    pub fn color_for(&self, index: usize) -> NamedColor {
        match self {
            ColorChoice::Palette => palette_color(index),
            ColorChoice::Named(colors) if !colors.is_empty() => colors[index % colors.len()],
            ColorChoice::Named(_) => palette_color(index),
        }
    }
}
