//! Glyph sizes, injected into every layout pass.
//!
//! The layout never looks glyphs up in global state: callers hand a
//! [`GlyphMetrics`] implementation to the formatter. [`StandardMetrics`]
//! carries a built-in table sized for a stave with 10px line spacing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod outline;

#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub enum Glyph {
    NoteheadDoubleWhole,
    NoteheadWhole,
    NoteheadHalf,
    NoteheadBlack,
    RestDoubleWhole,
    RestWhole,
    RestHalf,
    RestQuarter,
    Rest8th,
    Rest16th,
    Rest32nd,
    Rest64th,
    Rest128th,
    AccidentalSharp,
    AccidentalFlat,
    AccidentalNatural,
    AccidentalDoubleSharp,
    AccidentalDoubleFlat,
    AugmentationDot,
    ArticStaccato,
    ArticAccent,
    ArticTenuto,
    ArticMarcato,
    Fermata,
    OrnamentTrill,
    OrnamentMordent,
    OrnamentTurn,
    Parenthesis,
    Arpeggio,
    Vibrato,
    BarlineSingle,
    BarlineDouble,
    BarlineFinal,
    RepeatLeft,
    RepeatRight,
    ClefTreble,
    ClefBass,
    ClefAlto,
}

/// Read-only glyph and text size lookup.
pub trait GlyphMetrics {
    fn width(&self, glyph: Glyph) -> f64;
    fn height(&self, glyph: Glyph) -> f64;
    fn text_width(&self, text: &str) -> f64;
    fn text_height(&self) -> f64;
}

/// Built-in sizes with optional per-glyph overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardMetrics {
    overrides: HashMap<Glyph, (f64, f64)>,
    char_width: f64,
    text_height: f64,
}
impl Default for StandardMetrics {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            char_width: 6.0,
            text_height: 10.0,
        }
    }
}
impl StandardMetrics {
    pub fn with_override(
        mut self,
        glyph: Glyph,
        width: f64,
        height: f64,
    ) -> Self {
        self.overrides.insert(glyph, (width, height));
        self
    }
    pub fn with_text(mut self, char_width: f64, text_height: f64) -> Self {
        self.char_width = char_width;
        self.text_height = text_height;
        self
    }
    fn size(&self, glyph: Glyph) -> (f64, f64) {
        if let Some(size) = self.overrides.get(&glyph) {
            return *size;
        }
        match glyph {
            Glyph::NoteheadDoubleWhole => (22.0, 10.0),
            Glyph::NoteheadWhole => (15.0, 10.0),
            Glyph::NoteheadHalf | Glyph::NoteheadBlack => (11.0, 10.0),
            Glyph::RestDoubleWhole => (6.0, 10.0),
            Glyph::RestWhole | Glyph::RestHalf => (11.0, 5.0),
            Glyph::RestQuarter => (8.0, 27.0),
            Glyph::Rest8th => (8.0, 17.0),
            Glyph::Rest16th => (10.0, 27.0),
            Glyph::Rest32nd => (12.0, 37.0),
            Glyph::Rest64th => (13.0, 47.0),
            Glyph::Rest128th => (15.0, 57.0),
            Glyph::AccidentalSharp => (8.0, 28.0),
            Glyph::AccidentalFlat => (7.0, 24.0),
            Glyph::AccidentalNatural => (6.0, 27.0),
            Glyph::AccidentalDoubleSharp => (8.0, 8.0),
            Glyph::AccidentalDoubleFlat => (12.0, 24.0),
            Glyph::AugmentationDot => (4.0, 4.0),
            Glyph::ArticStaccato => (4.0, 4.0),
            Glyph::ArticAccent => (10.0, 7.0),
            Glyph::ArticTenuto => (10.0, 2.0),
            Glyph::ArticMarcato => (9.0, 10.0),
            Glyph::Fermata => (20.0, 11.0),
            Glyph::OrnamentTrill => (16.0, 12.0),
            Glyph::OrnamentMordent => (18.0, 9.0),
            Glyph::OrnamentTurn => (17.0, 8.0),
            Glyph::Parenthesis => (5.0, 25.0),
            Glyph::Arpeggio => (6.0, 40.0),
            Glyph::Vibrato => (20.0, 6.0),
            Glyph::BarlineSingle => (1.0, 40.0),
            Glyph::BarlineDouble => (5.0, 40.0),
            Glyph::BarlineFinal => (8.0, 40.0),
            Glyph::RepeatLeft | Glyph::RepeatRight => (14.0, 40.0),
            Glyph::ClefTreble => (26.0, 66.0),
            Glyph::ClefBass => (26.0, 32.0),
            Glyph::ClefAlto => (26.0, 40.0),
        }
    }
}
impl GlyphMetrics for StandardMetrics {
    fn width(&self, glyph: Glyph) -> f64 {
        self.size(glyph).0
    }
    fn height(&self, glyph: Glyph) -> f64 {
        self.size(glyph).1
    }
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
    fn text_height(&self) -> f64 {
        self.text_height
    }
}
