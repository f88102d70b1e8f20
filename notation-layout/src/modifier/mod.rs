//! Modifiers attached to tickables and the table ruling their placement.
//!
//! Every modifier kind maps to one [`ModifierCategory`]. The
//! [`PlacementTable`] decides, per category, the precedence (inner
//! categories are placed first, closest to the notehead column) and the
//! default side. A category missing from the table can not be placed.

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    glyph::{Glyph, GlyphMetrics},
    LayoutError, LayoutResult,
};

pub mod context;

#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub enum ModifierPosition {
    Left,
    Right,
    Above,
    Below,
}
impl ModifierPosition {
    pub fn is_lateral(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub enum ModifierCategory {
    Parenthesis,
    Dot,
    FretHandFinger,
    Accidental,
    Stroke,
    GraceNoteGroup,
    StringNumber,
    Articulation,
    Ornament,
    Annotation,
    ChordSymbol,
    Bend,
    Vibrato,
}
impl fmt::Display for ModifierCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum AccidentalType {
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,
}
impl AccidentalType {
    fn glyph(&self) -> Glyph {
        match self {
            Self::Sharp => Glyph::AccidentalSharp,
            Self::Flat => Glyph::AccidentalFlat,
            Self::Natural => Glyph::AccidentalNatural,
            Self::DoubleSharp => Glyph::AccidentalDoubleSharp,
            Self::DoubleFlat => Glyph::AccidentalDoubleFlat,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum ArticulationType {
    Staccato,
    Accent,
    Tenuto,
    Marcato,
    Fermata,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum OrnamentType {
    Trill,
    Mordent,
    Turn,
}

/// What is attached. Text-carrying kinds are sized by the metrics' text
/// functions.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ModifierKind {
    Accidental {
        accidental: AccidentalType,
        cautionary: bool,
    },
    Dot,
    Articulation(ArticulationType),
    Ornament(OrnamentType),
    Annotation(String),
    ChordSymbol(String),
    Stroke,
    Bend(String),
    Vibrato,
    FretHandFinger(u8),
    StringNumber(u8),
    Parenthesis,
    /// Amount of grace notes in the group.
    GraceNoteGroup(u8),
}
impl ModifierKind {
    pub fn accidental(accidental: AccidentalType) -> Self {
        Self::Accidental {
            accidental,
            cautionary: false,
        }
    }
    pub fn category(&self) -> ModifierCategory {
        match self {
            Self::Accidental { .. } => ModifierCategory::Accidental,
            Self::Dot => ModifierCategory::Dot,
            Self::Articulation(_) => ModifierCategory::Articulation,
            Self::Ornament(_) => ModifierCategory::Ornament,
            Self::Annotation(_) => ModifierCategory::Annotation,
            Self::ChordSymbol(_) => ModifierCategory::ChordSymbol,
            Self::Stroke => ModifierCategory::Stroke,
            Self::Bend(_) => ModifierCategory::Bend,
            Self::Vibrato => ModifierCategory::Vibrato,
            Self::FretHandFinger(_) => ModifierCategory::FretHandFinger,
            Self::StringNumber(_) => ModifierCategory::StringNumber,
            Self::Parenthesis => ModifierCategory::Parenthesis,
            Self::GraceNoteGroup(_) => ModifierCategory::GraceNoteGroup,
        }
    }

    /// Width and height in pixels.
    pub fn size(&self, metrics: &dyn GlyphMetrics) -> (f64, f64) {
        let glyph = |g: Glyph| (metrics.width(g), metrics.height(g));
        match self {
            Self::Accidental {
                accidental,
                cautionary,
            } => {
                let (w, h) = glyph(accidental.glyph());
                match cautionary {
                    true => (w + 2.0 * metrics.width(Glyph::Parenthesis), h),
                    false => (w, h),
                }
            }
            Self::Dot => glyph(Glyph::AugmentationDot),
            Self::Articulation(art) => glyph(match art {
                ArticulationType::Staccato => Glyph::ArticStaccato,
                ArticulationType::Accent => Glyph::ArticAccent,
                ArticulationType::Tenuto => Glyph::ArticTenuto,
                ArticulationType::Marcato => Glyph::ArticMarcato,
                ArticulationType::Fermata => Glyph::Fermata,
            }),
            Self::Ornament(orn) => glyph(match orn {
                OrnamentType::Trill => Glyph::OrnamentTrill,
                OrnamentType::Mordent => Glyph::OrnamentMordent,
                OrnamentType::Turn => Glyph::OrnamentTurn,
            }),
            Self::Annotation(text) | Self::ChordSymbol(text) => {
                (metrics.text_width(text), metrics.text_height())
            }
            Self::Stroke => glyph(Glyph::Arpeggio),
            Self::Bend(text) => (
                metrics.text_width(text).max(8.0),
                metrics.text_height() + 10.0,
            ),
            Self::Vibrato => glyph(Glyph::Vibrato),
            Self::FretHandFinger(finger) => (
                metrics.text_width(&finger.to_string()),
                metrics.text_height(),
            ),
            Self::StringNumber(_) => {
                let size = metrics.text_height() + 4.0;
                (size, size)
            }
            Self::Parenthesis => glyph(Glyph::Parenthesis),
            Self::GraceNoteGroup(amount) => {
                let head = metrics.width(Glyph::NoteheadBlack) * 0.66;
                let height = metrics.height(Glyph::NoteheadBlack);
                (*amount as f64 * (head + 2.0), height)
            }
        }
    }
}

/// Resolved position of a modifier, relative to its owner's x and the top
/// line of the owner's stave.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ModifierPlacement {
    pub position: ModifierPosition,
    /// Lateral column, counted outward from the notehead column.
    pub column: usize,
    /// Vertical stacking slot, counted outward from the note.
    pub text_line: usize,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Modifier {
    kind: ModifierKind,
    index: usize,
    position: Option<ModifierPosition>,
    placement: Option<ModifierPlacement>,
}
impl Modifier {
    pub fn new(kind: ModifierKind) -> Self {
        Self {
            kind,
            index: 0,
            position: None,
            placement: None,
        }
    }
    /// Attach to the head with the given index (heads are ordered from
    /// the lowest line up).
    pub fn on_head(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
    /// Override the category's default side.
    pub fn at(mut self, position: ModifierPosition) -> Self {
        self.position = Some(position);
        self
    }
    pub fn kind(&self) -> &ModifierKind {
        &self.kind
    }
    pub fn category(&self) -> ModifierCategory {
        self.kind.category()
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn position(&self) -> Option<ModifierPosition> {
        self.position
    }
    /// Available after the owning modifier context was pre-formatted.
    pub fn placement(&self) -> Option<&ModifierPlacement> {
        self.placement.as_ref()
    }
    pub(crate) fn set_placement(
        &mut self,
        placement: Option<ModifierPlacement>,
    ) {
        self.placement = placement;
    }
}
impl From<ModifierKind> for Modifier {
    fn from(kind: ModifierKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct PlacementRule {
    /// Precedence: lower is placed first, closer to the note.
    pub order: u8,
    pub default_position: ModifierPosition,
    /// Two lateral modifiers closer than this (in stave lines) can not
    /// share a column.
    pub band_lines: f64,
    /// Gap left before each column of this category.
    pub spacing: f64,
}
impl PlacementRule {
    pub fn new(order: u8, default_position: ModifierPosition) -> Self {
        Self {
            order,
            default_position,
            band_lines: 1.0,
            spacing: 2.0,
        }
    }
    pub fn band_lines(mut self, band_lines: f64) -> Self {
        self.band_lines = band_lines;
        self
    }
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }
}

/// Band that makes every member of a category take its own column.
const WHOLE_STAVE: f64 = f64::INFINITY;

static STANDARD_TABLE: Lazy<PlacementTable> = Lazy::new(|| {
    use ModifierCategory as C;
    use ModifierPosition as P;
    PlacementTable::new()
        .with(C::Parenthesis, PlacementRule::new(1, P::Left).spacing(1.0))
        .with(C::Dot, PlacementRule::new(2, P::Right).band_lines(0.5))
        .with(C::FretHandFinger, PlacementRule::new(3, P::Left))
        .with(
            C::Accidental,
            PlacementRule::new(4, P::Left).band_lines(3.0).spacing(3.0),
        )
        .with(C::Stroke, PlacementRule::new(5, P::Left).band_lines(WHOLE_STAVE))
        .with(
            C::GraceNoteGroup,
            PlacementRule::new(6, P::Left)
                .band_lines(WHOLE_STAVE)
                .spacing(4.0),
        )
        .with(C::StringNumber, PlacementRule::new(7, P::Above))
        .with(C::Articulation, PlacementRule::new(8, P::Above))
        .with(C::Ornament, PlacementRule::new(9, P::Above))
        .with(C::Annotation, PlacementRule::new(10, P::Above))
        .with(C::ChordSymbol, PlacementRule::new(11, P::Above))
        .with(C::Bend, PlacementRule::new(12, P::Right).band_lines(WHOLE_STAVE))
        .with(
            C::Vibrato,
            PlacementRule::new(13, P::Right).band_lines(WHOLE_STAVE),
        )
});

/// Category → placement rule lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementTable {
    rules: HashMap<ModifierCategory, PlacementRule>,
}
impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }
    /// Table holding every category, inner to outer: parenthesis, dot,
    /// fingering, accidental, stroke, grace notes, string number,
    /// articulation, ornament, annotation, chord symbol, bend, vibrato.
    pub fn standard() -> &'static Self {
        &STANDARD_TABLE
    }
    pub fn with(
        mut self,
        category: ModifierCategory,
        rule: PlacementRule,
    ) -> Self {
        self.rules.insert(category, rule);
        self
    }
    pub fn without(mut self, category: ModifierCategory) -> Self {
        self.rules.remove(&category);
        self
    }
    pub fn rule(
        &self,
        category: ModifierCategory,
    ) -> LayoutResult<&PlacementRule> {
        self.rules.get(&category).ok_or_else(|| {
            LayoutError::UnsupportedModifier(category.to_string())
        })
    }
}
