//! Everything that takes part in horizontal layout.
//!
//! A [`Tickable`] has a duration, a list of modifiers and a
//! [`TickableState`] the layout passes write into. The state keeps an
//! index of the owning tick context instead of a pointer: contexts live in
//! the formatter's arena and are rebuilt on every format call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    glyph::GlyphMetrics,
    modifier::Modifier,
    primitives::{BoundingBox, Duration},
    settings::LayoutSettings,
    tick_context::TickContextId,
};

pub mod bar_note;
pub mod stave_note;

pub use bar_note::{BarNote, BarlineType, ClefNote, ClefType, GhostNote};
pub use stave_note::{NoteHead, StaveNote};

/// Stave line of the middle line. Line 1 is the bottom line, 5 the top.
pub const MIDDLE_LINE: f64 = 3.0;

/// Position of a tickable inside a set of joined voices.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TickableRef {
    pub voice: usize,
    pub index: usize,
}
impl TickableRef {
    pub fn new(voice: usize, index: usize) -> Self {
        Self { voice, index }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum StemDirection {
    Up,
    Down,
}
impl StemDirection {
    /// 1 for up, -1 for down. Screen y grows downwards.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
    /// Direction a stem takes for heads averaging `mean_line`:
    /// above the middle line goes down, the middle line and below up.
    pub fn for_mean_line(mean_line: f64) -> Self {
        match mean_line > MIDDLE_LINE {
            true => Self::Down,
            false => Self::Up,
        }
    }
}

/// Horizontal space a tickable needs, in pixels.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct TickableMetrics {
    /// Notehead (or glyph) column width.
    pub note_px: f64,
    pub left_displaced_head_px: f64,
    pub right_displaced_head_px: f64,
    /// Extent of modifiers left of the notehead column.
    pub modifier_left_px: f64,
    /// Extent of modifiers right of the notehead column.
    pub modifier_right_px: f64,
}
impl TickableMetrics {
    pub fn width(&self) -> f64 {
        self.note_px
            + self.left_displaced_head_px
            + self.right_displaced_head_px
            + self.modifier_left_px
            + self.modifier_right_px
    }
}

/// Stem line of a formatted note.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct StemExtents {
    pub x: f64,
    pub base_y: f64,
    pub tip_y: f64,
}

/// Layout data shared by every tickable kind.
#[derive(Debug, Clone, Default)]
pub struct TickableState {
    modifiers: Vec<Modifier>,
    tick_context: Option<TickContextId>,
    stave_y: f64,
    x: Option<f64>,
    x_shift: f64,
    width: f64,
    note_px: f64,
    modifier_left_px: f64,
    modifier_right_px: f64,
}
impl TickableState {
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
    pub(crate) fn modifiers_mut(&mut self) -> &mut Vec<Modifier> {
        &mut self.modifiers
    }
    pub(crate) fn set_stave_y(&mut self, stave_y: f64) {
        self.stave_y = stave_y;
    }
    pub(crate) fn set_tick_context(&mut self, id: TickContextId) {
        self.tick_context = Some(id);
    }
    pub(crate) fn set_x(&mut self, x: f64) {
        self.x = Some(x);
    }
    pub(crate) fn set_x_shift(&mut self, x_shift: f64) {
        self.x_shift = x_shift;
    }
    pub(crate) fn set_modifier_px(&mut self, left: f64, right: f64) {
        self.modifier_left_px = left;
        self.modifier_right_px = right;
    }
    pub(crate) fn set_measured(&mut self, metrics: &TickableMetrics) {
        self.note_px = metrics.note_px;
        self.width = metrics.width();
    }

    /// Forget everything a previous layout pass computed.
    pub(crate) fn reset_layout(&mut self) {
        self.tick_context = None;
        self.x = None;
        self.x_shift = 0.0;
        self.width = 0.0;
        self.note_px = 0.0;
        self.modifier_left_px = 0.0;
        self.modifier_right_px = 0.0;
        for modifier in self.modifiers.iter_mut() {
            modifier.set_placement(None);
        }
    }
}

/// Contract of every element that takes part in layout.
///
/// Implementors provide the duration, their own glyph widths and access to
/// their [`TickableState`]; everything else is derived.
pub trait Tickable: fmt::Debug {
    /// Symbolic duration, dots and tuplets applied.
    fn duration(&self) -> Duration;
    fn state(&self) -> &TickableState;
    fn state_mut(&mut self) -> &mut TickableState;
    /// Widths of the tickable's own glyphs, without modifiers.
    fn intrinsic_metrics(&self, glyphs: &dyn GlyphMetrics) -> TickableMetrics;

    /// Occupies no time in the voice budget.
    fn ignore_ticks(&self) -> bool {
        false
    }
    /// Stave lines of the heads, lowest first.
    fn head_lines(&self) -> Vec<f64> {
        Vec::new()
    }
    fn is_rest(&self) -> bool {
        false
    }
    fn has_stem(&self) -> bool {
        false
    }
    /// Number of beams or flags.
    fn beam_count(&self) -> u8 {
        0
    }
    /// Direction set explicitly by the caller.
    fn forced_stem_direction(&self) -> Option<StemDirection> {
        None
    }
    fn stem_direction(&self) -> Option<StemDirection> {
        None
    }
    fn set_stem_direction(&mut self, _direction: StemDirection) {}

    fn ticks(&self) -> Duration {
        match self.ignore_ticks() {
            true => Duration::zero(),
            false => self.duration(),
        }
    }
    fn modifiers(&self) -> &[Modifier] {
        self.state().modifiers()
    }
    fn add_modifier(&mut self, modifier: Modifier) {
        self.state_mut().modifiers_mut().push(modifier);
    }
    fn tick_context(&self) -> Option<TickContextId> {
        self.state().tick_context
    }
    /// Absolute x of the notehead column. None before formatting.
    fn x(&self) -> Option<f64> {
        self.state().x
    }
    /// Lateral displacement inside the tick context.
    fn x_shift(&self) -> f64 {
        self.state().x_shift
    }
    fn stave_y(&self) -> f64 {
        self.state().stave_y
    }
    /// Resolved width, 0 before the tick context was pre-formatted.
    fn width(&self) -> f64 {
        self.state().width
    }
    /// Own metrics plus the modifier extents a modifier context recorded.
    fn metrics(&self, glyphs: &dyn GlyphMetrics) -> TickableMetrics {
        let mut metrics = self.intrinsic_metrics(glyphs);
        metrics.modifier_left_px = self.state().modifier_left_px;
        metrics.modifier_right_px = self.state().modifier_right_px;
        metrics
    }
    fn y_for_line(&self, line: f64, settings: &LayoutSettings) -> f64 {
        self.stave_y() + (5.0 - line) * settings.line_spacing
    }

    fn stem_extents(&self, settings: &LayoutSettings) -> Option<StemExtents> {
        if !self.has_stem() {
            return None;
        }
        let x = self.x()?;
        let lines = self.head_lines();
        let (low, high) = (*lines.first()?, *lines.last()?);
        match self.stem_direction()? {
            StemDirection::Up => {
                let base_y = self.y_for_line(low, settings);
                let top = self.y_for_line(high, settings);
                Some(StemExtents {
                    x: x + self.state().note_px,
                    base_y,
                    tip_y: top - settings.stem_length,
                })
            }
            StemDirection::Down => {
                let base_y = self.y_for_line(high, settings);
                let bottom = self.y_for_line(low, settings);
                Some(StemExtents {
                    x,
                    base_y,
                    tip_y: bottom + settings.stem_length,
                })
            }
        }
    }

    /// Bounds of heads and stem, or of the stave height for glyphs
    /// without heads. None before formatting.
    fn bounding_box(&self, settings: &LayoutSettings) -> Option<BoundingBox> {
        let x = self.x()?;
        let lines = self.head_lines();
        let half_space = settings.line_spacing / 2.0;
        let mut bbox = match (lines.first(), lines.last()) {
            (Some(low), Some(high)) => {
                let top = self.y_for_line(*high, settings) - half_space;
                let bottom = self.y_for_line(*low, settings) + half_space;
                BoundingBox::new(x, top, self.state().note_px, bottom - top)
            }
            _ => BoundingBox::new(
                x,
                self.stave_y(),
                self.state().note_px,
                4.0 * settings.line_spacing,
            ),
        };
        if let Some(stem) = self.stem_extents(settings) {
            bbox.merge_with(&BoundingBox::new(
                stem.x,
                stem.base_y.min(stem.tip_y),
                0.0,
                (stem.tip_y - stem.base_y).abs(),
            ));
        }
        Some(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::{StemDirection, TickableMetrics};

    #[test]
    fn test_stem_for_mean_line() {
        assert_eq!(StemDirection::for_mean_line(3.0), StemDirection::Up);
        assert_eq!(StemDirection::for_mean_line(3.5), StemDirection::Down);
        assert_eq!(StemDirection::for_mean_line(1.0), StemDirection::Up);
    }

    #[test]
    fn test_metrics_width() {
        let metrics = TickableMetrics {
            note_px: 10.0,
            left_displaced_head_px: 0.0,
            right_displaced_head_px: 10.0,
            modifier_left_px: 8.0,
            modifier_right_px: 6.0,
        };
        assert_eq!(metrics.width(), 34.0);
    }
}
