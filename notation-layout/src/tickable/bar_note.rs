//! In-voice glyphs that are not notes: bar lines, clef changes and
//! invisible spacers.

use serde::{Deserialize, Serialize};

use crate::{
    glyph::{Glyph, GlyphMetrics},
    primitives::Duration,
};

use super::{Tickable, TickableMetrics, TickableState};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum BarlineType {
    #[default]
    Single,
    Double,
    Final,
    RepeatBegin,
    RepeatEnd,
}

/// Bar line inside a voice. Takes no time.
#[derive(Debug, Clone, Default)]
pub struct BarNote {
    barline: BarlineType,
    state: TickableState,
}
impl BarNote {
    pub fn new(barline: BarlineType) -> Self {
        Self {
            barline,
            state: TickableState::default(),
        }
    }
    pub fn barline(&self) -> BarlineType {
        self.barline
    }
}
impl Tickable for BarNote {
    fn duration(&self) -> Duration {
        Duration::zero()
    }
    fn ignore_ticks(&self) -> bool {
        true
    }
    fn state(&self) -> &TickableState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut TickableState {
        &mut self.state
    }
    fn intrinsic_metrics(&self, glyphs: &dyn GlyphMetrics) -> TickableMetrics {
        let glyph = match self.barline {
            BarlineType::Single => Glyph::BarlineSingle,
            BarlineType::Double => Glyph::BarlineDouble,
            BarlineType::Final => Glyph::BarlineFinal,
            BarlineType::RepeatBegin => Glyph::RepeatLeft,
            BarlineType::RepeatEnd => Glyph::RepeatRight,
        };
        TickableMetrics {
            note_px: glyphs.width(glyph),
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum ClefType {
    #[default]
    Treble,
    Bass,
    Alto,
}

/// Clef change inside a voice. Takes no time; drawn at two thirds of the
/// stave clef size.
#[derive(Debug, Clone, Default)]
pub struct ClefNote {
    clef: ClefType,
    state: TickableState,
}
impl ClefNote {
    pub fn new(clef: ClefType) -> Self {
        Self {
            clef,
            state: TickableState::default(),
        }
    }
    pub fn clef(&self) -> ClefType {
        self.clef
    }
}
impl Tickable for ClefNote {
    fn duration(&self) -> Duration {
        Duration::zero()
    }
    fn ignore_ticks(&self) -> bool {
        true
    }
    fn state(&self) -> &TickableState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut TickableState {
        &mut self.state
    }
    fn intrinsic_metrics(&self, glyphs: &dyn GlyphMetrics) -> TickableMetrics {
        let glyph = match self.clef {
            ClefType::Treble => Glyph::ClefTreble,
            ClefType::Bass => Glyph::ClefBass,
            ClefType::Alto => Glyph::ClefAlto,
        };
        TickableMetrics {
            note_px: glyphs.width(glyph) * 2.0 / 3.0,
            ..Default::default()
        }
    }
}

/// Invisible spacer that takes time but no room.
#[derive(Debug, Clone)]
pub struct GhostNote {
    duration: Duration,
    state: TickableState,
}
impl GhostNote {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TickableState::default(),
        }
    }
}
impl Tickable for GhostNote {
    fn duration(&self) -> Duration {
        self.duration
    }
    fn state(&self) -> &TickableState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut TickableState {
        &mut self.state
    }
    fn intrinsic_metrics(&self, _glyphs: &dyn GlyphMetrics) -> TickableMetrics {
        TickableMetrics::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{BarNote, BarlineType, ClefNote, ClefType, GhostNote};
    use crate::{
        glyph::StandardMetrics,
        primitives::Duration,
        tickable::Tickable,
    };

    #[test]
    fn test_ignored_ticks() {
        let bar = BarNote::new(BarlineType::Double);
        assert!(bar.ignore_ticks());
        assert_eq!(bar.ticks(), Duration::zero());
        let clef = ClefNote::new(ClefType::Bass);
        assert_eq!(clef.ticks(), Duration::zero());
        let metrics = StandardMetrics::default();
        assert!(clef.intrinsic_metrics(&metrics).note_px > 0.0);
    }

    #[test]
    fn test_ghost_takes_time() {
        let ghost = GhostNote::new(Duration::new(1, 8).unwrap());
        assert_eq!(ghost.ticks(), Duration::new(1, 8).unwrap());
        let metrics = ghost.intrinsic_metrics(&StandardMetrics::default());
        assert_eq!(metrics.width(), 0.0);
    }
}
