//! Notes and rests on a five-line stave.

use itertools::Itertools;

use crate::{
    glyph::{Glyph, GlyphMetrics},
    modifier::{Modifier, ModifierKind},
    primitives::{Duration, NoteValue},
    LayoutResult,
};

use super::{StemDirection, Tickable, TickableMetrics, TickableState};

/// One head of a note. `displaced` heads sit on the other side of the
/// stem, which happens for seconds inside a chord.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct NoteHead {
    pub line: f64,
    pub displaced: bool,
}

#[derive(Debug, Clone)]
pub struct StaveNote {
    value: NoteValue,
    dots: u8,
    tuplet: Option<(u32, u32)>,
    duration: Duration,
    heads: Vec<NoteHead>,
    rest: bool,
    forced_stem: Option<StemDirection>,
    stem: StemDirection,
    state: TickableState,
}
impl StaveNote {
    /// Note (or chord) with heads on the given stave lines.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::{NoteValue, StaveNote, StemDirection, Tickable};
    /// let chord = StaveNote::new(NoteValue::Half, [4.5, 4.0, 4.0]);
    /// assert_eq!(chord.head_lines(), vec![4.0, 4.5]);
    /// assert_eq!(chord.stem_direction(), Some(StemDirection::Down));
    /// // the second is displaced to the left of a down stem
    /// assert!(chord.heads()[0].displaced);
    /// ```
    pub fn new(value: NoteValue, lines: impl IntoIterator<Item = f64>) -> Self {
        let heads: Vec<NoteHead> = lines
            .into_iter()
            .sorted_by(|a, b| a.total_cmp(b))
            .dedup()
            .map(|line| NoteHead {
                line,
                displaced: false,
            })
            .collect();
        let mean = match heads.is_empty() {
            true => super::MIDDLE_LINE,
            false => {
                heads.iter().map(|h| h.line).sum::<f64>() / heads.len() as f64
            }
        };
        let mut note = Self {
            value,
            dots: 0,
            tuplet: None,
            duration: Duration::from(value),
            heads,
            rest: false,
            forced_stem: None,
            stem: StemDirection::for_mean_line(mean),
            state: TickableState::default(),
        };
        note.calculate_displacements();
        note
    }
    /// Rest drawn around the given line.
    pub fn rest(value: NoteValue, line: f64) -> Self {
        let mut rest = Self::new(value, [line]);
        rest.rest = true;
        rest.stem = StemDirection::Up;
        rest.calculate_displacements();
        rest
    }

    /// Add dots to the duration, attaching one dot modifier per head and
    /// dot.
    pub fn dotted(mut self, dots: u8) -> Self {
        self.dots = self.dots.saturating_add(dots);
        let heads = match self.rest {
            true => 1,
            false => self.heads.len().max(1),
        };
        for _ in 0..dots {
            for index in 0..heads {
                self.state
                    .modifiers_mut()
                    .push(Modifier::new(ModifierKind::Dot).on_head(index));
            }
        }
        self.update_duration();
        self
    }
    /// Fit `num_notes` of this value into the space of `notes_occupied`.
    pub fn tuplet(
        mut self,
        num_notes: u32,
        notes_occupied: u32,
    ) -> LayoutResult<Self> {
        Duration::from(self.value).with_tuplet(num_notes, notes_occupied)?;
        self.tuplet = Some((num_notes, notes_occupied));
        self.update_duration();
        Ok(self)
    }
    pub fn with_stem_direction(mut self, direction: StemDirection) -> Self {
        self.forced_stem = Some(direction);
        self.set_stem_direction(direction);
        self
    }
    pub fn with_modifier(mut self, modifier: impl Into<Modifier>) -> Self {
        self.state.modifiers_mut().push(modifier.into());
        self
    }

    pub fn value(&self) -> NoteValue {
        self.value
    }
    pub fn dots(&self) -> u8 {
        self.dots
    }
    pub fn heads(&self) -> &[NoteHead] {
        &self.heads
    }

    fn update_duration(&mut self) {
        let dotted = Duration::from_value(self.value, self.dots);
        self.duration = match self.tuplet {
            None => dotted,
            Some((num, occupied)) => {
                dotted.with_tuplet(num, occupied).unwrap_or(dotted)
            }
        };
    }

    /// Seconds can not share a side of the stem: every head a step away
    /// from an undisplaced neighbour moves across. Up stems push heads
    /// right (walking upwards), down stems push them left (walking down).
    fn calculate_displacements(&mut self) {
        for head in self.heads.iter_mut() {
            head.displaced = false;
        }
        if self.rest || self.heads.len() < 2 {
            return;
        }
        let order: Vec<usize> = match self.stem {
            StemDirection::Up => (0..self.heads.len()).collect(),
            StemDirection::Down => (0..self.heads.len()).rev().collect(),
        };
        for (prev, cur) in order.into_iter().tuple_windows() {
            let step = (self.heads[cur].line - self.heads[prev].line).abs();
            if step <= 0.5 && !self.heads[prev].displaced {
                self.heads[cur].displaced = true;
            }
        }
    }

    fn glyph(&self) -> Glyph {
        match (self.rest, self.value) {
            (false, NoteValue::DoubleWhole) => Glyph::NoteheadDoubleWhole,
            (false, NoteValue::Whole) => Glyph::NoteheadWhole,
            (false, NoteValue::Half) => Glyph::NoteheadHalf,
            (false, _) => Glyph::NoteheadBlack,
            (true, NoteValue::DoubleWhole) => Glyph::RestDoubleWhole,
            (true, NoteValue::Whole) => Glyph::RestWhole,
            (true, NoteValue::Half) => Glyph::RestHalf,
            (true, NoteValue::Quarter) => Glyph::RestQuarter,
            (true, NoteValue::Eighth) => Glyph::Rest8th,
            (true, NoteValue::Sixteenth) => Glyph::Rest16th,
            (true, NoteValue::ThirtySecond) => Glyph::Rest32nd,
            (true, NoteValue::SixtyFourth) => Glyph::Rest64th,
            (true, NoteValue::HundredTwentyEighth) => Glyph::Rest128th,
        }
    }
}
impl Tickable for StaveNote {
    fn duration(&self) -> Duration {
        self.duration
    }
    fn state(&self) -> &TickableState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut TickableState {
        &mut self.state
    }
    fn intrinsic_metrics(&self, glyphs: &dyn GlyphMetrics) -> TickableMetrics {
        let note_px = glyphs.width(self.glyph());
        let displaced = self.heads.iter().any(|h| h.displaced);
        let (left, right) = match (displaced, self.stem) {
            (false, _) => (0.0, 0.0),
            (true, StemDirection::Up) => (0.0, note_px),
            (true, StemDirection::Down) => (note_px, 0.0),
        };
        TickableMetrics {
            note_px,
            left_displaced_head_px: left,
            right_displaced_head_px: right,
            ..Default::default()
        }
    }
    fn head_lines(&self) -> Vec<f64> {
        self.heads.iter().map(|h| h.line).collect()
    }
    fn is_rest(&self) -> bool {
        self.rest
    }
    fn has_stem(&self) -> bool {
        !self.rest && self.value.has_stem()
    }
    fn beam_count(&self) -> u8 {
        self.value.beam_count()
    }
    fn forced_stem_direction(&self) -> Option<StemDirection> {
        self.forced_stem
    }
    fn stem_direction(&self) -> Option<StemDirection> {
        Some(self.stem)
    }
    fn set_stem_direction(&mut self, direction: StemDirection) {
        self.stem = direction;
        self.calculate_displacements();
    }
}

#[cfg(test)]
mod tests {
    use super::StaveNote;
    use crate::{
        glyph::StandardMetrics,
        primitives::{Duration, NoteValue},
        tickable::{StemDirection, Tickable},
    };

    #[test]
    fn test_durations() {
        let note = StaveNote::new(NoteValue::Quarter, [3.0]).dotted(1);
        assert_eq!(note.duration(), Duration::new(3, 8).unwrap());
        assert_eq!(note.modifiers().len(), 1);
        let triplet = StaveNote::new(NoteValue::Eighth, [3.0])
            .tuplet(3, 2)
            .unwrap();
        assert_eq!(triplet.duration(), Duration::new(1, 12).unwrap());
        assert!(StaveNote::new(NoteValue::Eighth, [3.0]).tuplet(0, 2).is_err());
    }

    #[test]
    fn test_dotted_chord_gets_dot_per_head() {
        let chord = StaveNote::new(NoteValue::Half, [1.0, 2.0, 3.0]).dotted(2);
        assert_eq!(chord.modifiers().len(), 6);
        assert_eq!(chord.duration(), Duration::new(7, 8).unwrap());
    }

    #[test]
    fn test_displacement_follows_stem() {
        let metrics = StandardMetrics::default();
        let mut chord = StaveNote::new(NoteValue::Quarter, [2.0, 2.5]);
        assert_eq!(chord.stem_direction(), Some(StemDirection::Up));
        assert!(!chord.heads()[0].displaced);
        assert!(chord.heads()[1].displaced);
        let m = chord.intrinsic_metrics(&metrics);
        assert_eq!(m.right_displaced_head_px, m.note_px);

        chord.set_stem_direction(StemDirection::Down);
        assert!(chord.heads()[0].displaced);
        assert!(!chord.heads()[1].displaced);
        let m = chord.intrinsic_metrics(&metrics);
        assert_eq!(m.left_displaced_head_px, m.note_px);
    }

    #[test]
    fn test_cluster_alternates() {
        let cluster = StaveNote::new(NoteValue::Quarter, [1.0, 1.5, 2.0]);
        let displaced: Vec<bool> =
            cluster.heads().iter().map(|h| h.displaced).collect();
        assert_eq!(displaced, vec![false, true, false]);
    }

    #[test]
    fn test_rest() {
        let rest = StaveNote::rest(NoteValue::Quarter, 3.0);
        assert!(rest.is_rest());
        assert!(!rest.has_stem());
        assert_eq!(rest.duration(), Duration::new(1, 4).unwrap());
    }
}
