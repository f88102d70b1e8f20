//! Column of tickables that start at the same moment.

use crate::{
    glyph::GlyphMetrics,
    primitives::Duration,
    tickable::{Tickable, TickableRef},
    voice::Voice,
    LayoutError, LayoutResult,
};

/// Index of a tick context in the formatter's arena.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TickContextId(pub usize);

#[derive(Debug, Clone)]
pub struct TickContext {
    tick_id: Duration,
    lane: u32,
    tickables: Vec<TickableRef>,
    max_ticks: Duration,
    min_ticks: Option<Duration>,
    left_px: f64,
    notes_px: f64,
    right_px: f64,
    padding: f64,
    width: f64,
    x: f64,
    preformatted: bool,
}
impl TickContext {
    /// Context starting at `tick_id`, the offset from the start of the
    /// voices. Glyphs that take no time get lanes of their own, ordered
    /// before the timed lane.
    pub fn new(tick_id: Duration, lane: u32, padding: f64) -> Self {
        Self {
            tick_id,
            lane,
            tickables: Vec::new(),
            max_ticks: Duration::zero(),
            min_ticks: None,
            left_px: 0.0,
            notes_px: 0.0,
            right_px: 0.0,
            padding,
            width: 0.0,
            x: 0.0,
            preformatted: false,
        }
    }

    pub fn add_tickable(
        &mut self,
        reference: TickableRef,
        tickable: &dyn Tickable,
    ) -> &mut Self {
        let ticks = tickable.ticks();
        if !tickable.ignore_ticks() && !ticks.is_zero() {
            self.max_ticks = self.max_ticks.max(ticks);
            self.min_ticks =
                Some(self.min_ticks.map_or(ticks, |m| m.min(ticks)));
        }
        self.tickables.push(reference);
        self.preformatted = false;
        self
    }

    /// Measure every member and resolve the column width.
    pub fn pre_format(
        &mut self,
        voices: &[Voice],
        glyphs: &dyn GlyphMetrics,
    ) -> LayoutResult<()> {
        if self.preformatted {
            return Ok(());
        }
        let (mut left, mut notes, mut right) = (0.0_f64, 0.0_f64, 0.0_f64);
        for reference in self.tickables.iter() {
            let tickable = voices
                .get(reference.voice)
                .and_then(|v| v.tickable(reference.index))
                .ok_or_else(|| {
                    LayoutError::NotFormatted(format!(
                        "no tickable at {:?}",
                        reference
                    ))
                })?;
            let metrics = tickable.metrics(glyphs);
            left = left
                .max(metrics.left_displaced_head_px + metrics.modifier_left_px);
            notes = notes.max(metrics.note_px + tickable.x_shift());
            right = right.max(
                metrics.right_displaced_head_px + metrics.modifier_right_px,
            );
        }
        self.left_px = left;
        self.notes_px = notes;
        self.right_px = right;
        self.width = left + notes + right + self.padding;
        self.preformatted = true;
        Ok(())
    }

    pub fn tick_id(&self) -> Duration {
        self.tick_id
    }
    pub fn lane(&self) -> u32 {
        self.lane
    }
    pub fn tickables(&self) -> &[TickableRef] {
        &self.tickables
    }
    pub fn max_ticks(&self) -> Duration {
        self.max_ticks
    }
    pub fn min_ticks(&self) -> Option<Duration> {
        self.min_ticks
    }
    /// 0 until pre-formatted.
    pub fn width(&self) -> f64 {
        self.width
    }
    pub(crate) fn set_width(&mut self, width: f64) {
        self.width = width;
    }
    pub fn left_px(&self) -> f64 {
        self.left_px
    }
    pub fn notes_px(&self) -> f64 {
        self.notes_px
    }
    pub fn right_px(&self) -> f64 {
        self.right_px
    }
    pub fn padding(&self) -> f64 {
        self.padding
    }
    pub fn is_preformatted(&self) -> bool {
        self.preformatted
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }
}

#[cfg(test)]
mod tests {
    use super::TickContext;
    use crate::{
        glyph::StandardMetrics,
        primitives::{Duration, NoteValue, TimeSignature},
        tickable::{BarNote, BarlineType, StaveNote, Tickable, TickableRef},
        voice::{Voice, VoiceMode},
    };

    #[test]
    fn test_ticks_bookkeeping() {
        let eighth = StaveNote::new(NoteValue::Eighth, [3.0]);
        let half = StaveNote::new(NoteValue::Half, [3.0]);
        let bar = BarNote::new(BarlineType::Single);
        let mut ctx = TickContext::new(Duration::zero(), u32::MAX, 10.0);
        ctx.add_tickable(TickableRef::new(0, 0), &eighth)
            .add_tickable(TickableRef::new(1, 0), &half)
            .add_tickable(TickableRef::new(2, 0), &bar);
        assert_eq!(ctx.max_ticks(), half.ticks());
        assert_eq!(ctx.min_ticks(), Some(eighth.ticks()));
        assert_eq!(ctx.tickables().len(), 3);
        assert_eq!(ctx.width(), 0.0);
    }

    #[test]
    fn test_pre_format_width() {
        let metrics = StandardMetrics::default();
        let mut voice = Voice::new(TimeSignature::new(1, 4));
        voice.set_mode(VoiceMode::Soft);
        voice
            .add_tickable(Box::new(StaveNote::new(
                NoteValue::Quarter,
                [2.0, 2.5],
            )))
            .unwrap();
        let voices = vec![voice];
        let mut ctx = TickContext::new(Duration::zero(), u32::MAX, 10.0);
        let note = voices[0].tickables()[0].as_ref();
        ctx.add_tickable(TickableRef::new(0, 0), note);
        ctx.pre_format(&voices, &metrics).unwrap();
        // head plus the displaced second on the right
        assert_eq!(ctx.notes_px(), 11.0);
        assert_eq!(ctx.right_px(), 11.0);
        assert_eq!(ctx.width(), 32.0);
    }
}
