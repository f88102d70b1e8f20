//! Voice holds tickables of one time line against a duration budget.
//!
//! The budget comes from a time signature or an explicit duration. Adding a
//! tickable that would overflow a STRICT or FULL voice fails without
//! touching the voice.

use log::{debug, trace};

use crate::{
    primitives::{BoundingBox, Duration, TimeSignature},
    settings::LayoutSettings,
    tickable::Tickable,
    LayoutError, LayoutResult,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum VoiceMode {
    /// Overflow is an error and formatting requires a complete voice.
    #[default]
    Strict,
    /// No budget enforcement.
    Soft,
    /// Overflow is an error, an incomplete voice is fine.
    Full,
}

#[derive(Debug)]
pub struct Voice {
    tickables: Vec<Box<dyn Tickable>>,
    total: Duration,
    ticks_used: Duration,
    smallest: Option<Duration>,
    largest: Option<Duration>,
    mode: VoiceMode,
    stave_y: f64,
}
impl Voice {
    pub fn new(time_signature: TimeSignature) -> Self {
        Self::with_total(time_signature.length())
    }
    pub fn with_total(total: Duration) -> Self {
        Self {
            tickables: Vec::new(),
            total,
            ticks_used: Duration::zero(),
            smallest: None,
            largest: None,
            mode: VoiceMode::Strict,
            stave_y: 0.0,
        }
    }
    pub fn set_mode(&mut self, mode: VoiceMode) -> &mut Self {
        self.mode = mode;
        self
    }
    pub fn mode(&self) -> VoiceMode {
        self.mode
    }
    /// Y of the top stave line the voice is drawn on.
    pub fn set_stave_y(&mut self, stave_y: f64) -> &mut Self {
        self.stave_y = stave_y;
        for tickable in self.tickables.iter_mut() {
            tickable.state_mut().set_stave_y(stave_y);
        }
        self
    }
    pub fn stave_y(&self) -> f64 {
        self.stave_y
    }

    pub fn total_ticks(&self) -> Duration {
        self.total
    }
    pub fn ticks_used(&self) -> Duration {
        self.ticks_used
    }
    pub fn is_complete(&self) -> bool {
        self.ticks_used == self.total
    }
    /// Smallest nonzero duration among the tickables that take time.
    pub fn smallest_tick_count(&self) -> Option<Duration> {
        self.smallest
    }
    pub fn largest_tick_count(&self) -> Option<Duration> {
        self.largest
    }

    pub fn tickables(&self) -> &[Box<dyn Tickable>] {
        &self.tickables
    }
    pub fn tickable(&self, index: usize) -> Option<&dyn Tickable> {
        self.tickables.get(index).map(|t| t.as_ref())
    }
    pub fn tickable_mut(
        &mut self,
        index: usize,
    ) -> Option<&mut Box<dyn Tickable>> {
        self.tickables.get_mut(index)
    }
    pub(crate) fn tickables_mut(&mut self) -> &mut [Box<dyn Tickable>] {
        &mut self.tickables
    }
    pub fn len(&self) -> usize {
        self.tickables.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tickables.is_empty()
    }

    /// Append a tickable.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::{
    /// #     LayoutError, NoteValue, StaveNote, TimeSignature, Voice,
    /// # };
    /// let note = |value| Box::new(StaveNote::new(value, [3.0]));
    /// let mut voice = Voice::new(TimeSignature::new(2, 4));
    /// voice.add_tickable(note(NoteValue::Half)).unwrap();
    /// assert!(voice.is_complete());
    /// let overflow = voice.add_tickable(note(NoteValue::Eighth));
    /// assert!(matches!(overflow, Err(LayoutError::CapacityExceeded { .. })));
    /// assert_eq!(voice.len(), 1);
    /// ```
    pub fn add_tickable(
        &mut self,
        mut tickable: Box<dyn Tickable>,
    ) -> LayoutResult<&mut Self> {
        let ticks = tickable.ticks();
        let used = self.check_capacity(self.ticks_used, ticks)?;
        tickable.state_mut().set_stave_y(self.stave_y);
        self.commit(used, ticks);
        trace!(
            "voice: added {:?}, {} of {} used",
            tickable,
            self.ticks_used,
            self.total
        );
        self.tickables.push(tickable);
        Ok(self)
    }

    /// Append all tickables or none of them.
    pub fn add_tickables(
        &mut self,
        tickables: impl IntoIterator<Item = Box<dyn Tickable>>,
    ) -> LayoutResult<&mut Self> {
        let tickables: Vec<Box<dyn Tickable>> = tickables.into_iter().collect();
        let mut used = self.ticks_used;
        for tickable in tickables.iter() {
            used = self.check_capacity(used, tickable.ticks())?;
        }
        for tickable in tickables {
            self.add_tickable(tickable)?;
        }
        Ok(self)
    }

    /// New ticks used, or the overflow error. Mutates nothing.
    fn check_capacity(
        &self,
        used: Duration,
        ticks: Duration,
    ) -> LayoutResult<Duration> {
        let new_used = used.checked_add(&ticks)?;
        if self.mode != VoiceMode::Soft && new_used > self.total {
            debug!(
                "voice: capacity exceeded, {} used, adding {}, total {}",
                used, ticks, self.total
            );
            return Err(LayoutError::CapacityExceeded {
                used,
                adding: ticks,
                total: self.total,
            });
        }
        Ok(new_used)
    }

    fn commit(&mut self, used: Duration, ticks: Duration) {
        self.ticks_used = used;
        if ticks.is_zero() {
            return;
        }
        self.smallest = Some(self.smallest.map_or(ticks, |s| s.min(ticks)));
        self.largest = Some(self.largest.map_or(ticks, |l| l.max(ticks)));
    }

    /// Merged bounds of every formatted tickable.
    pub fn bounding_box(
        &self,
        settings: &LayoutSettings,
    ) -> Option<BoundingBox> {
        self.tickables
            .iter()
            .filter_map(|t| t.bounding_box(settings))
            .reduce(|acc, bbox| acc.merged(&bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::{Voice, VoiceMode};
    use crate::{
        primitives::{Duration, NoteValue, TimeSignature},
        tickable::{BarNote, BarlineType, StaveNote, Tickable},
        LayoutError,
    };

    fn quarter() -> Box<dyn Tickable> {
        Box::new(StaveNote::new(NoteValue::Quarter, [3.0]))
    }

    fn d(n: u64, den: u64) -> Duration {
        Duration::new(n, den).unwrap()
    }

    #[test]
    fn test_strict_overflow_keeps_ticks() {
        let mut voice = Voice::new(TimeSignature::new(3, 4));
        for _ in 0..3 {
            voice.add_tickable(quarter()).unwrap();
        }
        let before = voice.ticks_used();
        let err = voice.add_tickable(quarter()).unwrap_err();
        assert!(matches!(err, LayoutError::CapacityExceeded { .. }));
        assert_eq!(voice.ticks_used(), before);
        assert_eq!(voice.len(), 3);
    }

    #[test]
    fn test_soft_and_full() {
        let mut soft = Voice::new(TimeSignature::new(1, 4));
        soft.set_mode(VoiceMode::Soft);
        soft.add_tickable(quarter()).unwrap();
        soft.add_tickable(quarter()).unwrap();
        assert_eq!(soft.ticks_used(), d(1, 2));
        assert!(!soft.is_complete());

        let mut full = Voice::new(TimeSignature::new(1, 4));
        full.set_mode(VoiceMode::Full);
        full.add_tickable(quarter()).unwrap();
        assert!(full.add_tickable(quarter()).is_err());
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut voice = Voice::new(TimeSignature::new(2, 4));
        let err = voice.add_tickables(vec![quarter(), quarter(), quarter()]);
        assert!(err.is_err());
        assert!(voice.is_empty());
        assert_eq!(voice.ticks_used(), Duration::zero());
        voice.add_tickables(vec![quarter(), quarter()]).unwrap();
        assert!(voice.is_complete());
    }

    #[test]
    fn test_ignored_and_smallest() {
        let mut voice = Voice::new(TimeSignature::new(2, 4));
        voice
            .add_tickable(Box::new(
                StaveNote::new(NoteValue::Eighth, [3.0]).dotted(1),
            ))
            .unwrap()
            .add_tickable(Box::new(BarNote::new(BarlineType::Single)))
            .unwrap()
            .add_tickable(Box::new(StaveNote::new(NoteValue::Sixteenth, [3.0])))
            .unwrap()
            .add_tickable(quarter())
            .unwrap();
        assert!(voice.is_complete());
        assert_eq!(voice.len(), 4);
        assert_eq!(voice.smallest_tick_count(), Some(d(1, 16)));
        assert_eq!(voice.largest_tick_count(), Some(d(1, 4)));
    }

    #[test]
    fn test_stave_y_propagates() {
        let mut voice = Voice::new(TimeSignature::new(1, 4));
        voice.add_tickable(quarter()).unwrap();
        voice.set_stave_y(40.0);
        assert_eq!(voice.tickables()[0].stave_y(), 40.0);
    }
}
