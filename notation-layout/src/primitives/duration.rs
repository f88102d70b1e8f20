use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::Sum,
    ops::Add,
    str::FromStr,
};

use fraction::{CheckedAdd, CheckedMul, CheckedSub, Fraction};

use crate::{LayoutError, LayoutResult};

use super::{compare_fractions, fraction_parts, fraction_to_f64};

/// Ticks per whole note. Every standard note value divides it evenly.
pub const RESOLUTION: u64 = 16384;

/// Symbolic length of an event, as an exact fraction of a whole note.
///
/// Never negative: subtraction that would go below zero fails with
/// [`LayoutError::Arithmetic`].
#[derive(Debug, Clone, Copy)]
pub struct Duration {
    fraction: Fraction,
}
impl Duration {
    pub fn new(numer: u64, denom: u64) -> LayoutResult<Self> {
        if denom == 0 {
            return Err(LayoutError::Arithmetic(format!(
                "duration {}/{} has zero denominator",
                numer, denom
            )));
        }
        Ok(Self {
            fraction: Fraction::new(numer, denom),
        })
    }
    pub fn zero() -> Self {
        Self {
            fraction: Fraction::new(0u64, 1u64),
        }
    }
    pub fn whole() -> Self {
        Self {
            fraction: Fraction::new(1u64, 1u64),
        }
    }

    /// Length of a note value with the given amount of dots.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::primitives::{Duration, NoteValue};
    /// assert_eq!(
    ///     Duration::from_value(NoteValue::Quarter, 1),
    ///     Duration::new(3, 8).unwrap()
    /// );
    /// assert_eq!(
    ///     Duration::from_value(NoteValue::Half, 2),
    ///     Duration::new(7, 8).unwrap()
    /// );
    /// ```
    pub fn from_value(value: NoteValue, dots: u8) -> Self {
        let base = value.fraction();
        let dots = dots.min(8) as u32;
        let dotted = Fraction::new(2u64.pow(dots + 1) - 1, 2u64.pow(dots));
        Self {
            fraction: base * dotted,
        }
    }
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            fraction: Fraction::new(ticks, RESOLUTION),
        }
    }

    pub fn get(&self) -> Fraction {
        self.fraction
    }
    pub fn numer(&self) -> u64 {
        self.parts().0
    }
    pub fn denom(&self) -> u64 {
        self.parts().1
    }
    fn parts(&self) -> (u64, u64) {
        // Constructors only ever build finite non-negative fractions.
        fraction_parts(&self.fraction).unwrap_or((0, 1))
    }

    /// Exact tick count. Tuplets give non-integer ticks.
    pub fn ticks(&self) -> LayoutResult<Fraction> {
        let resolution = Fraction::new(RESOLUTION, 1u64);
        CheckedMul::checked_mul(&self.fraction, &resolution).ok_or_else(|| {
            LayoutError::Arithmetic(format!("ticks of {} overflow", self))
        })
    }

    /// Float approximation, for display and spacing weights only.
    pub fn value(&self) -> f64 {
        fraction_to_f64(&self.fraction)
    }
    pub fn is_zero(&self) -> bool {
        self.numer() == 0
    }

    /// Sum that fails instead of overflowing the u64 parts.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::primitives::Duration;
    /// let tiny = Duration::new(1, 1 << 40).unwrap();
    /// let odd = Duration::new(1, 3u64.pow(25)).unwrap();
    /// assert!(tiny.checked_add(&odd).is_err());
    /// ```
    pub fn checked_add(&self, other: &Self) -> LayoutResult<Self> {
        let fraction = CheckedAdd::checked_add(&self.fraction, &other.fraction)
            .ok_or_else(|| {
                LayoutError::Arithmetic(format!(
                    "duration overflow. left: {}, right: {}",
                    self, other
                ))
            })?;
        fraction_parts(&fraction)?;
        Ok(Self { fraction })
    }

    /// # Example
    /// ```
    /// # use notation_layout::primitives::Duration;
    /// let half = Duration::new(1, 2).unwrap();
    /// let quarter = Duration::new(1, 4).unwrap();
    /// assert_eq!(half.checked_sub(&quarter).unwrap(), quarter);
    /// assert!(quarter.checked_sub(&half).is_err());
    /// ```
    pub fn checked_sub(&self, other: &Self) -> LayoutResult<Self> {
        if other > self {
            return Err(LayoutError::Arithmetic(format!(
                "duration can not be negative. left: {}, right: {}",
                self, other
            )));
        }
        let fraction = CheckedSub::checked_sub(&self.fraction, &other.fraction)
            .ok_or_else(|| {
                LayoutError::Arithmetic(format!(
                    "duration overflow. left: {}, right: {}",
                    self, other
                ))
            })?;
        Ok(Self { fraction })
    }

    /// Scale the duration to fit `num_notes` into the space of
    /// `notes_occupied`.
    pub fn with_tuplet(
        &self,
        num_notes: u32,
        notes_occupied: u32,
    ) -> LayoutResult<Self> {
        if num_notes == 0 || notes_occupied == 0 {
            return Err(LayoutError::Arithmetic(format!(
                "tuplet {}:{} is degenerate",
                num_notes, notes_occupied
            )));
        }
        let ratio = Fraction::new(notes_occupied as u64, num_notes as u64);
        let fraction = CheckedMul::checked_mul(&self.fraction, &ratio)
            .ok_or_else(|| {
                LayoutError::Arithmetic(format!(
                    "tuplet {}:{} of {} overflows",
                    num_notes, notes_occupied, self
                ))
            })?;
        Ok(Self { fraction })
    }
}
impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}
impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Duration {}
impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_fractions(&self.fraction, &other.fraction)
    }
}
impl Hash for Duration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts().hash(state);
    }
}
/// # Panics
///
/// When the sum does not fit the u64 parts, as integer `+` does. Layout
/// code goes through [`Duration::checked_add`].
impl Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(&rhs) {
            Ok(sum) => sum,
            Err(err) => panic!("{}", err),
        }
    }
}
impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, d| acc + d)
    }
}
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (numer, denom) = self.parts();
        write!(f, "{}/{}", numer, denom)
    }
}
impl From<NoteValue> for Duration {
    fn from(value: NoteValue) -> Self {
        Self::from_value(value, 0)
    }
}

/// Undotted note values, from the double whole down to the 128th.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum NoteValue {
    DoubleWhole,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    HundredTwentyEighth,
}
impl NoteValue {
    fn fraction(&self) -> Fraction {
        match self {
            Self::DoubleWhole => Fraction::new(2u64, 1u64),
            other => Fraction::new(1u64, other.denominator()),
        }
    }
    /// Denominator of the value as in a time signature. 1 for
    /// the double whole as well.
    pub fn denominator(&self) -> u64 {
        match self {
            Self::DoubleWhole | Self::Whole => 1,
            Self::Half => 2,
            Self::Quarter => 4,
            Self::Eighth => 8,
            Self::Sixteenth => 16,
            Self::ThirtySecond => 32,
            Self::SixtyFourth => 64,
            Self::HundredTwentyEighth => 128,
        }
    }
    /// Amount of flags or beams the value carries.
    pub fn beam_count(&self) -> u8 {
        match self {
            Self::Eighth => 1,
            Self::Sixteenth => 2,
            Self::ThirtySecond => 3,
            Self::SixtyFourth => 4,
            Self::HundredTwentyEighth => 5,
            _ => 0,
        }
    }
    pub fn has_stem(&self) -> bool {
        !matches!(self, Self::DoubleWhole | Self::Whole)
    }
}
impl FromStr for NoteValue {
    type Err = LayoutError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1/2" | "b" => Ok(Self::DoubleWhole),
            "1" | "w" => Ok(Self::Whole),
            "2" | "h" => Ok(Self::Half),
            "4" | "q" => Ok(Self::Quarter),
            "8" => Ok(Self::Eighth),
            "16" => Ok(Self::Sixteenth),
            "32" => Ok(Self::ThirtySecond),
            "64" => Ok(Self::SixtyFourth),
            "128" => Ok(Self::HundredTwentyEighth),
            x => Err(LayoutError::InvalidNoteValue(x.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use super::{Duration, NoteValue, RESOLUTION};
    use crate::LayoutError;

    #[test]
    fn duration() {
        let a = Duration::new(1, 4).unwrap();
        let b = Duration::new(2, 8).unwrap();
        assert_eq!(a, b);
        assert_eq!(a + b, Duration::new(1, 2).unwrap());
        assert_eq!((a + b).numer(), 1);
        assert_eq!((a + b).denom(), 2);
        assert!(Duration::new(1, 0).is_err());
    }

    #[test]
    fn duration_negative_sub() {
        let quarter = Duration::new(1, 4).unwrap();
        let half = Duration::new(1, 2).unwrap();
        assert!(quarter.checked_sub(&half).is_err());
        assert_eq!(
            half.checked_sub(&quarter).unwrap(),
            Duration::new(1, 4).unwrap()
        );
    }

    #[test]
    fn ticks() {
        assert_eq!(
            Duration::from_value(NoteValue::Quarter, 0).ticks().unwrap(),
            Fraction::new(RESOLUTION / 4, 1u64)
        );
        let triplet_eighth = Duration::from_value(NoteValue::Eighth, 0)
            .with_tuplet(3, 2)
            .unwrap();
        assert_eq!(triplet_eighth, Duration::new(1, 12).unwrap());
        assert_eq!(
            triplet_eighth.ticks().unwrap(),
            Fraction::new(RESOLUTION, 12u64)
        );
        let beat: Duration = (0..3).map(|_| triplet_eighth).sum();
        assert_eq!(beat, Duration::new(1, 4).unwrap());
        assert_eq!(
            Duration::from_ticks(RESOLUTION / 8),
            Duration::new(1, 8).unwrap()
        );
    }

    #[test]
    fn overflow_is_an_error() {
        let tiny = Duration::new(1, 1 << 40).unwrap();
        let odd = Duration::new(1, 3u64.pow(25)).unwrap();
        assert!(matches!(
            tiny.checked_add(&odd),
            Err(LayoutError::Arithmetic(_))
        ));
        assert!(matches!(
            tiny.checked_sub(&Duration::zero()),
            Ok(d) if d == tiny
        ));
        let huge = Duration::new(1, u64::MAX / 2).unwrap();
        assert!(huge.with_tuplet(7, 5).is_err());
        let long = Duration::new(u64::MAX / 2, 1).unwrap();
        assert!(long.ticks().is_err());
    }

    #[test]
    fn ordering() {
        let mut durations = vec![
            Duration::new(1, 4).unwrap(),
            Duration::new(1, 12).unwrap(),
            Duration::whole(),
            Duration::zero(),
        ];
        durations.sort();
        assert_eq!(durations[0], Duration::zero());
        assert_eq!(durations[1], Duration::new(1, 12).unwrap());
        assert_eq!(durations[3], Duration::whole());
    }

    #[test]
    fn note_values() {
        assert_eq!("8".parse::<NoteValue>().unwrap(), NoteValue::Eighth);
        assert_eq!("q".parse::<NoteValue>().unwrap(), NoteValue::Quarter);
        assert!("3".parse::<NoteValue>().is_err());
        assert_eq!(
            Duration::from(NoteValue::DoubleWhole),
            Duration::new(2, 1).unwrap()
        );
        assert_eq!(
            Duration::from_value(NoteValue::Whole, 1).to_string(),
            "3/2"
        );
    }
}
