use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{LayoutError, LayoutResult};

use super::Duration;

/// Budget source for voices: `numerator` beats of `1/denominator`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignature {
    /// # Panics
    ///
    /// If denominator is zero. Use `str::parse` for unchecked input.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        assert!(denominator > 0, "time signature denominator is zero");
        Self {
            numerator,
            denominator,
        }
    }
    pub fn try_new(numerator: u32, denominator: u32) -> LayoutResult<Self> {
        match denominator {
            0 => Err(LayoutError::InvalidTimeSignature(format!(
                "{}/{}",
                numerator, denominator
            ))),
            _ => Ok(Self {
                numerator,
                denominator,
            }),
        }
    }

    /// Total length of one measure.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::primitives::{Duration, TimeSignature};
    /// assert_eq!(
    ///     TimeSignature::new(6, 8).length(),
    ///     Duration::new(3, 4).unwrap()
    /// );
    /// ```
    pub fn length(&self) -> Duration {
        Duration::new(self.numerator as u64, self.denominator.max(1) as u64)
            .unwrap_or_default()
    }
    /// Length of the beat unit.
    pub fn beat(&self) -> Duration {
        Duration::new(1, self.denominator.max(1) as u64).unwrap_or_default()
    }
}
impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
impl FromStr for TimeSignature {
    type Err = LayoutError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || LayoutError::InvalidTimeSignature(s.to_string());
        let (num, denom) = s.trim().split_once('/').ok_or_else(err)?;
        let numerator = num.trim().parse::<u32>().map_err(|_| err())?;
        let denominator = denom.trim().parse::<u32>().map_err(|_| err())?;
        Self::try_new(numerator, denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeSignature;
    use crate::primitives::Duration;

    #[test]
    fn test_parse() {
        assert_eq!(
            "7/8".parse::<TimeSignature>().unwrap(),
            TimeSignature::new(7, 8)
        );
        assert!("7/0".parse::<TimeSignature>().is_err());
        assert!("seven/8".parse::<TimeSignature>().is_err());
        assert!("4".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(TimeSignature::new(4, 4).length(), Duration::whole());
        assert_eq!(
            TimeSignature::new(9, 8).length(),
            Duration::new(9, 8).unwrap()
        );
        assert_eq!(
            TimeSignature::new(3, 2).beat(),
            Duration::new(1, 2).unwrap()
        );
    }
}
