//! Layout configuration.
//!
//! Every field has a default, so partial JSON documents are accepted:
//!
//! ```
//! # use notation_layout::LayoutSettings;
//! let json = r#"{"context_padding": 12.0}"#;
//! let settings = LayoutSettings::from_json(json).unwrap();
//! assert_eq!(settings.context_padding, 12.0);
//! assert_eq!(settings.line_spacing, 10.0);
//! ```

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::LayoutResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct LayoutSettings {
    /// Distance between two stave lines.
    #[derivative(Default(value = "10.0"))]
    pub line_spacing: f64,
    #[derivative(Default(value = "35.0"))]
    pub stem_length: f64,
    /// Space every tick context keeps on its right side.
    #[derivative(Default(value = "10.0"))]
    pub context_padding: f64,
    /// Gap between noteheads of different voices pushed apart.
    #[derivative(Default(value = "2.0"))]
    pub head_padding: f64,
    /// Gap between vertically stacked modifiers.
    #[derivative(Default(value = "2.0"))]
    pub text_padding: f64,
    /// Joined voices must have the same total duration.
    #[derivative(Default(value = "true"))]
    pub align_voices: bool,
    pub beam: BeamSettings,
}
impl LayoutSettings {
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn to_json(&self) -> LayoutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct BeamSettings {
    #[derivative(Default(value = "-0.25"))]
    pub min_slope: f64,
    #[derivative(Default(value = "0.25"))]
    pub max_slope: f64,
    #[derivative(Default(value = "20"))]
    pub slope_iterations: u32,
    /// Weight of the distance from the ideal slope against stem
    /// extension.
    #[derivative(Default(value = "100.0"))]
    pub slope_cost: f64,
    /// Let rests continue a beam group instead of breaking it.
    pub beam_rests: bool,
}

#[cfg(test)]
mod tests {
    use super::LayoutSettings;

    #[test]
    fn test_defaults() {
        let settings = LayoutSettings::default();
        assert_eq!(settings.stem_length, 35.0);
        assert!(settings.align_voices);
        assert_eq!(settings.beam.slope_iterations, 20);
        assert!(!settings.beam.beam_rests);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = LayoutSettings::default();
        settings.beam.beam_rests = true;
        let json = settings.to_json().unwrap();
        assert_eq!(LayoutSettings::from_json(&json).unwrap(), settings);
        assert!(LayoutSettings::from_json("{").is_err());
    }
}
