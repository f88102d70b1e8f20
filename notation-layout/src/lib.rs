//! Tick-based justification and collision-avoidance layout for music
//! notation.
//!
//! Voices of [`Tickable`] elements are merged into [`TickContext`] columns
//! by their rational start time, attached modifiers are stacked by a
//! [`ModifierContext`] per column, and the [`Formatter`] distributes the
//! target width across the columns proportionally to their durations.
//!
//! ```
//! use notation_layout::{
//!     Formatter, LayoutSettings, NoteValue, StandardMetrics, StaveNote,
//!     TimeSignature, Voice,
//! };
//!
//! let mut voice = Voice::new(TimeSignature::new(4, 4));
//! for line in [3.0, 3.5, 4.0, 4.5] {
//!     voice
//!         .add_tickable(Box::new(StaveNote::new(NoteValue::Quarter, [line])))
//!         .unwrap();
//! }
//! assert!(voice.is_complete());
//!
//! let mut voices = vec![voice];
//! let mut formatter = Formatter::new(LayoutSettings::default());
//! formatter
//!     .format(&mut voices, 300.0, &StandardMetrics::default())
//!     .unwrap();
//! let xs: Vec<f64> =
//!     voices[0].tickables().iter().filter_map(|t| t.x()).collect();
//! assert_eq!(xs.len(), 4);
//! assert!(xs.windows(2).all(|w| w[0] < w[1]));
//! ```

pub mod beam;
pub mod formatter;
pub mod glyph;
pub mod modifier;
pub mod primitives;
pub mod settings;
pub mod tick_context;
pub mod tickable;
pub mod voice;

pub use beam::{
    calculate_stem_direction, default_beam_groups, generate_beam_groups,
    Beam,
};
pub use formatter::{
    EqualSpacing, Formatter, LogarithmicSpacing, ProportionalSpacing,
    SpacingStrategy,
};
pub use glyph::{outline::GlyphOutline, Glyph, GlyphMetrics, StandardMetrics};
pub use modifier::{
    context::ModifierContext, AccidentalType, ArticulationType, Modifier,
    ModifierCategory, ModifierKind, ModifierPlacement, ModifierPosition,
    OrnamentType, PlacementRule, PlacementTable,
};
pub use primitives::{
    BoundingBox, BoundingBoxComputation, Duration, NoteValue, TimeSignature,
    RESOLUTION,
};
pub use settings::{BeamSettings, LayoutSettings};
pub use tick_context::{TickContext, TickContextId};
pub use tickable::{
    BarNote, BarlineType, ClefNote, ClefType, GhostNote, StaveNote,
    StemDirection, Tickable, TickableMetrics, TickableRef, TickableState,
};
pub use voice::{Voice, VoiceMode};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error(
        "Voice capacity exceeded: {used} used, adding {adding}, \
        total {total}"
    )]
    CapacityExceeded {
        used: Duration,
        adding: Duration,
        total: Duration,
    },
    #[error("Voice {voice} is incomplete: {used} of {total} used")]
    IncompleteVoice {
        voice: usize,
        used: Duration,
        total: Duration,
    },
    #[error("Insufficient width: required {required}, given {given}")]
    InsufficientWidth { required: f64, given: f64 },
    #[error("No voices to format")]
    EmptyVoiceSet,
    #[error(
        "Voices have different total durations: expected {expected}, \
        found {found} in voice {voice}"
    )]
    MismatchedTotalDuration {
        voice: usize,
        expected: Duration,
        found: Duration,
    },
    #[error("Unsupported modifier: {0}")]
    UnsupportedModifier(String),
    #[error("Forced stem directions disagree inside one beam")]
    MixedStemDirections,
    #[error("Invalid beam: {0}")]
    InvalidBeam(String),
    #[error("Not formatted yet: {0}")]
    NotFormatted(String),
    #[error("Malformed glyph outline: {0}")]
    MalformedOutline(String),
    #[error("Invalid time signature: `{0}`")]
    InvalidTimeSignature(String),
    #[error("Invalid note value: `{0}`")]
    InvalidNoteValue(String),
    #[error("Can not read settings: {0}")]
    Settings(#[from] serde_json::Error),
}
pub type LayoutResult<T> = Result<T, LayoutError>;
