//! Value types the layout is built from.
//!
//! Durations are exact fractions of a whole note, so sums of tuplets and
//! dotted values never drift. Bounding boxes are plain rectangles in
//! stave pixels.

pub mod bounding_box;
pub mod duration;
pub mod fraction_tools;
pub mod time_signature;

pub use bounding_box::{BoundingBox, BoundingBoxComputation};
pub use duration::{Duration, NoteValue, RESOLUTION};
pub use fraction_tools::{compare_fractions, fraction_parts, fraction_to_f64};
pub use time_signature::TimeSignature;
