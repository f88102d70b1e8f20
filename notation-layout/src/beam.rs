//! Beam grouping, stem directions and beam slopes.

use std::ops::Range;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    primitives::{Duration, TimeSignature},
    settings::LayoutSettings,
    tickable::{StemDirection, StemExtents, Tickable},
    voice::Voice,
    LayoutError, LayoutResult,
};

/// Common stem direction of a run of tickables.
///
/// Any forced direction wins, and two different forced directions are an
/// error. Otherwise the stem goes down when the heads average above the
/// middle line. Rests do not vote.
pub fn calculate_stem_direction(
    tickables: &[Box<dyn Tickable>],
) -> LayoutResult<StemDirection> {
    let forced: Vec<StemDirection> = tickables
        .iter()
        .filter_map(|t| t.forced_stem_direction())
        .unique()
        .collect();
    match forced.as_slice() {
        [] => (),
        [direction] => return Ok(*direction),
        _ => return Err(LayoutError::MixedStemDirections),
    }
    let means: Vec<f64> = tickables
        .iter()
        .filter(|t| !t.is_rest())
        .map(|t| t.head_lines())
        .filter(|lines| !lines.is_empty())
        .map(|lines| lines.iter().sum::<f64>() / lines.len() as f64)
        .collect();
    if means.is_empty() {
        return Ok(StemDirection::Up);
    }
    let mean = means.iter().sum::<f64>() / means.len() as f64;
    Ok(StemDirection::for_mean_line(mean))
}

/// Beam group lengths for a meter.
///
/// ```
/// # use notation_layout::{default_beam_groups, Duration, TimeSignature};
/// let groups = default_beam_groups(&TimeSignature::new(6, 8));
/// assert_eq!(groups, vec![Duration::new(3, 8).unwrap()]);
/// ```
pub fn default_beam_groups(time_signature: &TimeSignature) -> Vec<Duration> {
    let (num, den) = (time_signature.numerator, time_signature.denominator);
    let group = match (num, den) {
        (1..=4, 2) => (1, 2),
        (1..=4, 4) => (1, 4),
        (1, 8) => (1, 8),
        (2, 8) | (4, 8) => (2, 8),
        (3, 8) | (6, 8) | (9, 8) | (12, 8) => (3, 8),
        (1, 16) => (1, 16),
        (2, 16) | (4, 16) => (2, 16),
        (3, 16) => (3, 16),
        (n, d) if n % 3 == 0 => (3, d),
        (_, d) if d > 4 => (2, d),
        (_, d) => (1, d),
    };
    match Duration::new(group.0, group.1 as u64) {
        Ok(duration) => vec![duration],
        Err(_) => vec![time_signature.beat()],
    }
}

/// Beam the runs of beamable notes falling inside each group window.
///
/// The windows cycle through `groups`. A note longer than its window, a
/// glyph that takes no time or an unbeamable note closes the run. Rests
/// continue a run only with `beam_rests`, and never open or close one.
pub fn generate_beam_groups(
    voice: &Voice,
    groups: &[Duration],
    beam_rests: bool,
) -> LayoutResult<Vec<Beam>> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }
    if groups.iter().any(|g| g.is_zero()) {
        return Err(LayoutError::InvalidBeam(
            "zero-length beam group".to_string(),
        ));
    }
    let mut beams = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    let mut offset = Duration::zero();
    let mut group_idx = 0;
    let mut window_end = groups[0];
    for (idx, tickable) in voice.tickables().iter().enumerate() {
        if tickable.ignore_ticks() {
            flush_run(voice, &mut run, &mut beams)?;
            continue;
        }
        while offset >= window_end {
            flush_run(voice, &mut run, &mut beams)?;
            group_idx += 1;
            let group = &groups[group_idx % groups.len()];
            window_end = window_end.checked_add(group)?;
        }
        let end = offset.checked_add(&tickable.ticks())?;
        let beamable = tickable.beam_count() > 0
            && end <= window_end
            && match tickable.is_rest() {
                true => beam_rests,
                false => tickable.has_stem(),
            };
        match beamable {
            true => run.push(idx),
            false => flush_run(voice, &mut run, &mut beams)?,
        }
        offset = end;
    }
    flush_run(voice, &mut run, &mut beams)?;
    debug!("beam: {} beam(s) generated", beams.len());
    Ok(beams)
}

fn flush_run(
    voice: &Voice,
    run: &mut Vec<usize>,
    beams: &mut Vec<Beam>,
) -> LayoutResult<()> {
    let tickables = voice.tickables();
    let notes: Vec<usize> = run
        .iter()
        .copied()
        .filter(|idx| !tickables[*idx].is_rest())
        .collect();
    run.clear();
    if let [first, .., last] = notes.as_slice() {
        beams.push(Beam::new(voice, *first..*last + 1)?);
    }
    Ok(())
}

/// Beam over a contiguous range of a voice's tickables.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    range: Range<usize>,
    stem_direction: StemDirection,
    slope: f64,
    y_shift: f64,
    anchor: Option<(f64, f64)>,
    end_x: f64,
}
impl Beam {
    pub fn new(voice: &Voice, range: Range<usize>) -> LayoutResult<Self> {
        let tickables = beam_tickables(voice, &range)?;
        let notes =
            tickables.iter().filter(|t| is_beamed(t.as_ref())).count();
        if notes < 2 {
            return Err(LayoutError::InvalidBeam(format!(
                "{} beamable note(s) in {:?}",
                notes, range
            )));
        }
        Ok(Self {
            stem_direction: calculate_stem_direction(tickables)?,
            range,
            slope: 0.0,
            y_shift: 0.0,
            anchor: None,
            end_x: 0.0,
        })
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
    pub fn stem_direction(&self) -> StemDirection {
        self.stem_direction
    }
    pub fn slope(&self) -> f64 {
        self.slope
    }
    pub fn y_shift(&self) -> f64 {
        self.y_shift
    }

    /// Point every note of the beam the same way.
    pub fn apply_stem_direction(&self, voice: &mut Voice) {
        for idx in self.range.clone() {
            if let Some(tickable) = voice.tickable_mut(idx) {
                if is_beamed(&**tickable) {
                    tickable.set_stem_direction(self.stem_direction);
                }
            }
        }
    }

    /// Pick the slope within the configured bounds that stays close to
    /// half the slope between the outer stems while extending the inner
    /// stems the least.
    pub fn calculate_slope(
        &mut self,
        voice: &Voice,
        settings: &LayoutSettings,
    ) -> LayoutResult<()> {
        let tickables = beam_tickables(voice, &self.range)?;
        let stems: Vec<StemExtents> = tickables
            .iter()
            .filter(|t| is_beamed(t.as_ref()))
            .map(|t| {
                t.stem_extents(settings).ok_or_else(|| {
                    LayoutError::NotFormatted(format!(
                        "beam {:?} before formatting",
                        self.range
                    ))
                })
            })
            .collect::<LayoutResult<_>>()?;
        let (first, last) = match (stems.first(), stems.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(LayoutError::InvalidBeam(format!(
                    "empty beam {:?}",
                    self.range
                )))
            }
        };
        let direction = self.stem_direction.sign();
        let span = last.x - first.x;
        let initial = match span.abs() > f64::EPSILON {
            true => (last.tip_y - first.tip_y) / span,
            false => 0.0,
        };
        let ideal = initial / 2.0;
        let beam = &settings.beam;
        let iterations = beam.slope_iterations.max(1);
        let step = (beam.max_slope - beam.min_slope) / iterations as f64;

        let mut best_cost = f64::MAX;
        let (mut best_slope, mut best_shift) = (0.0, 0.0);
        for k in 0..=iterations {
            let slope = beam.min_slope + k as f64 * step;
            let mut extension = 0.0;
            let mut y_shift = 0.0;
            for (i, stem) in stems.iter().enumerate().skip(1) {
                let beam_y =
                    first.tip_y + (stem.x - first.x) * slope + y_shift;
                if stem.tip_y * direction < beam_y * direction {
                    let diff = (stem.tip_y - beam_y).abs();
                    y_shift += diff * -direction;
                    extension += diff * i as f64;
                } else {
                    extension += (stem.tip_y - beam_y) * direction;
                }
            }
            let cost =
                beam.slope_cost * (ideal - slope).abs() + extension.abs();
            if cost < best_cost {
                best_cost = cost;
                best_slope = slope;
                best_shift = y_shift;
            }
        }
        trace!(
            "beam: {:?} slope {} shift {} cost {}",
            self.range,
            best_slope,
            best_shift,
            best_cost
        );
        self.slope = best_slope;
        self.y_shift = best_shift;
        self.anchor = Some((first.x, first.tip_y));
        self.end_x = last.x;
        Ok(())
    }

    /// Beam y at `x`, None before the slope was calculated.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        let (x0, y0) = self.anchor?;
        Some(y0 + (x - x0) * self.slope + self.y_shift)
    }

    /// Start and end points of the beam.
    pub fn line(&self) -> Option<((f64, f64), (f64, f64))> {
        let (x0, _) = self.anchor?;
        Some(((x0, self.y_at(x0)?), (self.end_x, self.y_at(self.end_x)?)))
    }
}

fn beam_tickables<'v>(
    voice: &'v Voice,
    range: &Range<usize>,
) -> LayoutResult<&'v [Box<dyn Tickable>]> {
    voice.tickables().get(range.clone()).ok_or_else(|| {
        LayoutError::InvalidBeam(format!(
            "{:?} out of {} tickables",
            range,
            voice.len()
        ))
    })
}

fn is_beamed(tickable: &dyn Tickable) -> bool {
    !tickable.is_rest() && tickable.has_stem() && tickable.beam_count() > 0
}
