//! Joins voices into tick contexts and justifies them to a width.
//!
//! Every call to [`Formatter::format`] rebuilds the contexts from scratch,
//! so formatting the same voices twice gives the same coordinates.

use std::collections::BTreeMap;

use derivative::Derivative;
use log::{debug, trace};

use crate::{
    glyph::GlyphMetrics,
    modifier::{context::ModifierContext, PlacementTable},
    primitives::Duration,
    settings::LayoutSettings,
    tick_context::{TickContext, TickContextId},
    tickable::TickableRef,
    voice::{Voice, VoiceMode},
    LayoutError, LayoutResult,
};

/// Share of the free width a tick context receives, relative to the
/// others. Zero gets nothing.
pub trait SpacingStrategy {
    /// `max_ticks` is the longest duration starting in the context,
    /// `smallest` the shortest duration found in any of the voices.
    fn weight(&self, max_ticks: Duration, smallest: Option<Duration>) -> f64;
}

/// Free width in proportion to the duration. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalSpacing;
impl SpacingStrategy for ProportionalSpacing {
    fn weight(&self, max_ticks: Duration, _smallest: Option<Duration>) -> f64 {
        max_ticks.value()
    }
}

/// Every doubling of the duration adds the same amount of space.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogarithmicSpacing;
impl SpacingStrategy for LogarithmicSpacing {
    fn weight(&self, max_ticks: Duration, smallest: Option<Duration>) -> f64 {
        if max_ticks.is_zero() {
            return 0.0;
        }
        let smallest = smallest.unwrap_or(max_ticks).value();
        1.0 + (max_ticks.value() / smallest).log2().max(0.0)
    }
}

/// Same free width for every timed context.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualSpacing;
impl SpacingStrategy for EqualSpacing {
    fn weight(&self, max_ticks: Duration, _smallest: Option<Duration>) -> f64 {
        match max_ticks.is_zero() {
            true => 0.0,
            false => 1.0,
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Formatter {
    settings: LayoutSettings,
    table: PlacementTable,
    #[derivative(Debug = "ignore")]
    strategy: Box<dyn SpacingStrategy>,
    contexts: Vec<TickContext>,
    min_total_width: f64,
    total_ticks: Duration,
    justify_width: f64,
}
impl Formatter {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            table: PlacementTable::standard().clone(),
            strategy: Box::new(ProportionalSpacing),
            contexts: Vec::new(),
            min_total_width: 0.0,
            total_ticks: Duration::zero(),
            justify_width: 0.0,
        }
    }
    pub fn with_strategy(mut self, strategy: Box<dyn SpacingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }
    pub fn with_placement_table(mut self, table: PlacementTable) -> Self {
        self.table = table;
        self
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }
    pub fn tick_contexts(&self) -> &[TickContext] {
        &self.contexts
    }
    pub fn tick_context(&self, id: TickContextId) -> Option<&TickContext> {
        self.contexts.get(id.0)
    }
    /// Sum of the context widths, 0 before the first pass.
    pub fn min_total_width(&self) -> f64 {
        self.min_total_width
    }
    pub fn total_ticks(&self) -> Duration {
        self.total_ticks
    }
    /// Width of the last justification.
    pub fn justify_width(&self) -> f64 {
        self.justify_width
    }

    /// Build and measure the tick contexts, returning the narrowest width
    /// the voices fit in.
    pub fn pre_calculate_min_total_width(
        &mut self,
        voices: &mut [Voice],
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<f64> {
        self.validate(voices)?;
        self.reset(voices);
        self.create_tick_contexts(voices)?;
        self.format_modifiers(voices, metrics)?;
        for ctx in self.contexts.iter_mut() {
            ctx.pre_format(voices, metrics)?;
            for reference in ctx.tickables() {
                let voice = &mut voices[reference.voice];
                if let Some(tickable) = voice.tickable_mut(reference.index) {
                    let measured = tickable.metrics(metrics);
                    tickable.state_mut().set_measured(&measured);
                }
            }
        }
        self.min_total_width = self.contexts.iter().map(|c| c.width()).sum();
        debug!(
            "formatter: {} tick contexts, min total width {}",
            self.contexts.len(),
            self.min_total_width
        );
        Ok(self.min_total_width)
    }

    /// Lay the voices out across exactly `width` pixels.
    pub fn format(
        &mut self,
        voices: &mut [Voice],
        width: f64,
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<()> {
        let required = self.pre_calculate_min_total_width(voices, metrics)?;
        if width + 1e-9 < required {
            return Err(LayoutError::InsufficientWidth {
                required,
                given: width,
            });
        }
        self.justify(width - required, voices);
        self.justify_width = width;
        self.position(voices);
        Ok(())
    }

    pub fn format_to_min_width(
        &mut self,
        voices: &mut [Voice],
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<f64> {
        let width = self.pre_calculate_min_total_width(voices, metrics)?;
        self.format(voices, width, metrics)?;
        Ok(width)
    }

    fn validate(&self, voices: &[Voice]) -> LayoutResult<()> {
        let first = voices.first().ok_or(LayoutError::EmptyVoiceSet)?;
        for (idx, voice) in voices.iter().enumerate() {
            let aligned = voice.total_ticks() == first.total_ticks();
            if self.settings.align_voices && !aligned {
                return Err(LayoutError::MismatchedTotalDuration {
                    voice: idx,
                    expected: first.total_ticks(),
                    found: voice.total_ticks(),
                });
            }
            if voice.mode() == VoiceMode::Strict && !voice.is_complete() {
                return Err(LayoutError::IncompleteVoice {
                    voice: idx,
                    used: voice.ticks_used(),
                    total: voice.total_ticks(),
                });
            }
        }
        Ok(())
    }

    fn reset(&mut self, voices: &mut [Voice]) {
        self.contexts.clear();
        self.min_total_width = 0.0;
        self.justify_width = 0.0;
        for voice in voices.iter_mut() {
            for tickable in voice.tickables_mut() {
                tickable.state_mut().reset_layout();
            }
        }
    }

    /// Merge the voices at equal offsets. Glyphs that take no time get
    /// one lane each, so bar lines of different voices line up without
    /// sharing a column with the following notes.
    fn create_tick_contexts(
        &mut self,
        voices: &mut [Voice],
    ) -> LayoutResult<()> {
        let mut columns: BTreeMap<(Duration, u32), Vec<TickableRef>> =
            BTreeMap::new();
        let mut total = Duration::zero();
        for (v_idx, voice) in voices.iter().enumerate() {
            let mut offset = Duration::zero();
            let mut lane = 0;
            for (t_idx, tickable) in voice.tickables().iter().enumerate() {
                let key = match tickable.ignore_ticks() {
                    true => {
                        lane += 1;
                        (offset, lane - 1)
                    }
                    false => (offset, u32::MAX),
                };
                columns
                    .entry(key)
                    .or_default()
                    .push(TickableRef::new(v_idx, t_idx));
                let ticks = tickable.ticks();
                if !ticks.is_zero() {
                    offset = offset.checked_add(&ticks)?;
                    lane = 0;
                }
            }
            total = total.max(voice.total_ticks()).max(offset);
        }
        self.total_ticks = total;

        for ((offset, lane), refs) in columns {
            let id = TickContextId(self.contexts.len());
            let padding = self.settings.context_padding;
            let mut ctx = TickContext::new(offset, lane, padding);
            for reference in refs {
                let voice = &mut voices[reference.voice];
                if let Some(tickable) = voice.tickable_mut(reference.index) {
                    ctx.add_tickable(reference, &**tickable);
                    tickable.state_mut().set_tick_context(id);
                }
            }
            trace!("formatter: context {:?} at {} lane {}", id, offset, lane);
            self.contexts.push(ctx);
        }
        Ok(())
    }

    fn format_modifiers(
        &mut self,
        voices: &mut [Voice],
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<()> {
        for ctx in self.contexts.iter() {
            let mut modifiers = ModifierContext::from_tickables(
                &self.table,
                &self.settings,
                voices,
                ctx.tickables(),
                metrics,
            )?;
            modifiers.pre_format()?;
            modifiers.apply(voices)?;
        }
        Ok(())
    }

    fn justify(&mut self, extra: f64, voices: &[Voice]) {
        let smallest =
            voices.iter().filter_map(|v| v.smallest_tick_count()).min();
        let mut weights: Vec<f64> = self
            .contexts
            .iter()
            .map(|c| self.strategy.weight(c.max_ticks(), smallest).max(0.0))
            .collect();
        let mut total: f64 = weights.iter().sum();
        if total <= 0.0 {
            weights.iter_mut().for_each(|w| *w = 1.0);
            total = weights.len() as f64;
        }
        for (ctx, weight) in self.contexts.iter_mut().zip(weights) {
            let width = ctx.width() + extra * weight / total;
            ctx.set_width(width);
        }
        debug!("formatter: distributed {} extra px", extra);
    }

    fn position(&mut self, voices: &mut [Voice]) {
        let mut x = 0.0;
        for ctx in self.contexts.iter_mut() {
            ctx.set_x(x);
            x += ctx.width();
            let origin = ctx.x() + ctx.left_px();
            for reference in ctx.tickables() {
                let voice = &mut voices[reference.voice];
                if let Some(tickable) = voice.tickable_mut(reference.index) {
                    let tickable_x = origin + tickable.x_shift();
                    tickable.state_mut().set_x(tickable_x);
                }
            }
        }
    }
}
