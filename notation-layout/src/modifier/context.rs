//! Collision-free stacking of the modifiers of one tick context.
//!
//! Placement runs in three passes. Noteheads of different voices that
//! would overlap are pushed apart first; lateral categories then take
//! columns growing outward from the notehead column, inner categories
//! first; last, the vertical categories are stacked above and below the
//! whole context.
//!
//! Horizontal offsets are computed against the notehead column origin of
//! the context and reported relative to each owner's x.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    glyph::GlyphMetrics,
    settings::LayoutSettings,
    tickable::{Tickable, TickableRef, MIDDLE_LINE},
    voice::Voice,
    LayoutError, LayoutResult,
};

use super::{
    Modifier, ModifierCategory, ModifierPlacement, ModifierPosition,
    PlacementTable,
};

/// Notehead column of one tickable.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct NoteheadEntry {
    /// Lowest and highest head line, None for headless glyphs.
    pub lines: Option<(f64, f64)>,
    pub is_rest: bool,
    pub head_px: f64,
    pub left_displaced_px: f64,
    pub right_displaced_px: f64,
}
impl NoteheadEntry {
    pub fn from_tickable(
        tickable: &dyn Tickable,
        metrics: &dyn GlyphMetrics,
    ) -> Self {
        let own = tickable.intrinsic_metrics(metrics);
        let lines = tickable.head_lines();
        Self {
            lines: lines
                .iter()
                .copied()
                .minmax_by(|a, b| a.total_cmp(b))
                .into_option(),
            is_rest: tickable.is_rest(),
            head_px: own.note_px,
            left_displaced_px: own.left_displaced_head_px,
            right_displaced_px: own.right_displaced_head_px,
        }
    }
    fn collides(&self) -> bool {
        !self.is_rest && self.lines.is_some()
    }
    fn right_edge(&self) -> f64 {
        self.head_px + self.right_displaced_px
    }
}

/// What the context decided for one owner.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct OwnerLayout {
    pub x_shift: f64,
    pub modifier_left_px: f64,
    pub modifier_right_px: f64,
}

#[derive(Debug, Clone)]
struct Entry {
    owner: TickableRef,
    index: usize,
    category: ModifierCategory,
    order: u8,
    position: ModifierPosition,
    line: f64,
    width: f64,
    height: f64,
    seq: usize,
}

#[derive(Debug, Clone)]
pub struct ModifierContext<'a> {
    table: &'a PlacementTable,
    line_spacing: f64,
    head_padding: f64,
    text_padding: f64,
    noteheads: BTreeMap<TickableRef, NoteheadEntry>,
    entries: Vec<Entry>,
    placements: Vec<(TickableRef, usize, ModifierPlacement)>,
    owners: BTreeMap<TickableRef, OwnerLayout>,
    preformatted: bool,
}
impl<'a> ModifierContext<'a> {
    pub fn new(table: &'a PlacementTable, settings: &LayoutSettings) -> Self {
        Self {
            table,
            line_spacing: settings.line_spacing,
            head_padding: settings.head_padding,
            text_padding: settings.text_padding,
            noteheads: BTreeMap::new(),
            entries: Vec::new(),
            placements: Vec::new(),
            owners: BTreeMap::new(),
            preformatted: false,
        }
    }

    /// Collect noteheads and modifiers of the referenced tickables.
    pub fn from_tickables(
        table: &'a PlacementTable,
        settings: &LayoutSettings,
        voices: &[Voice],
        refs: &[TickableRef],
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<Self> {
        let mut context = Self::new(table, settings);
        for owner in refs {
            let tickable = voices
                .get(owner.voice)
                .and_then(|v| v.tickable(owner.index))
                .ok_or_else(|| {
                    LayoutError::NotFormatted(format!(
                        "no tickable at {:?}",
                        owner
                    ))
                })?;
            context.add_notehead(
                *owner,
                NoteheadEntry::from_tickable(tickable, metrics),
            );
            let lines = tickable.head_lines();
            for (index, modifier) in tickable.modifiers().iter().enumerate()
            {
                let band_line = lines
                    .get(modifier.index())
                    .or(lines.last())
                    .copied()
                    .unwrap_or(MIDDLE_LINE);
                context.add(*owner, index, modifier, band_line, metrics)?;
            }
        }
        Ok(context)
    }

    pub fn add_notehead(
        &mut self,
        owner: TickableRef,
        entry: NoteheadEntry,
    ) -> &mut Self {
        self.noteheads.insert(owner, entry);
        self.preformatted = false;
        self
    }

    /// Request a placement for the `index`-th modifier of `owner`, which
    /// sits at `band_line`.
    pub fn add(
        &mut self,
        owner: TickableRef,
        index: usize,
        modifier: &Modifier,
        band_line: f64,
        metrics: &dyn GlyphMetrics,
    ) -> LayoutResult<&mut Self> {
        let category = modifier.category();
        let rule = self.table.rule(category)?;
        let (width, height) = modifier.kind().size(metrics);
        self.entries.push(Entry {
            owner,
            index,
            category,
            order: rule.order,
            position: modifier.position().unwrap_or(rule.default_position),
            line: band_line,
            width,
            height,
            seq: self.entries.len(),
        });
        self.preformatted = false;
        Ok(self)
    }

    pub fn is_preformatted(&self) -> bool {
        self.preformatted
    }
    /// Resolved placements as (owner, modifier index, placement).
    pub fn placements(&self) -> &[(TickableRef, usize, ModifierPlacement)] {
        &self.placements
    }
    pub fn owner_layouts(
        &self,
    ) -> &BTreeMap<TickableRef, OwnerLayout> {
        &self.owners
    }
    pub fn owner_layout(&self, owner: &TickableRef) -> Option<&OwnerLayout> {
        self.owners.get(owner)
    }

    pub fn pre_format(&mut self) -> LayoutResult<()> {
        if self.preformatted {
            return Ok(());
        }
        self.placements.clear();
        self.owners = self
            .noteheads
            .keys()
            .chain(self.entries.iter().map(|e| &e.owner))
            .map(|owner| (*owner, OwnerLayout::default()))
            .collect();

        self.format_noteheads();
        let (left_base, right_base) = self.column_bases();
        let notes = self.notes_column();
        self.format_lateral(ModifierPosition::Left, left_base, 0.0)?;
        self.format_lateral(ModifierPosition::Right, right_base, notes)?;
        self.format_vertical()?;

        self.placements.sort_by_key(|(owner, index, _)| (*owner, *index));
        debug!(
            "modifier context: {} noteheads, {} modifiers placed",
            self.noteheads.len(),
            self.placements.len()
        );
        self.preformatted = true;
        Ok(())
    }

    fn x_shift(&self, owner: &TickableRef) -> f64 {
        self.owners.get(owner).map_or(0.0, |o| o.x_shift)
    }

    /// Push overlapping heads of lower voices to the right, upper entries
    /// staying put. Rests and headless glyphs never move.
    fn format_noteheads(&mut self) {
        let order: Vec<(TickableRef, NoteheadEntry)> = self
            .noteheads
            .iter()
            .filter(|(_, head)| head.collides())
            .map(|(owner, head)| (*owner, *head))
            .sorted_by(|(_, a), (_, b)| {
                let top = |h: &NoteheadEntry| h.lines.map_or(0.0, |l| l.1);
                top(b).total_cmp(&top(a))
            })
            .collect();
        let mut placed: Vec<(NoteheadEntry, f64)> = Vec::new();
        for (owner, head) in order {
            let Some((_, top)) = head.lines else { continue };
            let mut shift: f64 = 0.0;
            for (upper, upper_shift) in placed.iter() {
                let Some((upper_bottom, _)) = upper.lines else {
                    continue;
                };
                if upper_bottom - top < 1.0 {
                    let clear =
                        upper_shift + upper.right_edge() + self.head_padding;
                    shift = shift.max(clear);
                }
            }
            if shift > 0.0 {
                trace!(
                    "modifier context: {:?} displaced by {}",
                    owner,
                    shift
                );
            }
            if let Some(layout) = self.owners.get_mut(&owner) {
                layout.x_shift = shift;
            }
            placed.push((head, shift));
        }
    }

    /// Extent of the notehead column on both sides of the origin.
    fn column_bases(&self) -> (f64, f64) {
        let mut left: f64 = 0.0;
        let mut right: f64 = 0.0;
        for (owner, head) in self.noteheads.iter() {
            let shift = self.x_shift(owner);
            left = left.max(head.left_displaced_px - shift);
            right = right.max(shift + head.right_edge());
        }
        (left, right)
    }

    /// Right edge of the widest shifted head, where the tick context
    /// starts its right region.
    fn notes_column(&self) -> f64 {
        self.noteheads
            .iter()
            .map(|(owner, head)| self.x_shift(owner) + head.head_px)
            .fold(0.0, f64::max)
    }

    /// Lay out one side. `origin` is where the tick context starts to
    /// count the side's extent, measured from the notehead column origin.
    fn format_lateral(
        &mut self,
        side: ModifierPosition,
        base: f64,
        origin: f64,
    ) -> LayoutResult<()> {
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| e.position == side)
            .cloned()
            .sorted_by_key(|e| (e.order, e.seq))
            .collect();
        let mut shift = 0.0;
        for (category, group) in &entries.into_iter().group_by(|e| e.category)
        {
            let rule = *self.table.rule(category)?;
            let group: Vec<Entry> = group.collect();
            let mut columns: Vec<Vec<f64>> = Vec::new();
            let mut widths: Vec<f64> = Vec::new();
            let mut assigned = Vec::with_capacity(group.len());
            for entry in group.iter() {
                let free = columns.iter().position(|lines| {
                    lines
                        .iter()
                        .all(|l| (l - entry.line).abs() >= rule.band_lines)
                });
                let column = match free {
                    Some(column) => column,
                    None => {
                        columns.push(Vec::new());
                        widths.push(0.0);
                        columns.len() - 1
                    }
                };
                columns[column].push(entry.line);
                widths[column] = f64::max(widths[column], entry.width);
                assigned.push(column);
            }
            let inner: Vec<f64> = widths
                .iter()
                .scan(shift, |acc, width| {
                    let start = *acc + rule.spacing;
                    *acc = start + width;
                    Some(start)
                })
                .collect();
            for (entry, column) in group.iter().zip(assigned) {
                let owner_shift = self.x_shift(&entry.owner);
                let start = inner[column];
                let outer = start + widths[column];
                let dx = match side {
                    ModifierPosition::Left => {
                        -(base + start + entry.width) - owner_shift
                    }
                    _ => base + start - owner_shift,
                };
                self.placements.push((
                    entry.owner,
                    entry.index,
                    ModifierPlacement {
                        position: side,
                        column,
                        text_line: 0,
                        dx,
                        dy: (5.0 - entry.line) * self.line_spacing,
                    },
                ));
                let head = self
                    .noteheads
                    .get(&entry.owner)
                    .copied()
                    .unwrap_or_default();
                let displaced = match side {
                    ModifierPosition::Left => head.left_displaced_px,
                    _ => head.right_displaced_px,
                };
                let px = (base + outer - origin - displaced).max(0.0);
                if let Some(layout) = self.owners.get_mut(&entry.owner) {
                    let extent = match side {
                        ModifierPosition::Left => &mut layout.modifier_left_px,
                        _ => &mut layout.modifier_right_px,
                    };
                    *extent = extent.max(px);
                }
            }
            shift += widths.iter().map(|w| w + rule.spacing).sum::<f64>();
            trace!(
                "modifier context: {} {:?} in {} column(s), shift {}",
                category,
                side,
                columns.len(),
                shift
            );
        }
        Ok(())
    }

    /// One ABOVE and one BELOW stack for the whole context, closest
    /// category first. Both start outside the outermost head of any
    /// owner, so items of different voices never overlap.
    fn format_vertical(&mut self) -> LayoutResult<()> {
        let s = self.line_spacing;
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| !e.position.is_lateral())
            .cloned()
            .sorted_by_key(|e| (e.order, e.owner, e.seq))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }
        let (low, high) = self
            .noteheads
            .values()
            .filter_map(|head| head.lines)
            .fold(None, |acc: Option<(f64, f64)>, (low, high)| {
                Some(acc.map_or((low, high), |(l, h)| {
                    (l.min(low), h.max(high))
                }))
            })
            .unwrap_or((MIDDLE_LINE, MIDDLE_LINE));
        let above_base =
            f64::min(0.0, (5.0 - high) * s - s / 2.0) - self.text_padding;
        let below_base =
            f64::max(4.0 * s, (5.0 - low) * s + s / 2.0) + self.text_padding;
        let (mut above, mut below) = (0.0, 0.0);
        let (mut above_line, mut below_line) = (0, 0);
        for entry in entries {
            let head = self
                .noteheads
                .get(&entry.owner)
                .copied()
                .unwrap_or_default();
            let dx = (head.head_px - entry.width) / 2.0;
            let (dy, text_line) = match entry.position {
                ModifierPosition::Above => {
                    let dy = above_base - above - entry.height;
                    above += entry.height + self.text_padding;
                    above_line += 1;
                    (dy, above_line - 1)
                }
                _ => {
                    let dy = below_base + below;
                    below += entry.height + self.text_padding;
                    below_line += 1;
                    (dy, below_line - 1)
                }
            };
            self.placements.push((
                entry.owner,
                entry.index,
                ModifierPlacement {
                    position: entry.position,
                    column: 0,
                    text_line,
                    dx,
                    dy,
                },
            ));
        }
        trace!(
            "modifier context: {} above, {} below",
            above_line,
            below_line
        );
        Ok(())
    }

    /// Write x shifts, modifier extents and placements back into the
    /// owners.
    pub fn apply(&self, voices: &mut [Voice]) -> LayoutResult<()> {
        if !self.preformatted {
            return Err(LayoutError::NotFormatted(
                "modifier context was not pre-formatted".to_string(),
            ));
        }
        for (owner, layout) in self.owners.iter() {
            let tickable = Self::owner_mut(voices, owner)?;
            let state = tickable.state_mut();
            state.set_x_shift(layout.x_shift);
            state.set_modifier_px(
                layout.modifier_left_px,
                layout.modifier_right_px,
            );
        }
        for (owner, index, placement) in self.placements.iter() {
            let tickable = Self::owner_mut(voices, owner)?;
            let modifiers = tickable.state_mut().modifiers_mut();
            if let Some(modifier) = modifiers.get_mut(*index) {
                modifier.set_placement(Some(*placement));
            }
        }
        Ok(())
    }

    fn owner_mut<'v>(
        voices: &'v mut [Voice],
        owner: &TickableRef,
    ) -> LayoutResult<&'v mut Box<dyn Tickable>> {
        voices
            .get_mut(owner.voice)
            .and_then(|v| v.tickable_mut(owner.index))
            .ok_or_else(|| {
                LayoutError::NotFormatted(format!(
                    "no tickable at {:?}",
                    owner
                ))
            })
    }
}
