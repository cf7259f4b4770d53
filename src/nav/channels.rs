//! Channel panel: the flat, non-hierarchical sibling of the thread
//! panel. Filter, scroll, and hit-test only — no drill stack.

use crate::model::types::Channel;
use crate::nav::filter::FilterEngine;
use crate::nav::scroll::{clamp_and_window, locate};

/// Mutable panel state for the channel list. Channel records themselves
/// are passed in per call; the panel never caches them.
#[derive(Debug, Default)]
pub struct ChannelPanel {
    pub filter: FilterEngine,
    pub selected: usize,
    pub offset: usize,
}

impl ChannelPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.filter.deactivate();
        self.selected = 0;
        self.offset = 0;
    }

    /// Recomputes the match list and snaps the selection to the first
    /// match unless the currently selected channel still matches.
    pub fn recompute(&mut self, channels: &[Channel]) {
        self.filter
            .recompute(channels.iter().map(|c| Some(c.label())));
        if let Some(matches) = self.filter.matches()
            && !matches.is_empty()
            && !matches.contains(&self.selected)
        {
            self.selected = matches[0];
        }
    }

    /// Indices into `channels` the window and hit tester operate on.
    pub fn active_indices(&self, channel_count: usize) -> Vec<usize> {
        self.filter.active_indices(channel_count)
    }

    /// Moves the selection by `delta` steps through the active list.
    pub fn move_selection(&mut self, channel_count: usize, delta: isize) {
        let active = self.active_indices(channel_count);
        if active.is_empty() {
            return;
        }
        let pos = active
            .iter()
            .position(|&i| i == self.selected)
            .unwrap_or(0);
        let next = pos.saturating_add_signed(delta).min(active.len() - 1);
        self.selected = active[next];
    }

    /// Computes the visible window, persisting the clamped offset.
    pub fn visible_window(
        &mut self,
        channel_count: usize,
        viewport: usize,
        focused: bool,
    ) -> (usize, Vec<usize>) {
        let active = self.active_indices(channel_count);
        let (offset, slice) =
            clamp_and_window(&active, self.selected, viewport, self.offset, focused);
        self.offset = offset;
        (offset, slice.to_vec())
    }

    /// Number of screen lines above the list content: one title line,
    /// plus the filter line while filtering.
    pub fn header_lines(&self) -> usize {
        if self.filter.is_active() { 2 } else { 1 }
    }

    /// Resolves a clicked screen line to a channel index and moves the
    /// selection there. Returns the channel index when the click landed
    /// on a row.
    pub fn click(&mut self, channel_count: usize, screen_line: usize) -> Option<usize> {
        let active = self.active_indices(channel_count);
        let idx = locate(screen_line, self.header_lines(), &active, self.offset)?;
        self.selected = idx;
        Some(idx)
    }

    /// Scrolls by one visible-entry unit without moving the selection.
    pub fn scroll_by(&mut self, channel_count: usize, viewport: usize, delta: isize) {
        let active = self.active_indices(channel_count);
        let wanted = self.offset.saturating_add_signed(delta);
        let (offset, _) = clamp_and_window(&active, self.selected, viewport, wanted, false);
        self.offset = offset;
    }
}
