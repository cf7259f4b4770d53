//! Navigation controller: the single owner of all mutable panel state.
//!
//! The controller holds the drill stack, both filter engines, and the
//! per-panel selection/scroll state for the lifetime of the active
//! channel, and resets them on channel switch and on collection
//! enter/exit. Entry sequences themselves are recomputed on demand and
//! never cached as authoritative state.

use tracing::{debug, warn};

use crate::model::types::Thread;
use crate::nav::NavError;
use crate::nav::channels::ChannelPanel;
use crate::nav::drill::DrillStack;
use crate::nav::entry::{Entry, MessageCollectionKind, ThreadCollectionKind};
use crate::nav::filter::FilterEngine;
use crate::nav::hierarchy::{self, display_path};
use crate::nav::scroll::{clamp_and_window, locate};
use crate::storage::Directory;

/// The two navigation panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Threads,
    Channels,
}

/// Semantic key events the controller consumes. Decoding raw terminal
/// input into these is the outer input layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Select,
    Back,
    FilterToggle,
    ToggleMuted,
    SwitchPane,
    Char(char),
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Which virtual collection the thread panel is viewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionView {
    Muted,
    OpenQuestions,
    StaleQuestions,
}

/// Drill-navigation state machine. `Drilled` and `Collection` are
/// mutually exclusive; entering one exits the other first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    TopLevel,
    Drilled,
    Collection(CollectionView),
}

/// Selection index plus scroll offset for one panel. The selection
/// indexes into the unfiltered entry sequence; the offset is measured in
/// visible-entry units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneState {
    pub selected: usize,
    pub offset: usize,
}

impl PaneState {
    fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }
}

/// Navigation controller for one chat window.
pub struct NavController<D: Directory> {
    dir: D,
    focus: Pane,
    view: ViewMode,
    drill: DrillStack,
    thread_pane: PaneState,
    thread_filter: FilterEngine,
    thread_viewport: usize,
    channel_panel: ChannelPanel,
    channel_viewport: usize,
    active_channel: Option<String>,
    search_results: Vec<Thread>,
    last_search_text: Option<String>,
}

impl<D: Directory> NavController<D> {
    pub fn new(dir: D) -> Self {
        Self {
            dir,
            focus: Pane::Threads,
            view: ViewMode::TopLevel,
            drill: DrillStack::new(),
            thread_pane: PaneState::default(),
            thread_filter: FilterEngine::new(),
            thread_viewport: 0,
            channel_panel: ChannelPanel::new(),
            channel_viewport: 0,
            active_channel: None,
            search_results: Vec::new(),
            last_search_text: None,
        }
    }

    pub fn directory(&self) -> &D {
        &self.dir
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn drill_depth(&self) -> usize {
        self.drill.depth()
    }

    pub fn thread_pane(&self) -> PaneState {
        self.thread_pane
    }

    pub fn channel_selected(&self) -> usize {
        self.channel_panel.selected
    }

    pub fn active_channel(&self) -> Option<&str> {
        self.active_channel.as_deref()
    }

    pub fn thread_filter(&self) -> &FilterEngine {
        &self.thread_filter
    }

    /// Switches the active channel and discards all thread-panel state:
    /// drill stack, filter, selection, scroll, supplementary results.
    pub fn set_active_channel(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!(channel = %id, "switching active channel");
        self.active_channel = Some(id);
        self.reset_thread_state();
    }

    fn reset_thread_state(&mut self) {
        self.drill.clear();
        self.view = ViewMode::TopLevel;
        self.thread_pane.reset();
        self.thread_filter.deactivate();
        self.search_results.clear();
        self.last_search_text = None;
    }

    // -----------------------------------------------------------------
    // Render surface
    // -----------------------------------------------------------------

    /// Current ordered entry sequence, post-drill. Pure recomputation;
    /// safe to call every render frame.
    pub fn entries(&self) -> Vec<Entry> {
        let threads = self.dir.threads();
        match self.view {
            ViewMode::Collection(CollectionView::Muted) => {
                hierarchy::muted_collection(&threads, &self.dir)
            }
            // Message-level collections change the message view, not the
            // thread listing.
            _ => hierarchy::build(&threads, &self.drill, &self.dir, &self.search_results),
        }
    }

    /// Ancestor display path of the current drill scope, root first.
    pub fn breadcrumb(&self) -> Result<Vec<String>, NavError> {
        match self.drill.top() {
            Some(id) => display_path(&self.dir.threads(), id),
            None => Ok(Vec::new()),
        }
    }

    /// Visible window of the thread panel: `(offset, entry indices)`.
    /// Persists the clamped offset and remembers the viewport height for
    /// scroll-wheel clamping.
    pub fn visible_thread_window(&mut self, viewport: usize) -> (usize, Vec<usize>) {
        self.thread_viewport = viewport;
        let entries = self.entries();
        let active = self.thread_filter.active_indices(entries.len());
        let (offset, slice) = clamp_and_window(
            &active,
            self.thread_pane.selected,
            viewport,
            self.thread_pane.offset,
            self.focus == Pane::Threads,
        );
        self.thread_pane.offset = offset;
        (offset, slice.to_vec())
    }

    /// Visible window of the channel panel: `(offset, channel indices)`.
    pub fn visible_channel_window(&mut self, viewport: usize) -> (usize, Vec<usize>) {
        self.channel_viewport = viewport;
        let count = self.dir.channels().len();
        self.channel_panel
            .visible_window(count, viewport, self.focus == Pane::Channels)
    }

    /// Screen lines above a panel's list content: one title line, plus
    /// the filter line while that panel is filtering.
    pub fn header_lines(&self, pane: Pane) -> usize {
        match pane {
            Pane::Threads => {
                if self.thread_filter.is_active() {
                    2
                } else {
                    1
                }
            }
            Pane::Channels => self.channel_panel.header_lines(),
        }
    }

    // -----------------------------------------------------------------
    // Input surface
    // -----------------------------------------------------------------

    /// Handles one semantic key event. Returns whether it was consumed.
    pub fn on_key(&mut self, key: NavKey) -> bool {
        match key {
            NavKey::SwitchPane => {
                self.focus = match self.focus {
                    Pane::Threads => Pane::Channels,
                    Pane::Channels => Pane::Threads,
                };
                true
            }
            _ => match self.focus {
                Pane::Threads => self.on_thread_key(key),
                Pane::Channels => self.on_channel_key(key),
            },
        }
    }

    /// Handles a pointer click at `screen_line`, zero-based from the
    /// panel's top edge. Returns whether the click selected an entry.
    pub fn on_click(&mut self, pane: Pane, screen_line: usize) -> bool {
        self.focus = pane;
        match pane {
            Pane::Threads => {
                let entries = self.entries();
                let active = self.thread_filter.active_indices(entries.len());
                let Some(idx) = locate(
                    screen_line,
                    self.header_lines(Pane::Threads),
                    &active,
                    self.thread_pane.offset,
                ) else {
                    return false;
                };
                // The line resolved, but separators and section headers
                // are not selectable.
                if !entries.get(idx).is_some_and(Entry::selectable) {
                    return false;
                }
                self.thread_pane.selected = idx;
                true
            }
            Pane::Channels => {
                let count = self.dir.channels().len();
                self.channel_panel.click(count, screen_line).is_some()
            }
        }
    }

    /// Handles one scroll-wheel notch. Returns whether it moved the
    /// window.
    pub fn on_scroll(&mut self, pane: Pane, direction: ScrollDirection) -> bool {
        let delta: isize = match direction {
            ScrollDirection::Up => -1,
            ScrollDirection::Down => 1,
        };
        match pane {
            Pane::Threads => {
                let entries = self.entries();
                let active = self.thread_filter.active_indices(entries.len());
                let before = self.thread_pane.offset;
                let wanted = before.saturating_add_signed(delta);
                let (offset, _) = clamp_and_window(
                    &active,
                    self.thread_pane.selected,
                    self.thread_viewport,
                    wanted,
                    false,
                );
                self.thread_pane.offset = offset;
                offset != before
            }
            Pane::Channels => {
                let count = self.dir.channels().len();
                let before = self.channel_panel.offset;
                self.channel_panel
                    .scroll_by(count, self.channel_viewport, delta);
                self.channel_panel.offset != before
            }
        }
    }

    // -----------------------------------------------------------------
    // Thread panel
    // -----------------------------------------------------------------

    fn on_thread_key(&mut self, key: NavKey) -> bool {
        match key {
            NavKey::Up => self.move_thread_selection(-1),
            NavKey::Down => self.move_thread_selection(1),
            NavKey::Select => self.select_thread_entry(),
            NavKey::Back => self.back(),
            NavKey::FilterToggle => {
                if self.thread_filter.is_active() {
                    self.deactivate_thread_filter();
                } else {
                    self.thread_filter.activate();
                    self.recompute_thread_filter();
                }
                true
            }
            NavKey::ToggleMuted => {
                self.toggle_collection(CollectionView::Muted);
                true
            }
            NavKey::Char(c) if self.thread_filter.is_active() => {
                self.thread_filter.push_char(c);
                self.recompute_thread_filter();
                true
            }
            NavKey::Backspace if self.thread_filter.is_active() => {
                self.thread_filter.backspace();
                self.recompute_thread_filter();
                true
            }
            _ => false,
        }
    }

    fn deactivate_thread_filter(&mut self) {
        self.thread_filter.deactivate();
        self.thread_pane.offset = 0;
        self.search_results.clear();
        self.last_search_text = None;
    }

    /// Recomputes the thread match list, issuing the supplementary
    /// storage query only when the filter text actually changed.
    fn recompute_thread_filter(&mut self) {
        if self.thread_filter.is_active() && !self.thread_filter.text().is_empty() {
            if self.last_search_text.as_deref() != Some(self.thread_filter.text()) {
                let text = self.thread_filter.text().to_string();
                self.search_results = match self.dir.search_threads(&text) {
                    Ok(hits) => hits
                        .into_iter()
                        .filter(|t| !self.dir.is_subscribed(&t.id))
                        .collect(),
                    Err(err) => {
                        // Degrade to local-only filtering.
                        warn!(error = %err, "supplementary thread search failed");
                        Vec::new()
                    }
                };
                self.last_search_text = Some(text);
            }
        } else {
            self.search_results.clear();
            self.last_search_text = None;
        }

        let entries = self.entries();
        self.thread_filter
            .recompute(entries.iter().map(Entry::filter_label));
        if let Some(matches) = self.thread_filter.matches()
            && !matches.is_empty()
            && !matches.contains(&self.thread_pane.selected)
        {
            self.thread_pane.selected = matches[0];
        }
    }

    fn move_thread_selection(&mut self, delta: isize) -> bool {
        let entries = self.entries();
        let active = self.thread_filter.active_indices(entries.len());
        let selectable: Vec<usize> = active
            .into_iter()
            .filter(|&i| entries[i].selectable())
            .collect();
        if selectable.is_empty() {
            return false;
        }
        let pos = selectable
            .iter()
            .position(|&i| i == self.thread_pane.selected)
            .unwrap_or(0);
        let next = pos
            .saturating_add_signed(delta)
            .min(selectable.len() - 1);
        self.thread_pane.selected = selectable[next];
        true
    }

    fn select_thread_entry(&mut self) -> bool {
        let entries = self.entries();
        let Some(entry) = entries.get(self.thread_pane.selected).cloned() else {
            return false;
        };
        match entry {
            Entry::Main => true,
            Entry::Thread(t) if t.back_link => self.back(),
            // Collapsed "other" lines are select-only even when the
            // thread has descendants.
            Entry::Thread(t) if t.has_children && !t.collapsed => self.drill_into(&t.thread.id),
            // Leaf select: the message view changes, the stack does not.
            Entry::Thread(_) => true,
            Entry::MessageCollection { kind, .. } => {
                let view = match kind {
                    MessageCollectionKind::OpenQuestions => CollectionView::OpenQuestions,
                    MessageCollectionKind::StaleQuestions => CollectionView::StaleQuestions,
                };
                self.enter_collection(view);
                true
            }
            Entry::ThreadCollection { kind, .. } => {
                match kind {
                    ThreadCollectionKind::Muted => self.enter_collection(CollectionView::Muted),
                }
                true
            }
            Entry::Separator { .. } | Entry::SectionHeader { .. } => false,
        }
    }

    fn drill_into(&mut self, id: &str) -> bool {
        if let ViewMode::Collection(_) = self.view {
            self.exit_collection();
        }
        debug!(thread = %id, depth = self.drill.depth() + 1, "drill in");
        self.drill.push(id);
        self.view = ViewMode::Drilled;
        self.thread_pane.reset();
        self.recompute_thread_filter();
        true
    }

    /// Drill-out / collection-exit / filter-dismiss, in that order of
    /// precedence matching how the panel layers visually.
    fn back(&mut self) -> bool {
        if self.thread_filter.is_active() {
            self.deactivate_thread_filter();
            return true;
        }
        if let ViewMode::Collection(_) = self.view {
            self.exit_collection();
            return true;
        }
        let Some(popped) = self.drill.pop() else {
            return false;
        };
        debug!(thread = %popped, depth = self.drill.depth(), "drill out");
        self.view = if self.drill.is_empty() {
            ViewMode::TopLevel
        } else {
            ViewMode::Drilled
        };
        self.thread_pane.offset = 0;
        // Return focus to the entry we drilled into.
        let entries = self.entries();
        self.thread_pane.selected = entries
            .iter()
            .position(|e| {
                e.as_thread()
                    .is_some_and(|t| !t.back_link && t.thread.id == popped)
            })
            .unwrap_or(0);
        true
    }

    fn enter_collection(&mut self, view: CollectionView) {
        debug!(?view, "entering collection view");
        // Collection and drilled states are mutually exclusive, and
        // entering a collection resets drill/filter/scroll state.
        self.reset_thread_state_keep_channel();
        self.view = ViewMode::Collection(view);
        self.snap_thread_selection_to_selectable();
    }

    fn exit_collection(&mut self) {
        debug!("leaving collection view");
        self.reset_thread_state_keep_channel();
        self.view = ViewMode::TopLevel;
    }

    fn toggle_collection(&mut self, view: CollectionView) {
        if self.view == ViewMode::Collection(view) {
            self.exit_collection();
        } else {
            self.enter_collection(view);
        }
    }

    fn reset_thread_state_keep_channel(&mut self) {
        self.drill.clear();
        self.view = ViewMode::TopLevel;
        self.thread_pane.reset();
        self.thread_filter.deactivate();
        self.search_results.clear();
        self.last_search_text = None;
    }

    /// Moves the selection forward to the nearest selectable entry, for
    /// sequences that open with a non-selectable caption.
    fn snap_thread_selection_to_selectable(&mut self) {
        let entries = self.entries();
        if entries
            .get(self.thread_pane.selected)
            .is_some_and(Entry::selectable)
        {
            return;
        }
        if let Some(idx) = entries
            .iter()
            .enumerate()
            .skip(self.thread_pane.selected)
            .find_map(|(i, e)| e.selectable().then_some(i))
        {
            self.thread_pane.selected = idx;
        }
    }

    // -----------------------------------------------------------------
    // Channel panel
    // -----------------------------------------------------------------

    fn on_channel_key(&mut self, key: NavKey) -> bool {
        let channels = self.dir.channels();
        match key {
            NavKey::Up => {
                self.channel_panel.move_selection(channels.len(), -1);
                true
            }
            NavKey::Down => {
                self.channel_panel.move_selection(channels.len(), 1);
                true
            }
            NavKey::Select => {
                let Some(channel) = channels.get(self.channel_panel.selected) else {
                    return false;
                };
                let id = channel.id.clone();
                self.set_active_channel(id);
                true
            }
            NavKey::Back | NavKey::FilterToggle if self.channel_panel.filter.is_active() => {
                self.channel_panel.filter.deactivate();
                self.channel_panel.offset = 0;
                true
            }
            NavKey::FilterToggle => {
                self.channel_panel.filter.activate();
                self.channel_panel.recompute(&channels);
                true
            }
            NavKey::Char(c) if self.channel_panel.filter.is_active() => {
                self.channel_panel.filter.push_char(c);
                self.channel_panel.recompute(&channels);
                true
            }
            NavKey::Backspace if self.channel_panel.filter.is_active() => {
                self.channel_panel.filter.backspace();
                self.channel_panel.recompute(&channels);
                true
            }
            _ => false,
        }
    }
}
