//! chatnav — thread and channel navigation engine for a multi-agent
//! chat TUI.
//!
//! The crate keeps one always-consistent mapping between the logical,
//! filterable, drillable tree of navigation entries and the flat list of
//! screen lines a cursor or pointer can land on. Rendering, input
//! decoding, and persistence stay outside: the engine consumes plain
//! records through [`storage::Directory`] and exposes entry sequences,
//! visible windows, and hit-test results to whatever draws them.
//!
//! # Layout
//!
//! ```text
//!   Directory snapshot (threads, channels, flag sets)
//!        │
//!        ▼
//!   nav::hierarchy::build  ──  consults nav::drill::DrillStack
//!        │                     and supplementary search results
//!        ▼
//!   ordered Vec<Entry>
//!        │
//!        ├── nav::filter::FilterEngine   → active index list
//!        ├── nav::scroll::clamp_and_window → (offset, visible slice)
//!        └── nav::scroll::locate          → click/cursor resolution
//!
//!   nav::controller::NavController owns the mutable state and wires
//!   the pieces together per input event.
//! ```

pub mod model;
pub mod nav;
pub mod storage;

pub use model::types::{Channel, Thread};
pub use nav::NavError;
pub use nav::controller::{NavController, NavKey, Pane, ScrollDirection, ViewMode};
pub use nav::entry::{Entry, label_for};
pub use storage::{Directory, MemoryDirectory};
