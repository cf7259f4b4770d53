//! Thread/channel navigation engine.
//!
//! Everything that decides "what entry is at screen line Y" lives here:
//! hierarchy construction, the drill stack, incremental filtering, the
//! virtual scroll window, and hit-testing. Rendering and input decoding
//! sit one layer above and consume the surfaces on
//! [`controller::NavController`].

pub mod channels;
pub mod controller;
pub mod drill;
pub mod entry;
pub mod filter;
pub mod hierarchy;
pub mod scroll;

use thiserror::Error;

/// Bounded error taxonomy for data-inconsistency conditions the engine
/// detects. None of these are fatal to the caller; they exist so that
/// corrupt ancestry surfaces as a value instead of an infinite loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("thread {id} appears in its own ancestor chain")]
    ParentCycle { id: String },
}
