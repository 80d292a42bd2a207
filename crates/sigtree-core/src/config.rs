#![forbid(unsafe_code)]

//! Dispatch configuration.
//!
//! Each emitter carries a [`DispatchConfig`]; the one on the *origin* node
//! governs a whole emission.
//!
//! # Re-entrant tree mutation
//!
//! Handlers may add, remove, or reparent nodes while a signal is being
//! delivered. [`WalkPolicy`] decides what the in-flight emission sees:
//!
//! - [`WalkPolicy::Live`]: each node's children are snapshotted when the
//!   descendant walk arrives at that node, and each node's parent is read
//!   after delivering to it. Edits to parts of the tree the walk has not
//!   reached yet are observed.
//! - [`WalkPolicy::Frozen`]: the whole route is captured before the first
//!   delivery. Edits made by handlers only affect later emissions.

/// How the delivery route reacts to tree edits made by handlers mid-emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkPolicy {
    /// Snapshot each level as the walk reaches it.
    #[default]
    Live,
    /// Capture the full route before delivering anything.
    Frozen,
}

/// Per-emitter dispatch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchConfig {
    /// Route capture policy.
    pub walk: WalkPolicy,
    /// Catch handler panics, log them, and keep delivering.
    ///
    /// When `false` a panicking handler unwinds through `emit` and the rest
    /// of the route is skipped.
    pub isolate_panics: bool,
}

impl DispatchConfig {
    /// Default configuration: live walk, panics propagate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            walk: WalkPolicy::Live,
            isolate_panics: false,
        }
    }

    /// Set the walk policy.
    #[must_use]
    pub const fn with_walk(mut self, walk: WalkPolicy) -> Self {
        self.walk = walk;
        self
    }

    /// Enable or disable handler panic isolation.
    #[must_use]
    pub const fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }
}
