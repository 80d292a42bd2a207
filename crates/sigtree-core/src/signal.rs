#![forbid(unsafe_code)]

//! Immutable event records.

use std::fmt;

use crate::emitter::Emitter;
use crate::feature::Feature;

/// An event raised by an [`Emitter`].
///
/// Signals are only built by [`Emitter::emit`], which binds the emitting node
/// as [`origin`](Signal::origin). There is no public constructor, so a
/// signal's origin can always be trusted.
pub struct Signal<T> {
    kind: String,
    payload: T,
    origin: Emitter,
    feature: Feature,
}

impl<T> Signal<T> {
    pub(crate) fn new(kind: &str, payload: T, origin: Emitter, feature: Feature) -> Self {
        Self {
            kind: kind.to_string(),
            payload,
            origin,
            feature,
        }
    }

    /// The signal kind listeners are matched against.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The data carried by the signal.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The emitter `emit` was called on.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Emitter {
        &self.origin
    }

    /// Propagation mode chosen at emit time.
    #[inline]
    #[must_use]
    pub fn feature(&self) -> Feature {
        self.feature
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .field("origin", &self.origin.id())
            .field("feature", &self.feature)
            .finish()
    }
}
