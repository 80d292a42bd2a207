#![forbid(unsafe_code)]

//! Propagation modes ("features") shared by signals and listeners.
//!
//! A [`Feature`] on a [`Signal`](crate::Signal) decides which nodes the
//! signal is delivered to. The same vocabulary on a listener (its *catch
//! feature*) decides which of those deliveries it is willing to accept.
//!
//! | feature    | delivered to                                             |
//! |------------|----------------------------------------------------------|
//! | `exact`    | origin only                                              |
//! | `upward`   | origin, then parent → root                               |
//! | `downward` | origin, then every descendant in pre-order               |
//! | `whole`    | origin, then parent → root, then descendants (pre-order) |

use std::fmt;
use std::str::FromStr;

use crate::error::ParseFeatureError;

/// Propagation mode of a signal, or the mode a listener is willing to catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Feature {
    /// Delivered to the origin emitter only.
    #[default]
    Exact,
    /// Delivered to the origin, then each ancestor from parent to root.
    Upward,
    /// Delivered to the origin, then every descendant, pre-order depth-first.
    Downward,
    /// Delivered to the origin, its ancestors, then its descendants.
    Whole,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 4] = [
        Feature::Exact,
        Feature::Upward,
        Feature::Downward,
        Feature::Whole,
    ];

    /// Lowercase name used by `Display` and `FromStr`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Upward => "upward",
            Self::Downward => "downward",
            Self::Whole => "whole",
        }
    }

    /// Whether a signal with this feature walks the ancestor chain.
    #[inline]
    #[must_use]
    pub const fn reaches_ancestors(self) -> bool {
        matches!(self, Self::Upward | Self::Whole)
    }

    /// Whether a signal with this feature walks the descendant subtree.
    #[inline]
    #[must_use]
    pub const fn reaches_descendants(self) -> bool {
        matches!(self, Self::Downward | Self::Whole)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ParseFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| ParseFeatureError(s.to_string()))
    }
}
