#![forbid(unsafe_code)]

//! Hierarchical signal propagation.
//!
//! Emitters form a tree. Any node can emit a [`Signal`]; its [`Feature`]
//! decides whether it stays on the origin, bubbles to the ancestors, sinks
//! to the descendants, or does both. Listeners registered on each node pick
//! which deliveries they accept.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use sigtree_core::{Emitter, Feature, Handler, Signal};
//!
//! let root = Emitter::new();
//! let leaf = Emitter::new();
//! root.add_child(&leaf);
//!
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! root.on(
//!     "Saved",
//!     &Handler::new(move |signal: &Signal<u32>| sink.set(*signal.payload())),
//!     Feature::Upward,
//! );
//!
//! leaf.emit("Saved", 42_u32, Feature::Upward);
//! assert_eq!(seen.get(), 42);
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod feature;
pub mod listener;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod signal;

pub use config::{DispatchConfig, WalkPolicy};
pub use emitter::{Ancestors, Delivery, Emitter, WeakEmitter};
#[cfg(feature = "tracing-json")]
pub use error::LoggingError;
pub use error::{HandlerPanic, ParseFeatureError, RegistrationError};
pub use feature::Feature;
pub use listener::{Context, Handler, ListenOptions, Listener, Uses};
pub use signal::Signal;
