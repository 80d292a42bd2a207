#![forbid(unsafe_code)]

//! Error types.
//!
//! The engine has almost no hard failures: rejected registrations surface as
//! `false` from the `bool` API, and no-op removals are silent. The types here
//! exist for callers that want the reason ([`RegistrationError`]), for the
//! panic-isolation dispatch mode ([`HandlerPanic`]), and for parsing.

use thiserror::Error;

/// Why a listener registration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The signal kind was the empty string.
    #[error("listener kind must not be empty")]
    EmptyKind,
    /// The listener was given zero remaining uses.
    #[error("listener must allow at least one use")]
    NoUses,
}

/// A handler panic captured while dispatching with panic isolation enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler for `{kind}` panicked on emitter #{emitter}: {message}")]
pub struct HandlerPanic {
    /// Kind of the signal being delivered.
    pub kind: String,
    /// Id of the emitter whose listener panicked.
    pub emitter: u64,
    /// Panic message, if it was a string.
    pub message: String,
}

/// `Feature::from_str` received an unknown name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown propagation feature: {0:?}")]
pub struct ParseFeatureError(pub String);

/// Installing the logging subscriber failed.
#[cfg(feature = "tracing-json")]
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            RegistrationError::EmptyKind.to_string(),
            "listener kind must not be empty"
        );
        let panic = HandlerPanic {
            kind: "Ping".into(),
            emitter: 7,
            message: "boom".into(),
        };
        assert_eq!(
            panic.to_string(),
            "handler for `Ping` panicked on emitter #7: boom"
        );
        assert_eq!(
            ParseFeatureError("up".into()).to_string(),
            "unknown propagation feature: \"up\""
        );
    }
}
