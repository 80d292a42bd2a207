#![forbid(unsafe_code)]

//! Listener records and the values used to register them.
//!
//! # Identity
//!
//! A listener is identified on its owner by the tuple
//! `(kind, handler, context, catch feature)`. [`Handler`] and [`Context`]
//! compare by pointer identity, so clones of the same handler or context are
//! the same for registration and removal purposes.
//!
//! # Matching
//!
//! A listener fires for a signal iff it is active, its kind equals the
//! signal's kind, its handler was registered for the signal's payload type,
//! and at least one of these holds:
//!
//! 1. the listener's owner is the signal's origin;
//! 2. the listener catches [`Feature::Whole`];
//! 3. the listener catches anything but [`Feature::Exact`] and the signal is
//!    [`Feature::Whole`];
//! 4. the listener's catch feature equals the signal's feature.
//!
//! # Invariants
//!
//! 1. `Uses::Limited(0)` is only ever reached by consuming the last use.
//! 2. An inactive listener never fires again.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::emitter::{Emitter, Node};
use crate::feature::Feature;
use crate::signal::Signal;

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

type HandlerFn<T> = dyn Fn(&Signal<T>, &Context);

/// A signal callback.
///
/// Cloning a `Handler` yields the same handler: clones register, deduplicate,
/// and unregister as one.
pub struct Handler<T> {
    callback: Rc<HandlerFn<T>>,
}

impl<T: 'static> Handler<T> {
    /// Wrap a callback that ignores the listener context.
    pub fn new(callback: impl Fn(&Signal<T>) + 'static) -> Self {
        Self {
            callback: Rc::new(move |signal: &Signal<T>, _: &Context| callback(signal)),
        }
    }

    /// Wrap a callback that receives the context it was registered with.
    pub fn with_context(callback: impl Fn(&Signal<T>, &Context) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }
}

impl<T> Handler<T> {
    /// Whether both handles wrap the same callback.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    fn call(&self, signal: &Signal<T>, context: &Context) {
        (self.callback)(signal, context);
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.callback).cast::<()>())
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Opaque value handed back to a handler on every invocation.
///
/// The engine never inspects it; it only threads it through and uses its
/// pointer identity as part of the listener identity.
#[derive(Clone, Default)]
pub struct Context(Option<Rc<dyn Any>>);

impl Context {
    /// The empty context.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Allocate a new context holding `value`.
    pub fn new<C: Any>(value: C) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// Share an existing allocation as a context.
    pub fn from_rc<C: Any>(value: Rc<C>) -> Self {
        Self(Some(value))
    }

    /// Whether this is the empty context.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the context value if it has type `C`.
    #[must_use]
    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        self.0.as_deref()?.downcast_ref()
    }

    /// Identity comparison. Two empty contexts are equal.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("Context(none)"),
            Some(value) => write!(f, "Context({:p})", Rc::as_ptr(value).cast::<()>()),
        }
    }
}

// ---------------------------------------------------------------------------
// Uses / options
// ---------------------------------------------------------------------------

/// How many more times a listener may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uses {
    /// No limit.
    #[default]
    Unlimited,
    /// This many invocations remain; `Limited(0)` is inactive.
    Limited(u32),
}

impl Uses {
    /// Whether no invocations remain.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Limited(0))
    }

    const fn consumed(self) -> Self {
        match self {
            Self::Limited(n) => Self::Limited(n.saturating_sub(1)),
            Self::Unlimited => Self::Unlimited,
        }
    }
}

/// Registration options: context, use limit, and catch feature.
///
/// Defaults to no context, unlimited uses, and [`Feature::Exact`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenOptions {
    /// Value passed back to the handler.
    pub context: Context,
    /// Invocation budget.
    pub uses: Uses,
    /// Propagation mode the listener accepts.
    pub catch: Feature,
}

impl ListenOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Limit the listener to `n` invocations. `0` makes registration fail.
    #[must_use]
    pub fn with_uses(mut self, n: u32) -> Self {
        self.uses = Uses::Limited(n);
        self
    }

    /// Set the catch feature.
    #[must_use]
    pub fn with_catch(mut self, catch: Feature) -> Self {
        self.catch = catch;
        self
    }
}

impl From<Feature> for ListenOptions {
    fn from(catch: Feature) -> Self {
        Self::new().with_catch(catch)
    }
}

impl From<Context> for ListenOptions {
    fn from(context: Context) -> Self {
        Self::new().with_context(context)
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// A registration bound to one owning [`Emitter`].
///
/// Created only by the emitter registry; obtain snapshots through
/// [`Emitter::listeners`].
pub struct Listener {
    kind: String,
    /// Type-erased `Handler<T>`.
    handler: Rc<dyn Any>,
    owner: Weak<Node>,
    context: Context,
    remaining: Cell<Uses>,
    catch: Feature,
}

impl Listener {
    pub(crate) fn create<T: 'static>(
        kind: &str,
        handler: &Handler<T>,
        owner: &Emitter,
        options: ListenOptions,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            handler: Rc::new(handler.clone()),
            owner: owner.downgrade_node(),
            context: options.context,
            remaining: Cell::new(options.uses),
            catch: options.catch,
        }
    }

    /// Signal kind this listener matches.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Remaining invocation budget.
    #[must_use]
    pub fn remaining(&self) -> Uses {
        self.remaining.get()
    }

    /// Propagation mode this listener accepts.
    #[must_use]
    pub fn catch_feature(&self) -> Feature {
        self.catch
    }

    /// Context handed to the handler.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Whether the listener can still fire.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.remaining.get().is_exhausted()
    }

    /// The emitter that owns this listener, if it is still alive.
    #[must_use]
    pub fn owner(&self) -> Option<Emitter> {
        Emitter::upgrade_node(&self.owner)
    }

    /// Whether this listener was registered with `handler`.
    pub(crate) fn has_handler<T: 'static>(&self, handler: &Handler<T>) -> bool {
        self.handler
            .downcast_ref::<Handler<T>>()
            .is_some_and(|own| own.ptr_eq(handler))
    }

    /// Whether this listener is the registration `(handler, context, catch)`.
    pub(crate) fn is_registration<T: 'static>(
        &self,
        handler: &Handler<T>,
        context: &Context,
        catch: Feature,
    ) -> bool {
        self.catch == catch && self.context.ptr_eq(context) && self.has_handler(handler)
    }

    fn catches<T>(&self, signal: &Signal<T>) -> bool {
        let from_owner = std::ptr::eq(self.owner.as_ptr(), signal.origin().node_ptr());
        let catches_any = self.catch == Feature::Whole;
        let catches_whole_signal =
            self.catch != Feature::Exact && signal.feature() == Feature::Whole;
        let same_feature = self.catch == signal.feature();
        from_owner || catches_any || catches_whole_signal || same_feature
    }

    /// Resolve the typed handler if this listener should fire for `signal`.
    fn accept<T: 'static>(&self, signal: &Signal<T>) -> Option<&Handler<T>> {
        if !self.is_active() || self.kind != signal.kind() || !self.catches(signal) {
            return None;
        }
        self.handler.downcast_ref::<Handler<T>>()
    }

    fn consume(&self) {
        self.remaining.set(self.remaining.get().consumed());
    }

    /// Fire the handler if the listener matches. Panics propagate.
    pub(crate) fn handle<T: 'static>(&self, signal: &Signal<T>) -> bool {
        let Some(handler) = self.accept(signal) else {
            return false;
        };
        self.consume();
        handler.call(signal, &self.context);
        true
    }

    /// Like [`handle`](Self::handle), but a panicking handler is caught and
    /// its message returned as `Err`. The use is consumed either way.
    pub(crate) fn handle_isolated<T: 'static>(&self, signal: &Signal<T>) -> Result<bool, String> {
        let Some(handler) = self.accept(signal) else {
            return Ok(false);
        };
        self.consume();
        panic::catch_unwind(AssertUnwindSafe(|| handler.call(signal, &self.context)))
            .map(|()| true)
            .map_err(|payload| panic_message(payload.as_ref()))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("owner", &self.owner().map(|owner| owner.id()))
            .field("context", &self.context)
            .field("remaining", &self.remaining.get())
            .field("catch", &self.catch)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
