#![forbid(unsafe_code)]

//! Per-node listener registry.

use std::rc::Rc;

use ahash::AHashMap;
use tracing::{trace, warn};

use super::Emitter;
use crate::error::RegistrationError;
use crate::listener::{Handler, ListenOptions, Listener};

/// Listener sequences keyed by signal kind.
///
/// A kind is never present with an empty sequence.
#[derive(Default)]
pub(crate) struct Registry {
    by_kind: AHashMap<String, Vec<Rc<Listener>>>,
}

impl Registry {
    pub(crate) fn total(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub(crate) fn count(&self, kind: &str) -> usize {
        self.by_kind.get(kind).map_or(0, Vec::len)
    }

    /// Copy of the sequence for `kind`, for iteration outside the borrow.
    pub(crate) fn snapshot(&self, kind: &str) -> Option<Vec<Rc<Listener>>> {
        self.by_kind.get(kind).cloned()
    }

    fn push(&mut self, listener: Rc<Listener>) {
        self.by_kind
            .entry(listener.kind().to_string())
            .or_default()
            .push(listener);
    }

    /// Drop every listener of `kind` for which `remove` holds.
    fn remove_where(&mut self, kind: &str, remove: impl Fn(&Listener) -> bool) -> usize {
        let Some(listeners) = self.by_kind.get_mut(kind) else {
            return 0;
        };
        let before = listeners.len();
        listeners.retain(|listener| !remove(listener));
        let removed = before - listeners.len();
        if listeners.is_empty() {
            self.by_kind.remove(kind);
        }
        removed
    }

    /// Remove exhausted listeners of `kind`.
    pub(crate) fn prune_spent(&mut self, kind: &str) -> usize {
        self.remove_where(kind, |listener| !listener.is_active())
    }

    fn remove_kind(&mut self, kind: &str) -> usize {
        self.by_kind.remove(kind).map_or(0, |listeners| listeners.len())
    }

    fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.by_kind.keys().cloned().collect();
        kinds.sort_unstable();
        kinds
    }

    fn clear(&mut self) -> usize {
        let total = self.total();
        self.by_kind.clear();
        total
    }
}

impl Emitter {
    /// Register `handler` for signals of `kind`, reporting why a registration
    /// was rejected.
    ///
    /// An existing registration with the same `(kind, handler, context,
    /// catch)` identity is replaced, so a node never holds two listeners with
    /// one identity.
    pub fn try_add_listener<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> Result<(), RegistrationError> {
        let options = options.into();
        if kind.is_empty() {
            warn!(emitter = self.id(), "rejected listener: empty kind");
            return Err(RegistrationError::EmptyKind);
        }
        if options.uses.is_exhausted() {
            warn!(emitter = self.id(), kind, "rejected listener: zero uses");
            return Err(RegistrationError::NoUses);
        }

        let listener = Rc::new(Listener::create(kind, handler, self, options));
        let mut registry = self.node.registry.borrow_mut();
        registry.remove_where(kind, |existing| {
            existing.is_registration(handler, listener.context(), listener.catch_feature())
        });
        trace!(
            emitter = self.id(),
            kind,
            catch = %listener.catch_feature(),
            remaining = ?listener.remaining(),
            "listener added"
        );
        registry.push(listener);
        Ok(())
    }

    /// Register `handler` for signals of `kind`.
    ///
    /// Returns `false` without changing anything if `kind` is empty or the
    /// options allow zero uses.
    pub fn add_listener<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> bool {
        self.try_add_listener(kind, handler, options).is_ok()
    }

    /// Alias of [`add_listener`](Self::add_listener).
    pub fn on<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> bool {
        self.add_listener(kind, handler, options)
    }

    /// [`add_listener`](Self::add_listener) limited to a single use.
    pub fn once<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> bool {
        self.add_listener(kind, handler, options.into().with_uses(1))
    }

    /// Remove the registration `(kind, handler, options.context,
    /// options.catch)`. `options.uses` is ignored.
    ///
    /// Returns whether anything was removed.
    pub fn remove_listener<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> bool {
        let options = options.into();
        let removed = self.node.registry.borrow_mut().remove_where(kind, |listener| {
            listener.is_registration(handler, &options.context, options.catch)
        });
        if removed > 0 {
            trace!(emitter = self.id(), kind, removed, "listener removed");
        }
        removed > 0
    }

    /// Alias of [`remove_listener`](Self::remove_listener).
    pub fn off<T: 'static>(
        &self,
        kind: &str,
        handler: &Handler<T>,
        options: impl Into<ListenOptions>,
    ) -> bool {
        self.remove_listener(kind, handler, options)
    }

    /// Remove every listener of `kind`, or every listener at all with `None`.
    pub fn remove_all_listeners(&self, kind: Option<&str>) {
        let mut registry = self.node.registry.borrow_mut();
        let removed = match kind {
            Some(kind) => registry.remove_kind(kind),
            None => registry.clear(),
        };
        if removed > 0 {
            trace!(emitter = self.id(), kind, removed, "listeners cleared");
        }
    }

    /// Number of listeners across all kinds.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.node.registry.borrow().total()
    }

    /// Number of listeners for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.node.registry.borrow().count(kind)
    }

    /// Whether any listener is registered for `kind`.
    #[must_use]
    pub fn has_listeners(&self, kind: &str) -> bool {
        self.listener_count(kind) > 0
    }

    /// Kinds with at least one listener, sorted.
    #[must_use]
    pub fn listener_kinds(&self) -> Vec<String> {
        self.node.registry.borrow().kinds()
    }

    /// Snapshot of the listeners registered for `kind`, in registration
    /// order.
    #[must_use]
    pub fn listeners(&self, kind: &str) -> Vec<Rc<Listener>> {
        self.node.registry.borrow().snapshot(kind).unwrap_or_default()
    }
}
