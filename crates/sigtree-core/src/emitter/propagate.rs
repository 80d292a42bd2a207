#![forbid(unsafe_code)]

//! Signal delivery.
//!
//! # Algorithm
//!
//! 1. Build the [`Signal`] with the emitting node as origin.
//! 2. Deliver to the origin (always, whatever the feature).
//! 3. If the feature reaches ancestors, deliver to parent, grandparent, …
//!    up to the root.
//! 4. If the feature reaches descendants, deliver to every descendant of the
//!    origin in pre-order (a child, then its subtree, then its next sibling).
//!
//! The ancestor and descendant walks both start from the origin, so no node
//! receives the same emission twice.
//!
//! Delivery on a node snapshots the listener sequence for the signal kind,
//! offers the signal to each listener in registration order, then prunes
//! listeners whose uses ran out. Pruning happens in a drop guard so it also
//! runs when a handler unwinds.

use tracing::{debug, error, trace};

use super::Emitter;
use crate::config::{DispatchConfig, WalkPolicy};
use crate::error::HandlerPanic;
use crate::feature::Feature;
use crate::signal::Signal;

/// Outcome of one [`Emitter::emit`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Nodes the signal was delivered to, origin included.
    pub nodes: usize,
    /// Handler invocations.
    pub fired: usize,
    /// Handler panics caught under panic isolation.
    pub failures: Vec<HandlerPanic>,
}

impl Delivery {
    /// Whether no handler panicked.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Prunes exhausted listeners of one kind when dropped.
struct PruneGuard<'a> {
    emitter: &'a Emitter,
    kind: &'a str,
}

impl Drop for PruneGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.emitter.node.registry.try_borrow_mut() {
            registry.prune_spent(self.kind);
        }
    }
}

impl Emitter {
    /// Raise a signal of `kind` carrying `payload` on this node.
    ///
    /// Delivery is synchronous: every matching handler on the route has run
    /// when this returns. Handlers may re-enter the tree (emit, register,
    /// reparent); see [`WalkPolicy`] for how tree edits affect the route of
    /// the emission in flight.
    pub fn emit<T: 'static>(&self, kind: &str, payload: T, feature: Feature) -> Delivery {
        let config = self.config();
        let signal = Signal::new(kind, payload, self.clone(), feature);
        let mut delivery = Delivery::default();

        match config.walk {
            WalkPolicy::Live => {
                self.receive(&signal, config, &mut delivery);
                if feature.reaches_ancestors() {
                    let mut next = self.parent();
                    while let Some(node) = next {
                        node.receive(&signal, config, &mut delivery);
                        next = node.parent();
                    }
                }
                if feature.reaches_descendants() {
                    let mut pending = self.children();
                    pending.reverse();
                    while let Some(node) = pending.pop() {
                        node.receive(&signal, config, &mut delivery);
                        pending.extend(node.children().into_iter().rev());
                    }
                }
            }
            WalkPolicy::Frozen => {
                for node in self.route(feature) {
                    node.receive(&signal, config, &mut delivery);
                }
            }
        }

        debug!(
            origin = self.id(),
            kind,
            feature = %feature,
            nodes = delivery.nodes,
            fired = delivery.fired,
            failures = delivery.failures.len(),
            "signal emitted"
        );
        delivery
    }

    /// Every node an emission with `feature` from here would reach, in
    /// delivery order.
    #[must_use]
    pub fn route(&self, feature: Feature) -> Vec<Emitter> {
        let mut route = vec![self.clone()];
        if feature.reaches_ancestors() {
            route.extend(self.ancestors());
        }
        if feature.reaches_descendants() {
            let mut pending = self.children();
            pending.reverse();
            while let Some(node) = pending.pop() {
                pending.extend(node.children().into_iter().rev());
                route.push(node);
            }
        }
        route
    }

    fn receive<T: 'static>(
        &self,
        signal: &Signal<T>,
        config: DispatchConfig,
        delivery: &mut Delivery,
    ) {
        delivery.nodes += 1;
        let snapshot = self.node.registry.borrow().snapshot(signal.kind());
        let Some(listeners) = snapshot else {
            return;
        };
        let _prune = PruneGuard {
            emitter: self,
            kind: signal.kind(),
        };

        for listener in &listeners {
            let fired = if config.isolate_panics {
                match listener.handle_isolated(signal) {
                    Ok(fired) => fired,
                    Err(message) => {
                        error!(
                            emitter = self.id(),
                            kind = signal.kind(),
                            origin = signal.origin().id(),
                            message = %message,
                            "handler panicked"
                        );
                        delivery.failures.push(HandlerPanic {
                            kind: signal.kind().to_string(),
                            emitter: self.id(),
                            message,
                        });
                        true
                    }
                }
            } else {
                listener.handle(signal)
            };
            if fired {
                delivery.fired += 1;
                trace!(
                    emitter = self.id(),
                    kind = signal.kind(),
                    origin = signal.origin().id(),
                    feature = %signal.feature(),
                    "listener fired"
                );
            }
        }
    }
}
