#![forbid(unsafe_code)]

//! Recording handlers.
//!
//! A [`Probe`] owns one [`Handler`] and records every invocation of it. Since
//! handler identity is pointer identity, registering `probe.handler()` twice
//! on one node with the same options is deduplicated, and the same probe can
//! be unregistered later.

use std::cell::RefCell;
use std::rc::Rc;

use sigtree_core::{Context, Feature, Handler, Signal};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Hit<T> {
    pub kind: String,
    pub payload: T,
    /// Id of the emitting node.
    pub origin: u64,
    pub feature: Feature,
    pub context: Context,
}

/// A handler that records what it receives.
pub struct Probe<T> {
    handler: Handler<T>,
    hits: Rc<RefCell<Vec<Hit<T>>>>,
}

impl<T: Clone + 'static> Probe<T> {
    #[must_use]
    pub fn new() -> Self {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        let handler = Handler::with_context(move |signal: &Signal<T>, context: &Context| {
            sink.borrow_mut().push(Hit {
                kind: signal.kind().to_string(),
                payload: signal.payload().clone(),
                origin: signal.origin().id(),
                feature: signal.feature(),
                context: context.clone(),
            });
        });
        Self { handler, hits }
    }

    /// The recording handler.
    #[must_use]
    pub fn handler(&self) -> &Handler<T> {
        &self.handler
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.borrow().len()
    }

    /// Payloads in invocation order.
    #[must_use]
    pub fn payloads(&self) -> Vec<T> {
        self.hits.borrow().iter().map(|hit| hit.payload.clone()).collect()
    }

    /// Origin ids in invocation order.
    #[must_use]
    pub fn origins(&self) -> Vec<u64> {
        self.hits.borrow().iter().map(|hit| hit.origin).collect()
    }

    #[must_use]
    pub fn hits(&self) -> Vec<Hit<T>> {
        self.hits.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Hit<T>> {
        self.hits.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.hits.borrow_mut().clear();
    }
}

impl<T: Clone + 'static> Default for Probe<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigtree_core::{Emitter, ListenOptions};

    #[test]
    fn records_invocations() {
        let node = Emitter::new();
        let probe = Probe::<u8>::new();
        let ctx = Context::new("ctx");
        node.on("K", probe.handler(), ctx.clone());
        node.emit("K", 3_u8, Feature::Exact);
        node.emit("K", 4_u8, Feature::Upward);

        assert_eq!(probe.count(), 2);
        assert_eq!(probe.payloads(), vec![3, 4]);
        assert_eq!(probe.origins(), vec![node.id(), node.id()]);
        let last = probe.last().expect("two hits");
        assert_eq!(last.feature, Feature::Upward);
        assert_eq!(last.kind, "K");
        assert_eq!(last.context, ctx);

        probe.clear();
        assert_eq!(probe.count(), 0);
    }

    #[test]
    fn handler_identity_is_stable() {
        let node = Emitter::new();
        let probe = Probe::<()>::new();
        node.on("K", probe.handler(), ListenOptions::new());
        node.on("K", probe.handler(), ListenOptions::new());
        assert_eq!(node.total_listeners(), 1);
        assert!(node.off("K", probe.handler(), ListenOptions::new()));
    }
}
