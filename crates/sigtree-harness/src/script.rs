#![forbid(unsafe_code)]

//! Scripted operation sequences over a fixed pool of emitters.
//!
//! Used by property tests and the fuzzer to drive arbitrary interleavings of
//! tree edits, registrations, and emissions, then check the structural
//! invariants afterwards. Indices in an [`Op`] are taken modulo the pool
//! size, so every op is applicable.

use tracing::trace;

use sigtree_core::{Delivery, Emitter, Feature, Handler, ListenOptions, Signal};

use crate::invariants::{self, Violation};
use crate::probe::Probe;

/// Signal kinds scripts draw from.
pub const KINDS: [&str; 3] = ["Alpha", "Beta", "Gamma"];

/// Number of distinct handlers scripts register.
pub const HANDLERS: usize = 3;

/// One scripted operation. Fields are raw indices into the node pool,
/// [`KINDS`], the handler pool, and [`Feature::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Op {
    AddChild { parent: u8, child: u8 },
    RemoveChild { parent: u8, child: u8 },
    SetParent { node: u8, parent: Option<u8> },
    RemoveAllChildren { node: u8 },
    Listen {
        node: u8,
        kind: u8,
        handler: u8,
        catch: u8,
        /// `0` means unlimited.
        uses: u8,
    },
    Unlisten {
        node: u8,
        kind: u8,
        handler: u8,
        catch: u8,
    },
    ClearListeners { node: u8, kind: Option<u8> },
    /// Register a single-use listener on `node` that detaches `target` from
    /// its parent when fired.
    Detacher { node: u8, kind: u8, target: u8 },
    Emit { node: u8, kind: u8, feature: u8 },
    Destroy { node: u8 },
}

/// A pool of emitters plus the handlers scripts register on them.
pub struct Script {
    nodes: Vec<Emitter>,
    probes: Vec<Probe<u32>>,
    emitted: u32,
}

impl Script {
    /// A pool of `size` isolated emitters (at least one).
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            nodes: (0..size.max(1)).map(|_| Emitter::new()).collect(),
            probes: (0..HANDLERS).map(|_| Probe::new()).collect(),
            emitted: 0,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Emitter] {
        &self.nodes
    }

    #[must_use]
    pub fn probes(&self) -> &[Probe<u32>] {
        &self.probes
    }

    fn node(&self, index: u8) -> &Emitter {
        &self.nodes[usize::from(index) % self.nodes.len()]
    }

    fn handler(&self, index: u8) -> &Handler<u32> {
        self.probes[usize::from(index) % self.probes.len()].handler()
    }

    fn kind(index: u8) -> &'static str {
        KINDS[usize::from(index) % KINDS.len()]
    }

    fn feature(index: u8) -> Feature {
        Feature::ALL[usize::from(index) % Feature::ALL.len()]
    }

    fn options(catch: u8, uses: u8) -> ListenOptions {
        let options = ListenOptions::new().with_catch(Self::feature(catch));
        if uses == 0 {
            options
        } else {
            options.with_uses(u32::from(uses))
        }
    }

    /// Apply one op. Returns the delivery report for [`Op::Emit`].
    pub fn apply(&mut self, op: Op) -> Option<Delivery> {
        trace!(?op, "apply");
        match op {
            Op::AddChild { parent, child } => {
                self.node(parent).add_child(self.node(child));
            }
            Op::RemoveChild { parent, child } => {
                self.node(parent).remove_child(self.node(child));
            }
            Op::SetParent { node, parent } => {
                let parent = parent.map(|p| self.node(p).clone());
                self.node(node).set_parent(parent.as_ref());
            }
            Op::RemoveAllChildren { node } => self.node(node).remove_all_children(),
            Op::Listen {
                node,
                kind,
                handler,
                catch,
                uses,
            } => {
                self.node(node)
                    .on(Self::kind(kind), self.handler(handler), Self::options(catch, uses));
            }
            Op::Unlisten {
                node,
                kind,
                handler,
                catch,
            } => {
                self.node(node)
                    .off(Self::kind(kind), self.handler(handler), Self::feature(catch));
            }
            Op::ClearListeners { node, kind } => {
                self.node(node).remove_all_listeners(kind.map(Self::kind));
            }
            Op::Detacher { node, kind, target } => {
                let target = self.node(target).downgrade();
                let detach = Handler::new(move |_: &Signal<u32>| {
                    if let Some(target) = target.upgrade() {
                        target.set_parent(None);
                    }
                });
                self.node(node)
                    .once(Self::kind(kind), &detach, Feature::Whole);
            }
            Op::Emit {
                node,
                kind,
                feature,
            } => {
                self.emitted += 1;
                let payload = self.emitted;
                return Some(self.node(node).emit(Self::kind(kind), payload, Self::feature(feature)));
            }
            Op::Destroy { node } => self.node(node).destroy(),
        }
        None
    }

    /// Apply every op in order.
    pub fn run(&mut self, ops: impl IntoIterator<Item = Op>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Check every invariant over the whole pool.
    pub fn check(&self) -> Result<(), Violation> {
        invariants::check_links(&self.nodes)?;
        for root in self.nodes.iter().filter(|n| n.parent().is_none()) {
            invariants::check_subtree(root)?;
        }
        Ok(())
    }
}
