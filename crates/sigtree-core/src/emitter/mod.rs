#![forbid(unsafe_code)]

//! Emitter trees.
//!
//! An [`Emitter`] is a cheap, cloneable handle to a tree node. Each node holds
//! strong handles to its children, a `Weak` back-reference to its parent, and
//! a per-kind registry of [`Listener`](crate::Listener)s.
//!
//! # Architecture
//!
//! Nodes use `Rc` + `RefCell` for single-threaded shared ownership. No
//! `RefCell` borrow is held while a handler runs, so handlers may freely emit,
//! register or remove listeners, and edit the tree.
//!
//! # Invariants
//!
//! 1. `e.parent() == Some(p)` iff `p.children()` contains `e`.
//! 2. A node appears at most once among any node's children.
//! 3. The tree is acyclic: a node never adopts itself or one of its
//!    ancestors.
//! 4. No registry kind maps to an empty listener sequence.
//! 5. A listener whose uses reach zero is removed before the `receive` that
//!    exhausted it returns, even if a handler unwinds.
//!
//! # Ownership
//!
//! Dropping the last external handle to a root releases its whole subtree.
//! Listeners and [`WeakEmitter`] refer to nodes weakly.

mod propagate;
mod registry;
mod tree;

pub use propagate::Delivery;
pub use tree::Ancestors;

pub(crate) use registry::Registry;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::config::DispatchConfig;

// ─── Emitter ID generation ──────────────────────────────────────────────────

static NEXT_EMITTER_ID: AtomicU64 = AtomicU64::new(1);

fn next_emitter_id() -> u64 {
    NEXT_EMITTER_ID.fetch_add(1, Ordering::Relaxed)
}

// ─── Node ───────────────────────────────────────────────────────────────────

/// Shared interior of an [`Emitter`].
pub(crate) struct Node {
    id: u64,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Emitter>>,
    registry: RefCell<Registry>,
    config: Cell<DispatchConfig>,
}

// ─── Emitter ────────────────────────────────────────────────────────────────

/// Handle to a node in a signal tree.
///
/// Cloning creates a new handle to the **same** node. Equality and hashing
/// follow node identity.
#[derive(Clone)]
pub struct Emitter {
    node: Rc<Node>,
}

impl Emitter {
    /// Create an isolated node: no parent, no children, no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Create an isolated node with the given dispatch configuration.
    #[must_use]
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            node: Rc::new(Node {
                id: next_emitter_id(),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                registry: RefCell::new(Registry::default()),
                config: Cell::new(config),
            }),
        }
    }

    /// Process-unique identifier, for logs and diagnostics.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.node.id
    }

    /// Dispatch configuration used when this node is the origin.
    #[must_use]
    pub fn config(&self) -> DispatchConfig {
        self.node.config.get()
    }

    /// Replace the dispatch configuration.
    pub fn set_config(&self, config: DispatchConfig) {
        self.node.config.set(config);
    }

    /// Non-owning handle to this node.
    #[must_use]
    pub fn downgrade(&self) -> WeakEmitter {
        WeakEmitter {
            node: self.downgrade_node(),
        }
    }

    /// Detach from the parent, unlink every child, and drop every listener.
    ///
    /// Children are not destroyed. The node stays usable afterwards.
    pub fn destroy(&self) {
        self.set_parent(None);
        self.remove_all_children();
        self.remove_all_listeners(None);
        debug!(emitter = self.id(), "emitter destroyed");
    }

    pub(crate) fn downgrade_node(&self) -> Weak<Node> {
        Rc::downgrade(&self.node)
    }

    pub(crate) fn upgrade_node(node: &Weak<Node>) -> Option<Self> {
        node.upgrade().map(|node| Self { node })
    }

    pub(crate) fn node_ptr(&self) -> *const Node {
        Rc::as_ptr(&self.node)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Emitter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Emitter {}

impl Hash for Emitter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.id.hash(state);
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<u64> = self.node.children.borrow().iter().map(Emitter::id).collect();
        f.debug_struct("Emitter")
            .field("id", &self.id())
            .field("parent", &self.parent().map(|parent| parent.id()))
            .field("children", &children)
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

// ─── WeakEmitter ────────────────────────────────────────────────────────────

/// Non-owning handle to an [`Emitter`].
///
/// Handlers that need to refer back to nodes should capture one of these to
/// avoid reference cycles through the listener registry.
#[derive(Clone, Default)]
pub struct WeakEmitter {
    node: Weak<Node>,
}

impl WeakEmitter {
    /// The node, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Emitter> {
        Emitter::upgrade_node(&self.node)
    }
}

impl fmt::Debug for WeakEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(emitter) => write!(f, "WeakEmitter({})", emitter.id()),
            None => f.write_str("WeakEmitter(dropped)"),
        }
    }
}
