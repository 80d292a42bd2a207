#![forbid(unsafe_code)]

//! Parent/child maintenance.
//!
//! Every mutation goes through [`Emitter::set_parent`], [`Emitter::add_child`]
//! or [`Emitter::remove_child`]; each one fixes up the opposite side of the
//! link so the two views never disagree. Borrows of the children list are
//! released before calling into the other side.

use std::rc::Weak;

use tracing::{debug, warn};

use super::Emitter;

impl Emitter {
    // ── Parent ───────────────────────────────────────────────────────

    /// The parent node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Emitter> {
        Emitter::upgrade_node(&self.node.parent.borrow())
    }

    /// Re-link this node under `parent`, or detach it with `None`.
    ///
    /// Detaches from the previous parent first. Setting the current parent
    /// again is a no-op. Returns `false` when nothing changed, including when
    /// the new link would make the tree cyclic.
    pub fn set_parent(&self, parent: Option<&Emitter>) -> bool {
        let old = self.parent();
        if old.as_ref() == parent {
            return false;
        }
        if let Some(parent) = parent
            && !parent.can_adopt(self)
        {
            warn!(
                emitter = self.id(),
                parent = parent.id(),
                "rejected reparent: would create a cycle"
            );
            return false;
        }

        *self.node.parent.borrow_mut() = parent.map_or_else(Weak::new, Emitter::downgrade_node);
        if let Some(old) = &old {
            old.remove_child(self);
        }
        if let Some(parent) = parent {
            parent.add_child(self);
        }
        debug!(
            emitter = self.id(),
            from = old.as_ref().map(Emitter::id),
            to = parent.map(Emitter::id),
            "emitter reparented"
        );
        true
    }

    // ── Children ─────────────────────────────────────────────────────

    /// Snapshot of the children, in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<Emitter> {
        self.node.children.borrow().clone()
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.node.children.borrow().len()
    }

    /// Whether `child` is a direct child.
    #[must_use]
    pub fn has_child(&self, child: &Emitter) -> bool {
        self.node.children.borrow().contains(child)
    }

    /// Position of `child` among the children.
    #[must_use]
    pub fn child_index(&self, child: &Emitter) -> Option<usize> {
        self.node.children.borrow().iter().position(|c| c == child)
    }

    /// Append `child` and make this node its parent.
    ///
    /// Returns `false` if `child` is already a child, or if adopting it would
    /// make the tree cyclic (`child` is this node or one of its ancestors).
    pub fn add_child(&self, child: &Emitter) -> bool {
        if self.has_child(child) {
            return false;
        }
        if !self.can_adopt(child) {
            warn!(
                emitter = self.id(),
                child = child.id(),
                "rejected add_child: would create a cycle"
            );
            return false;
        }
        self.node.children.borrow_mut().push(child.clone());
        if child.parent().as_ref() != Some(self) {
            child.set_parent(Some(self));
        }
        true
    }

    /// [`add_child`](Self::add_child) for each node, in order.
    ///
    /// Duplicates in `children` collapse to the first occurrence.
    pub fn add_children<'a>(&self, children: impl IntoIterator<Item = &'a Emitter>) {
        for child in children {
            self.add_child(child);
        }
    }

    /// Unlink `child`. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Emitter) -> bool {
        let removed = {
            let mut children = self.node.children.borrow_mut();
            children
                .iter()
                .position(|c| c == child)
                .map(|index| children.remove(index))
        };
        let Some(removed) = removed else {
            return false;
        };
        if removed.parent().as_ref() == Some(self) {
            removed.set_parent(None);
        }
        true
    }

    /// [`remove_child`](Self::remove_child) for each node.
    pub fn remove_children<'a>(&self, children: impl IntoIterator<Item = &'a Emitter>) {
        for child in children {
            self.remove_child(child);
        }
    }

    /// Unlink every child. The children themselves are left intact.
    pub fn remove_all_children(&self) {
        for child in self.children() {
            self.remove_child(&child);
        }
    }

    // ── Ancestry ─────────────────────────────────────────────────────

    /// Iterator over the ancestors, from parent to root.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// The topmost ancestor, or this node if it has no parent.
    #[must_use]
    pub fn root(&self) -> Emitter {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Whether this node is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Emitter) -> bool {
        other.ancestors().any(|ancestor| ancestor == *self)
    }

    fn can_adopt(&self, child: &Emitter) -> bool {
        child != self && !child.is_ancestor_of(self)
    }
}

/// Ancestor chain iterator returned by [`Emitter::ancestors`].
///
/// Reads each parent link lazily, so it reflects edits made while iterating.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<Emitter>,
}

impl Iterator for Ancestors {
    type Item = Emitter;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
