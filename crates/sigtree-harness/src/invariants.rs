#![forbid(unsafe_code)]

//! Structural invariant checks.
//!
//! # Invariants
//!
//! 1. Every child of `n` has `n` as its parent.
//! 2. No node appears twice among one node's children.
//! 3. A walk from a root visits each node once (the tree is acyclic).
//! 4. Every registered kind has at least one listener.
//! 5. No listener is spent (pruning happened).
//! 6. Every listener is owned by the node it is registered on.

use std::collections::HashSet;

use sigtree_core::Emitter;
use thiserror::Error;

/// A broken invariant, with the ids of the nodes involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("node #{child} is a child of #{parent} but its parent is {found:?}")]
    ParentMismatch {
        parent: u64,
        child: u64,
        found: Option<u64>,
    },
    #[error("node #{node} has parent #{parent} but is not among its children")]
    MissingChild { parent: u64, node: u64 },
    #[error("node #{child} appears more than once under #{parent}")]
    DuplicateChild { parent: u64, child: u64 },
    #[error("node #{node} reached twice while walking the tree")]
    Revisited { node: u64 },
    #[error("node #{node} lists kind `{kind}` with no listeners")]
    EmptyKind { node: u64, kind: String },
    #[error("node #{node} keeps a spent listener for `{kind}`")]
    SpentListener { node: u64, kind: String },
    #[error("node #{node} holds a listener for `{kind}` owned elsewhere")]
    ForeignListener { node: u64, kind: String },
}

/// Check invariants 1–6 over `root` and all its descendants.
pub fn check_subtree(root: &Emitter) -> Result<(), Violation> {
    let mut seen = HashSet::new();
    let mut pending = vec![root.clone()];
    while let Some(node) = pending.pop() {
        if !seen.insert(node.id()) {
            return Err(Violation::Revisited { node: node.id() });
        }
        check_registry(&node)?;

        let children = node.children();
        let mut siblings = HashSet::new();
        for child in &children {
            if !siblings.insert(child.id()) {
                return Err(Violation::DuplicateChild {
                    parent: node.id(),
                    child: child.id(),
                });
            }
            if child.parent().as_ref() != Some(&node) {
                return Err(Violation::ParentMismatch {
                    parent: node.id(),
                    child: child.id(),
                    found: child.parent().map(|p| p.id()),
                });
            }
        }
        pending.extend(children);
    }
    Ok(())
}

/// Check the reverse direction of invariant 1 for each node in `nodes`: a
/// node with a parent is listed among that parent's children.
pub fn check_links(nodes: &[Emitter]) -> Result<(), Violation> {
    for node in nodes {
        if let Some(parent) = node.parent()
            && !parent.has_child(node)
        {
            return Err(Violation::MissingChild {
                parent: parent.id(),
                node: node.id(),
            });
        }
    }
    Ok(())
}

fn check_registry(node: &Emitter) -> Result<(), Violation> {
    for kind in node.listener_kinds() {
        let listeners = node.listeners(&kind);
        if listeners.is_empty() {
            return Err(Violation::EmptyKind {
                node: node.id(),
                kind,
            });
        }
        if listeners.iter().any(|l| !l.is_active()) {
            return Err(Violation::SpentListener {
                node: node.id(),
                kind,
            });
        }
        if listeners.iter().any(|l| l.owner().as_ref() != Some(node)) {
            return Err(Violation::ForeignListener {
                node: node.id(),
                kind,
            });
        }
    }
    Ok(())
}
