#![forbid(unsafe_code)]

//! Prebuilt emitter trees.

use sigtree_core::Emitter;

/// Linear chain of `len` nodes, root first. Each node is the parent of the
/// next.
#[must_use]
pub fn chain(len: usize) -> Vec<Emitter> {
    let nodes: Vec<Emitter> = (0..len).map(|_| Emitter::new()).collect();
    for pair in nodes.windows(2) {
        pair[0].add_child(&pair[1]);
    }
    nodes
}

/// Complete tree with `fanout` children per node and `depth` levels below the
/// root, in breadth-first order (root first).
#[must_use]
pub fn balanced(fanout: usize, depth: usize) -> Vec<Emitter> {
    let mut nodes = vec![Emitter::new()];
    let mut level_start = 0;
    for _ in 0..depth {
        let level_end = nodes.len();
        for parent in level_start..level_end {
            for _ in 0..fanout {
                let child = Emitter::new();
                nodes[parent].add_child(&child);
                nodes.push(child);
            }
        }
        level_start = level_end;
    }
    nodes
}

/// Three generations: `parent → current → children`.
#[derive(Debug, Clone)]
pub struct Family {
    pub parent: Emitter,
    pub current: Emitter,
    pub children: Vec<Emitter>,
}

/// A [`Family`] where `current` has `children` children.
#[must_use]
pub fn family(children: usize) -> Family {
    let parent = Emitter::new();
    let current = Emitter::new();
    current.set_parent(Some(&parent));
    let children: Vec<Emitter> = (0..children).map(|_| Emitter::new()).collect();
    current.add_children(&children);
    Family {
        parent,
        current,
        children,
    }
}
