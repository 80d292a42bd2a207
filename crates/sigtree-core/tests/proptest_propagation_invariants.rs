//! Property-based invariant tests for signal routing and listener budgets.
//!
//! 1. Exact delivers to the origin only.
//! 2. Upward delivers to the origin and exactly its ancestors, nearest first.
//! 3. Downward delivers to the origin and exactly its descendants, pre-order.
//! 4. Whole is the origin, then the upward part, then the downward part.
//! 5. No node receives one emission twice.
//! 6. Live and frozen walks agree when no handler edits the tree.
//! 7. A listener with `n` uses fires `min(n, k)` times over `k` emissions and
//!    is gone once spent.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use proptest::sample::Index;
use sigtree_core::{DispatchConfig, Emitter, Feature, Handler, ListenOptions, Signal, WalkPolicy};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Random tree: node `i > 0` hangs under a node with a smaller index.
fn tree_strategy() -> impl Strategy<Value = Vec<Index>> {
    proptest::collection::vec(any::<Index>(), 0..40)
}

fn build(parents: &[Index]) -> Vec<Emitter> {
    let nodes: Vec<Emitter> = (0..=parents.len()).map(|_| Emitter::new()).collect();
    for (i, parent) in parents.iter().enumerate() {
        let child = i + 1;
        nodes[parent.index(child)].add_child(&nodes[child]);
    }
    nodes
}

fn feature_strategy() -> impl Strategy<Value = Feature> {
    prop_oneof![
        Just(Feature::Exact),
        Just(Feature::Upward),
        Just(Feature::Downward),
        Just(Feature::Whole),
    ]
}

fn descendants(node: &Emitter) -> Vec<Emitter> {
    let mut out = Vec::new();
    for child in node.children() {
        out.push(child.clone());
        out.extend(descendants(&child));
    }
    out
}

/// Register a whole-catching recorder on every node; returns the delivery log
/// as node ids.
fn record_all(nodes: &[Emitter]) -> Rc<RefCell<Vec<u64>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for node in nodes {
        let sink = Rc::clone(&log);
        let id = node.id();
        node.on(
            "Probe",
            &Handler::new(move |_: &Signal<()>| sink.borrow_mut().push(id)),
            Feature::Whole,
        );
    }
    log
}

// ═════════════════════════════════════════════════════════════════════════
// 1–5. Delivery sets
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn delivery_follows_feature(
        parents in tree_strategy(),
        origin in any::<Index>(),
        feature in feature_strategy(),
    ) {
        let nodes = build(&parents);
        let origin = &nodes[origin.index(nodes.len())];
        let log = record_all(&nodes);

        let delivery = origin.emit("Probe", (), feature);

        let mut expected = vec![origin.id()];
        if matches!(feature, Feature::Upward | Feature::Whole) {
            expected.extend(origin.ancestors().map(|e| e.id()));
        }
        if matches!(feature, Feature::Downward | Feature::Whole) {
            expected.extend(descendants(origin).iter().map(Emitter::id));
        }

        let seen = log.borrow().clone();
        prop_assert_eq!(&seen, &expected);
        prop_assert_eq!(delivery.nodes, expected.len());
        prop_assert_eq!(delivery.fired, expected.len());
        let unique: HashSet<u64> = seen.iter().copied().collect();
        prop_assert_eq!(unique.len(), seen.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Live and frozen agree on a static tree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn walk_policies_agree_without_edits(
        parents in tree_strategy(),
        origin in any::<Index>(),
        feature in feature_strategy(),
    ) {
        let nodes = build(&parents);
        let origin = &nodes[origin.index(nodes.len())];
        let log = record_all(&nodes);

        origin.emit("Probe", (), feature);
        let live = std::mem::take(&mut *log.borrow_mut());

        origin.set_config(DispatchConfig::new().with_walk(WalkPolicy::Frozen));
        origin.emit("Probe", (), feature);
        let frozen = log.borrow().clone();

        prop_assert_eq!(&live, &frozen);
        let route: Vec<u64> = origin.route(feature).iter().map(Emitter::id).collect();
        prop_assert_eq!(live, route);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Finite listeners
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn finite_listener_budget(uses in 1u32..6, emissions in 0usize..10) {
        let node = Emitter::new();
        let fired = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&fired);
        node.on(
            "Tick",
            &Handler::new(move |_: &Signal<()>| *sink.borrow_mut() += 1),
            ListenOptions::new().with_uses(uses),
        );

        for _ in 0..emissions {
            node.emit("Tick", (), Feature::Exact);
        }

        let expected = emissions.min(uses as usize);
        prop_assert_eq!(*fired.borrow(), expected);
        prop_assert_eq!(node.has_listeners("Tick"), emissions < uses as usize);
    }
}
