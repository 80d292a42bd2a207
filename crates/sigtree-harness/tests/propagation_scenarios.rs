#![forbid(unsafe_code)]

//! End-to-end propagation scenarios on small hand-built trees.

use sigtree_core::{Context, Emitter, Feature, ListenOptions, Uses};
use sigtree_harness::fixtures::{self, Family};
use sigtree_harness::{Probe, check_subtree};

type Text = Probe<&'static str>;

// ============================================================================
// Single node
// ============================================================================

#[test]
fn on_emit_off() {
    let emitter = Emitter::new();
    let probe = Text::new();
    emitter.on("SaySomething", probe.handler(), ListenOptions::new());
    emitter.emit("SaySomething", "Hi!", Feature::Exact);
    emitter.off("SaySomething", probe.handler(), ListenOptions::new());
    emitter.emit("SaySomething", "Hi!", Feature::Exact);

    assert_eq!(probe.payloads(), vec!["Hi!"]);
    assert_eq!(emitter.total_listeners(), 0);
}

#[test]
fn context_is_handed_back() {
    let emitter = Emitter::new();
    let probe = Text::new();
    let ctx = Context::new(5_u32);
    emitter.on("SignalType", probe.handler(), ctx.clone());
    emitter.emit("SignalType", "ID is", Feature::Exact);

    let hit = probe.last().expect("handler ran");
    assert_eq!(hit.context, ctx);
    let id = hit.context.downcast_ref::<u32>().copied();
    assert_eq!(format!("{} {}", hit.payload, id.unwrap_or_default()), "ID is 5");
}

#[test]
fn use_limits() {
    let emitter = Emitter::new();
    let unlimited = Probe::<i32>::new();
    let twice = Probe::<i32>::new();
    let once = Probe::<i32>::new();
    emitter.on("SignalType", unlimited.handler(), ListenOptions::new());
    emitter.on("SignalType", twice.handler(), ListenOptions::new().with_uses(2));
    emitter.once("SignalType", once.handler(), ListenOptions::new());

    for i in 1..=3 {
        emitter.emit("SignalType", i, Feature::Exact);
    }

    assert_eq!(unlimited.payloads(), vec![1, 2, 3]);
    assert_eq!(twice.payloads(), vec![1, 2]);
    assert_eq!(once.payloads(), vec![1]);
    assert_eq!(emitter.total_listeners(), 1);
    assert_eq!(emitter.listeners("SignalType")[0].remaining(), Uses::Unlimited);
}

// ============================================================================
// Family: parent → current → children
// ============================================================================

#[test]
fn catch_features_across_three_generations() {
    let Family {
        parent,
        current,
        children,
    } = fixtures::family(2);
    let child_1 = &children[0];

    let parent_exact = Text::new();
    let parent_upward = Text::new();
    let current_exact = Text::new();
    let current_upward = Text::new();
    let current_downward = Text::new();
    let current_whole = Text::new();
    let child_exact = Text::new();
    let child_downward = Text::new();
    let child_whole = Text::new();

    parent.on("SignalType", parent_exact.handler(), Feature::Exact);
    parent.on("SignalType", parent_upward.handler(), Feature::Upward);
    current.on("SignalType", current_exact.handler(), Feature::Exact);
    current.on("SignalType", current_upward.handler(), Feature::Upward);
    current.on("SignalType", current_downward.handler(), Feature::Downward);
    current.on("SignalType", current_whole.handler(), Feature::Whole);
    child_1.on("SignalType", child_exact.handler(), Feature::Exact);
    child_1.on("SignalType", child_downward.handler(), Feature::Downward);
    child_1.on("SignalType", child_whole.handler(), Feature::Whole);

    parent.emit("SignalType", "parent_exact", Feature::Exact);
    parent.emit("SignalType", "parent_exact", Feature::Exact);
    parent.emit("SignalType", "parent_exact_1", Feature::Exact);
    parent.emit("SignalType", "parent_downward", Feature::Downward);
    current.emit("SignalType", "current_exact", Feature::Exact);
    current.emit("SignalType", "current_downward", Feature::Downward);
    current.emit("SignalType", "current_upward", Feature::Upward);
    current.emit("SignalType", "current_whole", Feature::Whole);
    child_1.emit("SignalType", "child_1_exact", Feature::Exact);
    child_1.emit("SignalType", "child_1_upward", Feature::Upward);

    assert_eq!(
        parent_exact.payloads(),
        ["parent_exact", "parent_exact", "parent_exact_1", "parent_downward"]
    );
    assert_eq!(
        parent_upward.payloads(),
        [
            "parent_exact",
            "parent_exact",
            "parent_exact_1",
            "parent_downward",
            "current_upward",
            "current_whole",
            "child_1_upward",
        ]
    );
    assert_eq!(
        current_exact.payloads(),
        ["current_exact", "current_downward", "current_upward", "current_whole"]
    );
    assert_eq!(
        current_upward.payloads(),
        [
            "current_exact",
            "current_downward",
            "current_upward",
            "current_whole",
            "child_1_upward",
        ]
    );
    assert_eq!(
        current_downward.payloads(),
        [
            "parent_downward",
            "current_exact",
            "current_downward",
            "current_upward",
            "current_whole",
        ]
    );
    assert_eq!(
        current_whole.payloads(),
        [
            "parent_downward",
            "current_exact",
            "current_downward",
            "current_upward",
            "current_whole",
            "child_1_upward",
        ]
    );
    assert_eq!(child_exact.payloads(), ["child_1_exact", "child_1_upward"]);
    let child_expected = [
        "parent_downward",
        "current_downward",
        "current_whole",
        "child_1_exact",
        "child_1_upward",
    ];
    assert_eq!(child_downward.payloads(), child_expected);
    assert_eq!(child_whole.payloads(), child_expected);
    assert_eq!(check_subtree(&parent), Ok(()));
}

#[test]
fn cumulative_counts_per_feature() {
    let Family {
        parent,
        current,
        children,
    } = fixtures::family(3);
    let child_1 = &children[0];
    let h1 = Probe::<i32>::new();
    let h2 = Probe::<i32>::new();
    let h3 = Probe::<i32>::new();
    let ctx = Context::new(1_i32);

    current.add_listener("Type1", h2.handler(), ctx.clone());
    current.emit("Type1", 5, Feature::Exact);
    assert_eq!(h2.count(), 1);
    assert_eq!(h2.payloads(), vec![5]);
    assert_eq!(h2.origins(), vec![current.id()]);
    assert_eq!(h2.last().map(|hit| hit.context), Some(ctx));

    parent.add_listener("Type1", h1.handler(), Feature::Upward);
    current.add_listener("Type1", h2.handler(), Feature::Whole);
    child_1.add_listener("Type1", h3.handler(), Feature::Downward);

    let steps = [
        (child_1, Feature::Exact, (0, 1, 1)),
        (child_1, Feature::Upward, (1, 2, 2)),
        (child_1, Feature::Whole, (2, 3, 3)),
        (&current, Feature::Whole, (3, 5, 4)),
        (&current, Feature::Upward, (4, 7, 4)),
        (&current, Feature::Downward, (4, 9, 5)),
    ];
    for (origin, feature, expected) in steps {
        origin.emit("Type1", 0, feature);
        assert_eq!(
            (h1.count(), h2.count(), h3.count()),
            expected,
            "after {feature} from #{}",
            origin.id()
        );
    }
}

#[test]
fn upward_catcher_sees_whole_from_below() {
    let Family {
        parent, children, ..
    } = fixtures::family(1);
    let probe = Probe::<char>::new();
    parent.on("Ping", probe.handler(), Feature::Upward);

    children[0].emit("Ping", 'x', Feature::Whole);

    assert_eq!(probe.payloads(), vec!['x']);
    assert_eq!(probe.origins(), vec![children[0].id()]);
    assert_eq!(children[0].route(Feature::Whole).len(), 3);
}

#[test]
fn destroy_detaches_everything() {
    let Family {
        parent,
        current,
        children,
    } = fixtures::family(3);
    current.on("Type", Probe::<()>::new().handler(), ListenOptions::new());

    for node in [&parent, &current] {
        node.destroy();
    }
    for node in &children {
        node.destroy();
    }

    assert_eq!(parent.child_count(), 0);
    assert!(current.parent().is_none());
    assert_eq!(current.child_count(), 0);
    assert_eq!(current.total_listeners(), 0);
    assert!(children.iter().all(|c| c.parent().is_none()));
}
