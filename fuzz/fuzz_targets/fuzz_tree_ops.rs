#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sigtree_harness::{Op, Script};

#[derive(Arbitrary, Debug)]
struct Input {
    pool: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut script = Script::new(usize::from(input.pool % 12) + 1);
    for op in input.ops.into_iter().take(512) {
        script.apply(op);
        if let Err(violation) = script.check() {
            panic!("{violation} after {op:?}");
        }
    }
});
