#![forbid(unsafe_code)]

//! Test support for sigtree: recording probes, tree fixtures, structural
//! invariant checks, and scripted operation sequences.

pub mod fixtures;
pub mod invariants;
pub mod probe;
pub mod script;

pub use invariants::{Violation, check_links, check_subtree};
pub use probe::{Hit, Probe};
pub use script::{Op, Script};
