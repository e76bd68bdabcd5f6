//! Passes over finished IR
//!
//! - `manager` - pass trait, statistics and the pass manager
//! - `reachability` - unreachable block elimination
//! - `dot` - Graphviz rendering of each function's CFG

pub use self::manager::{Pass, PassManager, PassRecord, PassReport, PassStats};
pub use self::reachability::{reachable_blocks, remove_unreachable_blocks, UnreachableBlockElimination};
pub use self::dot::{render_function, DotPass};

mod manager;
mod reachability;
mod dot;
