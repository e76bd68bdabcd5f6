//! Kiln IR
//!
//! This crate provides the middle layer of the Kiln compiler toolchain:
//! - IR: typed values and instructions in basic blocks, built through a
//!   cursor-based builder
//! - Passes: unreachable block elimination and Graphviz output
//! - Verifier: structural checks of the CFG
//! - Samples: small modules for demos and tests

pub mod ir;
pub mod passes;
pub mod verify;
pub mod error;
pub mod samples;

pub use error::IrError;
pub use ir::{
    BasicBlock, BlockId, Builder, Function, InstId, Instruction, Module, Type, TypeRegistry, Value,
};
pub use passes::{DotPass, Pass, PassManager, PassReport, PassStats, UnreachableBlockElimination};
pub use verify::{verify_function, verify_module};
