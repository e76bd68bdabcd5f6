//! Typed Intermediate Representation
//!
//! This module defines the IR that frontends build and backends consume:
//! typed values and instructions grouped into basic blocks, with explicit
//! control-flow edges between the blocks.
//!
//! ## Architecture
//!
//! The module is structured as follows:
//! - `types` - Type system (Type, TypeRegistry)
//! - `values` - Value representations and ids
//! - `ops` - Binary and unary operations
//! - `instructions` - IR instructions
//! - `blocks` - Basic blocks and CFG edges
//! - `function` - Function definitions and their arenas
//! - `module` - Module and global variables
//! - `builder` - IR construction at a cursor
//! - `printer` - Textual IR output

// Public exports - clean API surface
pub use self::types::{BaseKind, ProtoType, Type, TypeRegistry};
pub use self::values::{Constant, FuncId, GlobalId, InstId, LocalId, Reference, Value, ValueKind, VarRef};
pub use self::ops::{BinaryOp, UnaryOp};
pub use self::instructions::{InstKind, Instruction};
pub use self::blocks::{BasicBlock, BlockId, Edge, EdgeKind};
pub use self::function::{Function, LocalVar};
pub use self::module::{GlobalVar, Module, INIT_FUNCTION_NAME};
pub use self::builder::Builder;
pub use self::printer::{FunctionDisplay, ModuleDisplay};
pub(crate) use self::printer::ValueNames;

// Internal modules
mod types;
mod values;
mod ops;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
mod printer;
