//! IR Instructions
//!
//! Defines all instruction types available in the IR.

use crate::ir::{BinaryOp, BlockId, EdgeKind, Type, UnaryOp, Value};

/// Instruction payload
#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// Copy: lhs = rhs
    Copy { lhs: Value, rhs: Value },

    /// Binary operation: result = op lhs, rhs
    Binary { op: BinaryOp, lhs: Value, rhs: Value },

    /// Unary operation: result = op operand
    Unary { op: UnaryOp, operand: Value },

    /// Function call: result = call callee(args...)
    Call { callee: Value, args: Vec<Value> },

    /// Unconditional jump
    Jump { dest: BlockId },

    /// Conditional jump: then_bb when cond holds, else_bb otherwise
    CondJump { cond: Value, then_bb: BlockId, else_bb: BlockId },

    /// Return a value
    Return { value: Value },

    /// Return without a value
    ReturnVoid,
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstKind::Jump { .. }
                | InstKind::CondJump { .. }
                | InstKind::Return { .. }
                | InstKind::ReturnVoid
        )
    }

    /// Control-flow successors in edge order (then before else)
    pub fn successors(&self) -> Vec<(BlockId, EdgeKind)> {
        match self {
            InstKind::Jump { dest } => vec![(*dest, EdgeKind::Jump)],
            InstKind::CondJump { then_bb, else_bb, .. } => {
                vec![(*then_bb, EdgeKind::Then), (*else_bb, EdgeKind::Else)]
            }
            _ => Vec::new(),
        }
    }

    /// Value operands in source order
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            InstKind::Copy { lhs, rhs } | InstKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            InstKind::Unary { operand, .. } => vec![operand],
            InstKind::Call { callee, args } => {
                let mut operands = Vec::with_capacity(args.len() + 1);
                operands.push(callee);
                operands.extend(args.iter());
                operands
            }
            InstKind::CondJump { cond, .. } => vec![cond],
            InstKind::Return { value } => vec![value],
            InstKind::Jump { .. } | InstKind::ReturnVoid => Vec::new(),
        }
    }
}

/// An instruction as stored in its function's arena
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    kind: InstKind,
    ty: Type,
    name: Option<String>,
    block: BlockId,
}

impl Instruction {
    pub(crate) fn new(kind: InstKind, ty: Type, name: Option<String>, block: BlockId) -> Self {
        Self { kind, ty, name, block }
    }

    pub fn kind(&self) -> &InstKind {
        &self.kind
    }

    /// Result type; `void` for instructions that produce nothing
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Block that owns this instruction
    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn is_terminator(&self) -> bool {
        self.kind.is_terminator()
    }

    /// Whether the instruction can be used as an operand
    pub fn has_result(&self) -> bool {
        matches!(
            self.kind,
            InstKind::Binary { .. } | InstKind::Unary { .. } | InstKind::Call { .. }
        ) && !self.ty.is_void()
    }

    pub fn successors(&self) -> Vec<(BlockId, EdgeKind)> {
        self.kind.successors()
    }

    pub fn operands(&self) -> Vec<&Value> {
        self.kind.operands()
    }
}
