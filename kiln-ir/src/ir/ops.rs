//! IR Operations
//!
//! Defines binary and unary operations available in the IR.

use std::fmt;

/// Binary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div, Mod, Pow,

    // Comparison (return bool)
    CmpEq, CmpNe,
    CmpGt, CmpGe,
    CmpLt, CmpLe,

    // Logical
    And, Or,

    // Bitwise
    BitAnd, BitOr, BitXor,
    Shl, Shr,
}

impl BinaryOp {
    /// Comparisons always produce `bool`, whatever the operand types
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::CmpEq
                | BinaryOp::CmpNe
                | BinaryOp::CmpGt
                | BinaryOp::CmpGe
                | BinaryOp::CmpLt
                | BinaryOp::CmpLe
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "pow",
            BinaryOp::CmpEq => "cmpeq",
            BinaryOp::CmpNe => "cmpne",
            BinaryOp::CmpGt => "cmpgt",
            BinaryOp::CmpGe => "cmpge",
            BinaryOp::CmpLt => "cmplt",
            BinaryOp::CmpLe => "cmple",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitAnd => "bitand",
            BinaryOp::BitOr => "bitor",
            BinaryOp::BitXor => "bitxor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
        };
        write!(f, "{op_str}")
    }
}

/// Unary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,    // Arithmetic negation
    Not,    // Logical NOT (returns bool)
    BitNot, // Bitwise NOT
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
            UnaryOp::BitNot => "bitnot",
        };
        write!(f, "{op_str}")
    }
}
