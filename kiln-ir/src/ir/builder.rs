//! IR Builder
//!
//! A builder inserts instructions into one function at a cursor. The cursor
//! names the instruction new code goes after; `None` means the head of the
//! block. Each insertion moves the cursor onto the new instruction, so
//! consecutive builds come out in call order.
//!
//! Ordinary instructions never follow a terminator. A second control
//! transfer appended after one is kept, edges included, and reported as a
//! warning; `verify_function` rejects such blocks.

use kiln_common::{internal_error, ErrorReporter, SourceLocation};
use log::trace;
use crate::ir::{
    BinaryOp, BlockId, Function, InstId, InstKind, Instruction, Type, UnaryOp, Value,
};

/// Builder for constructing IR
pub struct Builder<'a> {
    func: &'a mut Function,
    block: BlockId,
    after: Option<InstId>,
    diags: &'a mut ErrorReporter,
    location: Option<SourceLocation>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(func: &'a mut Function, block: BlockId, diags: &'a mut ErrorReporter) -> Self {
        let after = func.block(block).last_inst();
        Self { func, block, after, diags, location: None }
    }

    pub fn function(&self) -> &Function {
        self.func
    }

    /// Mutable access to the function, for adding locals or blocks while
    /// building
    pub fn function_mut(&mut self) -> &mut Function {
        self.func
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Source location attached to diagnostics raised by later builds
    pub fn set_location(&mut self, location: Option<SourceLocation>) {
        self.location = location;
    }

    /// Move the cursor to the end of `block`
    pub fn set_block(&mut self, block: BlockId) {
        self.after = self.func.block(block).last_inst();
        self.block = block;
    }

    /// Move the cursor to the end of the current block
    pub fn set_end(&mut self) {
        self.set_block(self.block);
    }

    /// Move the cursor to the head of the current block
    pub fn set_head(&mut self) {
        self.after = None;
    }

    /// Position the cursor so the next instruction goes right after `inst`
    pub fn set_after(&mut self, inst: InstId) {
        self.block = self.func.inst(inst).block();
        self.after = Some(inst);
    }

    /// Position the cursor so the next instruction goes right before `inst`
    pub fn set_before(&mut self, inst: InstId) {
        let block = self.func.inst(inst).block();
        let insts = self.func.block(block).insts();
        let index = match insts.iter().position(|id| *id == inst) {
            Some(index) => index,
            None => internal_error(format_args!("instruction {} is not in {block}", inst.index())),
        };
        self.block = block;
        self.after = index.checked_sub(1).map(|prev| insts[prev]);
    }

    /// Whether the next instruction will become the first of the block
    pub fn at_head(&self) -> bool {
        self.after.is_none()
    }

    /// Copy `rhs` into `lhs`
    pub fn build_copy(&mut self, lhs: Value, rhs: Value) -> InstId {
        if !lhs.ty().check(rhs.ty()) {
            let message = format!("type not matched: cannot copy '{}' into '{}'", rhs.ty(), lhs.ty());
            self.diags.error(message, self.location.clone());
        }
        let ty = lhs.ty().clone();
        self.insert(InstKind::Copy { lhs, rhs }, ty, "")
    }

    /// Binary operation; comparisons yield `bool`, everything else the
    /// type of `lhs`
    pub fn build_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, name: &str) -> Value {
        if !lhs.ty().check(rhs.ty()) {
            let message = format!("operand types of '{op}' differ: '{}' and '{}'", lhs.ty(), rhs.ty());
            self.diags.warning(message, self.location.clone());
        }
        let ty = if op.is_comparison() { Type::bool() } else { lhs.ty().clone() };
        let id = self.insert(InstKind::Binary { op, lhs, rhs }, ty, name);
        self.func.inst_value(id)
    }

    pub fn build_add(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::Add, lhs, rhs, name)
    }

    pub fn build_sub(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::Sub, lhs, rhs, name)
    }

    pub fn build_mul(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::Mul, lhs, rhs, name)
    }

    pub fn build_cmp_eq(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::CmpEq, lhs, rhs, name)
    }

    pub fn build_cmp_lt(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::CmpLt, lhs, rhs, name)
    }

    pub fn build_cmp_le(&mut self, lhs: Value, rhs: Value, name: &str) -> Value {
        self.build_binary(BinaryOp::CmpLe, lhs, rhs, name)
    }

    /// Unary operation; `not` yields `bool`, the others the operand's type
    pub fn build_unary(&mut self, op: UnaryOp, operand: Value, name: &str) -> Value {
        let ty = match op {
            UnaryOp::Not => Type::bool(),
            UnaryOp::Neg | UnaryOp::BitNot => operand.ty().clone(),
        };
        let id = self.insert(InstKind::Unary { op, operand }, ty, name);
        self.func.inst_value(id)
    }

    /// Call `callee` with `args`; the result has the prototype's return type
    pub fn build_call(&mut self, callee: Value, args: Vec<Value>, name: &str) -> Value {
        let ty = match callee.ty().as_proto() {
            Some(proto) => {
                if proto.params().len() != args.len() {
                    let message = format!(
                        "call expects {} arguments, {} given",
                        proto.params().len(),
                        args.len()
                    );
                    self.diags.warning(message, self.location.clone());
                }
                for (i, (param, arg)) in proto.params().iter().zip(&args).enumerate() {
                    if !param.check(arg.ty()) {
                        let message = format!(
                            "argument {i} has type '{}', expected '{param}'",
                            arg.ty()
                        );
                        self.diags.warning(message, self.location.clone());
                    }
                }
                proto.ret().clone()
            }
            None => {
                let message = format!("called value of type '{}' is not a function", callee.ty());
                self.diags.error(message, self.location.clone());
                Type::Void
            }
        };
        let id = self.insert(InstKind::Call { callee, args }, ty, name);
        self.func.inst_value(id)
    }

    /// Unconditional jump; adds one edge to `dest`
    pub fn build_jump(&mut self, dest: BlockId) -> InstId {
        self.insert(InstKind::Jump { dest }, Type::Void, "")
    }

    /// Conditional jump; adds an edge to `then_bb`, then one to `else_bb`
    pub fn build_cond_jump(&mut self, cond: Value, then_bb: BlockId, else_bb: BlockId) -> InstId {
        if !cond.ty().check(&Type::bool()) {
            let message = format!("jump condition has type '{}', expected 'bool'", cond.ty());
            self.diags.warning(message, self.location.clone());
        }
        self.insert(InstKind::CondJump { cond, then_bb, else_bb }, Type::Void, "")
    }

    pub fn build_return(&mut self, value: Value) -> InstId {
        let expected = self.func.return_type();
        if !expected.check(value.ty()) {
            let message = format!(
                "function '{}' returns '{expected}', found '{}'",
                self.func.name(),
                value.ty()
            );
            self.diags.warning(message, self.location.clone());
        }
        self.insert(InstKind::Return { value }, Type::Void, "")
    }

    pub fn build_return_void(&mut self) -> InstId {
        let expected = self.func.return_type();
        if !expected.is_void() {
            let message = format!(
                "function '{}' returns '{expected}', found no value",
                self.func.name()
            );
            self.diags.warning(message, self.location.clone());
        }
        self.insert(InstKind::ReturnVoid, Type::Void, "")
    }

    fn insert(&mut self, kind: InstKind, ty: Type, name: &str) -> InstId {
        let func_id = self.func.id();
        for operand in kind.operands() {
            if operand.owner().is_some_and(|owner| owner != func_id) {
                internal_error(format_args!(
                    "operand of '{}' belongs to another function",
                    self.func.name()
                ));
            }
        }
        for (dest, _) in kind.successors() {
            // Aborts on a block that is not part of this function.
            self.func.block(dest);
        }

        let block = self.func.block(self.block);
        let index = match self.after {
            None => 0,
            Some(after) => match block.position_of(after) {
                Some(position) => position + 1,
                None => internal_error(format_args!(
                    "builder cursor is not in {} of '{}'",
                    self.block,
                    self.func.name()
                )),
            },
        };
        let follows_terminator = index
            .checked_sub(1)
            .is_some_and(|prev| self.func.inst(block.insts()[prev]).is_terminator());
        let at_end = index == block.num_insts();

        if kind.is_terminator() {
            if !at_end {
                internal_error(format_args!(
                    "terminator must be the last instruction of {} in '{}'",
                    self.block,
                    self.func.name()
                ));
            }
            if follows_terminator {
                let message = format!(
                    "unreachable control transfer after the terminator of {} in '{}'",
                    self.block,
                    self.func.name()
                );
                self.diags.warning(message, self.location.clone());
            }
        } else if follows_terminator {
            internal_error(format_args!(
                "cannot insert after the terminator of {} in '{}'",
                self.block,
                self.func.name()
            ));
        }

        let successors = kind.successors();
        let name = (!name.is_empty()).then(|| name.to_string());
        let id = self.func.alloc_inst(Instruction::new(kind, ty, name, self.block));
        self.func.block_mut(self.block).insert_inst(index, id);
        for (dest, edge_kind) in successors {
            self.func.link_edge(self.block, dest, edge_kind);
        }
        self.after = Some(id);
        trace!("Inserted instruction {} into {} of '{}'", id.index(), self.block, self.func.name());
        id
    }
}
