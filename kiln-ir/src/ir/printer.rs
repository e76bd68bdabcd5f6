//! Textual IR printer
//!
//! Renders a module in a readable assembly-like form. Unnamed locals and
//! instruction results are numbered `%0`, `%1`, ... per function, in the
//! order they are defined.

use std::collections::HashMap;
use std::fmt;
use crate::ir::{
    BlockId, Function, InstId, InstKind, Instruction, Module, Value, ValueKind, VarRef,
};

/// Names of a function's values as they appear in printed IR
pub(crate) struct ValueNames<'a> {
    module: &'a Module,
    func: &'a Function,
    locals: Vec<String>,
    insts: HashMap<InstId, String>,
}

impl<'a> ValueNames<'a> {
    pub(crate) fn new(module: &'a Module, func: &'a Function) -> Self {
        let mut next = 0usize;
        let mut fresh = |name: Option<&str>| match name {
            Some(name) => format!("%{name}"),
            None => {
                let n = next;
                next += 1;
                format!("%{n}")
            }
        };

        let locals = func.locals().iter().map(|local| fresh(local.name.as_deref())).collect();
        let mut insts = HashMap::new();
        for block in func.blocks() {
            for (id, inst) in func.block_insts(block.id()) {
                if inst.has_result() {
                    insts.insert(id, fresh(inst.name()));
                }
            }
        }

        Self { module, func, locals, insts }
    }

    pub(crate) fn block(&self, id: BlockId) -> String {
        match self.func.try_block(id) {
            Some(block) if !block.label().is_empty() => format!("%{}", block.label()),
            _ => format!("%{id}"),
        }
    }

    pub(crate) fn value(&self, value: &Value) -> String {
        match value.kind() {
            ValueKind::Const(constant) => constant.to_string(),
            ValueKind::Var(VarRef::Global(id)) => format!("@{}", self.module.global(*id).name),
            ValueKind::Var(VarRef::Local(_, id)) => self.locals[id.index()].clone(),
            ValueKind::Inst(_, id) => self
                .insts
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("%<dead {}>", id.index())),
            ValueKind::Func(id) => format!("@{}", self.module.function(*id).name()),
            ValueKind::Ref(reference) => format!("{}({})", reference.name, self.value(&reference.target)),
        }
    }

    /// One instruction, without indentation
    pub(crate) fn inst(&self, id: InstId, inst: &Instruction) -> String {
        let body = match inst.kind() {
            InstKind::Copy { lhs, rhs } => format!("copy {}, {}", self.value(lhs), self.value(rhs)),
            InstKind::Binary { op, lhs, rhs } => {
                format!("{op} {}, {}", self.value(lhs), self.value(rhs))
            }
            InstKind::Unary { op, operand } => format!("{op} {}", self.value(operand)),
            InstKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.value(arg)).collect();
                format!("call {}({})", self.value(callee), args.join(", "))
            }
            InstKind::Jump { dest } => format!("jmp {}", self.block(*dest)),
            InstKind::CondJump { cond, then_bb, else_bb } => format!(
                "br {}, {}, {}",
                self.value(cond),
                self.block(*then_bb),
                self.block(*else_bb)
            ),
            InstKind::Return { value } => format!("ret {}", self.value(value)),
            InstKind::ReturnVoid => "ret".to_string(),
        };

        match self.insts.get(&id) {
            Some(result) => format!("{result} = {body}"),
            None => body,
        }
    }
}

/// `Display` adapter for a whole module
pub struct ModuleDisplay<'a> {
    module: &'a Module,
}

/// `Display` adapter for one function
pub struct FunctionDisplay<'a> {
    module: &'a Module,
    func: &'a Function,
}

impl Module {
    pub fn display(&self) -> ModuleDisplay<'_> {
        ModuleDisplay { module: self }
    }
}

impl Function {
    /// Printable form; `module` resolves global and callee names
    pub fn display<'a>(&'a self, module: &'a Module) -> FunctionDisplay<'a> {
        FunctionDisplay { module, func: self }
    }
}

impl fmt::Display for ModuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "__name__ = \"{}\"", self.module.name())?;

        if !self.module.globals().is_empty() {
            writeln!(f)?;
            for global in self.module.globals() {
                writeln!(f, "global @{}: {}", global.name, global.ty)?;
            }
        }

        for func in self.module.functions() {
            writeln!(f)?;
            write!(f, "{}", func.display(self.module))?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = ValueNames::new(self.module, self.func);
        let proto = self.func.proto();

        write!(f, "func @{}(", self.func.name())?;
        for (i, param) in proto.params().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {param}", names.locals[i])?;
        }
        write!(f, ")")?;
        if !proto.ret().is_void() {
            write!(f, " -> {}", proto.ret())?;
        }
        writeln!(f, " {{")?;

        for (i, local) in self.func.locals().iter().enumerate().skip(self.func.num_params()) {
            writeln!(f, "  local {}: {}", names.locals[i], local.ty)?;
        }

        for block in self.func.blocks() {
            writeln!(f, "{}:", names.block(block.id()))?;
            for (id, inst) in self.func.block_insts(block.id()) {
                writeln!(f, "  {}", names.inst(id, inst))?;
            }
        }
        writeln!(f, "}}")
    }
}
