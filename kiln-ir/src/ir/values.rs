//! IR Value Representations
//!
//! A [`Value`] is a cheap handle carrying its type and what it refers to:
//! a constant, a global or local variable, an instruction result, a
//! function, or a named reference to another value. Storage for variables,
//! instructions and functions lives in the module; values only hold ids.

use std::fmt;
use std::rc::Rc;
use crate::ir::{BaseKind, Type};

/// Index of a global variable in its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub(crate) u32);

/// Index of a function in its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub(crate) u32);

/// Index of a local variable (parameters first) in its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub(crate) u32);

/// Index of an instruction in its function's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub(crate) u32);

macro_rules! impl_index {
    ($($id:ident),*) => {$(
        impl $id {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

impl_index!(GlobalId, FuncId, LocalId, InstId);

/// Constant payload
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

impl Constant {
    pub fn kind(&self) -> BaseKind {
        match self {
            Constant::Int8(_) => BaseKind::Int8,
            Constant::Int16(_) => BaseKind::Int16,
            Constant::Int32(_) => BaseKind::Int32,
            Constant::Int64(_) => BaseKind::Int64,
            Constant::Float32(_) => BaseKind::Float32,
            Constant::Float64(_) => BaseKind::Float64,
            Constant::Bool(_) => BaseKind::Bool,
            Constant::Char(_) => BaseKind::Char,
            Constant::Str(_) => BaseKind::String,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int8(v) => write!(f, "{v}"),
            Constant::Int16(v) => write!(f, "{v}"),
            Constant::Int32(v) => write!(f, "{v}"),
            Constant::Int64(v) => write!(f, "{v}"),
            Constant::Float32(v) => write!(f, "{v:?}"),
            Constant::Float64(v) => write!(f, "{v:?}"),
            Constant::Bool(v) => write!(f, "{v}"),
            Constant::Char(v) => write!(f, "{v:?}"),
            Constant::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// Variable location; `Global` variables live in the module,
/// `Local` ones (including parameters) in a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarRef {
    Global(GlobalId),
    Local(FuncId, LocalId),
}

impl VarRef {
    pub fn is_global(self) -> bool {
        matches!(self, VarRef::Global(_))
    }
}

/// Named alias to another value
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub target: Value,
}

/// What a value refers to
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Const(Constant),
    Var(VarRef),
    Inst(FuncId, InstId),
    Func(FuncId),
    Ref(Rc<Reference>),
}

/// IR Value - an operand usable by instructions
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    kind: ValueKind,
    ty: Type,
}

impl Value {
    pub(crate) fn new(kind: ValueKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    fn constant(value: Constant) -> Self {
        let ty = Type::base(value.kind());
        Self::new(ValueKind::Const(value), ty)
    }

    pub fn const_int8(v: i8) -> Self {
        Self::constant(Constant::Int8(v))
    }

    pub fn const_int16(v: i16) -> Self {
        Self::constant(Constant::Int16(v))
    }

    pub fn const_int32(v: i32) -> Self {
        Self::constant(Constant::Int32(v))
    }

    pub fn const_int64(v: i64) -> Self {
        Self::constant(Constant::Int64(v))
    }

    pub fn const_float32(v: f32) -> Self {
        Self::constant(Constant::Float32(v))
    }

    pub fn const_float64(v: f64) -> Self {
        Self::constant(Constant::Float64(v))
    }

    pub fn const_bool(v: bool) -> Self {
        Self::constant(Constant::Bool(v))
    }

    pub fn const_char(v: char) -> Self {
        Self::constant(Constant::Char(v))
    }

    pub fn const_str(v: impl Into<String>) -> Self {
        Self::constant(Constant::Str(v.into()))
    }

    /// Create a named alias of `target`; same type, no storage of its own
    pub fn reference(target: &Value, name: impl Into<String>) -> Self {
        let reference = Reference { name: name.into(), target: target.clone() };
        Self::new(ValueKind::Ref(Rc::new(reference)), target.ty.clone())
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Follow reference aliases down to the underlying value
    pub fn resolve(&self) -> &Value {
        let mut value = self;
        while let ValueKind::Ref(reference) = &value.kind {
            value = &reference.target;
        }
        value
    }

    pub fn is_const(&self) -> bool {
        matches!(self.resolve().kind, ValueKind::Const(_))
    }

    pub fn as_const(&self) -> Option<&Constant> {
        match &self.resolve().kind {
            ValueKind::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<VarRef> {
        match self.resolve().kind {
            ValueKind::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_inst(&self) -> Option<(FuncId, InstId)> {
        match self.resolve().kind {
            ValueKind::Inst(func, inst) => Some((func, inst)),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<FuncId> {
        match self.resolve().kind {
            ValueKind::Func(func) => Some(func),
            _ => None,
        }
    }

    /// The function this value is bound to, if it is function-local
    pub(crate) fn owner(&self) -> Option<FuncId> {
        match self.resolve().kind {
            ValueKind::Inst(func, _) | ValueKind::Var(VarRef::Local(func, _)) => Some(func),
            _ => None,
        }
    }
}
