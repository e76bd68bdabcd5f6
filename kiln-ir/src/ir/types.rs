//! IR Type System
//!
//! Base types are immutable values handed out by a [`TypeRegistry`];
//! function prototypes are allocated per construction and compared
//! structurally.

use std::fmt;
use std::rc::Rc;
use crate::error::IrError;

/// Primitive type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Char,
    String,
    Any,
}

impl BaseKind {
    pub const ALL: [BaseKind; 10] = [
        BaseKind::Int8,
        BaseKind::Int16,
        BaseKind::Int32,
        BaseKind::Int64,
        BaseKind::Float32,
        BaseKind::Float64,
        BaseKind::Bool,
        BaseKind::Char,
        BaseKind::String,
        BaseKind::Any,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseKind::Int8 => "i8",
            BaseKind::Int16 => "i16",
            BaseKind::Int32 => "i32",
            BaseKind::Int64 => "i64",
            BaseKind::Float32 => "f32",
            BaseKind::Float64 => "f64",
            BaseKind::Bool => "bool",
            BaseKind::Char => "char",
            BaseKind::String => "string",
            BaseKind::Any => "any",
        }
    }
}

/// Function prototype: return type plus ordered parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoType {
    ret: Type,
    params: Vec<Type>,
}

impl ProtoType {
    pub fn ret(&self) -> &Type {
        &self.ret
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }
}

/// IR Type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// No value (prototypes without a result, control transfers)
    Void,

    /// Primitive type
    Base(BaseKind),

    /// Function prototype
    Proto(Rc<ProtoType>),
}

impl Type {
    pub const fn base(kind: BaseKind) -> Type {
        Type::Base(kind)
    }

    pub const fn int32() -> Type {
        Type::Base(BaseKind::Int32)
    }

    pub const fn bool() -> Type {
        Type::Base(BaseKind::Bool)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_proto(&self) -> bool {
        matches!(self, Type::Proto(_))
    }

    pub fn kind(&self) -> Option<BaseKind> {
        match self {
            Type::Base(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_proto(&self) -> Option<&ProtoType> {
        match self {
            Type::Proto(proto) => Some(proto.as_ref()),
            _ => None,
        }
    }

    /// Type compatibility check.
    ///
    /// Prototypes compare by shape, so two separately constructed
    /// `fn(i32) -> i32` types are compatible.
    pub fn check(&self, other: &Type) -> bool {
        self == other
    }

    /// Identity comparison: base types are singletons, prototypes are
    /// identical only when they are the same allocation.
    pub fn same_instance(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Proto(a), Type::Proto(b)) => Rc::ptr_eq(a, b),
            (Type::Proto(_), _) | (_, Type::Proto(_)) => false,
            _ => self == other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Base(kind) => write!(f, "{}", kind.name()),
            Type::Proto(proto) => {
                write!(f, "fn(")?;
                for (i, param) in proto.params.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{param}")?;
                }
                write!(f, ")")?;
                if !proto.ret.is_void() {
                    write!(f, " -> {}", proto.ret)?;
                }
                Ok(())
            }
        }
    }
}

/// Immutable table of base types, built once per module.
///
/// `base` always returns a reference into the same table, so base types are
/// identity-stable for the life of the registry.
#[derive(Debug)]
pub struct TypeRegistry {
    void: Type,
    bases: Vec<Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            void: Type::Void,
            bases: BaseKind::ALL.iter().map(|kind| Type::Base(*kind)).collect(),
        }
    }

    pub fn base(&self, kind: BaseKind) -> &Type {
        &self.bases[kind.index()]
    }

    pub fn void(&self) -> &Type {
        &self.void
    }

    pub fn int32(&self) -> &Type {
        self.base(BaseKind::Int32)
    }

    pub fn bool(&self) -> &Type {
        self.base(BaseKind::Bool)
    }

    /// Look up a base type by its printed name (`i32`, `bool`, ...)
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        if name == "void" {
            return Some(&self.void);
        }
        BaseKind::ALL
            .iter()
            .find(|kind| kind.name() == name)
            .map(|kind| self.base(*kind))
    }

    /// Construct a new prototype. Every call allocates.
    pub fn proto(&self, ret: Type, params: Vec<Type>) -> Type {
        Type::Proto(Rc::new(ProtoType { ret, params }))
    }

    /// Parse a compact type descriptor.
    ///
    /// `i8 i16 i32 i64 f32 f64` sized numbers, `z` bool, `c` char,
    /// `s` string, `A` any, `P<params>:<ret>` prototype (empty ret is void).
    pub fn parse(&self, descriptor: &str) -> Result<Type, IrError> {
        let mut parser = DescriptorParser { registry: self, src: descriptor, pos: 0 };
        let ty = parser.parse_type()?;
        if parser.pos != descriptor.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(ty)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct DescriptorParser<'a> {
    registry: &'a TypeRegistry,
    src: &'a str,
    pos: usize,
}

impl DescriptorParser<'_> {
    fn error(&self, message: &str) -> IrError {
        IrError::InvalidTypeDescriptor {
            descriptor: self.src.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.src[self.pos..].starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    fn starts_type(byte: u8) -> bool {
        matches!(byte, b'i' | b'f' | b'z' | b'c' | b's' | b'A' | b'P')
    }

    fn parse_type(&mut self) -> Result<Type, IrError> {
        let Some(byte) = self.peek() else {
            return Err(self.error("unexpected end of descriptor"));
        };
        self.pos += 1;

        let kind = match byte {
            b'i' => {
                if self.eat("8") {
                    BaseKind::Int8
                } else if self.eat("16") {
                    BaseKind::Int16
                } else if self.eat("32") {
                    BaseKind::Int32
                } else if self.eat("64") {
                    BaseKind::Int64
                } else {
                    return Err(self.error("expected integer width 8, 16, 32 or 64"));
                }
            }
            b'f' => {
                if self.eat("32") {
                    BaseKind::Float32
                } else if self.eat("64") {
                    BaseKind::Float64
                } else {
                    return Err(self.error("expected float width 32 or 64"));
                }
            }
            b'z' => BaseKind::Bool,
            b'c' => BaseKind::Char,
            b's' => BaseKind::String,
            b'A' => BaseKind::Any,
            b'P' => return self.parse_proto(),
            _ => {
                self.pos -= 1;
                return Err(self.error("unknown type code"));
            }
        };

        Ok(self.registry.base(kind).clone())
    }

    fn parse_proto(&mut self) -> Result<Type, IrError> {
        let mut params = Vec::new();
        loop {
            match self.peek() {
                Some(b':') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => params.push(self.parse_type()?),
                None => return Err(self.error("prototype is missing ':'")),
            }
        }

        let ret = match self.peek() {
            Some(byte) if Self::starts_type(byte) => self.parse_type()?,
            _ => Type::Void,
        };

        Ok(self.registry.proto(ret, params))
    }
}
