//! Module and Global Variables
//!
//! Defines the top-level module structure. A module owns its type registry,
//! its global variables, its functions and the diagnostics reported while
//! building them.

use kiln_common::{internal_error, ErrorReporter};
use log::debug;
use crate::ir::{
    BlockId, Builder, FuncId, Function, GlobalId, Type, TypeRegistry, Value, ValueKind, VarRef,
};

/// Name of the synthesized function holding top-level initialization code
pub const INIT_FUNCTION_NAME: &str = "__init__";

/// Global variable definition
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: Type,
}

/// IR Module - represents a complete compilation unit
#[derive(Debug)]
pub struct Module {
    name: String,
    types: TypeRegistry,
    globals: Vec<GlobalVar>,
    functions: Vec<Function>,
    init: Option<FuncId>,
    diagnostics: ErrorReporter,
}

impl Module {
    pub fn new(name: &str) -> Self {
        debug!("Created module '{name}'");
        Self {
            name: name.to_string(),
            types: TypeRegistry::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            init: None,
            diagnostics: ErrorReporter::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Add a module-level variable
    pub fn add_var(&mut self, ty: Type, name: &str) -> Value {
        if name.is_empty() {
            internal_error("global variable without a name");
        }
        let id = GlobalId::from_index(self.globals.len());
        self.globals.push(GlobalVar { name: name.to_string(), ty: ty.clone() });
        debug!("Added global '{name}': {ty}");
        Value::new(ValueKind::Var(VarRef::Global(id)), ty)
    }

    /// Add a function. `ty` must be a prototype; its parameters become the
    /// function's first locals, in order.
    pub fn add_func(&mut self, ty: Type, name: &str) -> Value {
        if name.is_empty() {
            internal_error("function without a name");
        }
        let id = FuncId::from_index(self.functions.len());
        let function = Function::new(id, name.to_string(), ty);
        let value = function.value();
        self.functions.push(function);
        value
    }

    /// The `__init__` function, created on first use
    pub fn init_func(&mut self) -> FuncId {
        if let Some(id) = self.init {
            return id;
        }
        let ty = self.types.proto(Type::Void, Vec::new());
        let id = match self.add_func(ty, INIT_FUNCTION_NAME).as_func() {
            Some(id) => id,
            None => internal_error("init function is not a function value"),
        };
        self.init = Some(id);
        id
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut [Function] {
        &mut self.functions
    }

    pub fn function(&self, id: FuncId) -> &Function {
        match self.functions.get(id.index()) {
            Some(function) => function,
            None => internal_error(format_args!(
                "function {} does not exist in module '{}'",
                id.index(),
                self.name
            )),
        }
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        match self.functions.get_mut(id.index()) {
            Some(function) => function,
            None => internal_error(format_args!(
                "function {} does not exist in module '{}'",
                id.index(),
                self.name
            )),
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn globals(&self) -> &[GlobalVar] {
        &self.globals
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVar {
        match self.globals.get(id.index()) {
            Some(global) => global,
            None => internal_error(format_args!(
                "global {} does not exist in module '{}'",
                id.index(),
                self.name
            )),
        }
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVar> {
        self.globals.iter().find(|g| g.name == name)
    }

    /// Builder positioned after the last instruction of `block`
    pub fn builder(&mut self, func: FuncId, block: BlockId) -> Builder<'_> {
        let function = match self.functions.get_mut(func.index()) {
            Some(function) => function,
            None => internal_error(format_args!("function {} does not exist", func.index())),
        };
        Builder::new(function, block, &mut self.diagnostics)
    }

    pub fn diagnostics(&self) -> &ErrorReporter {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut ErrorReporter {
        &mut self.diagnostics
    }
}
