//! Function Definitions
//!
//! A function owns its local variables, its basic blocks and an arena of
//! instructions. Blocks and instructions are addressed by dense ids; a
//! deleted block leaves an empty slot behind so surviving ids stay valid.

use kiln_common::internal_error;
use log::{debug, trace, warn};
use crate::ir::{
    BasicBlock, BlockId, EdgeKind, FuncId, InstId, Instruction, LocalId, ProtoType, Type, Value,
    ValueKind, VarRef,
};

/// Function-local variable; the first `num_params` are parameter slots
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub ty: Type,
    pub name: Option<String>,
}

/// Function in IR
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    id: FuncId,
    name: String,
    ty: Type,
    num_params: usize,
    locals: Vec<LocalVar>,
    blocks: Vec<Option<BasicBlock>>,
    layout: Vec<BlockId>,
    insts: Vec<Option<Instruction>>,
    entry: Option<BlockId>,
}

impl Function {
    /// Create a function and its parameter slots from a prototype type
    pub(crate) fn new(id: FuncId, name: String, ty: Type) -> Self {
        let params: Vec<Type> = match ty.as_proto() {
            Some(proto) => proto.params().to_vec(),
            None => internal_error(format_args!("function '{name}' has non-prototype type '{ty}'")),
        };

        let mut function = Self {
            id,
            name,
            ty,
            num_params: params.len(),
            locals: Vec::new(),
            blocks: Vec::new(),
            layout: Vec::new(),
            insts: Vec::new(),
            entry: None,
        };
        for param in params {
            function.locals.push(LocalVar { ty: param, name: None });
        }
        debug!("Created function '{}' with {} parameters", function.name, function.num_params);
        function
    }

    pub fn id(&self) -> FuncId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn proto(&self) -> &ProtoType {
        match self.ty.as_proto() {
            Some(proto) => proto,
            None => internal_error(format_args!("function '{}' lost its prototype", self.name)),
        }
    }

    pub fn return_type(&self) -> &Type {
        self.proto().ret()
    }

    /// This function as a callable value
    pub fn value(&self) -> Value {
        Value::new(ValueKind::Func(self.id), self.ty.clone())
    }

    pub fn num_params(&self) -> usize {
        self.num_params
    }

    pub fn locals(&self) -> &[LocalVar] {
        &self.locals
    }

    /// Append a local variable
    pub fn add_local(&mut self, ty: Type, name: &str) -> Value {
        let id = LocalId::from_index(self.locals.len());
        let name = (!name.is_empty()).then(|| name.to_string());
        self.locals.push(LocalVar { ty, name });
        self.local_value(id)
    }

    pub fn local_value(&self, id: LocalId) -> Value {
        match self.locals.get(id.index()) {
            Some(local) => Value::new(ValueKind::Var(VarRef::Local(self.id, id)), local.ty.clone()),
            None => internal_error(format_args!(
                "local {} does not exist in function '{}'",
                id.index(),
                self.name
            )),
        }
    }

    /// Parameter `index` in prototype order.
    ///
    /// An index outside `0..num_params` is a bug in the code building the IR
    /// and aborts.
    pub fn param(&self, index: usize) -> Value {
        if index >= self.num_params {
            internal_error(format_args!(
                "index {} out of range(0 ..< {}) in function '{}'",
                index, self.num_params, self.name
            ));
        }
        self.local_value(LocalId::from_index(index))
    }

    pub fn set_param_name(&mut self, index: usize, name: &str) {
        // Aborts on an out-of-range index.
        self.param(index);
        self.set_local_name(LocalId::from_index(index), name);
    }

    pub fn set_local_name(&mut self, id: LocalId, name: &str) {
        match self.locals.get_mut(id.index()) {
            Some(local) => local.name = (!name.is_empty()).then(|| name.to_string()),
            None => internal_error(format_args!("local {} does not exist", id.index())),
        }
    }

    /// Append a block at the end of the block list. The first block ever
    /// appended becomes the entry block.
    pub fn append_block(&mut self, label: &str) -> BlockId {
        let id = self.alloc_block(label);
        self.layout.push(id);
        id
    }

    /// Insert a new block right after `after` in the block list
    pub fn add_block_after(&mut self, after: BlockId, label: &str) -> BlockId {
        let position = self.layout_position(after) + 1;
        let id = self.alloc_block(label);
        self.layout.insert(position, id);
        id
    }

    /// Insert a new block right before `before` in the block list
    pub fn add_block_before(&mut self, before: BlockId, label: &str) -> BlockId {
        let position = self.layout_position(before);
        let id = self.alloc_block(label);
        self.layout.insert(position, id);
        id
    }

    fn alloc_block(&mut self, label: &str) -> BlockId {
        let id = BlockId::from_index(self.blocks.len());
        self.blocks.push(Some(BasicBlock::new(id, label.to_string())));
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        debug!("Appended block {} '{}' to function '{}'", id, label, self.name);
        id
    }

    fn layout_position(&self, id: BlockId) -> usize {
        match self.layout.iter().position(|b| *b == id) {
            Some(position) => position,
            None => internal_error(format_args!("{id} is not a block of function '{}'", self.name)),
        }
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.entry
    }

    pub fn num_blocks(&self) -> usize {
        self.layout.len()
    }

    /// Block ids in list order
    pub fn block_ids(&self) -> &[BlockId] {
        &self.layout
    }

    /// Blocks in list order
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.layout.iter().map(move |id| self.block(*id))
    }

    /// Number of block slots ever allocated, deleted ones included
    pub fn block_capacity(&self) -> usize {
        self.blocks.len()
    }

    pub fn try_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index()).and_then(Option::as_ref)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        match self.try_block(id) {
            Some(block) => block,
            None => internal_error(format_args!("{id} is not a block of function '{}'", self.name)),
        }
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        match self.blocks.get_mut(id.index()).and_then(Option::as_mut) {
            Some(block) => block,
            None => internal_error(format_args!("{id} is not a block of function '{}'", self.name)),
        }
    }

    pub fn try_inst(&self, id: InstId) -> Option<&Instruction> {
        self.insts.get(id.index()).and_then(Option::as_ref)
    }

    pub fn inst(&self, id: InstId) -> &Instruction {
        match self.try_inst(id) {
            Some(inst) => inst,
            None => internal_error(format_args!(
                "instruction {} does not exist in function '{}'",
                id.index(),
                self.name
            )),
        }
    }

    /// Instructions of a block, resolved, in program order
    pub fn block_insts(&self, id: BlockId) -> impl Iterator<Item = (InstId, &Instruction)> + '_ {
        self.block(id).insts().iter().map(move |inst| (*inst, self.inst(*inst)))
    }

    /// The result of an instruction as an operand
    pub fn inst_value(&self, id: InstId) -> Value {
        Value::new(ValueKind::Inst(self.id, id), self.inst(id).ty().clone())
    }

    pub fn set_inst_name(&mut self, id: InstId, name: &str) {
        match self.insts.get_mut(id.index()).and_then(Option::as_mut) {
            Some(inst) => inst.set_name((!name.is_empty()).then(|| name.to_string())),
            None => internal_error(format_args!("instruction {} does not exist", id.index())),
        }
    }

    /// The block's last instruction, if it is a terminator
    pub fn terminator(&self, id: BlockId) -> Option<&Instruction> {
        self.block(id)
            .last_inst()
            .map(|inst| self.inst(inst))
            .filter(|inst| inst.is_terminator())
    }

    pub(crate) fn alloc_inst(&mut self, inst: Instruction) -> InstId {
        let id = InstId::from_index(self.insts.len());
        self.insts.push(Some(inst));
        id
    }

    pub(crate) fn link_edge(&mut self, src: BlockId, dst: BlockId, kind: EdgeKind) {
        self.block_mut(src).push_edge(dst, kind);
        self.block_mut(dst).add_predecessor(src);
        trace!("Linked edge {src} -> {dst} ({kind:?}) in '{}'", self.name);
    }

    /// Delete one block. See [`Function::delete_blocks`].
    pub fn delete_block(&mut self, id: BlockId) -> usize {
        self.delete_blocks(&[id])
    }

    /// Delete a set of blocks together with their instructions and edges.
    ///
    /// Edges between deleted blocks vanish with them. A surviving block that
    /// jumps into a deleted block loses that jump together with the edges it
    /// created. Returns the number of edges dropped from surviving blocks.
    pub fn delete_blocks(&mut self, ids: &[BlockId]) -> usize {
        let mut dead = vec![false; self.blocks.len()];
        for id in ids {
            if self.try_block(*id).is_none() || dead[id.index()] {
                internal_error(format_args!("cannot delete {id} from function '{}'", self.name));
            }
            dead[id.index()] = true;
        }

        let removed: Vec<BasicBlock> = ids
            .iter()
            .filter_map(|id| self.blocks[id.index()].take())
            .collect();
        self.layout.retain(|id| !dead[id.index()]);

        let mut dropped = 0;
        for block in removed {
            for inst in block.insts() {
                self.insts[inst.index()] = None;
            }
            for edge in block.out_edges() {
                if !dead[edge.dst.index()] {
                    self.block_mut(edge.dst).remove_predecessor(block.id());
                }
            }
            for pred in block.predecessors() {
                if !dead[pred.index()] && self.try_block(*pred).is_some() {
                    dropped += self.detach_terminators(*pred, &dead);
                }
            }
        }

        if self.entry.is_some_and(|entry| dead[entry.index()]) {
            self.entry = self.layout.first().copied();
        }
        dropped
    }

    /// Remove every control transfer in `pred` that targets a dead block,
    /// along with the edges it created. Returns the number of edges removed.
    fn detach_terminators(&mut self, pred: BlockId, dead: &[bool]) -> usize {
        let doomed: Vec<InstId> = self
            .block(pred)
            .insts()
            .iter()
            .copied()
            .filter(|id| {
                let inst = self.inst(*id);
                inst.is_terminator() && inst.successors().iter().any(|(dst, _)| dead[dst.index()])
            })
            .collect();

        let mut dropped = 0;
        for id in doomed {
            let successors = self.inst(id).successors();
            dropped += successors.len();
            for (dst, kind) in successors {
                self.block_mut(pred).remove_edge(dst, kind);
                if !dead[dst.index()] {
                    self.block_mut(dst).remove_predecessor(pred);
                }
            }
            self.block_mut(pred).remove_inst(id);
            self.insts[id.index()] = None;
        }

        if dropped > 0 {
            warn!(
                "Dropped jumps of {} in '{}' ({} edges) because their target was deleted",
                pred, self.name, dropped
            );
        }
        dropped
    }
}
