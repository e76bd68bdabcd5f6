//! Basic Block Management
//!
//! Defines basic blocks and the CFG edges between them. A block keeps its
//! outgoing edges in creation order and mirrors every incoming edge in its
//! predecessor list, so deleting a block can clean up both directions.

use std::fmt;
use crate::ir::InstId;

/// Index of a basic block in its function's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Which control transfer created an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Jump,
    Then,
    Else,
}

/// Directed CFG edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: BlockId,
    pub dst: BlockId,
    pub kind: EdgeKind,
}

/// Basic Block - a sequence of instructions with a single entry whose
/// terminator, if any, comes last
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    id: BlockId,
    label: String,
    insts: Vec<InstId>,
    out_edges: Vec<Edge>,
    predecessors: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, label: String) -> Self {
        Self {
            id,
            label,
            insts: Vec::new(),
            out_edges: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Label given at creation; may be empty
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Instructions in program order
    pub fn insts(&self) -> &[InstId] {
        &self.insts
    }

    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn last_inst(&self) -> Option<InstId> {
        self.insts.last().copied()
    }

    pub fn out_edges(&self) -> &[Edge] {
        &self.out_edges
    }

    pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.out_edges.iter().map(|edge| edge.dst)
    }

    /// One entry per incoming edge, so a block reached by both arms of a
    /// conditional jump lists that predecessor twice
    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    pub(crate) fn position_of(&self, inst: InstId) -> Option<usize> {
        self.insts.iter().position(|id| *id == inst)
    }

    pub(crate) fn insert_inst(&mut self, index: usize, inst: InstId) {
        self.insts.insert(index, inst);
    }

    pub(crate) fn remove_inst(&mut self, inst: InstId) {
        self.insts.retain(|id| *id != inst);
    }

    pub(crate) fn push_edge(&mut self, dst: BlockId, kind: EdgeKind) {
        self.out_edges.push(Edge { src: self.id, dst, kind });
    }

    /// Drop the first edge to `dst` created by a `kind` transfer
    pub(crate) fn remove_edge(&mut self, dst: BlockId, kind: EdgeKind) {
        if let Some(index) = self.out_edges.iter().position(|e| e.dst == dst && e.kind == kind) {
            self.out_edges.remove(index);
        }
    }

    pub(crate) fn add_predecessor(&mut self, pred: BlockId) {
        self.predecessors.push(pred);
    }

    /// Drop one mirrored entry for an edge coming from `pred`
    pub(crate) fn remove_predecessor(&mut self, pred: BlockId) {
        if let Some(index) = self.predecessors.iter().position(|p| *p == pred) {
            self.predecessors.remove(index);
        }
    }
}
