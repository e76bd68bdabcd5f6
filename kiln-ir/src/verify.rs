//! Structural verifier
//!
//! Checks the invariants the builder and block deletion maintain. Useful
//! after a pass to catch graph corruption early.

use std::collections::HashMap;
use crate::error::IrError;
use crate::ir::{BlockId, EdgeKind, Function, Module};

pub fn verify_module(module: &Module) -> Result<(), IrError> {
    module.functions().iter().try_for_each(verify_function)
}

pub fn verify_function(func: &Function) -> Result<(), IrError> {
    let fail = |message: String| IrError::Verification {
        function: func.name().to_string(),
        message,
    };

    match func.entry_block() {
        Some(entry) if func.try_block(entry).is_none() => {
            return Err(fail(format!("entry block {entry} was deleted")));
        }
        None if func.num_blocks() > 0 => return Err(fail("function has blocks but no entry".into())),
        _ => {}
    }

    let mut owner = HashMap::new();
    let mut incoming: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

    for block in func.blocks() {
        let id = block.id();
        for (pos, inst_id) in block.insts().iter().enumerate() {
            let Some(inst) = func.try_inst(*inst_id) else {
                return Err(fail(format!("{id} lists deleted instruction {}", inst_id.index())));
            };
            if let Some(other) = owner.insert(*inst_id, id) {
                return Err(fail(format!(
                    "instruction {} appears in both {other} and {id}",
                    inst_id.index()
                )));
            }
            if inst.block() != id {
                return Err(fail(format!(
                    "instruction {} in {id} claims to belong to {}",
                    inst_id.index(),
                    inst.block()
                )));
            }
            if inst.is_terminator() && pos + 1 != block.num_insts() {
                return Err(fail(format!("terminator in the middle of {id}")));
            }
        }

        let expected: Vec<(BlockId, EdgeKind)> = func
            .terminator(id)
            .map(|term| term.successors())
            .unwrap_or_default();
        let actual: Vec<(BlockId, EdgeKind)> =
            block.out_edges().iter().map(|edge| (edge.dst, edge.kind)).collect();
        if expected != actual {
            return Err(fail(format!("edges of {id} do not match its terminator")));
        }

        for edge in block.out_edges() {
            if edge.src != id {
                return Err(fail(format!("edge stored in {id} starts at {}", edge.src)));
            }
            if func.try_block(edge.dst).is_none() {
                return Err(fail(format!("{id} has an edge to deleted block {}", edge.dst)));
            }
            incoming.entry(edge.dst).or_default().push(id);
        }
    }

    for block in func.blocks() {
        let mut expected = incoming.remove(&block.id()).unwrap_or_default();
        let mut actual = block.predecessors().to_vec();
        expected.sort();
        actual.sort();
        if expected != actual {
            return Err(fail(format!("predecessors of {} are out of sync", block.id())));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::remove_unreachable_blocks;
    use crate::samples;

    #[test]
    fn test_samples_verify() {
        for name in samples::SAMPLE_NAMES {
            let module = samples::by_name(name).unwrap();
            verify_module(&module).unwrap();
        }
    }

    #[test]
    fn test_verifies_after_pruning() {
        let mut module = samples::diamond_with_orphan_module();
        for func in module.functions_mut() {
            remove_unreachable_blocks(func);
        }
        verify_module(&module).unwrap();
    }

    #[test]
    fn test_verifies_after_deleting_branch_target() {
        let mut module = samples::fib_module();
        let func = module.functions_mut().first_mut().unwrap();
        let base = func.block_ids()[1];
        let dropped = func.delete_block(base);

        assert_eq!(dropped, 2);
        assert!(func.terminator(func.entry_block().unwrap()).is_none());
        verify_function(func).unwrap();
    }
}
