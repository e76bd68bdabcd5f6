//! Unreachable block elimination
//!
//! Marks every block reachable from the entry block with an iterative
//! depth-first walk over the outgoing edges, then deletes the rest. Marks
//! live only for one run, so running the pass again changes nothing.

use log::info;
use crate::error::IrError;
use crate::ir::{BlockId, Function};
use crate::passes::{Pass, PassStats};

/// Reachability marks indexed by block id; deleted slots and unreachable
/// blocks are `false`
pub fn reachable_blocks(function: &Function) -> Vec<bool> {
    let mut visited = vec![false; function.block_capacity()];
    let Some(entry) = function.entry_block() else {
        return visited;
    };

    let mut stack = vec![entry];
    while let Some(id) = stack.pop() {
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        for succ in function.block(id).successors() {
            if !visited[succ.index()] {
                stack.push(succ);
            }
        }
    }
    visited
}

/// Delete every block not reachable from the entry block
pub fn remove_unreachable_blocks(function: &mut Function) -> PassStats {
    let mut stats = PassStats::default();
    if function.num_blocks() == 0 {
        return stats;
    }

    let visited = reachable_blocks(function);
    let dead: Vec<BlockId> = function
        .block_ids()
        .iter()
        .copied()
        .filter(|id| !visited[id.index()])
        .collect();
    if dead.is_empty() {
        return stats;
    }

    for id in &dead {
        let block = function.block(*id);
        info!(
            "Removing unreachable block {} '{}' from '{}'",
            id,
            block.label(),
            function.name()
        );
        stats.edges_removed += block.out_edges().len();
    }
    stats.edges_removed += function.delete_blocks(&dead);
    stats.blocks_removed = dead.len();
    stats
}

/// Pass wrapper around [`remove_unreachable_blocks`]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnreachableBlockElimination;

impl Pass for UnreachableBlockElimination {
    fn name(&self) -> &'static str {
        "unreachable-block-elim"
    }

    fn run_on_function(&mut self, function: &mut Function) -> Result<PassStats, IrError> {
        Ok(remove_unreachable_blocks(function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Module, Type, Value};
    use pretty_assertions::assert_eq;

    fn void_function(module: &mut Module, name: &str) -> crate::ir::FuncId {
        let ty = module.types().proto(Type::Void, Vec::new());
        module.add_func(ty, name).as_func().unwrap()
    }

    #[test]
    fn test_empty_function_untouched() {
        let mut module = Module::new("m");
        let f = void_function(&mut module, "empty");
        let stats = remove_unreachable_blocks(module.function_mut(f));
        assert_eq!(stats, PassStats::default());
        assert_eq!(module.function(f).num_blocks(), 0);
    }

    #[test]
    fn test_loop_is_kept() {
        let mut module = Module::new("m");
        let f = void_function(&mut module, "spin");
        let func = module.function_mut(f);
        let entry = func.append_block("entry");
        let body = func.append_block("body");

        let mut b = module.builder(f, entry);
        b.build_jump(body);
        b.set_block(body);
        b.build_jump(body);

        let visited = reachable_blocks(module.function(f));
        assert_eq!(visited, vec![true, true]);
        assert_eq!(remove_unreachable_blocks(module.function_mut(f)).blocks_removed, 0);
    }

    #[test]
    fn test_dead_cycle_removed_with_its_edges() {
        let mut module = Module::new("m");
        let f = void_function(&mut module, "f");
        let func = module.function_mut(f);
        let entry = func.append_block("entry");
        let a = func.append_block("a");
        let b_bb = func.append_block("b");
        let exit = func.append_block("exit");

        let mut b = module.builder(f, entry);
        b.build_jump(exit);
        b.set_block(a);
        b.build_cond_jump(Value::const_bool(true), b_bb, exit);
        b.set_block(b_bb);
        b.build_jump(a);
        b.set_block(exit);
        b.build_return_void();

        let stats = remove_unreachable_blocks(module.function_mut(f));
        assert_eq!(stats.blocks_removed, 2);
        assert_eq!(stats.edges_removed, 3);

        let func = module.function(f);
        assert_eq!(func.block_ids(), &[entry, exit]);
        assert_eq!(func.block(exit).predecessors(), &[entry]);
        assert!(func.try_block(a).is_none());
    }
}
