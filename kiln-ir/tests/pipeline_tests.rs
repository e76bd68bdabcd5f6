//! End-to-end tests: build modules through the public API, run the pass
//! pipeline, inspect the result

use kiln_ir::ir::{BaseKind, BlockId, Edge, EdgeKind, InstId, Module, Type, Value};
use kiln_ir::passes::{reachable_blocks, remove_unreachable_blocks, UnreachableBlockElimination};
use kiln_ir::{samples, verify_module, PassManager, PassStats};
use pretty_assertions::assert_eq;

fn labels(module: &Module, name: &str) -> Vec<String> {
    module
        .get_function(name)
        .unwrap()
        .blocks()
        .map(|block| block.label().to_string())
        .collect()
}

#[test]
fn test_add_end_to_end() {
    let mut module = samples::add_module();
    let func = module.get_function("add").unwrap();

    assert_eq!(func.num_blocks(), 1);
    let entry = func.entry_block().unwrap();
    let block = func.block(entry);
    assert_eq!(block.num_insts(), 2);
    assert!(block.out_edges().is_empty());
    assert_eq!(func.inst(block.insts()[0]).ty(), &Type::int32());
    assert_eq!(reachable_blocks(func), vec![true]);

    let report = PassManager::with_default_pipeline(None).run(&mut module).unwrap();
    assert_eq!(report.total.blocks_removed, 0);
    assert_eq!(labels(&module, "add"), vec!["entry"]);
    assert!(!module.diagnostics().has_errors());
}

#[test]
fn test_orphan_block_removed_once() {
    let mut module = samples::diamond_with_orphan_module();
    assert_eq!(labels(&module, "diamond"), vec!["entry", "pos", "neg", "orphan"]);

    let mut manager = PassManager::new();
    manager.register(UnreachableBlockElimination);

    let first = manager.run(&mut module).unwrap();
    assert_eq!(first.total.blocks_removed, 1);
    assert_eq!(first.total.edges_removed, 0);
    assert_eq!(labels(&module, "diamond"), vec!["entry", "pos", "neg"]);

    let second = manager.run(&mut module).unwrap();
    assert_eq!(second.total.blocks_removed, 0);
    assert_eq!(labels(&module, "diamond"), vec!["entry", "pos", "neg"]);
    verify_module(&module).unwrap();
}

type BlockSnapshot = (BlockId, Vec<InstId>, Vec<Edge>);

fn snapshot(module: &Module) -> Vec<Vec<BlockSnapshot>> {
    module
        .functions()
        .iter()
        .map(|f| {
            f.blocks()
                .map(|b| (b.id(), b.insts().to_vec(), b.out_edges().to_vec()))
                .collect()
        })
        .collect()
}

#[test]
fn test_fully_reachable_function_unchanged() {
    let mut module = samples::fib_module();
    let before = snapshot(&module);
    let text_before = module.display().to_string();

    for func in module.functions_mut() {
        assert_eq!(remove_unreachable_blocks(func), PassStats::default());
    }

    assert_eq!(snapshot(&module), before);
    assert_eq!(module.display().to_string(), text_before);
}

#[test]
fn test_orphan_removal_keeps_reachable_contents() {
    let mut module = samples::diamond_with_orphan_module();
    let mut before = snapshot(&module);
    before[0].pop();

    PassManager::with_default_pipeline(None).run(&mut module).unwrap();
    assert_eq!(snapshot(&module), before);
}

#[test]
fn test_two_jumps_with_orphan() {
    let mut module = Module::new("jumps");
    let ty = module.types().proto(Type::Void, Vec::new());
    let f = module.add_func(ty, "f").as_func().unwrap();
    let func = module.function_mut(f);
    let entry = func.append_block("entry");
    let a = func.append_block("A");
    let b = func.append_block("B");
    let c = func.append_block("C");

    let mut builder = module.builder(f, entry);
    builder.build_jump(a);
    builder.build_jump(b);
    builder.set_block(a);
    builder.build_return_void();
    builder.set_block(b);
    builder.build_return_void();
    builder.set_block(c);
    builder.build_return_void();

    let func = module.function(f);
    assert_eq!(func.block(entry).num_insts(), 2);
    assert_eq!(
        func.block(entry).out_edges(),
        &[
            Edge { src: entry, dst: a, kind: EdgeKind::Jump },
            Edge { src: entry, dst: b, kind: EdgeKind::Jump },
        ]
    );
    assert_eq!(module.diagnostics().warning_count(), 1);
    assert!(!module.diagnostics().has_errors());

    let report = PassManager::with_default_pipeline(None).run(&mut module).unwrap();
    assert_eq!(report.total.blocks_removed, 1);
    assert_eq!(labels(&module, "f"), vec!["entry", "A", "B"]);
    assert!(module.function(f).try_block(c).is_none());
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("terminator in the middle of bb0"));
}

#[test]
fn test_fib_edges() {
    let module = samples::fib_module();
    let fib = module.get_function("fib").unwrap();
    let ids = fib.block_ids();
    let entry = fib.block(ids[0]);

    let edges: Vec<(BlockId, EdgeKind)> =
        entry.out_edges().iter().map(|e| (e.dst, e.kind)).collect();
    assert_eq!(edges, vec![(ids[1], EdgeKind::Then), (ids[2], EdgeKind::Else)]);
    assert_eq!(fib.block(ids[1]).predecessors(), &[ids[0]]);
    assert_eq!(fib.block(ids[2]).predecessors(), &[ids[0]]);
}

#[test]
fn test_fib_display() {
    let module = samples::fib_module();
    assert_eq!(
        module.display().to_string(),
        r#"__name__ = "fib"

func @fib(%n: i32) -> i32 {
%entry:
  %small = cmplt %n, 2
  br %small, %base, %recurse
%base:
  ret %n
%recurse:
  %0 = sub %n, 1
  %1 = call @fib(%0)
  %2 = sub %n, 2
  %3 = call @fib(%2)
  %4 = add %1, %3
  ret %4
}

func @main() -> i32 {
%entry:
  %result = call @fib(10)
  ret %result
}
"#
    );
}

#[test]
fn test_init_code_in_module() {
    let mut module = Module::new("globals");
    let counter = module.add_var(module.types().base(BaseKind::Int64).clone(), "counter");
    let init = module.init_func();
    let entry = module.function_mut(init).append_block("entry");

    let mut builder = module.builder(init, entry);
    builder.build_copy(counter, Value::const_int64(0));
    builder.build_return_void();

    assert!(module.diagnostics().check().is_ok());
    assert!(module
        .display()
        .to_string()
        .contains("func @__init__() {\n%entry:\n  copy @counter, 0\n  ret\n}\n"));
}

#[test]
fn test_separately_built_protos_are_compatible() {
    let mut module = Module::new("m");
    let registry = module.types();
    let callee_ty = registry.parse("Pi32:i32").unwrap();
    let caller_ty = registry.proto(Type::int32(), vec![Type::int32()]);
    assert!(callee_ty.check(&caller_ty));
    assert!(!callee_ty.same_instance(&caller_ty));

    let callee = module.add_func(callee_ty, "callee");
    let caller = module.add_func(caller_ty, "caller").as_func().unwrap();
    let func = module.function_mut(caller);
    let arg = func.param(0);
    let entry = func.append_block("entry");

    let mut builder = module.builder(caller, entry);
    let result = builder.build_call(callee, vec![arg], "");
    builder.build_return(result);

    assert_eq!(module.diagnostics().diagnostics().len(), 0);
}

#[test]
fn test_dot_pass_in_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let mut module = samples::diamond_with_orphan_module();
    let report = PassManager::with_default_pipeline(Some(dir.path().to_path_buf()))
        .run(&mut module)
        .unwrap();

    assert_eq!(report.passes.len(), 2);
    assert_eq!(report.passes[1].pass, "dot");
    assert_eq!(report.total.files_written, 1);

    let dot = std::fs::read_to_string(dir.path().join("diamond.dot")).unwrap();
    assert!(dot.contains("bb0:t -> bb1:h [label=\"true\"]"));
    assert!(dot.contains("bb0:f -> bb2:h [label=\"false\"]"));
    assert!(!dot.contains("orphan"));
}
