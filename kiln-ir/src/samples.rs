//! Small modules built through the public builder API
//!
//! Used by the driver's `demo` command and by tests.

use kiln_common::internal_error;
use crate::ir::{BaseKind, BinaryOp, FuncId, Module, Value};

/// Names accepted by [`by_name`]
pub const SAMPLE_NAMES: [&str; 3] = ["add", "fib", "diamond"];

pub fn by_name(name: &str) -> Option<Module> {
    match name {
        "add" => Some(add_module()),
        "fib" => Some(fib_module()),
        "diamond" => Some(diamond_with_orphan_module()),
        _ => None,
    }
}

/// `add(a: i32, b: i32) -> i32` in a single block
pub fn add_module() -> Module {
    let mut module = Module::new("add");
    let i32_ty = module.types().int32().clone();
    let ty = module.types().proto(i32_ty.clone(), vec![i32_ty.clone(), i32_ty]);
    let f = func_id(&module.add_func(ty, "add"));

    let func = module.function_mut(f);
    let a = func.param(0);
    let b = func.param(1);
    func.set_param_name(0, "a");
    func.set_param_name(1, "b");
    let entry = func.append_block("entry");

    let mut builder = module.builder(f, entry);
    let sum = builder.build_add(a, b, "sum");
    builder.build_return(sum);
    module
}

/// Recursive Fibonacci plus a `main` calling it
pub fn fib_module() -> Module {
    let mut module = Module::new("fib");
    let i32_ty = module.types().base(BaseKind::Int32).clone();
    let fib_ty = module.types().proto(i32_ty.clone(), vec![i32_ty.clone()]);
    let fib = module.add_func(fib_ty, "fib");
    let main_ty = module.types().proto(i32_ty, Vec::new());
    let main = module.add_func(main_ty, "main");

    let f = func_id(&fib);
    let func = module.function_mut(f);
    let n = func.param(0);
    func.set_param_name(0, "n");
    let entry = func.append_block("entry");
    let base = func.append_block("base");
    let recurse = func.append_block("recurse");

    let mut b = module.builder(f, entry);
    let cond = b.build_cmp_lt(n.clone(), Value::const_int32(2), "small");
    b.build_cond_jump(cond, base, recurse);

    b.set_block(base);
    b.build_return(n.clone());

    b.set_block(recurse);
    let n1 = b.build_sub(n.clone(), Value::const_int32(1), "");
    let f1 = b.build_call(fib.clone(), vec![n1], "");
    let n2 = b.build_sub(n, Value::const_int32(2), "");
    let f2 = b.build_call(fib.clone(), vec![n2], "");
    let sum = b.build_add(f1, f2, "");
    b.build_return(sum);

    let m = func_id(&main);
    let entry = module.function_mut(m).append_block("entry");
    let mut b = module.builder(m, entry);
    let result = b.build_call(fib, vec![Value::const_int32(10)], "result");
    b.build_return(result);
    module
}

/// `diamond(x: i32) -> i32` branching to two returning blocks, plus a
/// block nothing jumps to
pub fn diamond_with_orphan_module() -> Module {
    let mut module = Module::new("diamond");
    let i32_ty = module.types().int32().clone();
    let ty = module.types().proto(i32_ty.clone(), vec![i32_ty]);
    let f = func_id(&module.add_func(ty, "diamond"));

    let func = module.function_mut(f);
    let x = func.param(0);
    func.set_param_name(0, "x");
    let entry = func.append_block("entry");
    let pos = func.append_block("pos");
    let neg = func.append_block("neg");
    let orphan = func.append_block("orphan");

    let mut b = module.builder(f, entry);
    let cond = b.build_binary(BinaryOp::CmpGt, x, Value::const_int32(0), "");
    b.build_cond_jump(cond, pos, neg);
    b.set_block(pos);
    b.build_return(Value::const_int32(1));
    b.set_block(neg);
    b.build_return(Value::const_int32(-1));
    b.set_block(orphan);
    b.build_return(Value::const_int32(0));
    module
}

fn func_id(value: &Value) -> FuncId {
    match value.as_func() {
        Some(id) => id,
        None => internal_error("sample callee is not a function"),
    }
}
