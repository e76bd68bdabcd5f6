//! Graphviz output
//!
//! One `digraph` per function. Each block is a record node whose header
//! port `h` receives edges; blocks ending in a conditional jump get `t` and
//! `f` ports for their two outgoing edges. Jump edges leave the node itself.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use log::debug;
use crate::error::IrError;
use crate::ir::{EdgeKind, Function, InstKind, Module, ValueNames};
use crate::passes::{Pass, PassStats};

/// Escape text for a record label
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape text for a quoted graph id
fn escape_id(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// File stem for a function: characters outside `[A-Za-z0-9_.-]` become
/// `_`, and a leading dot is replaced so the name stays inside the directory
fn file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') { ch } else { '_' })
        .collect();
    if stem.is_empty() || stem.starts_with('.') {
        stem.insert(0, '_');
    }
    stem
}

/// Render the CFG of `func` as a Graphviz digraph
pub fn render_function(module: &Module, func: &Function) -> String {
    let names = ValueNames::new(module, func);
    let mut out = String::new();

    let _ = writeln!(out, "digraph \"{}\" {{", escape_id(func.name()));
    let _ = writeln!(out, "  node[shape=record margin=0.1 fontsize=10 fontname=\"monospace\"]");

    for block in func.blocks() {
        let mut label = format!("{{<h>{}:", escape(&names.block(block.id())));
        for (id, inst) in func.block_insts(block.id()) {
            let _ = write!(label, "\\l\\ \\ \\ {}", escape(&names.inst(id, inst)));
        }
        let branches = func
            .terminator(block.id())
            .is_some_and(|term| matches!(term.kind(), InstKind::CondJump { .. }));
        if branches {
            label.push_str("|{<t>T|<f>F}}");
        } else {
            label.push_str("\\l}");
        }
        let _ = writeln!(out, "  {}[label=\"{label}\"]", block.id());
    }

    for block in func.blocks() {
        for edge in block.out_edges() {
            let _ = match edge.kind {
                EdgeKind::Then => writeln!(out, "  {}:t -> {}:h [label=\"true\"]", edge.src, edge.dst),
                EdgeKind::Else => writeln!(out, "  {}:f -> {}:h [label=\"false\"]", edge.src, edge.dst),
                EdgeKind::Jump => writeln!(out, "  {} -> {}:h", edge.src, edge.dst),
            };
        }
    }

    out.push_str("}\n");
    out
}

/// Writes `<function>.dot` for every function into a directory. Names are
/// made file-safe; a name already taken in this run gets a numeric suffix
/// starting at the function's index.
#[derive(Debug, Clone)]
pub struct DotPass {
    out_dir: PathBuf,
}

impl DotPass {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }
}

impl Pass for DotPass {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn run_on_module(&mut self, module: &mut Module) -> Result<PassStats, IrError> {
        let io_error = |path: &PathBuf, err: std::io::Error| IrError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        };

        fs::create_dir_all(&self.out_dir).map_err(|err| io_error(&self.out_dir, err))?;

        let mut stats = PassStats::default();
        let mut used = HashSet::new();
        for func in module.functions() {
            let base = file_stem(func.name());
            let mut stem = base.clone();
            let mut suffix = func.id().index();
            while !used.insert(stem.clone()) {
                stem = format!("{base}.{suffix}");
                suffix += 1;
            }
            let path = self.out_dir.join(format!("{stem}.dot"));
            fs::write(&path, render_function(module, func)).map_err(|err| io_error(&path, err))?;
            debug!("Wrote {}", path.display());
            stats.functions_visited += 1;
            stats.files_written += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_record_characters() {
        assert_eq!(escape("{a|b}"), "\\{a\\|b\\}");
        assert_eq!(escape("%x = add %0, 1"), "%x = add %0, 1");
    }

    #[test]
    fn test_render_add() {
        let module = samples::add_module();
        let func = module.get_function("add").unwrap();
        let dot = render_function(&module, func);
        assert_eq!(
            dot,
            "digraph \"add\" {\n\
             \x20 node[shape=record margin=0.1 fontsize=10 fontname=\"monospace\"]\n\
             \x20 bb0[label=\"{<h>%entry:\\l\\ \\ \\ %sum = add %a, %b\\l\\ \\ \\ ret %sum\\l}\"]\n\
             }\n"
        );
    }

    #[test]
    fn test_branch_edges_use_ports() {
        let module = samples::fib_module();
        let func = module.get_function("fib").unwrap();
        let dot = render_function(&module, func);
        assert!(dot.contains("|{<t>T|<f>F}}"));
        assert!(dot.contains("bb0:t -> bb1:h [label=\"true\"]"));
        assert!(dot.contains("bb0:f -> bb2:h [label=\"false\"]"));
    }

    #[test]
    fn test_pass_writes_one_file_per_function() {
        let dir = tempfile::tempdir().unwrap();
        let mut module = samples::fib_module();
        let mut pass = DotPass::new(dir.path().join("graphs"));

        let stats = pass.run_on_module(&mut module).unwrap();
        assert_eq!(stats.files_written, 2);

        let text = std::fs::read_to_string(dir.path().join("graphs").join("fib.dot")).unwrap();
        assert!(text.starts_with("digraph \"fib\" {"));
        assert!(dir.path().join("graphs").join("main.dot").exists());
    }

    #[test]
    fn test_quoted_function_name() {
        let mut module = Module::new("m");
        let ty = module.types().proto(crate::ir::Type::Void, Vec::new());
        let f = module.add_func(ty, "say \"hi\" \\o/").as_func().unwrap();
        let entry = module.function_mut(f).append_block("entry");
        module.builder(f, entry).build_return_void();

        let dot = render_function(&module, module.function(f));
        assert!(dot.starts_with("digraph \"say \\\"hi\\\" \\\\o/\" {\n"));
    }

    #[test]
    fn test_jump_edges_follow_edge_kind() {
        let mut module = Module::new("m");
        let ty = module.types().proto(crate::ir::Type::Void, Vec::new());
        let f = module.add_func(ty, "two_jumps").as_func().unwrap();
        let func = module.function_mut(f);
        let entry = func.append_block("entry");
        let a = func.append_block("a");
        let b = func.append_block("b");

        let mut builder = module.builder(f, entry);
        builder.build_jump(a);
        builder.build_jump(b);
        builder.set_block(a);
        builder.build_return_void();
        builder.set_block(b);
        builder.build_return_void();

        let dot = render_function(&module, module.function(f));
        assert!(dot.contains("  bb0 -> bb1:h\n"));
        assert!(dot.contains("  bb0 -> bb2:h\n"));
        assert!(!dot.contains("bb0:t"));
    }

    #[test]
    fn test_file_stem_stays_in_directory() {
        assert_eq!(file_stem("fib"), "fib");
        assert_eq!(file_stem("../etc/passwd"), "_.._etc_passwd");
        assert_eq!(file_stem("a b"), "a_b");
        assert_eq!(file_stem(""), "_");
    }

    #[test]
    fn test_colliding_names_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut module = Module::new("m");
        for name in ["a/b", "a_b", "a?b"] {
            let ty = module.types().proto(crate::ir::Type::Void, Vec::new());
            module.add_func(ty, name);
        }

        let stats = DotPass::new(dir.path()).run_on_module(&mut module).unwrap();
        assert_eq!(stats.files_written, 3);
        let mut files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["a_b.1.dot", "a_b.2.dot", "a_b.dot"]);
    }
}
