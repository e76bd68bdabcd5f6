//! Pass Manager
//!
//! Passes run in registration order, each over the whole module.

use log::debug;
use serde::{Deserialize, Serialize};
use crate::error::IrError;
use crate::ir::{Function, Module};
use crate::passes::{DotPass, UnreachableBlockElimination};
use std::path::PathBuf;

/// A pass over a module
pub trait Pass {
    /// Get the name of this pass
    fn name(&self) -> &'static str;

    /// Run the pass on a function (default implementation does nothing)
    fn run_on_function(&mut self, _function: &mut Function) -> Result<PassStats, IrError> {
        Ok(PassStats::default())
    }

    /// Run the pass on a module, by default once per function
    fn run_on_module(&mut self, module: &mut Module) -> Result<PassStats, IrError> {
        let mut stats = PassStats::default();
        for function in module.functions_mut() {
            stats.merge(&self.run_on_function(function)?);
            stats.functions_visited += 1;
        }
        Ok(stats)
    }
}

/// What a pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub functions_visited: usize,
    pub blocks_removed: usize,
    pub edges_removed: usize,
    pub files_written: usize,
}

impl PassStats {
    pub fn merge(&mut self, other: &PassStats) {
        self.functions_visited += other.functions_visited;
        self.blocks_removed += other.blocks_removed;
        self.edges_removed += other.edges_removed;
        self.files_written += other.files_written;
    }

    pub fn modified(&self) -> bool {
        self.blocks_removed > 0 || self.edges_removed > 0
    }
}

/// Statistics of one pass run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRecord {
    pub pass: String,
    pub stats: PassStats,
}

/// Statistics of a whole pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub module: String,
    pub passes: Vec<PassRecord>,
    pub total: PassStats,
}

/// Runs registered passes in order
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass at the end of the pipeline
    pub fn register<P: Pass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// Unreachable block elimination, followed by Graphviz output when
    /// `dot_dir` is given
    pub fn with_default_pipeline(dot_dir: Option<PathBuf>) -> Self {
        let mut manager = Self::new();
        manager.register(UnreachableBlockElimination);
        if let Some(dir) = dot_dir {
            manager.register(DotPass::new(dir));
        }
        manager
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Run all passes on a module, stopping at the first failure
    pub fn run(&mut self, module: &mut Module) -> Result<PassReport, IrError> {
        let mut report = PassReport {
            module: module.name().to_string(),
            ..PassReport::default()
        };

        for pass in &mut self.passes {
            debug!("Running pass '{}' on module '{}'", pass.name(), module.name());
            let stats = pass.run_on_module(module)?;
            debug!("Pass '{}' finished: {:?}", pass.name(), stats);
            report.total.merge(&stats);
            report.passes.push(PassRecord { pass: pass.name().to_string(), stats });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use pretty_assertions::assert_eq;

    struct CountingPass {
        seen: Vec<String>,
    }

    impl Pass for CountingPass {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn run_on_function(&mut self, function: &mut Function) -> Result<PassStats, IrError> {
            self.seen.push(function.name().to_string());
            Ok(PassStats::default())
        }
    }

    #[test]
    fn test_default_run_visits_every_function() {
        let mut module = samples::fib_module();
        let mut pass = CountingPass { seen: Vec::new() };
        let stats = pass.run_on_module(&mut module).unwrap();
        assert_eq!(pass.seen, vec!["fib".to_string(), "main".to_string()]);
        assert_eq!(stats.functions_visited, 2);
        assert!(!stats.modified());
    }

    #[test]
    fn test_report_aggregates_in_order() {
        let mut module = samples::diamond_with_orphan_module();
        let mut manager = PassManager::new();
        manager.register(UnreachableBlockElimination);
        manager.register(UnreachableBlockElimination);
        assert_eq!(manager.pass_names(), vec!["unreachable-block-elim", "unreachable-block-elim"]);

        let report = manager.run(&mut module).unwrap();
        assert_eq!(report.module, "diamond");
        assert_eq!(report.passes.len(), 2);
        assert_eq!(report.passes[0].stats.blocks_removed, 1);
        assert_eq!(report.passes[1].stats.blocks_removed, 0);
        assert_eq!(report.total.blocks_removed, 1);
        assert_eq!(report.total.functions_visited, 2);
    }

    #[test]
    fn test_report_serializes() {
        let mut module = samples::add_module();
        let report = PassManager::with_default_pipeline(None).run(&mut module).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["module"], "add");
        assert_eq!(json["passes"][0]["pass"], "unreachable-block-elim");
        assert_eq!(json["total"]["blocks_removed"], 0);
    }
}
