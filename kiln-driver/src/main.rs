//! Kiln IR Driver
//!
//! Command-line front door to the IR library: builds the bundled sample
//! modules, runs the pass pipeline over them and prints the result.

use clap::{Parser, Subcommand};
use kiln_common::CompilerError;
use kiln_ir::{samples, verify_module, PassManager, TypeRegistry};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Kiln IR toolkit")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a sample module and run the pass pipeline over it
    Demo {
        /// Which sample to build (add, fib, diamond)
        #[arg(default_value = "fib")]
        name: String,

        /// Print IR to stdout after the passes ran
        #[arg(long)]
        print_ir: bool,

        /// Write one Graphviz file per function into this directory
        #[arg(long)]
        dot_dir: Option<PathBuf>,

        /// Skip unreachable block elimination
        #[arg(long)]
        no_prune: bool,

        /// Print the pass report as JSON
        #[arg(long)]
        stats_json: bool,
    },

    /// Parse a type descriptor such as `Pi32i32:i32` and print it
    Type {
        descriptor: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Demo { name, print_ir, dot_dir, no_prune, stats_json } => {
            run_demo(&name, print_ir, dot_dir, no_prune, stats_json)
        }
        Commands::Type { descriptor } => print_type(&descriptor),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_demo(
    name: &str,
    print_ir: bool,
    dot_dir: Option<PathBuf>,
    no_prune: bool,
    stats_json: bool,
) -> Result<(), CompilerError> {
    let Some(mut module) = samples::by_name(name) else {
        return Err(CompilerError::InvalidInput {
            message: format!(
                "unknown sample '{name}', expected one of: {}",
                samples::SAMPLE_NAMES.join(", ")
            ),
        });
    };
    info!("Built sample module '{}'", module.name());

    module.diagnostics().print_diagnostics();
    module.diagnostics().check()?;

    let mut manager = if no_prune {
        let mut manager = PassManager::new();
        if let Some(dir) = dot_dir {
            manager.register(kiln_ir::DotPass::new(dir));
        }
        manager
    } else {
        PassManager::with_default_pipeline(dot_dir)
    };

    let report = manager.run(&mut module)?;
    verify_module(&module)?;

    if print_ir {
        print!("{}", module.display());
    }

    if stats_json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| CompilerError::IoError {
            message: e.to_string(),
        })?;
        println!("{json}");
    } else {
        println!(
            "{}: {} functions, {} blocks removed, {} edges removed, {} files written",
            report.module,
            module.functions().len(),
            report.total.blocks_removed,
            report.total.edges_removed,
            report.total.files_written
        );
    }

    Ok(())
}

fn print_type(descriptor: &str) -> Result<(), CompilerError> {
    let registry = TypeRegistry::new();
    let ty = registry.parse(descriptor)?;
    println!("{ty}");
    Ok(())
}
