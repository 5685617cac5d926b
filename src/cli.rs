//! Command-line interface for visitcheck.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::check::{CheckResult, Checker};
use crate::{ignore, parser, report};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default marker substring identifying the visitor family.
pub const DEFAULT_VISITOR_MARKER: &str = "StructuralHashVisitor::Visit";

/// Default filename suffix selecting the translation unit in a
/// compilation database.
pub const DEFAULT_UNIT_MARKER: &str = "ASTStructure.cpp";

/// CI gate verifying visitor coverage of API accessor surfaces.
///
/// Visitcheck locates the functions matching a visitor naming convention,
/// infers the API class each one targets from its single parameter, and
/// verifies that every public const instance accessor on those classes is
/// called by some visitor or whitelisted in the ignore list. Uncovered
/// methods fail the build.
#[derive(Parser)]
#[command(name = "visitcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a single source file
    Check(CheckArgs),
    /// Check the marked translation unit of a compilation database
    Compdb(CompdbArgs),
}

/// Arguments for direct-source mode.
#[derive(Parser)]
pub struct CheckArgs {
    /// Source file to analyze
    pub source: PathBuf,

    /// Ignore list of intentionally uncovered methods
    pub ignore_list: PathBuf,

    /// Marker substring identifying visitor functions
    #[arg(long, default_value = DEFAULT_VISITOR_MARKER)]
    pub visitor: String,
}

/// Arguments for compilation-database mode.
#[derive(Parser)]
pub struct CompdbArgs {
    /// Ignore list of intentionally uncovered methods
    pub ignore_list: PathBuf,

    /// Directory containing compile_commands.json
    pub database: PathBuf,

    /// Marker substring identifying visitor functions
    #[arg(long, default_value = DEFAULT_VISITOR_MARKER)]
    pub visitor: String,

    /// Filename suffix selecting the translation unit to analyze
    #[arg(long, default_value = DEFAULT_UNIT_MARKER)]
    pub unit: String,
}

/// Run direct-source mode. Violations go to the error stream.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let ignored = ignore::load(&args.ignore_list)?;
    let model = parser::parse_source(&args.source)?;
    let result = Checker::new(args.visitor.as_str()).run(&model, &ignored);
    finish(&result, &mut io::stderr(), &args.visitor)
}

/// Run compilation-database mode. Violations go to standard output.
pub fn run_compdb(args: &CompdbArgs) -> anyhow::Result<i32> {
    let ignored = ignore::load(&args.ignore_list)?;
    let commands = parser::load_database(&args.database)?;
    let unit = parser::find_unit(&commands, &args.unit)?;
    let model = parser::parse_source(&unit.source_path())?;
    let result = Checker::new(args.visitor.as_str()).run(&model, &ignored);
    finish(&result, &mut io::stdout(), &args.visitor)
}

fn finish<W: io::Write>(result: &CheckResult, out: &mut W, marker: &str) -> anyhow::Result<i32> {
    if result.visitor_count == 0 {
        eprintln!("Warning: no functions match visitor marker {:?}", marker);
    }

    report::write_violations(out, &result.violations)?;

    if result.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}
