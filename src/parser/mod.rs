//! Source-to-model frontends.
//!
//! The checker consumes a `ProgramModel`; this module produces one. The
//! C++ frontend is a best-effort syntactic pass built on tree-sitter: it
//! resolves receiver types lexically from declared parameter and local
//! variable types rather than through semantic analysis. That is the
//! precision the exact-type coverage rule needs, since only declared
//! static types ever count.

mod compdb;
mod cpp;

pub use compdb::{find_unit, load_database, CompdbError, CompileCommand};
pub use cpp::CppModelBuilder;

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::model::ProgramModel;

/// Read and parse a single source file into a program model.
pub fn parse_source(path: &Path) -> anyhow::Result<ProgramModel> {
    let source = fs::read(path)
        .with_context(|| format!("cannot read source file {}", path.display()))?;
    CppModelBuilder::new().build(path, &source)
}
