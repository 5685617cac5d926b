//! Visitcheck - visitor coverage gate for API accessor surfaces.
//!
//! Given one parsed translation unit, visitcheck verifies that every
//! public, const, instance-level accessor method on the API classes
//! targeted by a family of visitor functions is actually called by some
//! visitor - or is explicitly whitelisted in an externally maintained
//! ignore list. Missing coverage is a build failure, not a warning.
//!
//! # Architecture
//!
//! - `model`: the read-only program model (classes, methods, call trees)
//! - `parser`: frontends producing models - tree-sitter C++ parsing and
//!   compilation-database unit lookup
//! - `check`: the core pass - visitor location, call collection, catalog
//!   construction, coverage diff
//! - `ignore`: unified ignore-list loading
//! - `report`: plain-text violation output

pub mod check;
pub mod cli;
pub mod ignore;
pub mod model;
pub mod parser;
pub mod report;

pub use check::{CheckResult, Checker};
pub use model::{Access, BodyNode, CallSite, ClassDecl, FunctionDecl, MethodSig, ProgramModel};
pub use parser::{CompileCommand, CppModelBuilder};
