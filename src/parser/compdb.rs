//! Compilation-database loading and translation-unit lookup.
//!
//! A compilation database is a `compile_commands.json` file in the format
//! emitted by CMake and most build systems. Only one translation unit is
//! ever analyzed: the first command whose source filename ends with the
//! configured unit marker (first match wins, scanning stops there).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// One entry of `compile_commands.json`.
///
/// Either `command` or `arguments` is present depending on the generator;
/// the checker needs neither, only the source file location.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
}

impl CompileCommand {
    /// Absolute path of the source file, resolving relative entries
    /// against the command's working directory.
    pub fn source_path(&self) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            Path::new(&self.directory).join(file)
        }
    }
}

/// Errors loading or querying a compilation database. All are fatal.
#[derive(Error, Debug)]
pub enum CompdbError {
    #[error("cannot read compilation database {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed compilation database {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no compile command matches unit {0:?}")]
    UnitNotFound(String),
}

/// Load `compile_commands.json` from a build directory.
pub fn load_database(dir: &Path) -> Result<Vec<CompileCommand>, CompdbError> {
    let path = dir.join("compile_commands.json");
    let content = fs::read_to_string(&path).map_err(|source| CompdbError::Unreadable {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CompdbError::Malformed { path, source })
}

/// Linear scan for the first command whose source filename ends with
/// `marker`.
pub fn find_unit<'a>(
    commands: &'a [CompileCommand],
    marker: &str,
) -> Result<&'a CompileCommand, CompdbError> {
    commands
        .iter()
        .find(|c| c.file.ends_with(marker))
        .ok_or_else(|| CompdbError::UnitNotFound(marker.to_string()))
}
