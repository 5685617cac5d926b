//! Plain-text reporting of coverage violations.
//!
//! Full coverage produces no output at all. Violations produce a header
//! line followed by one qualified name per line, in the order the differ
//! emitted them (already sorted).

use std::io::{self, Write};

/// Header preceding the violation list.
pub const HEADER: &str = "Following methods are never called and not marked unused:";

/// Write the violation report to `out`. Writes nothing when the list is
/// empty.
pub fn write_violations<W: Write>(out: &mut W, violations: &[String]) -> io::Result<()> {
    if violations.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}", HEADER)?;
    for name in violations {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
