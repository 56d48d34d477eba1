//! `hash` command: print integrity values of local files.

use std::{
    fs,
    io::{Write, stdout},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::debug;
use crate::integrity::Integrity;

/// Compute the integrity value of a single file.
pub fn hash_file(path: &Path) -> Result<Integrity> {
    let content = fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    debug!("hash"; "{} ({} bytes)", path.display(), content.len());
    Ok(Integrity::compute(content))
}

/// Print `<integrity>  <path>` for each file, in argument order.
pub fn hash_files(files: &[PathBuf]) -> Result<()> {
    let mut out = stdout().lock();
    for path in files {
        let integrity = hash_file(path)?;
        writeln!(out, "{integrity}  {}", path.display())?;
    }
    out.flush()?;
    Ok(())
}
