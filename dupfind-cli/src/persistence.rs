use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

/// Name of the cross-run persistence file, read at start and overwritten
/// at the end of every run — grounded on `cur.py`'s `CUR_FILENAME`.
pub const CUR_FILENAME: &str = ".cur.rent";

/// The `<total_severity>/<total_lines>` figures from a previous run, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousRun {
    pub total_severity: i64,
    pub total_lines: usize,
}

/// Reads `.cur.rent` in `dir`. A missing file is not an error and
/// reports as `None`; any other I/O error, or a file whose contents
/// don't parse as `"<int>/<int>"`, is propagated.
pub fn read_previous_run(dir: &Path) -> Result<Option<PreviousRun>> {
    let path = dir.join(CUR_FILENAME);
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("could not read `{}`", path.display()));
        }
    };
    parse_previous_run(&contents)
        .with_context(|| format!("`{}` does not contain a valid `severity/lines` pair", path.display()))
        .map(Some)
}

fn parse_previous_run(contents: &str) -> Result<PreviousRun> {
    let trimmed = contents.trim();
    let (severity, lines) = trimmed
        .split_once('/')
        .context("expected a single '/' separating severity and line count")?;
    let total_severity: i64 = severity.parse().context("severity is not an integer")?;
    let total_lines: usize = lines.parse().context("line count is not an integer")?;
    Ok(PreviousRun {
        total_severity,
        total_lines,
    })
}

/// Overwrites `.cur.rent` in `dir` with the current run's totals.
pub fn write_current_run(dir: &Path, total_severity: i64, total_lines: usize) -> Result<()> {
    let path = dir.join(CUR_FILENAME);
    std::fs::write(&path, format!("{}/{}", total_severity, total_lines))
        .with_context(|| format!("could not write `{}`", path.display()))
}
