use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `records` as a pretty-printed JSON array at `dest`.
///
/// The document is staged in a temp file in the destination directory and
/// moved into place with an atomic rename, so a failed run never leaves a
/// truncated artifact behind. The file is fully overwritten on every run.
pub fn write_artifact<T: Serialize>(records: &[T], dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, records)?;
    tmp.write_all(b"\n")?;
    tmp.persist(dest).map_err(|e| e.error)?;

    debug!(path = %dest.display(), count = records.len(), "wrote artifact");
    Ok(())
}
