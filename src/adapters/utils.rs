//! Shared filesystem helpers for the adapter layer.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `data` to `path` atomically: a sibling temp file is written,
/// flushed, then renamed over the target.  Readers see the old content or
/// the new content, never a partial file.  Missing parents are created.
pub(super) fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
