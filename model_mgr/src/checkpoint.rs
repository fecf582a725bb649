//! Checkpoint directory layout: one file per persisted step, named by
//! its decimal step number, plus the well-known `best` key maintained
//! by the online tester.

use std::path::{Path, PathBuf};

use tokio::{fs, io};

use comms::ParamsBlob;

/// Well-known key for the best-evaluated checkpoint.
pub const BEST_KEY: &str = "best";

/// Path of the checkpoint file for `step`.
pub fn step_path(model_dir: &Path, step: u64) -> PathBuf {
    model_dir.join(step.to_string())
}

/// Path of the `best` checkpoint file.
pub fn best_path(model_dir: &Path) -> PathBuf {
    model_dir.join(BEST_KEY)
}

/// Lists the step keys currently visible in `model_dir`.
///
/// Only names consisting entirely of ASCII digits are step keys; `best`,
/// in-flight temp files and any other garbage are ignored.
pub async fn list_steps(model_dir: &Path) -> io::Result<Vec<u64>> {
    let mut steps = Vec::new();
    let mut entries = fs::read_dir(model_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(step) = name.parse() {
            steps.push(step);
        }
    }

    Ok(steps)
}

/// Commits `blob` at `path`: written to a temp name first and renamed
/// into place, so a checkpoint only becomes visible under its final
/// name once fully written. The temp name carries a non-digit suffix
/// and is therefore invisible to `list_steps`.
pub async fn commit_blob(path: &Path, blob: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, blob).await?;
    fs::rename(&tmp, path).await
}

/// Reads back a committed blob.
pub async fn read_blob(path: &Path) -> io::Result<ParamsBlob> {
    fs::read(path).await
}
