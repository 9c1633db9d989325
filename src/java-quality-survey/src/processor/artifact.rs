//! Locating CK output.
//!
//! CK builds its output paths by string concatenation, so depending on the
//! version and on trailing separators it writes `class.csv` either into the
//! requested output directory or into the process's current directory. This
//! is the only place that knows about it: callers get the artifact at the
//! output path or nothing.

use super::error::ProcessError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// CK's per-class output.
pub const CLASS_ARTIFACT: &str = "class.csv";

/// Other CK outputs that must not leak into the next repository's run.
pub const SIDE_ARTIFACTS: [&str; 3] = ["method.csv", "field.csv", "variable.csv"];

/// Returns the path of `class.csv` inside `output_dir`, relocating it from
/// `stray_dir` first if CK dropped it there.
///
/// Stray side artifacts are deleted. `None` means CK produced nothing,
/// which usually means the repository has no Java sources.
///
/// # Errors
///
/// Returns [`ProcessError::Artifact`] if the stray artifact cannot be moved.
pub fn collect_artifact(stray_dir: &Path, output_dir: &Path) -> Result<Option<PathBuf>, ProcessError> {
    let destination = output_dir.join(CLASS_ARTIFACT);
    let stray = stray_dir.join(CLASS_ARTIFACT);

    if stray.is_file() {
        debug!(from = %stray.display(), to = %destination.display(), "Relocating stray CK output");
        move_file(&stray, &destination).map_err(|source| ProcessError::Artifact {
            path: stray.display().to_string(),
            source,
        })?;
        remove_artifacts(stray_dir, &SIDE_ARTIFACTS);
        return Ok(Some(destination));
    }

    if destination.is_file() {
        return Ok(Some(destination));
    }

    Ok(None)
}

/// Renames, falling back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}

/// Deletes every CK output from `stray_dir`.
///
/// Run before each analysis and after a failed one, so a stray `class.csv`
/// always belongs to the repository that just ran.
pub fn clear_stray_artifacts(stray_dir: &Path) {
    remove_artifacts(stray_dir, &[CLASS_ARTIFACT]);
    remove_artifacts(stray_dir, &SIDE_ARTIFACTS);
}

fn remove_artifacts(stray_dir: &Path, names: &[&str]) {
    for name in names {
        let path = stray_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed stray CK output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stray CK output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn relocates_stray_output_and_removes_side_files() {
        let temp = TempDir::new().unwrap();
        let stray = temp.path().join("cwd");
        let output = temp.path().join("out");
        fs::create_dir_all(&stray).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(stray.join("class.csv"), "cbo\n1\n").unwrap();
        fs::write(stray.join("method.csv"), "x\n").unwrap();
        fs::write(stray.join("variable.csv"), "x\n").unwrap();

        let found = collect_artifact(&stray, &output).unwrap();

        assert_eq!(found, Some(output.join("class.csv")));
        assert_eq!(fs::read_to_string(output.join("class.csv")).unwrap(), "cbo\n1\n");
        assert!(!stray.join("class.csv").exists());
        assert!(!stray.join("method.csv").exists());
        assert!(!stray.join("variable.csv").exists());
    }

    #[test]
    fn uses_output_directory_when_ck_behaves() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("class.csv"), "cbo\n1\n").unwrap();

        let found = collect_artifact(&temp.path().join("cwd"), &output).unwrap();

        assert_eq!(found, Some(output.join("class.csv")));
    }

    #[test]
    fn clearing_removes_leftover_output() {
        let temp = TempDir::new().unwrap();
        for name in ["class.csv", "method.csv", "field.csv", "notes.txt"] {
            fs::write(temp.path().join(name), "x\n").unwrap();
        }

        clear_stray_artifacts(temp.path());

        assert!(!temp.path().join("class.csv").exists());
        assert!(!temp.path().join("method.csv").exists());
        assert!(!temp.path().join("field.csv").exists());
        assert!(temp.path().join("notes.txt").exists());
        assert_eq!(collect_artifact(temp.path(), &temp.path().join("out")).unwrap(), None);
    }

    #[test]
    fn nothing_produced() {
        let temp = TempDir::new().unwrap();
        assert_eq!(collect_artifact(temp.path(), temp.path()).unwrap(), None);
    }
}
