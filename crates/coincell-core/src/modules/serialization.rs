use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn format_scientific_f64(value: f64, precision: usize) -> String {
    format!("{value:.precision$e}", precision = precision)
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to create a staging file in '{}': {source}", directory.display())]
    Create { directory: PathBuf, source: io::Error },
    #[error("failed to write staged artifact for '{}': {source}", destination.display())]
    Write { destination: PathBuf, source: io::Error },
    #[error("artifact destination '{}' is a directory", destination.display())]
    Blocked { destination: PathBuf },
    #[error("failed to move staged artifact into '{}': {source}", destination.display())]
    Persist { destination: PathBuf, source: io::Error },
}

impl StageError {
    pub fn destination(&self) -> &Path {
        match self {
            Self::Create { directory, .. } => directory,
            Self::Write { destination, .. }
            | Self::Blocked { destination }
            | Self::Persist { destination, .. } => destination,
        }
    }
}

/// Text artifacts written to temporary files next to their destinations.
///
/// Nothing becomes visible under a destination name until
/// [`StagedArtifacts::persist_all`] runs; dropping the stage removes every
/// temporary file.
#[derive(Debug, Default)]
pub struct StagedArtifacts {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn stage_text(&mut self, destination: &Path, content: &str) -> Result<(), StageError> {
        let directory = staging_directory(destination);
        let mut file = NamedTempFile::new_in(&directory).map_err(|source| StageError::Create {
            directory: directory.clone(),
            source,
        })?;
        file.write_all(normalize_text_artifact(content).as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| StageError::Write {
                destination: destination.to_path_buf(),
                source,
            })?;
        self.staged.push((file, destination.to_path_buf()));
        Ok(())
    }

    /// Moves every staged file into place.
    ///
    /// Destinations are checked before the first move. If a move still
    /// fails, the files already moved by this call are removed again.
    pub fn persist_all(self) -> Result<Vec<PathBuf>, StageError> {
        if let Some((_, destination)) = self
            .staged
            .iter()
            .find(|(_, destination)| destination.is_dir())
        {
            return Err(StageError::Blocked {
                destination: destination.clone(),
            });
        }

        let mut written = Vec::with_capacity(self.staged.len());
        for (file, destination) in self.staged {
            if let Err(error) = file.persist(&destination) {
                for path in &written {
                    let _ = fs::remove_file(path);
                }
                return Err(StageError::Persist {
                    destination,
                    source: error.error,
                });
            }
            written.push(destination);
        }
        Ok(written)
    }
}

fn staging_directory(destination: &Path) -> PathBuf {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        StageError, StagedArtifacts, format_fixed_f64, format_scientific_f64,
        normalize_text_artifact,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn fixed_width_float_formatting_is_deterministic() {
        let first = format_fixed_f64(1.23, 13, 5);
        let second = format_fixed_f64(1.23, 13, 5);

        assert_eq!(first, "      1.23000");
        assert_eq!(first, second);
    }

    #[test]
    fn scientific_formatting_keeps_small_spin_downs_readable() {
        assert_eq!(format_scientific_f64(-1.0e-9, 6), "-1.000000e-9");
    }

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn staged_artifacts_appear_only_after_persist() {
        let temp = TempDir::new().expect("tempdir should be created");
        let first = temp.path().join("first.dat");
        let second = temp.path().join("second.dat");

        let mut stage = StagedArtifacts::new();
        stage.stage_text(&first, "line 1\r\nline 2").expect("first stage");
        stage.stage_text(&second, "").expect("second stage");
        assert_eq!(stage.len(), 2);
        assert!(!first.exists());
        assert!(!second.exists());

        let written = stage.persist_all().expect("persist should succeed");
        assert_eq!(written, vec![first.clone(), second.clone()]);
        assert_eq!(fs::read(&first).expect("readable"), b"line 1\nline 2\n");
        assert_eq!(fs::read(&second).expect("readable"), b"");
    }

    #[test]
    fn dropped_stage_leaves_no_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        {
            let mut stage = StagedArtifacts::new();
            stage
                .stage_text(&temp.path().join("dump.dat"), "content")
                .expect("stage should succeed");
        }
        let remaining = fs::read_dir(temp.path()).expect("listable").count();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn missing_directory_fails_at_staging() {
        let temp = TempDir::new().expect("tempdir should be created");
        let destination = temp.path().join("absent").join("dump.dat");
        let mut stage = StagedArtifacts::new();
        let error = stage
            .stage_text(&destination, "content")
            .expect_err("missing directory should fail");
        assert!(matches!(error, StageError::Create { .. }));
        assert_eq!(error.destination(), temp.path().join("absent"));
    }

    #[test]
    fn directory_destination_blocks_every_persist() {
        let temp = TempDir::new().expect("tempdir should be created");
        let first = temp.path().join("first.dat");
        let blocked = temp.path().join("second.dat");
        fs::create_dir(&blocked).expect("blocking directory");

        let mut stage = StagedArtifacts::new();
        stage.stage_text(&first, "content").expect("first stage");
        stage.stage_text(&blocked, "content").expect("second stage");
        let error = stage.persist_all().expect_err("directory destination should fail");

        assert!(matches!(error, StageError::Blocked { .. }));
        assert_eq!(error.destination(), blocked);
        assert!(!first.exists());
    }

    #[test]
    fn failed_persist_removes_files_already_moved() {
        let temp = TempDir::new().expect("tempdir should be created");
        let kept_dir = temp.path().join("kept");
        let lost_dir = temp.path().join("lost");
        fs::create_dir(&kept_dir).expect("kept dir");
        fs::create_dir(&lost_dir).expect("lost dir");
        let first = kept_dir.join("first.dat");

        let mut stage = StagedArtifacts::new();
        stage.stage_text(&first, "content").expect("first stage");
        stage
            .stage_text(&lost_dir.join("second.dat"), "content")
            .expect("second stage");
        fs::remove_dir_all(&lost_dir).expect("staging dir removed");

        let error = stage.persist_all().expect_err("vanished staging file should fail");
        assert!(matches!(error, StageError::Persist { .. }));
        assert!(!first.exists());
        assert_eq!(fs::read_dir(&kept_dir).expect("listable").count(), 0);
    }
}
