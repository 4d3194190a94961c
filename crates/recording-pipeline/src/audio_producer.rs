//! Audio producer (spec.md §4.C11): spawns the native recorder helper that
//! writes a WAV file; stop sends a soft termination and gives the helper a
//! short grace window to flush before checking whether anything was
//! written. Empty files are treated as "no audio".

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::warn;

use crate::errors::RecordingError;

pub struct AudioProducer {
    program: String,
    args: Vec<String>,
    output_path: PathBuf,
}

impl AudioProducer {
    pub fn new(program: impl Into<String>, args: Vec<String>, output_path: PathBuf) -> Self {
        Self {
            program: program.into(),
            args,
            output_path,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub async fn start(&self) -> Result<Child, RecordingError> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(&self.output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| RecordingError::HelperSpawnFailed(self.program.clone(), err.to_string()))
    }
}

/// Soft-terminates `child`, waits up to `grace` for its output file to
/// flush, and returns the file's path only if it ended up non-empty.
pub async fn stop_and_collect(mut child: Child, output_path: &Path, grace: Duration) -> Option<PathBuf> {
    if let Err(err) = child.start_kill() {
        warn!(error = %err, "audio-producer: failed to signal recorder for shutdown");
    }
    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        warn!("audio-producer: recorder did not exit within the flush grace window");
    }

    match tokio::fs::metadata(output_path).await {
        Ok(meta) if meta.len() > 0 => Some(output_path.to_path_buf()),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, path = %output_path.display(), "audio-producer: no recording file found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn an_empty_file_is_treated_as_no_audio() {
        let dir = std::env::temp_dir().join(format!("uia-audio-test-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("empty.wav");
        tokio::fs::write(&path, b"").await.unwrap();

        let child = Command::new("sh")
            .args(["-c", "sleep 0"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let result = stop_and_collect(child, &path, Duration::from_millis(200)).await;
        assert!(result.is_none());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn a_non_empty_file_is_returned() {
        let dir = std::env::temp_dir().join(format!("uia-audio-test2-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("sound.wav");
        tokio::fs::write(&path, b"RIFF....WAVEfmt ").await.unwrap();

        let child = Command::new("sh")
            .args(["-c", "sleep 0"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let result = stop_and_collect(child, &path, Duration::from_millis(200)).await;
        assert_eq!(result.as_deref(), Some(path.as_path()));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
