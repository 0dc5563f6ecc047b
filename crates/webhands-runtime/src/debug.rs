//! Debug artifacts written next to each step.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::warn;

/// Writes artifacts under `{root}/{task_id}`. Failures are logged, never fatal.
#[derive(Debug, Clone)]
pub struct DebugWriter {
    task_dir: PathBuf,
}

impl DebugWriter {
    pub fn new(root: impl AsRef<Path>, task_id: &str) -> Self {
        Self {
            task_dir: root.as_ref().join(task_id),
        }
    }

    pub fn task_dir(&self) -> &Path {
        &self.task_dir
    }

    pub fn step_dir(&self, idx: usize) -> PathBuf {
        self.task_dir.join(format!("step-{}", idx))
    }

    /// Create the step directory and return it.
    pub async fn prepare_step(&self, idx: usize) -> Option<PathBuf> {
        let dir = self.step_dir(idx);
        match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => Some(dir),
            Err(e) => {
                warn!("Failed to create debug dir {}: {}", dir.display(), e);
                None
            }
        }
    }

    pub async fn write_text(&self, path: &Path, text: &str) {
        if let Err(e) = tokio::fs::write(path, text).await {
            warn!("Failed to write {}: {}", path.display(), e);
        }
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.write_text(path, &text).await,
            Err(e) => warn!("Failed to serialize {}: {}", path.display(), e),
        }
    }

    /// Decode a base64 PNG and write it.
    pub async fn write_png(&self, path: &Path, data: &str) {
        match STANDARD.decode(data) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(path, bytes).await {
                    warn!("Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("Screenshot is not valid base64: {}", e),
        }
    }

    pub async fn write_task_output<T: Serialize + ?Sized>(&self, output: &T) {
        if let Err(e) = tokio::fs::create_dir_all(&self.task_dir).await {
            warn!("Failed to create debug dir {}: {}", self.task_dir.display(), e);
            return;
        }
        self.write_json(&self.task_dir.join("taskOutput.json"), output)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_step_artifacts() {
        let tmp = TempDir::new().unwrap();
        let writer = DebugWriter::new(tmp.path(), "task-1");

        let dir = writer.prepare_step(0).await.unwrap();
        assert_eq!(dir, tmp.path().join("task-1").join("step-0"));

        writer.write_text(&dir.join("elems.txt"), "[1]<a>x</a>").await;
        writer.write_png(&dir.join("screenshot.png"), "iVBORw0KGgo=").await;
        writer
            .write_json(&dir.join("stepOutput.json"), &json!({"idx": 0}))
            .await;

        assert_eq!(
            std::fs::read_to_string(dir.join("elems.txt")).unwrap(),
            "[1]<a>x</a>"
        );
        let png = std::fs::read(dir.join("screenshot.png")).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let step: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("stepOutput.json")).unwrap())
                .unwrap();
        assert_eq!(step["idx"], 0);
    }

    #[tokio::test]
    async fn test_invalid_png_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let writer = DebugWriter::new(tmp.path(), "t");
        let dir = writer.prepare_step(3).await.unwrap();
        writer.write_png(&dir.join("screenshot.png"), "***").await;
        assert!(!dir.join("screenshot.png").exists());
    }

    #[tokio::test]
    async fn test_task_output() {
        let tmp = TempDir::new().unwrap();
        let writer = DebugWriter::new(tmp.path(), "t");
        writer.write_task_output(&json!({"status": "completed"})).await;
        assert!(tmp.path().join("t").join("taskOutput.json").exists());
    }
}
