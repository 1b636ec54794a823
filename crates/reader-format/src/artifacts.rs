//! Screenshot/pageshot persistence, grounded on `riptide-headless`'s
//! artifact-capture convention of a `Uuid::new_v4()`-named file written
//! under a run-scoped directory (`pool.rs`'s per-instance temp profile
//! naming, generalized from a browser profile dir to a screenshot dir).

use std::path::{Path, PathBuf};

use reader_types::Result;
use uuid::Uuid;

/// Where instant-screenshot artifacts are written and how their public
/// URL is derived (`http://{host}/instant-screenshots/{file}`, §4.4).
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists `bytes` as `screenshot-{uuid}.png` and returns the
    /// `http://{host}/instant-screenshots/{file}` URL.
    pub async fn persist(&self, host: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("screenshot-{}.png", Uuid::new_v4());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("http://{host}/instant-screenshots/{file_name}"))
    }
}
