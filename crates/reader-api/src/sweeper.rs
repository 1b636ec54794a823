//! Sweeps `local-storage/instant-screenshots/*.png` older than 48 hours.
//! Same time-bounded-then-stale shape as `CacheEntry`, expressed over the
//! filesystem instead of a store.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

const MAX_AGE: Duration = Duration::from_secs(48 * 3600);

/// One sweep pass: removes every file in `dir` whose mtime is older than
/// [`MAX_AGE`]. Missing `dir` is not an error, nothing has been written
/// yet.
pub async fn sweep_once(dir: &Path) -> anyhow::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_expired(&entry, now).await {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                removed += 1;
                debug!(path = %path.display(), "swept expired screenshot");
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed to sweep screenshot"),
        }
    }
    Ok(removed)
}

async fn is_expired(entry: &tokio::fs::DirEntry, now: SystemTime) -> bool {
    let Ok(metadata) = entry.metadata().await else { return false };
    let Ok(modified) = metadata.modified() else { return false };
    expired_at(now, modified)
}

fn expired_at(now: SystemTime, modified: SystemTime) -> bool {
    now.duration_since(modified).is_ok_and(|age| age > MAX_AGE)
}

/// Spawns a loop that sweeps `dir` once an hour, for the lifetime of the
/// process.
pub fn spawn_sweeper(dir: PathBuf) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match sweep_once(&dir).await {
                Ok(removed) if removed > 0 => debug!(removed, "screenshot sweep completed"),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "screenshot sweep failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn expired_past_48_hours() {
        let now = SystemTime::now();
        let old = now - MAX_AGE - StdDuration::from_secs(60);
        let fresh = now - StdDuration::from_secs(60);
        assert!(expired_at(now, old));
        assert!(!expired_at(now, fresh));
    }

    #[tokio::test]
    async fn sweeps_freshly_written_file_is_never_removed() {
        let dir = tempfile::tempdir().unwrap();
        let fresh_path = dir.path().join("screenshot-fresh.png");
        tokio::fs::write(&fresh_path, b"fresh").await.unwrap();

        let removed = sweep_once(dir.path()).await.unwrap();
        assert_eq!(removed, 0);
        assert!(fresh_path.exists());
    }

    #[tokio::test]
    async fn missing_directory_is_not_an_error() {
        let removed = sweep_once(Path::new("/nonexistent/reader-sweeper-dir")).await.unwrap();
        assert_eq!(removed, 0);
    }
}
