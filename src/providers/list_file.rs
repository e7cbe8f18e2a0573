//! Flat list files: one entry per line, `#` comments.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Read the non-comment, non-empty lines of a list file.
pub fn read_list_file(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Default)]
struct WriterState {
    /// Latest content requested while a write was in progress.
    pending: Option<Vec<String>>,
    /// Whether a drain task is currently running.
    writing: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<WriterState>,
    /// Mirrors `state.writing`, updated under the state lock.
    busy: watch::Sender<bool>,
}

/// Background writer for list files.
///
/// [`ListFileWriter::queue`] never blocks on I/O. The first request starts a
/// drain task on Tokio's blocking pool; requests arriving while it writes
/// only replace the pending content, which the same task picks up once the
/// current write is done. A request is therefore never lost and at most one
/// task writes the file. Outside a Tokio runtime the drain runs on the
/// calling thread.
#[derive(Debug, Clone)]
pub struct ListFileWriter {
    path: PathBuf,
    label: &'static str,
    shared: Arc<Shared>,
}

impl ListFileWriter {
    pub fn new(path: PathBuf, label: &'static str) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            path,
            label,
            shared: Arc::new(Shared {
                state: Mutex::new(WriterState::default()),
                busy,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file content with `lines`, asynchronously.
    pub fn queue(&self, lines: Vec<String>) {
        {
            let mut state = self.shared.state.lock();
            if state.writing {
                state.pending = Some(lines);
                return;
            }
            state.writing = true;
            self.shared.busy.send_replace(true);
        }

        let path = self.path.clone();
        let label = self.label;
        let shared = Arc::clone(&self.shared);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || drain(&path, label, lines, &shared));
            }
            Err(_) => {
                debug!(file = %path.display(), "no runtime, writing list file inline");
                drain(&path, label, lines, &shared);
            }
        }
    }

    /// Wait until every queued write has been flushed.
    pub async fn wait_idle(&self) {
        let mut busy = self.shared.busy.subscribe();
        // The sender lives in `self.shared`, so the channel cannot close here.
        let _ = busy.wait_for(|busy| !*busy).await;
    }

    pub fn is_writing(&self) -> bool {
        self.shared.state.lock().writing
    }
}

fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text)
}

fn drain(path: &Path, label: &str, mut active: Vec<String>, shared: &Shared) {
    loop {
        match write_lines(path, &active) {
            Ok(()) => debug!(file = %path.display(), lines = active.len(), "list file written"),
            Err(err) => warn!(
                "could not open `{}` for writing, {} are not saved: {}",
                path.display(),
                label,
                err
            ),
        }

        let mut state = shared.state.lock();
        match state.pending.take() {
            Some(next) => active = next,
            None => {
                state.writing = false;
                shared.busy.send_replace(false);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_list_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "# header\n/a/b.bin\n\n  # indented comment\nrel/c.bin\n").unwrap();

        assert_eq!(read_list_file(&path).unwrap(), ["/a/b.bin", "rel/c.bin"]);
        assert!(read_list_file(&dir.path().join("missing.txt")).is_err());
    }

    #[tokio::test]
    async fn test_last_request_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/favorites.txt");
        let writer = ListFileWriter::new(path.clone(), "favorites");

        for idx in 0..20 {
            writer.queue(vec!["# header".into(), format!("/games/{idx}.bin")]);
        }
        writer.wait_idle().await;

        assert!(!writer.is_writing());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# header\n/games/19.bin\n"
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // The target is a directory, so opening it for writing fails.
        let writer = ListFileWriter::new(dir.path().to_path_buf(), "whitelists");
        writer.queue(vec!["x".into()]);
        writer.wait_idle().await;
        assert!(!writer.is_writing());
    }

    #[test]
    fn test_writes_inline_without_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.txt");
        let writer = ListFileWriter::new(path.clone(), "favorites");

        writer.queue(vec!["/games/a.bin".into()]);
        assert!(!writer.is_writing());
        assert_eq!(fs::read_to_string(&path).unwrap(), "/games/a.bin\n");
    }
}
