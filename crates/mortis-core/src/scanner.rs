//! Directory listing for the file browser.
//!
//! A listing runs on its own thread and reports back over a channel that the
//! interactive thread polls once per tick. Every request gets a generation
//! number; only the result of the newest request is ever applied, and
//! starting a new request cancels the previous one.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use serde::Serialize;

use crate::paths::{available_roots, parent_path};

/// One child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

/// List the immediate children of `dir`.
///
/// With a non-empty `filters`, files are kept only if their extension
/// matches one of them (case-insensitive, with or without the leading dot).
/// Directories are never filtered. Directories come first, then files, each
/// group ordered case-insensitively by name. Any error opening `dir` gives an
/// empty listing; unreadable children are skipped.
pub fn scan_directory(dir: &Path, filters: &[String]) -> Vec<ScanEntry> {
    scan_directory_cancellable(dir, filters, &AtomicBool::new(false)).unwrap_or_default()
}

/// Like [`scan_directory`], but returns `None` as soon as `cancel` is set.
pub fn scan_directory_cancellable(
    dir: &Path,
    filters: &[String],
    cancel: &AtomicBool,
) -> Option<Vec<ScanEntry>> {
    let filters: Vec<String> = filters
        .iter()
        .map(|f| f.trim_start_matches('.').to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();

    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::debug!("Cannot list {}: {e}", dir.display());
            return Some(Vec::new());
        }
    };

    let mut entries = Vec::new();
    for child in read_dir {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let Ok(child) = child else {
            continue;
        };
        let path = child.path();
        let is_directory = path.is_dir();
        if !is_directory && !filters.is_empty() && !extension_matches(&path, &filters) {
            continue;
        }
        entries.push(ScanEntry {
            name: child.file_name().to_string_lossy().into_owned(),
            path,
            is_directory,
        });
    }

    entries.sort_by_cached_key(|e| (!e.is_directory, e.name.to_lowercase()));
    Some(entries)
}

fn extension_matches(path: &Path, filters: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| filters.iter().any(|f| *f == ext))
}

/// Result delivered by a scan worker.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub generation: u64,
    pub path: PathBuf,
    pub entries: Vec<ScanEntry>,
}

/// State of a [`ScanHandle`] after a poll.
#[derive(Debug)]
pub enum ScanPoll {
    Pending,
    Ready(ScanResult),
    /// The worker stopped without a result (cancelled or failed to start).
    Gone,
}

/// A scan running on a worker thread.
#[derive(Debug)]
pub struct ScanHandle {
    generation: u64,
    receiver: mpsc::Receiver<ScanResult>,
    cancel: Arc<AtomicBool>,
}

impl ScanHandle {
    /// Start listing `dir` on a new thread.
    pub fn spawn(generation: u64, dir: PathBuf, filters: Vec<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let spawned = thread::Builder::new()
            .name(format!("mortis-scan-{generation}"))
            .spawn(move || {
                if let Some(entries) = scan_directory_cancellable(&dir, &filters, &worker_cancel) {
                    // The receiver may be gone already; nothing to do then.
                    let _ = tx.send(ScanResult {
                        generation,
                        path: dir,
                        entries,
                    });
                }
            });
        if let Err(e) = spawned {
            tracing::warn!("Failed to start directory scan: {e}");
        }

        ScanHandle {
            generation,
            receiver: rx,
            cancel,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the worker to stop at its next check.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Non-blocking poll.
    pub fn poll(&self) -> ScanPoll {
        match self.receiver.try_recv() {
            Ok(result) => ScanPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => ScanPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => ScanPoll::Gone,
        }
    }

    /// Block until the worker finishes.
    pub fn wait(&self) -> ScanPoll {
        match self.receiver.recv() {
            Ok(result) => ScanPoll::Ready(result),
            Err(_) => ScanPoll::Gone,
        }
    }
}

/// Browsing session: at most one scan in flight, newest generation wins.
#[derive(Debug, Default)]
pub struct DirectoryBrowser {
    generation: u64,
    current: Option<ScanHandle>,
    entries: Vec<ScanEntry>,
    current_path: Option<PathBuf>,
    last_path: Option<PathBuf>,
}

impl DirectoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listing `dir`, superseding any scan still in flight. Returns the
    /// generation of the new request.
    pub fn request(&mut self, dir: impl Into<PathBuf>, filters: &[String]) -> u64 {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        self.generation += 1;
        let dir = dir.into();
        tracing::debug!("Scanning {} (generation {})", dir.display(), self.generation);
        self.current = Some(ScanHandle::spawn(self.generation, dir, filters.to_vec()));
        self.generation
    }

    /// Apply a finished result if it is still current. Returns `true` when
    /// the listing changed.
    pub fn poll(&mut self) -> bool {
        let Some(handle) = &self.current else {
            return false;
        };
        match handle.poll() {
            ScanPoll::Pending => false,
            ScanPoll::Ready(result) => {
                self.current = None;
                self.accept(result)
            }
            ScanPoll::Gone => {
                self.current = None;
                false
            }
        }
    }

    /// Block until the current scan (if any) finishes and apply it.
    pub fn wait(&mut self) -> bool {
        let Some(handle) = self.current.take() else {
            return false;
        };
        match handle.wait() {
            ScanPoll::Ready(result) => self.accept(result),
            ScanPoll::Pending | ScanPoll::Gone => false,
        }
    }

    /// Apply `result` unless a newer request has been issued since.
    pub fn accept(&mut self, result: ScanResult) -> bool {
        if result.generation != self.generation {
            tracing::debug!(
                "Discarding stale scan of {} (generation {}, current {})",
                result.path.display(),
                result.generation,
                self.generation
            );
            return false;
        }
        self.entries = result.entries;
        self.last_path = Some(result.path.clone());
        self.current_path = Some(result.path);
        true
    }

    pub fn is_scanning(&self) -> bool {
        self.current.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Last directory a listing was applied for.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

/// Directory a browse for `target` should open in.
///
/// The target itself if it is a directory, else its parent when that exists,
/// else `last` when it is still a directory, else the first filesystem root.
pub fn initial_browse_dir(target: &str, last: Option<&Path>) -> PathBuf {
    let target = target.trim();
    if !target.is_empty() {
        let path = Path::new(target);
        if path.is_dir() {
            return path.to_path_buf();
        }
        if let Some(parent) = parent_path(target).map(Path::new) {
            if parent.is_dir() {
                return parent.to_path_buf();
            }
        }
    }
    if let Some(last) = last.filter(|p| p.is_dir()) {
        return last.to_path_buf();
    }
    available_roots()
        .into_iter()
        .next()
        .unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[ScanEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("B.txt"), "").unwrap();
        std::fs::write(tmp.path().join("a.txt"), "").unwrap();
        std::fs::write(tmp.path().join("setup.EXE"), "").unwrap();
        std::fs::create_dir(tmp.path().join("Sub")).unwrap();
        tmp
    }

    #[test]
    fn test_filter_and_order() {
        let tmp = fixture();
        let entries = scan_directory(tmp.path(), &[".txt".to_string()]);
        assert_eq!(names(&entries), vec!["Sub", "a.txt", "B.txt"]);
        assert!(entries[0].is_directory);
        assert_eq!(entries[1].path, tmp.path().join("a.txt"));
    }

    #[test]
    fn test_filter_without_dot_and_case() {
        let tmp = fixture();
        let entries = scan_directory(tmp.path(), &["exe".to_string(), "COM".to_string()]);
        assert_eq!(names(&entries), vec!["Sub", "setup.EXE"]);
    }

    #[test]
    fn test_no_filter_lists_everything() {
        let tmp = fixture();
        let entries = scan_directory(tmp.path(), &[]);
        assert_eq!(names(&entries), vec!["Sub", "a.txt", "B.txt", "setup.EXE"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scan_directory(&tmp.path().join("gone"), &[]).is_empty());
        assert!(scan_directory(&tmp.path().join("gone"), &["txt".to_string()]).is_empty());
    }

    #[test]
    fn test_cancelled_scan_returns_none() {
        let tmp = fixture();
        let cancel = AtomicBool::new(true);
        assert!(scan_directory_cancellable(tmp.path(), &[], &cancel).is_none());
    }

    #[test]
    fn test_browser_applies_result() {
        let tmp = fixture();
        let mut browser = DirectoryBrowser::new();
        let generation = browser.request(tmp.path(), &[".txt".to_string()]);
        assert_eq!(generation, 1);
        assert!(browser.is_scanning());
        assert!(browser.wait());
        assert!(!browser.is_scanning());
        assert_eq!(names(browser.entries()), vec!["Sub", "a.txt", "B.txt"]);
        assert_eq!(browser.current_path(), Some(tmp.path()));
        assert_eq!(browser.last_path(), Some(tmp.path()));
    }

    #[test]
    fn test_browser_poll_until_ready() {
        let tmp = fixture();
        let mut browser = DirectoryBrowser::new();
        browser.request(tmp.path(), &[]);
        let mut applied = false;
        for _ in 0..500 {
            if browser.poll() {
                applied = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(applied);
        assert_eq!(browser.entries().len(), 4);
        assert!(!browser.poll());
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let tmp = fixture();
        let mut browser = DirectoryBrowser::new();
        browser.request(tmp.path(), &[]);
        browser.request(tmp.path().join("Sub"), &[]);
        assert_eq!(browser.generation(), 2);

        let stale = ScanResult {
            generation: 1,
            path: tmp.path().to_path_buf(),
            entries: scan_directory(tmp.path(), &[]),
        };
        assert!(!browser.accept(stale));
        assert!(browser.entries().is_empty());

        assert!(browser.wait());
        assert_eq!(browser.current_path(), Some(tmp.path().join("Sub").as_path()));
        assert!(browser.entries().is_empty());
    }

    #[test]
    fn test_initial_browse_dir() {
        let tmp = fixture();
        let root = tmp.path();
        let file = root.join("a.txt");
        let missing = root.join("missing.exe");
        let sub = root.join("Sub");

        assert_eq!(initial_browse_dir(&sub.display().to_string(), None), sub);
        assert_eq!(initial_browse_dir(&file.display().to_string(), None), root);
        assert_eq!(initial_browse_dir(&missing.display().to_string(), None), root);
        assert_eq!(
            initial_browse_dir("/definitely/not/here/x.exe", Some(&sub)),
            sub
        );
        assert_eq!(initial_browse_dir("", Some(&sub)), sub);
        assert_eq!(
            initial_browse_dir("", Some(&root.join("gone"))),
            available_roots()[0]
        );
    }
}
