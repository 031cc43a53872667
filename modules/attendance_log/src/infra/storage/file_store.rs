use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::repo::{AttendanceStore, StoreError};

/// Append-only attendance log backed by a single plain-text file.
///
/// The lock and the file I/O live together on a blocking thread, so
/// dropping an `append` future can never release the lock while its write
/// is still running. Appends hold the write half for the whole
/// open-write-sync sequence and reads hold the read half. Every append is
/// one contiguous run and readers never see a half-written line, within
/// one process.
pub struct FileAttendanceStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    sync_on_append: bool,
    gate: RwLock<()>,
}

/// Marks an append as abandoned once the awaiting future goes away.
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

impl FileAttendanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                sync_on_append: true,
                gate: RwLock::new(()),
            }),
        }
    }

    pub fn with_sync_on_append(self, sync_on_append: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: self.inner.path.clone(),
                sync_on_append,
                gate: RwLock::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl Inner {
    /// Returns `false` when the caller gave up before the lock was acquired;
    /// nothing is written in that case.
    fn append_blocking(&self, bytes: &[u8], abandoned: &AtomicBool) -> io::Result<bool> {
        let _guard = self.gate.write();
        if abandoned.load(Ordering::Acquire) {
            return Ok(false);
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)?;
        if self.sync_on_append {
            file.sync_data()?;
        }
        Ok(true)
    }

    fn read_blocking(&self) -> Result<Vec<u8>, StoreError> {
        let _guard = self.gate.read();

        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Io(io::Error::other(e))
}

#[async_trait]
impl AttendanceStore for FileAttendanceStore {
    async fn append(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let inner = self.inner.clone();
        let owned = bytes.to_vec();
        let abandoned = Arc::new(AtomicBool::new(false));
        let _abandon = AbandonOnDrop(abandoned.clone());

        let written =
            tokio::task::spawn_blocking(move || inner.append_blocking(&owned, &abandoned))
                .await
                .map_err(join_error)??;

        if written {
            debug!(path = %self.inner.path.display(), bytes = bytes.len(), "Appended to attendance log");
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.read_blocking())
            .await
            .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn read_before_first_append_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileAttendanceStore::new(dir.path().join("attendance_log.csv"));

        assert!(matches!(store.read_all().await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn first_append_creates_the_file_and_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/nested/attendance_log.csv");
        let store = FileAttendanceStore::new(&path);

        store.append(b"A1,t1\n").await.unwrap();

        assert!(path.exists());
        assert_eq!(store.read_all().await.unwrap(), b"A1,t1\n");
    }

    #[tokio::test]
    async fn appends_accumulate_in_arrival_order() {
        let dir = tempdir().unwrap();
        let store =
            FileAttendanceStore::new(dir.path().join("log.csv")).with_sync_on_append(false);

        store.append(b"A1,t1\n").await.unwrap();
        store.append(b"A2,t2\nA3,t3\n").await.unwrap();
        store.append(b"A4,t4\n").await.unwrap();

        assert_eq!(
            store.read_all().await.unwrap(),
            b"A1,t1\nA2,t2\nA3,t3\nA4,t4\n"
        );
    }

    #[tokio::test]
    async fn existing_content_is_never_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "OLD,line\n").unwrap();

        let store = FileAttendanceStore::new(&path);
        store.append(b"NEW,line\n").await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), b"OLD,line\nNEW,line\n");
    }

    #[tokio::test]
    async fn unwritable_location_is_an_io_error() {
        let dir = tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let store = FileAttendanceStore::new(blocker.join("log.csv"));

        assert!(matches!(
            store.append(b"A1,t1\n").await,
            Err(StoreError::Io(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_interleave() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FileAttendanceStore::new(dir.path().join("log.csv")).with_sync_on_append(false),
        );

        // Large blocks make torn writes visible if the lock were missing.
        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let line = format!("{}\n", format!("{i:02}").repeat(2048));
                store.append(line.as_bytes()).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let content = String::from_utf8(store.read_all().await.unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 32);
        for line in lines {
            let head = &line[..2];
            assert_eq!(line, head.repeat(2048), "torn line detected");
        }
    }

    #[tokio::test]
    async fn append_abandoned_while_waiting_for_the_lock_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let store = FileAttendanceStore::new(&path).with_sync_on_append(false);
        store.append(b"A1,t1\n").await.unwrap();

        let writer_lock = store.inner.gate.write();
        let res = tokio::time::timeout(
            Duration::from_millis(20),
            store.append(b"LATE,t2\n"),
        )
        .await;
        assert!(res.is_err(), "append must wait for the lock");
        drop(writer_lock);

        // Give the abandoned blocking task time to acquire the lock and bail out.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(std::fs::read(&path).unwrap(), b"A1,t1\n");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn timed_out_appends_never_tear_the_log() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            FileAttendanceStore::new(dir.path().join("log.csv")).with_sync_on_append(false),
        );
        const BLOCK: usize = 64 * 1024;

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    if let Ok(bytes) = store.read_all().await {
                        assert!(bytes.len() % (BLOCK + 1) == 0, "reader saw a partial block");
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut acked = 0;
        for i in 0..100u8 {
            let ch = (b'a' + i % 26) as char;
            let line = format!("{}\n", ch.to_string().repeat(BLOCK));
            let res =
                tokio::time::timeout(Duration::from_micros(50), store.append(line.as_bytes()))
                    .await;
            if matches!(res, Ok(Ok(()))) {
                acked += 1;
            }
        }
        reader.await.unwrap();
        // Let writes that already held the lock finish.
        tokio::time::sleep(Duration::from_millis(500)).await;

        let content = String::from_utf8(store.read_all().await.unwrap()).unwrap();
        assert_eq!(content.len() % (BLOCK + 1), 0);
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines.len() >= acked, "acknowledged appends went missing");
        for line in lines {
            assert_eq!(line.len(), BLOCK, "torn block detected");
            let head = &line[..1];
            assert_eq!(line, head.repeat(BLOCK), "interleaved block detected");
        }
    }
}
