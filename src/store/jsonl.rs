// src/store/jsonl.rs
// =============================================================================
// Append-only JSON Lines page store.
//
// Each line is one PageRecord serialized with serde_json. Before appending we
// read the urls already in the file so re-crawls don't duplicate pages.
// Lines that no longer parse are logged and otherwise ignored.
//
// Records are encoded up front and written one line at a time. If a write
// fails, the error says how many lines made it into the file.
// =============================================================================

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{PageRecord, PageStore, PersistReport};
use crate::error::PersistenceError;

pub struct JsonlStore {
    path: PathBuf,
    // serializes concurrent persist calls on the same file
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn stored_urls(&self) -> Result<HashSet<String>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut urls = HashSet::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PageRecord>(line) {
                Ok(record) => {
                    urls.insert(record.url);
                }
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "ignoring unreadable stored record"
                ),
            }
        }
        Ok(urls)
    }
}

// Writes each line and flushes it, stopping at the first failure
//
// Returns: on failure, how many lines were written before it and the error
async fn append_lines<W>(writer: &mut W, lines: &[String]) -> Result<(), (usize, std::io::Error)>
where
    W: AsyncWrite + Unpin,
{
    for (written, line) in lines.iter().enumerate() {
        writer.write_all(line.as_bytes()).await.map_err(|e| (written, e))?;
        writer.flush().await.map_err(|e| (written, e))?;
    }
    Ok(())
}

#[async_trait]
impl PageStore for JsonlStore {
    async fn persist(&self, records: Vec<PageRecord>) -> Result<PersistReport, PersistenceError> {
        let _guard = self.write_lock.lock().await;

        let mut known = self.stored_urls().await?;
        let mut report = PersistReport::default();
        let mut lines = Vec::new();

        for record in records {
            if !known.insert(record.url.clone()) {
                report.skipped += 1;
                continue;
            }
            let mut line = serde_json::to_string(&record).map_err(|source| PersistenceError::Encode {
                url: record.url.clone(),
                source,
            })?;
            line.push('\n');
            lines.push(line);
        }

        if !lines.is_empty() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| self.io_error(e))?;

            if let Err((inserted, source)) = append_lines(&mut file, &lines).await {
                warn!(
                    path = %self.path.display(),
                    inserted,
                    attempted = lines.len(),
                    error = %source,
                    "page store write failed part way"
                );
                return Err(PersistenceError::Partial {
                    path: self.path.clone(),
                    inserted,
                    attempted: lines.len(),
                    source,
                });
            }
            report.inserted = lines.len();
        }

        info!(
            path = %self.path.display(),
            inserted = report.inserted,
            skipped = report.skipped,
            "persisted pages"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            body: "body text".to_string(),
        }
    }

    async fn read_records(path: &Path) -> Vec<PageRecord> {
        let contents = fs::read_to_string(path).await.unwrap();
        contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_writes_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("pages.jsonl"));

        let report = store
            .persist(vec![record("https://a.com/1"), record("https://a.com/2")])
            .await
            .unwrap();

        assert_eq!(report, PersistReport { inserted: 2, skipped: 0 });
        let stored = read_records(store.path()).await;
        assert_eq!(stored, vec![record("https://a.com/1"), record("https://a.com/2")]);
    }

    #[tokio::test]
    async fn test_duplicate_urls_are_ignored_across_calls() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("pages.jsonl"));

        store.persist(vec![record("https://a.com/1")]).await.unwrap();
        let report = store
            .persist(vec![record("https://a.com/1"), record("https://a.com/2")])
            .await
            .unwrap();

        assert_eq!(report, PersistReport { inserted: 1, skipped: 1 });
        assert_eq!(read_records(store.path()).await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_urls_within_batch() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("pages.jsonl"));

        let report = store
            .persist(vec![record("https://a.com/1"), record("https://a.com/1")])
            .await
            .unwrap();

        assert_eq!(report, PersistReport { inserted: 1, skipped: 1 });
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("nested/out/pages.jsonl"));

        store.persist(vec![record("https://a.com/1")]).await.unwrap();
        assert_eq!(read_records(store.path()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_append_stops_at_first_failed_write() {
        let lines = vec!["one\n".to_string(), "two\n".to_string(), "three\n".to_string()];
        let mut writer = tokio_test::io::Builder::new()
            .write(b"one\n")
            .write_error(std::io::Error::new(ErrorKind::Other, "disk full"))
            .build();

        let (written, error) = append_lines(&mut writer, &lines).await.unwrap_err();

        assert_eq!(written, 1);
        assert_eq!(error.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_unwritable_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        // the store path is a directory, so opening it for append fails
        let store = JsonlStore::new(dir.path());

        let err = store.persist(vec![record("https://a.com/1")]).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_lines_do_not_block_persisting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pages.jsonl");
        fs::write(&path, "not json\n").await.unwrap();
        let store = JsonlStore::new(&path);

        let report = store.persist(vec![record("https://a.com/1")]).await.unwrap();
        assert_eq!(report.inserted, 1);
    }
}
