use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::document::{Document, User};

/// Errors from DocumentStore
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document {} is unreadable: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write document {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whole-file JSON persistence for the Document.
///
/// Every write goes through `write_lock`, so Load-mutate-Save cycles run one at a
/// time across the process. Readers skip the lock: a save lands as a temp file
/// renamed over the target, so a reader sees either the old or the new document.
pub struct DocumentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    pub async fn load(&self) -> Result<Document, StorageError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StorageError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, doc: &Document) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write(doc).await
    }

    /// Run one Load-mutate-Save cycle under the writer lock.
    ///
    /// The document is saved only when `mutate` returns `Ok`; on `Err` the file
    /// is left untouched.
    pub async fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let out = mutate(&mut doc)?;
        self.write(&doc).await?;
        Ok(out)
    }

    /// Bootstrap a fresh document with one empty bucket per declared name.
    /// `users` is written only when given.
    pub async fn create_initial(
        &self,
        resources: &[String],
        users: Option<Vec<User>>,
    ) -> Result<(), StorageError> {
        let doc = Document::seeded(resources.iter().cloned(), users);
        self.save(&doc).await?;
        info!(
            "Created document {} with {} resource(s)",
            self.path.display(),
            resources.len()
        );
        Ok(())
    }

    async fn write(&self, doc: &Document) -> Result<(), StorageError> {
        let write_failed = |source: std::io::Error| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let mut bytes = serde_json::to_vec_pretty(doc).map_err(|e| write_failed(e.into()))?;
        bytes.push(b'\n');

        let tmp = self.temp_path();
        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = result {
            if e.kind() != ErrorKind::NotFound {
                let _ = tokio::fs::remove_file(&tmp).await;
            }
            return Err(write_failed(e));
        }

        debug!("Saved document {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("document"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::document::ResourceBucket;
    use serde_json::json;
    use std::sync::Arc;

    fn store_in(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("database.json"))
    }

    #[tokio::test]
    async fn load_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Unreadable { .. }), "{err}");
    }

    #[tokio::test]
    async fn load_rejects_bad_json_and_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load().await, Err(StorageError::Malformed { .. })));

        std::fs::write(store.path(), r#"{"resources": {"posts": []}}"#).unwrap();
        assert!(matches!(store.load().await, Err(StorageError::Malformed { .. })));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut doc = Document::seeded(["posts", "comments"], None);
        let item = json!({"title": "hi", "tags": ["a", "b"], "meta": {"z": 1, "a": null}});
        doc.resources[0].insert(item.as_object().unwrap().clone(), "1".into());

        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await.unwrap(), doc);
    }

    #[tokio::test]
    async fn resave_of_loaded_document_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"resources":[{"resource":"posts","items":[{"title":"x","id":"1","b":2}]}]}"#,
        )
        .unwrap();

        let doc = store.load().await.unwrap();
        store.save(&doc).await.unwrap();
        let first = std::fs::read(store.path()).unwrap();
        store.save(&store.load().await.unwrap()).await.unwrap();
        assert_eq!(first, std::fs::read(store.path()).unwrap());

        let text = String::from_utf8(first).unwrap();
        let b = text.find("\"b\"").unwrap();
        let id = text.find("\"id\"").unwrap();
        let title = text.find("\"title\"").unwrap();
        assert!(b < id && id < title, "item keys should be sorted: {text}");
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.create_initial(&["posts".to_string()], None).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["database.json"]);
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("nope").join("database.json"));
        let err = store.save(&Document::seeded(["posts"], None)).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
    }

    #[tokio::test]
    async fn create_initial_seeds_admin() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let admin = User {
            username: "admin".into(),
            password: "$argon2id$hash".into(),
        };
        store
            .create_initial(&["posts".to_string(), "comments".to_string()], Some(vec![admin.clone()]))
            .await
            .unwrap();

        let doc = store.load().await.unwrap();
        assert_eq!(
            doc.resources,
            vec![ResourceBucket::empty("posts"), ResourceBucket::empty("comments")]
        );
        assert_eq!(doc.users, Some(vec![admin]));
    }

    #[tokio::test]
    async fn failed_mutation_does_not_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.create_initial(&["posts".to_string()], None).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let result: Result<(), StorageErrorOr> = store
            .update(|doc| {
                doc.resources.clear();
                Err(StorageErrorOr::Rejected)
            })
            .await;
        assert!(matches!(result, Err(StorageErrorOr::Rejected)));
        assert_eq!(before, std::fs::read(store.path()).unwrap());
    }

    #[tokio::test]
    async fn concurrent_updates_do_not_lose_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));
        store
            .create_initial(&["posts".to_string(), "comments".to_string()], None)
            .await
            .unwrap();

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let bucket = if i % 2 == 0 { "posts" } else { "comments" };
                    store
                        .update(|doc| {
                            doc.bucket_mut(bucket)
                                .unwrap()
                                .insert(Default::default(), i.to_string());
                            Ok::<_, StorageError>(())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let doc = store.load().await.unwrap();
        assert_eq!(doc.bucket("posts").unwrap().items.len(), 20);
        assert_eq!(doc.bucket("comments").unwrap().items.len(), 20);
    }

    #[derive(Debug)]
    enum StorageErrorOr {
        Storage,
        Rejected,
    }

    impl From<StorageError> for StorageErrorOr {
        fn from(_: StorageError) -> Self {
            StorageErrorOr::Storage
        }
    }
}
