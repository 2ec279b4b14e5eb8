//! In-memory object store
//!
//! Backs the integration tests and offline experiments. Supports paginated
//! listing with delimiter grouping, and per-key transient failure injection
//! to exercise the retry path.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::app::models::RemoteObject;
use crate::errors::{StoreError, StoreResult};

use super::{ListPage, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    etag: String,
}

/// Object store holding its contents in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    /// Remaining injected failures per key
    failures: Mutex<BTreeMap<String, u32>>,
    /// Successful body fetches, for assertions
    downloads: AtomicU64,
    page_size: usize,
}

impl MemoryStore {
    /// Create an empty store with the default page size
    pub fn new() -> Self {
        Self {
            page_size: 1000,
            ..Self::default()
        }
    }

    /// Create an empty store with a small page size to exercise pagination
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Insert an object; the etag is derived from the body length
    pub fn put(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        let key = key.into();
        let body = body.into();
        let etag = format!("\"mem-{}\"", body.len());
        self.objects
            .lock()
            .unwrap()
            .insert(key, StoredObject { body, etag });
    }

    /// Make the next `count` fetches of `key` fail with a transient error
    pub fn fail_next(&self, key: impl Into<String>, count: u32) {
        self.failures.lock().unwrap().insert(key.into(), count);
    }

    /// Number of successful body fetches served so far
    pub fn download_count(&self) -> u64 {
        self.downloads.load(Ordering::Relaxed)
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// True when the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("injected transient failure")]
struct InjectedFailure;

#[derive(Debug, thiserror::Error)]
#[error("no such key")]
struct NoSuchKey;

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        token: Option<String>,
    ) -> StoreResult<ListPage> {
        let objects = self.objects.lock().unwrap();

        let mut matched = Vec::new();
        let mut common_prefixes = Vec::new();

        for (key, stored) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }

            if let Some(delimiter) = delimiter {
                let rest = &key[prefix.len()..];
                if let Some(idx) = rest.find(delimiter) {
                    let group = format!("{}{}", prefix, &rest[..idx + delimiter.len()]);
                    if common_prefixes.last() != Some(&group) {
                        common_prefixes.push(group);
                    }
                    continue;
                }
            }

            matched.push(RemoteObject {
                key: key.clone(),
                size: stored.body.len() as u64,
                etag: stored.etag.clone(),
            });
        }

        // Pagination slices the object list; grouped prefixes are small and
        // returned in full on the first page.
        let offset: usize = token.as_deref().map(|t| t.parse().unwrap_or(0)).unwrap_or(0);
        if offset > 0 {
            common_prefixes.clear();
        }

        let page: Vec<RemoteObject> = matched
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();

        let next_token = if offset + page.len() < matched.len() {
            Some((offset + page.len()).to_string())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            common_prefixes,
            next_token,
        })
    }

    async fn download_to(&self, key: &str, dest: &Path) -> StoreResult<u64> {
        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(StoreError::get(key, InjectedFailure));
                }
            }
        }

        let body = {
            let objects = self.objects.lock().unwrap();
            objects
                .get(key)
                .map(|o| o.body.clone())
                .ok_or_else(|| StoreError::get(key, NoSuchKey))?
        };

        fs::write(dest, &body).await.map_err(|source| StoreError::Write {
            key: key.to_string(),
            path: dest.to_path_buf(),
            source,
        })?;

        self.downloads.fetch_add(1, Ordering::Relaxed);
        Ok(body.len() as u64)
    }
}
