//! Object-store access layer
//!
//! The application consumes a narrow capability: paginated listing under a
//! prefix (optionally with a delimiter for folder discovery) and fetching one
//! object body to a local file. The [`ObjectStore`] trait captures exactly
//! that, with an S3-backed implementation for production and an in-memory
//! implementation for tests.

pub mod memory;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;

use crate::app::models::RemoteObject;
use crate::errors::StoreResult;

pub use memory::MemoryStore;
pub use s3::{S3Store, StoreConfig};

/// One page of a listing response
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects on this page
    pub objects: Vec<RemoteObject>,
    /// Common prefixes when a delimiter was supplied (folder discovery)
    pub common_prefixes: Vec<String>,
    /// Continuation token for the next page, absent on the last page
    pub next_token: Option<String>,
}

/// Narrow object-store capability consumed by listing and transfers
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects under a prefix
    ///
    /// A delimiter groups keys into `common_prefixes` the way S3 folder
    /// listings do. `token` continues a previous page.
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        token: Option<String>,
    ) -> StoreResult<ListPage>;

    /// Fetch one object body into a local file, returning the byte count
    async fn download_to(&self, key: &str, dest: &Path) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trait_object_is_usable() {
        let store: Box<dyn ObjectStore> = Box::new(MemoryStore::new());
        let page = store.list_page("", None, None).await.unwrap();
        assert!(page.objects.is_empty());
        assert!(page.next_token.is_none());
    }
}
