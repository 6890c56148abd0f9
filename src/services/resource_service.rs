use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::database::{Document, DocumentStore, Item, ResourceBucket};
use crate::error::ResourceError;

/// CRUD over the buckets of the shared document.
///
/// Reads load the document without the writer lock. Every mutation is exactly
/// one `DocumentStore::update` cycle, so it either saves the whole document once
/// or leaves the file untouched.
#[derive(Clone)]
pub struct ResourceService {
    store: Arc<DocumentStore>,
}

impl ResourceService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, resource: &str) -> Result<Vec<Item>, ResourceError> {
        let doc = self.store.load().await?;
        let bucket = take_bucket(doc, resource)?;
        Ok(bucket.items)
    }

    pub async fn show(&self, resource: &str, id: &str) -> Result<Item, ResourceError> {
        let doc = self.store.load().await?;
        let mut bucket = take_bucket(doc, resource)?;
        bucket.remove(id).ok_or_else(|| item_not_found(resource, id))
    }

    /// Append `body` under a fresh id; any client-supplied `id` is overwritten
    pub async fn create(&self, resource: &str, body: Item) -> Result<Item, ResourceError> {
        let item = self
            .store
            .update(|doc| {
                let bucket = bucket_mut(doc, resource)?;
                let id = fresh_id(bucket);
                Ok::<_, ResourceError>(bucket.insert(body, id).clone())
            })
            .await?;
        debug!("Created item in {}", resource);
        Ok(item)
    }

    /// Replace the whole item; the stored `id` is kept
    pub async fn replace(&self, resource: &str, id: &str, body: Item) -> Result<Item, ResourceError> {
        self.store
            .update(|doc| {
                bucket_mut(doc, resource)?
                    .replace(id, body)
                    .cloned()
                    .ok_or_else(|| item_not_found(resource, id))
            })
            .await
    }

    /// Shallow right-biased merge into the existing item
    pub async fn patch(&self, resource: &str, id: &str, changes: Item) -> Result<Item, ResourceError> {
        self.store
            .update(|doc| {
                bucket_mut(doc, resource)?
                    .merge(id, changes)
                    .cloned()
                    .ok_or_else(|| item_not_found(resource, id))
            })
            .await
    }

    pub async fn delete(&self, resource: &str, id: &str) -> Result<Item, ResourceError> {
        self.store
            .update(|doc| {
                bucket_mut(doc, resource)?
                    .remove(id)
                    .ok_or_else(|| item_not_found(resource, id))
            })
            .await
    }

    /// Empty the bucket; the bucket itself stays in the document
    pub async fn clear(&self, resource: &str) -> Result<(), ResourceError> {
        self.store
            .update(|doc| {
                bucket_mut(doc, resource)?.clear();
                Ok(())
            })
            .await
    }
}

fn take_bucket(doc: Document, resource: &str) -> Result<ResourceBucket, ResourceError> {
    doc.resources
        .into_iter()
        .find(|b| b.resource == resource)
        .ok_or_else(|| ResourceError::ResourceNotFound(resource.to_string()))
}

fn bucket_mut<'a>(doc: &'a mut Document, resource: &str) -> Result<&'a mut ResourceBucket, ResourceError> {
    doc.bucket_mut(resource)
        .ok_or_else(|| ResourceError::ResourceNotFound(resource.to_string()))
}

fn item_not_found(resource: &str, id: &str) -> ResourceError {
    ResourceError::ItemNotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}

fn fresh_id(bucket: &ResourceBucket) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if bucket.get(&id).is_none() {
            return id;
        }
    }
}
