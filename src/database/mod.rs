pub mod document;
pub mod store;

pub use document::{Document, Item, ResourceBucket, User, ID_FIELD};
pub use store::{DocumentStore, StorageError};
