//! Document database layer.

pub mod batch;
pub mod document;
pub mod firestore;
pub mod path;
pub mod reference;
pub mod store;
pub mod transaction;

pub use batch::{WriteBatch, MAX_BATCH_WRITES};
pub use document::{to_document_data, DocumentData};
pub use firestore::Firestore;
pub use path::ResourcePath;
pub use reference::{CollectionReference, DocumentReference, DocumentSnapshot, QuerySnapshot};
pub use store::CommitResult;
pub use transaction::{Transaction, TransactionOptions, DEFAULT_MAX_ATTEMPTS};
