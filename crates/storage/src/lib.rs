#![forbid(unsafe_code)]

pub mod bundled;
pub mod repository;
pub mod sqlite;

pub use bundled::BundledQuestions;
pub use repository::{
    InMemoryRepository, KeyValueStore, QuestionBank, QuestionRecord, Storage, StorageError,
};
