#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{
    InMemoryRepository, ProgressRepository, Storage, StorageError, TaskRepository,
};
