//! Embassy async tasks

pub mod storage;

pub use storage::storage_task;
