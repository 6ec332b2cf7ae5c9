#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    HighScore, HighScoreRepository, InMemoryRepository, ProgressRepository, Storage, StorageError,
};
