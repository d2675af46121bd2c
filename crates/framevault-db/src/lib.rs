//! Framevault Database Library
//!
//! Postgres persistence for video records: the `VideoStore` trait, its sqlx
//! implementation, and embedded migrations.

pub mod pool;
pub mod videos;

pub use pool::{create_pool, run_migrations};
pub use videos::{PgVideoStore, VideoStore};
