//! In-memory driver for mango.
//!
//! This crate provides a thread-safe, in-process implementation of the `Driver` trait.
//! It keeps every collection as a vector of BSON documents behind an async-aware
//! read-write lock, which makes it suitable for development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Filter subset** - Equality, dotted paths, logical and comparison operators
//! - **Updates** - `$set` and `$unset`, with upsert
//! - **Paging** - Multi-key sort, skip and limit
//!
//! # Quick Start
//!
//! ```ignore
//! use mango::{Record, store::Database, memory::InMemoryDriver};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Record)]
//! pub struct Space {
//!     #[serde(rename = "_id", default)]
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let database = Database::new(InMemoryDriver::new());
//!     let spaces = database.typed_collection::<Space>();
//!
//!     let mut space = Space { name: "test".into(), ..Default::default() };
//!     spaces.insert_one(&mut space, None).await?;
//!
//!     let found = spaces.find_by_id(&space, None).await?;
//!     assert_eq!(found.map(|s| s.name), Some("test".to_string()));
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mango_memory;

pub mod error;
pub mod options;
pub mod store;
mod evaluator;

pub use error::MemoryError;
pub use options::{FindOneOptions, FindOptions, UpdateOptions};
pub use store::{InMemoryDriver, InMemoryDriverBuilder};
