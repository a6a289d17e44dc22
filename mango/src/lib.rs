//! Main mango crate: map Rust records onto document database collections.
//!
//! This crate is the entry point for users of mango. It re-exports the core types,
//! the `Record` derive macro and the available drivers.
//!
//! # Features
//!
//! - **Records** - Any serde struct with an identifier field, via `#[derive(Record)]`
//! - **Collections** - Find, page, insert, update, replace and delete by identifier
//! - **Query by example** - A record's non-zero fields double as a filter
//! - **Drivers** - In-memory, plus MongoDB behind the `mongodb` feature
//!
//! # Quick Start
//!
//! ```ignore
//! use mango::{prelude::*, memory::InMemoryDriver};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Record)]
//! pub struct Space {
//!     #[serde(rename = "_id", default)]
//!     pub id: String,
//!     #[serde(default)]
//!     pub name: String,
//!     #[serde(default)]
//!     pub founder: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> MangoResult<()> {
//!     let database = Database::new(InMemoryDriver::new());
//!     let spaces = database.typed_collection::<Space>();
//!
//!     let mut space = Space { name: "test".into(), founder: "u1".into(), ..Default::default() };
//!     spaces.insert_one(&mut space, None).await?;
//!
//!     // Only non-zero fields are set, the stored name is kept
//!     let patch = Space { id: space.id.clone(), founder: "u2".into(), ..Default::default() };
//!     spaces.update_by_id(&patch, None).await?;
//!
//!     let by_founder = spaces
//!         .find(&Space { founder: "u2".into(), ..Default::default() }, None)
//!         .await?;
//!     println!("{by_founder:?}");
//!
//!     let page = spaces.page(bson::doc! {}, None, "1", "20").await?;
//!     println!("page {} holds {} spaces", page.page, page.items.len());
//!
//!     database.shutdown().await
//! }
//! ```
//!
//! # Drivers
//!
//! - [`memory`] - In-process driver for development and testing
//! - `mongodb` - MongoDB driver (requires the `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as mango;

pub mod prelude;

pub use mango_core::{collection, driver, error, page, record, store, transform};
pub use mango_macros::Record;

// Re-export BSON types for convenience
pub use bson;

/// In-memory driver implementations.
pub mod memory {
    pub use mango_memory::{
        FindOneOptions, FindOptions, InMemoryDriver, InMemoryDriverBuilder, MemoryError,
        UpdateOptions,
    };
}

/// MongoDB driver implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use mango_mongodb::{MongoDriver, MongoDriverBuilder};
}
