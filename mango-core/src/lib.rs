//! A thin object-document mapping layer over document database drivers.
//!
//! This crate is the core of the mango project and provides:
//!
//! - **Record trait** ([`record`]) - How a Rust type exposes its identifier field
//! - **Transform engine** ([`transform`]) - Filters, content, insert and replacement documents derived from records
//! - **Driver abstraction** ([`driver`]) - The seam to the underlying document database driver
//! - **Collections interface** ([`collection`]) - Typed find/insert/update/replace/delete by identifier
//! - **Database handle** ([`store`]) - Hands out collections over a driver
//! - **Error handling** ([`error`]) - Error and result types
//! - **Pagination** ([`page`]) - Page parameters and page results
//!
//! # Example
//!
//! ```ignore
//! use mango::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Record)]
//! #[record(collection = "spaces")]
//! pub struct Space {
//!     #[serde(rename = "_id", default)]
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! let spaces = database.typed_collection::<Space>();
//! let mut space = Space { name: "test".into(), ..Default::default() };
//! spaces.insert_one(&mut space, None).await?;
//! let found = spaces.find_by_id(&space, None).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as mango_core;

pub mod collection;
pub mod driver;
pub mod error;
pub mod page;
pub mod record;
pub mod store;
pub mod transform;
