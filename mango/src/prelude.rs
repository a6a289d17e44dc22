//! Convenient re-exports of commonly used types from mango.
//!
//! ```ignore
//! use mango::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Record` trait and its derive macro
//! - Drivers, driver builders and their result types
//! - Collections, pages and the database handle
//! - Error types

pub use mango_macros::Record;
pub use mango_core::{
    collection::Collection,
    driver::{DeleteResult, Driver, DriverBuilder, InsertOneResult, UpdateResult},
    error::{MangoError, MangoResult},
    page::{Page, PaginationParams},
    record::{IdentifierField, Record},
    store::Database,
};
