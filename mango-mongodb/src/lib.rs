//! MongoDB driver for mango.
//!
//! This crate implements the `Driver` trait over the official `mongodb` crate, so the
//! collection facade can map records to a real MongoDB deployment.
//!
//! To use this driver, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mango = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Options
//!
//! Every operation accepts the `mongodb` crate's own option types
//! (`mongodb::options::FindOptions`, `UpdateOptions`, ...), passed through unchanged.
//! Timeouts are set there (`max_time`) or imposed by the caller.
//!
//! # Example
//!
//! ```ignore
//! use mango::{driver::DriverBuilder, mongodb::MongoDriver, store::Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = MongoDriver::builder("mongodb://localhost:27017", "my_database")
//!         .with_app_name("spaces-service")
//!         .build()
//!         .await?;
//!     let database = Database::new(driver);
//!
//!     database.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as mango_mongodb;

pub mod store;

pub use store::{MongoDriver, MongoDriverBuilder};
