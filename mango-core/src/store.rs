//! Database handle handing out typed collections.
//!
//! # Example
//!
//! ```ignore
//! use mango::{prelude::*, memory::InMemoryDriver};
//!
//! let database = Database::new(InMemoryDriver::new());
//! let spaces = database.collection::<Space>("space");
//! let users = database.typed_collection::<User>();
//! ```

use crate::{collection::Collection, driver::Driver, error::MangoResult, record::Record};

/// A document database reached through driver `D`.
#[derive(Debug)]
pub struct Database<D: Driver> {
    driver: D,
}

impl<D: Driver> Database<D> {
    /// Creates a database handle over the given driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Gets a collection of `R` records with an explicit name.
    pub fn collection<'a, R: Record>(&'a self, name: &str) -> Collection<'a, D, R> {
        Collection::new(name, &self.driver)
    }

    /// Gets a collection of `R` records named after [`Record::collection_name`].
    pub fn typed_collection<'a, R: Record>(&'a self) -> Collection<'a, D, R> {
        Collection::new(R::collection_name(), &self.driver)
    }

    /// Returns the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Consumes the handle and returns the underlying driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Shuts down the underlying driver.
    pub async fn shutdown(self) -> MangoResult<()> {
        self.driver.shutdown().await
    }
}
