//! Document database driver abstraction.
//!
//! The mapping layer never talks to a database itself. Every collection operation
//! derives its documents through [`crate::transform`] and hands them to a [`Driver`],
//! which owns the connection, protocol, retries and timeouts.
//!
//! # Traits
//!
//! - [`Driver`]: The operations the collection facade needs from a document database
//! - [`DriverBuilder`]: Factory trait for creating driver instances from configuration
//!
//! # Options
//!
//! Each driver declares its own option types (for example the `mongodb` crate's
//! `FindOptions`). The facade passes them through untouched; the only options it
//! builds itself are the sort/skip/limit of a paged find, via [`Driver::page_options`].
//!
//! # Examples
//!
//! ```ignore
//! use mango::driver::Driver;
//! use bson::doc;
//!
//! let result = driver.insert_one("space", doc! { "name": "test" }, None).await?;
//! let found = driver.find_one("space", doc! { "_id": result.inserted_id }, None).await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::error::MangoResult;

/// Result of a single-document insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    /// The identifier of the inserted document, assigned by the database when absent.
    pub inserted_id: Bson,
}

/// Result of a single-document update or replace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateResult {
    /// Number of documents matched by the filter.
    pub matched_count: u64,
    /// Number of documents actually modified.
    pub modified_count: u64,
    /// Identifier of the document inserted by an upsert, if any.
    pub upserted_id: Option<Bson>,
}

/// Result of a single-document delete.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteResult {
    /// Number of documents deleted.
    pub deleted_count: u64,
}

/// Abstract interface over a document database driver.
///
/// All operations address a collection by name and exchange ordered BSON documents.
/// Implementations must be thread-safe; the facade holds drivers by shared reference.
///
/// # Error Handling
///
/// Driver failures are returned as
/// [`MangoError::Driver`](crate::error::MangoError::Driver) carrying the driver's own
/// error type. A find that matches nothing is not an error.
#[async_trait]
pub trait Driver: Send + Sync + Debug {
    /// Options accepted by [`Driver::find_one`].
    type FindOneOptions: Default + Send + 'static;
    /// Options accepted by [`Driver::find`].
    type FindOptions: Default + Send + 'static;
    /// Options accepted by [`Driver::insert_one`].
    type InsertOneOptions: Default + Send + 'static;
    /// Options accepted by [`Driver::update_one`].
    type UpdateOptions: Default + Send + 'static;
    /// Options accepted by [`Driver::replace_one`].
    type ReplaceOptions: Default + Send + 'static;
    /// Options accepted by [`Driver::delete_one`].
    type DeleteOptions: Default + Send + 'static;

    /// Builds find options selecting one page of results.
    ///
    /// # Arguments
    ///
    /// * `sort` - Sort specification (`{ field: 1 | -1 }`), if any
    /// * `skip` - Number of matching documents to skip
    /// * `limit` - Maximum number of documents to return
    fn page_options(sort: Option<Document>, skip: u64, limit: i64) -> Self::FindOptions;

    /// Returns the first document matching `filter`, or `None`.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOneOptions>,
    ) -> MangoResult<Option<Document>>;

    /// Returns every document matching `filter`, honouring sort/skip/limit options.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOptions>,
    ) -> MangoResult<Vec<Document>>;

    /// Inserts one document and returns the identifier it was stored under.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: Option<Self::InsertOneOptions>,
    ) -> MangoResult<InsertOneResult>;

    /// Applies an update document (`$set`, `$unset`, ...) to the first match of `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: Option<Self::UpdateOptions>,
    ) -> MangoResult<UpdateResult>;

    /// Replaces the first match of `filter` with `replacement`, keeping its identifier.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Option<Self::ReplaceOptions>,
    ) -> MangoResult<UpdateResult>;

    /// Deletes the first match of `filter`.
    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::DeleteOptions>,
    ) -> MangoResult<DeleteResult>;

    /// Cleanly shuts down the driver, releasing connections.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> MangoResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<D> Driver for &D
where
    D: Driver,
{
    type FindOneOptions = D::FindOneOptions;
    type FindOptions = D::FindOptions;
    type InsertOneOptions = D::InsertOneOptions;
    type UpdateOptions = D::UpdateOptions;
    type ReplaceOptions = D::ReplaceOptions;
    type DeleteOptions = D::DeleteOptions;

    fn page_options(sort: Option<Document>, skip: u64, limit: i64) -> Self::FindOptions {
        D::page_options(sort, skip, limit)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOneOptions>,
    ) -> MangoResult<Option<Document>> {
        (*self)
            .find_one(collection, filter, options)
            .await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOptions>,
    ) -> MangoResult<Vec<Document>> {
        (*self)
            .find(collection, filter, options)
            .await
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: Option<Self::InsertOneOptions>,
    ) -> MangoResult<InsertOneResult> {
        (*self)
            .insert_one(collection, document, options)
            .await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: Option<Self::UpdateOptions>,
    ) -> MangoResult<UpdateResult> {
        (*self)
            .update_one(collection, filter, update, options)
            .await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Option<Self::ReplaceOptions>,
    ) -> MangoResult<UpdateResult> {
        (*self)
            .replace_one(collection, filter, replacement, options)
            .await
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::DeleteOptions>,
    ) -> MangoResult<DeleteResult> {
        (*self)
            .delete_one(collection, filter, options)
            .await
    }
}

/// Factory trait for building a driver from its configuration.
#[async_trait]
pub trait DriverBuilder {
    type Driver: Driver;

    async fn build(self) -> MangoResult<Self::Driver>;
}
