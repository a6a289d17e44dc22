//! Typed collection facade over a driver.
//!
//! A [`Collection`] binds a collection name, a driver and a record type. Each
//! operation derives its documents from the record through [`crate::transform`],
//! makes exactly one driver call and decodes the result back into the record type.
//!
//! # Example
//!
//! ```ignore
//! use mango::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Record)]
//! pub struct Space {
//!     #[serde(rename = "_id", default)]
//!     pub id: String,
//!     #[serde(default)]
//!     pub name: String,
//! }
//!
//! # async fn example<D: Driver>(database: &Database<D>) -> MangoResult<()> {
//! let spaces = database.collection::<Space>("space");
//!
//! let mut space = Space { name: "test".into(), ..Default::default() };
//! spaces.insert_one(&mut space, None).await?;
//!
//! space.name = "renamed".into();
//! spaces.update_by_id(&space, None).await?;
//! # Ok(()) }
//! ```

use bson::{Document, doc};
use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::{
    driver::{DeleteResult, Driver, InsertOneResult, UpdateResult},
    error::MangoResult,
    page::{Page, PaginationParams},
    record::{OBJECT_ID_KEY, Record},
    transform::{
        content_document, decode, decode_many, identifier_filter, inject_identifier,
        insert_document, replacement_document,
    },
};

/// A collection of records of type `R`, backed by driver `D`.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the driver reference
/// * `D` - The driver type
/// * `R` - The record type stored in the collection
#[derive(Debug)]
pub struct Collection<'a, D: Driver, R: Record> {
    name: String,
    driver: &'a D,
    _marker: PhantomData<R>,
}

impl<'a, D: Driver, R: Record> Collection<'a, D, R> {
    /// Creates a collection over `driver` with the given name.
    pub fn new(name: impl Into<String>, driver: &'a D) -> Self {
        Self { name: name.into(), driver, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the driver backing this collection.
    pub fn driver(&self) -> &'a D {
        self.driver
    }

    /// Views the same collection as a different record type.
    pub fn with_type<T: Record>(&self) -> Collection<'a, D, T> {
        Collection {
            name: self.name.clone(),
            driver: self.driver,
            _marker: PhantomData,
        }
    }

    /// Finds the stored record with the same identifier as `record`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no document matches.
    ///
    /// # Errors
    ///
    /// Returns [`MangoError::MissingIdentifierField`](crate::error::MangoError::MissingIdentifierField)
    /// if `record` has no identifier, or the driver's error.
    pub async fn find_by_id(
        &self,
        record: &R,
        options: impl Into<Option<D::FindOneOptions>> + Send,
    ) -> MangoResult<Option<R>> {
        let filter = identifier_filter(record)?;
        debug!(collection = %self.name, ?filter, "find by id");

        self.driver
            .find_one(&self.name, filter, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "find by id failed"))?
            .map(decode::<R>)
            .transpose()
    }

    /// Finds every stored record matching the non-zero, non-identifier fields of `example`.
    ///
    /// An example with only zero-valued fields matches the whole collection.
    pub async fn find(
        &self,
        example: &R,
        options: impl Into<Option<D::FindOptions>> + Send,
    ) -> MangoResult<Vec<R>> {
        let filter = content_document(example)?;
        debug!(collection = %self.name, ?filter, "find by example");

        let documents = self
            .driver
            .find(&self.name, filter, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "find failed"))?;

        decode_many(documents)
    }

    /// Finds one page of records matching a raw filter.
    ///
    /// `page` and `per_page` are parsed leniently, see [`PaginationParams::parse`].
    pub async fn page(
        &self,
        filter: Document,
        sort: Option<Document>,
        page: &str,
        per_page: &str,
    ) -> MangoResult<Page<R>> {
        let params = PaginationParams::parse(page, per_page);
        debug!(
            collection = %self.name,
            page = params.page,
            per_page = params.per_page,
            skip = params.offset(),
            "find page"
        );

        let documents = self
            .driver
            .find(
                &self.name,
                filter,
                Some(D::page_options(sort, params.offset(), params.limit())),
            )
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "find page failed"))?;

        Ok(Page::builder(decode_many(documents)?)
            .with_page(params.page)
            .with_per_page(params.per_page)
            .build())
    }

    /// Inserts a record and writes the identifier it was stored under back into it.
    ///
    /// Takes the record by mutable reference: the assigned identifier is only ever
    /// visible through the caller's own value. An identifier stored under `_id` comes
    /// from the driver's result; one stored under any other key is the value sent in
    /// the insert document.
    pub async fn insert_one(
        &self,
        record: &mut R,
        options: impl Into<Option<D::InsertOneOptions>> + Send,
    ) -> MangoResult<InsertOneResult> {
        let document = insert_document(record)?;
        let own_key_id = R::id_key()
            .filter(|key| *key != OBJECT_ID_KEY)
            .and_then(|key| document.get(key).cloned());
        debug!(collection = %self.name, "insert one");

        let result = self
            .driver
            .insert_one(&self.name, document, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "insert failed"))?;

        inject_identifier(record, own_key_id.unwrap_or_else(|| result.inserted_id.clone()))?;

        Ok(result)
    }

    /// Sets every non-zero, non-identifier field of `record` on the stored document
    /// with the same identifier.
    pub async fn update_by_id(
        &self,
        record: &R,
        options: impl Into<Option<D::UpdateOptions>> + Send,
    ) -> MangoResult<UpdateResult> {
        let filter = identifier_filter(record)?;
        let update = doc! { "$set": content_document(record)? };
        debug!(collection = %self.name, ?filter, "update by id");

        self.driver
            .update_one(&self.name, filter, update, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "update failed"))
    }

    /// Replaces the stored document with the same identifier by the full contents of `record`.
    pub async fn replace_by_id(
        &self,
        record: &R,
        options: impl Into<Option<D::ReplaceOptions>> + Send,
    ) -> MangoResult<UpdateResult> {
        let filter = identifier_filter(record)?;
        let replacement = replacement_document(record)?;
        debug!(collection = %self.name, ?filter, "replace by id");

        self.driver
            .replace_one(&self.name, filter, replacement, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "replace failed"))
    }

    /// Deletes the stored document with the same identifier as `record`.
    pub async fn delete_by_id(
        &self,
        record: &R,
        options: impl Into<Option<D::DeleteOptions>> + Send,
    ) -> MangoResult<DeleteResult> {
        let filter = identifier_filter(record)?;
        debug!(collection = %self.name, ?filter, "delete by id");

        self.driver
            .delete_one(&self.name, filter, options.into())
            .await
            .inspect_err(|e| warn!(collection = %self.name, error = %e, "delete failed"))
    }
}
