//! In-memory driver implementation.
//!
//! Collections are vectors of BSON documents kept in insertion order behind an
//! async-aware read-write lock.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};

use mango_core::{
    driver::{DeleteResult, Driver, DriverBuilder, InsertOneResult, UpdateResult},
    error::MangoResult,
    record::OBJECT_ID_KEY,
};

use crate::{
    error::MemoryError,
    evaluator::{DocumentEvaluator, apply_update, sort_documents, upsert_seed},
    options::{FindOneOptions, FindOptions, UpdateOptions},
};

type CollectionMap = Vec<Document>;
type StoreMap = HashMap<String, CollectionMap>;


/// Thread-safe in-memory document database.
///
/// Implements [`Driver`] entirely in process. Clones share the same underlying data,
/// so a driver can be handed to several tasks.
///
/// Queries scan every document of a collection; there are no indexes.
///
/// # Example
///
/// ```ignore
/// use mango_memory::InMemoryDriver;
/// use mango::driver::Driver;
/// use bson::doc;
///
/// let driver = InMemoryDriver::new();
/// let result = driver.insert_one("space", doc! { "name": "test" }, None).await?;
/// let found = driver.find_one("space", doc! { "_id": result.inserted_id }, None).await?;
/// assert!(found.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryDriver {
    /// collection name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryDriver {
    /// Creates a new driver with no collections.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryDriver`, optionally pre-seeded.
    pub fn builder() -> InMemoryDriverBuilder {
        InMemoryDriverBuilder::default()
    }

    /// Names of the collections that have received at least one document.
    pub async fn collection_names(&self) -> Vec<String> {
        self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of every document stored in `collection`, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.store
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn position(documents: &[Document], filter: &Document) -> Result<Option<usize>, MemoryError> {
    for (index, document) in documents.iter().enumerate() {
        if DocumentEvaluator::new(document).matches(filter)? {
            return Ok(Some(index));
        }
    }

    Ok(None)
}

/// Puts `_id` first, generating an ObjectId when the document has none.
fn with_object_id(mut document: Document, fallback: impl FnOnce() -> Bson) -> (Bson, Document) {
    let id = document
        .remove(OBJECT_ID_KEY)
        .unwrap_or_else(fallback);

    let stored = Document::from_iter(
        std::iter::once((OBJECT_ID_KEY.to_string(), id.clone()))
            .chain(document)
    );

    (id, stored)
}

fn new_object_id() -> Bson {
    Bson::ObjectId(ObjectId::new())
}

fn window(documents: Vec<Document>, skip: Option<u64>, limit: Option<i64>) -> Vec<Document> {
    let skip = skip
        .and_then(|skip| usize::try_from(skip).ok())
        .unwrap_or(0);
    let take = match limit {
        None | Some(0) => usize::MAX,
        Some(limit) => usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX),
    };

    documents
        .into_iter()
        .skip(skip)
        .take(take)
        .collect()
}

fn check_replacement(replacement: &Document) -> Result<(), MemoryError> {
    if replacement.keys().any(|key| key.starts_with('$')) {
        return Err(MemoryError::InvalidUpdate(
            "replacement document must not contain update operators".into(),
        ));
    }

    Ok(())
}


#[async_trait]
impl Driver for InMemoryDriver {
    type FindOneOptions = FindOneOptions;
    type FindOptions = FindOptions;
    type InsertOneOptions = ();
    type UpdateOptions = UpdateOptions;
    type ReplaceOptions = UpdateOptions;
    type DeleteOptions = ();

    fn page_options(sort: Option<Document>, skip: u64, limit: i64) -> Self::FindOptions {
        FindOptions {
            sort,
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOneOptions>,
    ) -> MangoResult<Option<Document>> {
        let options = FindOptions::from(options.unwrap_or_default());

        Ok(
            self.find(collection, filter, Some(options))
                .await?
                .into_iter()
                .next()
        )
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOptions>,
    ) -> MangoResult<Vec<Document>> {
        let options = options.unwrap_or_default();
        let store = self.store.read().await;
        let documents = match store.get(collection) {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        let mut matched = DocumentEvaluator::filter_documents(documents, &filter)?;

        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort)?;
        }

        tracing::trace!(collection, matched = matched.len(), "memory find");

        Ok(window(matched, options.skip, options.limit))
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        _options: Option<Self::InsertOneOptions>,
    ) -> MangoResult<InsertOneResult> {
        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let (id, stored) = with_object_id(document, new_object_id);

        if documents.iter().any(|existing| existing.get(OBJECT_ID_KEY) == Some(&id)) {
            return Err(MemoryError::DuplicateKey(id.to_string(), collection.to_string()).into());
        }

        documents.push(stored);

        Ok(InsertOneResult { inserted_id: id })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: Option<Self::UpdateOptions>,
    ) -> MangoResult<UpdateResult> {
        let upsert = options
            .and_then(|options| options.upsert)
            .unwrap_or(false);

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        match position(documents, &filter)? {
            Some(index) => {
                let current = &documents[index];
                let mut updated = current.clone();
                apply_update(&mut updated, &update)?;

                if updated.get(OBJECT_ID_KEY) != current.get(OBJECT_ID_KEY) {
                    return Err(MemoryError::ImmutableId.into());
                }

                let modified = updated != *current;
                if modified {
                    documents[index] = updated;
                }

                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            },
            None if upsert => {
                let mut seeded = upsert_seed(&filter);
                apply_update(&mut seeded, &update)?;

                let (id, stored) = with_object_id(seeded, new_object_id);
                documents.push(stored);

                Ok(UpdateResult {
                    upserted_id: Some(id),
                    ..Default::default()
                })
            },
            None => Ok(UpdateResult::default()),
        }
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Option<Self::ReplaceOptions>,
    ) -> MangoResult<UpdateResult> {
        check_replacement(&replacement)?;

        let upsert = options
            .and_then(|options| options.upsert)
            .unwrap_or(false);

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        match position(documents, &filter)? {
            Some(index) => {
                let current = &documents[index];
                let current_id = current
                    .get(OBJECT_ID_KEY)
                    .cloned()
                    .unwrap_or(Bson::Null);

                if replacement
                    .get(OBJECT_ID_KEY)
                    .is_some_and(|id| *id != current_id)
                {
                    return Err(MemoryError::ImmutableId.into());
                }

                let (_, replaced) = with_object_id(replacement, || current_id);
                let modified = replaced != *current;
                if modified {
                    documents[index] = replaced;
                }

                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            },
            None if upsert => {
                let seed_id = upsert_seed(&filter).remove(OBJECT_ID_KEY);
                let (id, stored) = with_object_id(replacement, || {
                    seed_id.unwrap_or_else(new_object_id)
                });

                if documents.iter().any(|existing| existing.get(OBJECT_ID_KEY) == Some(&id)) {
                    return Err(MemoryError::DuplicateKey(id.to_string(), collection.to_string()).into());
                }

                documents.push(stored);

                Ok(UpdateResult {
                    upserted_id: Some(id),
                    ..Default::default()
                })
            },
            None => Ok(UpdateResult::default()),
        }
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        _options: Option<Self::DeleteOptions>,
    ) -> MangoResult<DeleteResult> {
        let mut store = self.store.write().await;
        let documents = match store.get_mut(collection) {
            Some(documents) => documents,
            None => return Ok(DeleteResult::default()),
        };

        match position(documents, &filter)? {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            },
            None => Ok(DeleteResult::default()),
        }
    }
}


/// Builder for constructing [`InMemoryDriver`] instances.
///
/// # Example
///
/// ```ignore
/// use mango_memory::InMemoryDriver;
/// use mango::driver::DriverBuilder;
/// use bson::doc;
///
/// let driver = InMemoryDriver::builder()
///     .with_documents("space", vec![doc! { "name": "seeded" }])
///     .build()
///     .await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryDriverBuilder {
    seed: Vec<(String, Vec<Document>)>,
}

impl InMemoryDriverBuilder {
    /// Pre-loads `documents` into `collection`. Documents without `_id` get an ObjectId.
    pub fn with_documents(mut self, collection: impl Into<String>, documents: Vec<Document>) -> Self {
        self.seed.push((collection.into(), documents));
        self
    }
}

#[async_trait]
impl DriverBuilder for InMemoryDriverBuilder {
    type Driver = InMemoryDriver;

    /// Builds the driver, failing if the seed repeats an `_id` within a collection.
    async fn build(self) -> MangoResult<Self::Driver> {
        let driver = InMemoryDriver::new();

        for (collection, documents) in self.seed {
            for document in documents {
                driver
                    .insert_one(&collection, document, None)
                    .await?;
            }
        }

        Ok(driver)
    }
}
