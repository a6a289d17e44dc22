use async_trait::async_trait;
use futures::TryStreamExt;
use bson::Document;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{
        ClientOptions, DeleteOptions, FindOneOptions, FindOptions, InsertOneOptions,
        ReplaceOptions, UpdateOptions,
    },
};
use mango_core::{
    driver::{DeleteResult, Driver, DriverBuilder, InsertOneResult, UpdateResult},
    error::{MangoError, MangoResult},
};


/// [`Driver`] over a MongoDB database.
///
/// Holds a `mongodb::Client`, which pools connections internally and is cheap to share.
#[derive(Debug, Clone)]
pub struct MongoDriver {
    client: Client,
    database: String,
}

impl MongoDriver {
    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self { client, database: database.into() }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDriverBuilder {
        MongoDriverBuilder::new(dsn, database)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }
}

#[async_trait]
impl Driver for MongoDriver {
    type FindOneOptions = FindOneOptions;
    type FindOptions = FindOptions;
    type InsertOneOptions = InsertOneOptions;
    type UpdateOptions = UpdateOptions;
    type ReplaceOptions = ReplaceOptions;
    type DeleteOptions = DeleteOptions;

    fn page_options(sort: Option<Document>, skip: u64, limit: i64) -> Self::FindOptions {
        let mut options = FindOptions::default();

        options.sort = sort;
        options.skip = Some(skip);
        options.limit = Some(limit);

        options
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOneOptions>,
    ) -> MangoResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(filter)
            .with_options(options)
            .await
            .map_err(MangoError::driver)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::FindOptions>,
    ) -> MangoResult<Vec<Document>> {
        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(MangoError::driver)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(MangoError::driver)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: Option<Self::InsertOneOptions>,
    ) -> MangoResult<InsertOneResult> {
        let result = self.get_collection(collection)
            .insert_one(document)
            .with_options(options)
            .await
            .map_err(MangoError::driver)?;

        Ok(InsertOneResult { inserted_id: result.inserted_id })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: Option<Self::UpdateOptions>,
    ) -> MangoResult<UpdateResult> {
        let result = self.get_collection(collection)
            .update_one(filter, update)
            .with_options(options)
            .await
            .map_err(MangoError::driver)?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: Option<Self::ReplaceOptions>,
    ) -> MangoResult<UpdateResult> {
        let result = self.get_collection(collection)
            .replace_one(filter, replacement)
            .with_options(options)
            .await
            .map_err(MangoError::driver)?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: Option<Self::DeleteOptions>,
    ) -> MangoResult<DeleteResult> {
        let result = self.get_collection(collection)
            .delete_one(filter)
            .with_options(options)
            .await
            .map_err(MangoError::driver)?;

        Ok(DeleteResult { deleted_count: result.deleted_count })
    }

    async fn shutdown(self) -> MangoResult<()> {
        tracing::debug!(database = %self.database, "shutting down mongodb client");
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builds a [`MongoDriver`] from a connection string and a database name.
#[derive(Debug, Clone)]
pub struct MongoDriverBuilder {
    dsn: String,
    database: String,
    app_name: Option<String>,
}

impl MongoDriverBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            app_name: None,
        }
    }

    /// Application name reported to the server in the connection handshake.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[async_trait]
impl DriverBuilder for MongoDriverBuilder {
    type Driver = MongoDriver;

    async fn build(self) -> MangoResult<Self::Driver> {
        let mut options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| MangoError::Initialization(e.to_string()))?;

        if self.app_name.is_some() {
            options.app_name = self.app_name;
        }

        tracing::debug!(database = %self.database, "connecting mongodb client");

        Ok(MongoDriver::new(
            Client::with_options(options)
                .map_err(|e| MangoError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}


#[cfg(test)]
mod tests {
    use bson::{Bson, doc};

    use super::*;

    #[test]
    fn page_options_select_a_window() {
        let options = MongoDriver::page_options(Some(doc! { "name": 1 }), 20, 10);

        assert_eq!(options.sort, Some(doc! { "name": 1 }));
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.limit, Some(10));
    }

    #[tokio::test]
    async fn invalid_dsn_is_an_initialization_error() {
        let err = MongoDriver::builder("not-a-connection-string", "test")
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, MangoError::Initialization(_)));
    }

    fn live_dsn() -> String {
        std::env::var("MANGO_MONGODB_DSN")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    #[tokio::test]
    #[ignore = "needs a running MongoDB, see MANGO_MONGODB_DSN"]
    async fn live_round_trip() {
        let driver = MongoDriver::builder(&live_dsn(), "mango_test")
            .with_app_name("mango-tests")
            .build()
            .await
            .unwrap();
        let collection = format!("space_{}", uuid::Uuid::new_v4().simple());

        let inserted = driver
            .insert_one(&collection, doc! { "name": "test" }, None)
            .await
            .unwrap();
        assert!(matches!(inserted.inserted_id, Bson::ObjectId(_)));

        let filter = doc! { "_id": inserted.inserted_id.clone() };

        let updated = driver
            .update_one(&collection, filter.clone(), doc! { "$set": { "name": "renamed" } }, None)
            .await
            .unwrap();
        assert_eq!(updated.modified_count, 1);

        let found = driver
            .find_one(&collection, filter.clone(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "renamed");

        let deleted = driver
            .delete_one(&collection, filter, None)
            .await
            .unwrap();
        assert_eq!(deleted.deleted_count, 1);

        driver.get_collection(&collection).drop().await.unwrap();
        driver.shutdown().await.unwrap();
    }
}
