//! Option types accepted by [`InMemoryDriver`](crate::InMemoryDriver).

use bson::Document;

/// Options for [`Driver::find`](mango_core::driver::Driver::find).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort specification, `{ field: 1 | -1, ... }`.
    pub sort: Option<Document>,
    /// Number of matching documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return. Zero means no limit and a negative
    /// value limits by its absolute value.
    pub limit: Option<i64>,
}

/// Options for [`Driver::find_one`](mango_core::driver::Driver::find_one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
}

/// Options for [`Driver::update_one`](mango_core::driver::Driver::update_one) and
/// [`Driver::replace_one`](mango_core::driver::Driver::replace_one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// Insert a new document when nothing matches the filter.
    pub upsert: Option<bool>,
}

impl From<FindOneOptions> for FindOptions {
    fn from(options: FindOneOptions) -> Self {
        FindOptions {
            sort: options.sort,
            skip: options.skip,
            limit: Some(1),
        }
    }
}
