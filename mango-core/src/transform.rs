//! Conversion between records and the documents sent to a driver.
//!
//! Every identifier-dependent collection operation goes through this module:
//!
//! - [`identifier`] / [`inject_identifier`] read and write the identifier field
//! - [`identifier_filter`] builds the `{ <id key>: <id> }` filter selecting one record
//! - [`content_document`] yields the non-zero, non-identifier fields of a record
//! - [`insert_document`] and [`replacement_document`] build full payloads
//! - [`decode`] and [`decode_many`] turn driver documents back into records
//!
//! An identifier that parses as a 24 character hex ObjectId is sent to the
//! database as an ObjectId. Any other identifier is sent as a plain string.

use bson::{
    Bson, Document, de::deserialize_from_document, oid::ObjectId, ser::serialize_to_document,
};
use tracing::trace;

use crate::{
    error::{MangoError, MangoResult},
    record::{OBJECT_ID_KEY, Record},
};

/// Returns the record's identifier, or an empty string when it has none.
pub fn identifier<R: Record>(record: &R) -> String {
    match R::id_key() {
        Some(_) => record.id(),
        None => String::new(),
    }
}

/// Writes a driver-assigned identifier into the record.
///
/// ObjectIds are stored as their hex form. Records without an identifier field are left untouched.
///
/// # Errors
///
/// Returns [`MangoError::InvalidIdentifier`] if `id` is neither an ObjectId nor a string.
pub fn inject_identifier<R: Record>(record: &mut R, id: Bson) -> MangoResult<()> {
    if R::id_key().is_none() {
        return Ok(());
    }

    match id {
        Bson::ObjectId(oid) => record.set_id(oid.to_hex()),
        Bson::String(id) => record.set_id(id),
        other => {
            return Err(MangoError::InvalidIdentifier(format!(
                "cannot store {:?} value in a string identifier field",
                other.element_type()
            )));
        }
    }

    Ok(())
}

/// Builds the filter document selecting this record by identifier.
///
/// # Errors
///
/// Returns [`MangoError::MissingIdentifierField`] if the type has no identifier field
/// or the identifier is empty.
pub fn identifier_filter<R: Record>(record: &R) -> MangoResult<Document> {
    let key = R::id_key().ok_or(MangoError::MissingIdentifierField)?;
    let id = identifier(record);

    if id.is_empty() {
        return Err(MangoError::MissingIdentifierField);
    }

    let mut filter = Document::new();
    filter.insert(key, identifier_value(id));

    Ok(filter)
}

/// Builds the content document of a record: every field except the identifier,
/// skipping fields holding their type's zero value.
///
/// The result doubles as a query-by-example filter and as the body of a `$set` update.
///
/// # Errors
///
/// Returns [`MangoError::Transformation`] if the record does not serialize to a document.
pub fn content_document<R: Record>(record: &R) -> MangoResult<Document> {
    let serialized = serialize_to_document(record)?;
    let content = serialized
        .into_iter()
        .filter(|(key, value)| !is_identifier_key::<R>(key) && !is_zero(value))
        .collect::<Document>();

    trace!(collection = R::collection_name(), ?content, "content document");

    Ok(content)
}

/// Builds the document inserted for a new record.
///
/// An ObjectId-shaped identifier is stored as an ObjectId. An empty `_id` is left out so
/// the database assigns one. An empty identifier under any other key gets a fresh
/// ObjectId here, since the database only assigns `_id`. Zero-valued fields are kept.
///
/// # Errors
///
/// Returns [`MangoError::Transformation`] if the record does not serialize to a document.
pub fn insert_document<R: Record>(record: &R) -> MangoResult<Document> {
    let mut document = serialize_to_document(record)?;

    if let Some(key) = R::id_key() {
        let id = identifier(record);

        if !id.is_empty() {
            document.insert(key, identifier_value(id));
        } else if key == OBJECT_ID_KEY {
            document.remove(key);
        } else {
            document.insert(key, ObjectId::new());
        }
    }

    trace!(collection = R::collection_name(), ?document, "insert document");

    Ok(document)
}

/// Builds the full replacement payload for a record.
///
/// The payload comes from [`Record::without_id`], so the matched document keeps its
/// own `_id`. An identifier stored under any other key is an ordinary field to the
/// database, so it is written back first. Zero-valued fields are kept.
///
/// # Errors
///
/// Returns [`MangoError::Transformation`] if the record does not serialize to a document.
pub fn replacement_document<R: Record>(record: &R) -> MangoResult<Document> {
    let own_key = R::id_key()
        .filter(|key| *key != OBJECT_ID_KEY)
        .map(|key| (key.to_string(), identifier_value(identifier(record))));

    let replacement = own_key
        .into_iter()
        .chain(
            serialize_to_document(&record.without_id())?
                .into_iter()
                .filter(|(key, _)| !is_identifier_key::<R>(key))
        )
        .collect::<Document>();

    trace!(collection = R::collection_name(), ?replacement, "replacement document");

    Ok(replacement)
}

/// Decodes a driver document into a record.
///
/// An ObjectId stored under the identifier key is handed to the record as its hex string.
///
/// # Errors
///
/// Returns [`MangoError::Transformation`] if the document does not match the record type.
pub fn decode<R: Record>(mut document: Document) -> MangoResult<R> {
    if let Some(key) = R::id_key() {
        if let Some(Bson::ObjectId(oid)) = document.get(key) {
            let hex = oid.to_hex();
            document.insert(key, hex);
        }
    }

    Ok(deserialize_from_document(document)?)
}

/// Decodes every document returned by a driver, failing on the first mismatch.
pub fn decode_many<R: Record>(documents: Vec<Document>) -> MangoResult<Vec<R>> {
    documents.into_iter().map(decode::<R>).collect()
}

/// Returns true if the value is the zero value of its BSON type.
pub fn is_zero(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => true,
        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => s.is_empty(),
        Bson::Int32(n) => *n == 0,
        Bson::Int64(n) => *n == 0,
        Bson::Double(n) => *n == 0.0,
        Bson::Boolean(b) => !b,
        Bson::Array(items) => items.is_empty(),
        Bson::Document(doc) => doc.is_empty(),
        Bson::DateTime(dt) => dt.timestamp_millis() == 0,
        Bson::ObjectId(oid) => oid.bytes() == [0; 12],
        Bson::Binary(binary) => binary.bytes.is_empty(),
        Bson::Timestamp(ts) => ts.time == 0 && ts.increment == 0,
        Bson::Decimal128(d) => d.bytes() == [0; 16],
        _ => false,
    }
}

fn identifier_value(id: String) -> Bson {
    match ObjectId::parse_str(&id) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id),
    }
}

fn is_identifier_key<R: Record>(key: &str) -> bool {
    key == OBJECT_ID_KEY || R::id_key() == Some(key)
}
