//! The trait mapping a Rust type onto a database document.
//!
//! A [`Record`] is any serde-serializable struct whose identifier field (if any) is
//! known at compile time. Most types get their implementation from
//! `#[derive(Record)]`; implementing it by hand is a matter of pointing the four
//! identifier accessors at the right field.

use serde::{Serialize, de::DeserializeOwned};

/// Document key under which the database stores a document's identifier.
pub const OBJECT_ID_KEY: &str = "_id";

/// Core trait that every type stored through a collection must implement.
///
/// A record has zero or one identifier field. Types without one can still be
/// inserted and used as query-by-example filters, but every identifier-dependent
/// operation on them fails with
/// [`MangoError::MissingIdentifierField`](crate::error::MangoError::MissingIdentifierField).
///
/// # Example
///
/// ```ignore
/// use mango::record::{Record, IdentifierField};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct Space {
///     #[serde(rename = "_id", default)]
///     pub id: String,
///     pub name: String,
/// }
///
/// impl Record for Space {
///     fn collection_name() -> &'static str { "spaces" }
///     fn id_key() -> Option<&'static str> { Some("_id") }
///     fn id(&self) -> String { self.id.to_identifier() }
///     fn set_id(&mut self, id: String) { self.id = IdentifierField::from_identifier(id) }
///     fn clear_id(&mut self) { self.id = Default::default() }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Returns the name of the collection this record type is stored in by default.
    fn collection_name() -> &'static str;

    /// Returns the document key of the identifier field, or `None` if the type has none.
    fn id_key() -> Option<&'static str>;

    /// Returns the identifier as a string, empty when unset or when the type has no identifier field.
    fn id(&self) -> String;

    /// Writes an identifier into the identifier field. No-op for types without one.
    fn set_id(&mut self, id: String);

    /// Resets the identifier field to its default value. No-op for types without one.
    fn clear_id(&mut self);

    /// Returns an independent copy of this record with the identifier reset.
    fn without_id(&self) -> Self {
        let mut clone = self.clone();
        clone.clear_id();
        clone
    }
}

/// Field types that can hold a record identifier.
///
/// Identifiers are string-shaped: either the hex form of an ObjectId or an opaque key.
pub trait IdentifierField: Default {
    /// Returns the identifier held by this field, empty when unset.
    fn to_identifier(&self) -> String;

    /// Builds the field value holding `id`.
    fn from_identifier(id: String) -> Self;
}

impl IdentifierField for String {
    fn to_identifier(&self) -> String {
        self.clone()
    }

    fn from_identifier(id: String) -> Self {
        id
    }
}

impl IdentifierField for Option<String> {
    fn to_identifier(&self) -> String {
        self.clone().unwrap_or_default()
    }

    fn from_identifier(id: String) -> Self {
        if id.is_empty() { None } else { Some(id) }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{NotHaveId, Space};
    use super::*;

    #[test]
    fn without_id_resets_only_the_identifier() {
        let src = Space {
            id: "6277cc2316b97479f315e797".into(),
            name: "test".into(),
            members: vec!["a".into()],
            ..Default::default()
        };

        let dst = src.without_id();

        assert_ne!(src, dst);
        assert!(dst.id.is_empty());
        assert_eq!(dst.name, src.name);
        assert_eq!(dst.members, src.members);
    }

    #[test]
    fn without_id_returns_an_independent_value() {
        let src = Space {
            id: "6277cc2316b97479f315e797".into(),
            name: "test".into(),
            ..Default::default()
        };
        let by_ref = &src;

        let mut dst = by_ref.without_id();
        dst.name.push_str("-changed");
        dst.members.push("someone".into());

        assert_eq!(src.name, "test");
        assert!(src.members.is_empty());
        assert_eq!(src.id, "6277cc2316b97479f315e797");
    }

    #[test]
    fn without_id_is_a_plain_clone_without_identifier_field() {
        let src = NotHaveId { name: "test".into() };

        assert_eq!(src.without_id(), src);
    }

    #[test]
    fn optional_identifier_fields_treat_empty_as_unset() {
        assert_eq!(None::<String>.to_identifier(), "");
        assert_eq!(Option::<String>::from_identifier(String::new()), None);
        assert_eq!(
            Option::<String>::from_identifier("abc".into()),
            Some("abc".to_string())
        );
    }
}
