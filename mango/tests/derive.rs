use mango::{Record, record::Record as _, transform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
struct Space {
    #[serde(rename = "_id", default)]
    id: String,
    name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(collection = "people")]
struct Person {
    #[record(id)]
    person_key: Option<String>,
    display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
struct Holder {
    #[serde(rename = "_identifierHolder")]
    holder: String,
}

#[test]
fn object_id_rename_marks_the_identifier() {
    assert_eq!(Space::collection_name(), "space");
    assert_eq!(Space::id_key(), Some("_id"));

    let mut space = Space { id: "6277cc2316b97479f315e797".into(), name: "test".into() };
    assert_eq!(space.id(), "6277cc2316b97479f315e797");

    space.set_id("notanobjectid".into());
    assert_eq!(space.id, "notanobjectid");

    let clone = space.without_id();
    assert_eq!(clone, Space { id: String::new(), name: "test".into() });
    assert_eq!(space.id, "notanobjectid");
}

#[test]
fn marked_field_uses_its_serde_key() {
    assert_eq!(Person::collection_name(), "people");
    assert_eq!(Person::id_key(), Some("personKey"));

    let mut person = Person { person_key: None, display_name: "Ana".into() };
    assert_eq!(person.id(), "");

    person.set_id("p-1".into());
    assert_eq!(person.person_key.as_deref(), Some("p-1"));

    let filter = transform::identifier_filter(&person).unwrap();
    assert_eq!(filter, mango::bson::doc! { "personKey": "p-1" });

    let content = transform::content_document(&person).unwrap();
    assert_eq!(content, mango::bson::doc! { "displayName": "Ana" });

    person.clear_id();
    assert_eq!(person.person_key, None);
}

#[test]
fn similar_keys_are_not_identifiers() {
    assert_eq!(Holder::id_key(), None);

    let holder = Holder { holder: "x".into() };
    assert_eq!(holder.id(), "");
    assert!(transform::identifier_filter(&holder).is_err());
}
