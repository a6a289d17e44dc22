use mango::{
    bson::{Bson, doc, oid::ObjectId},
    memory::{InMemoryDriver, MemoryError},
    prelude::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
struct Space {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    founder: String,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    capacity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
#[record(collection = "notes")]
struct NotHaveId {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
struct Person {
    #[record(id)]
    #[serde(default)]
    person_key: String,
    #[serde(default)]
    display_name: String,
}

fn space(name: &str, founder: &str, capacity: i32) -> Space {
    Space {
        name: name.into(),
        founder: founder.into(),
        capacity,
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_assigns_object_id() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let mut created = space("test", "u1", 4);
    let result = spaces.insert_one(&mut created, None).await.unwrap();

    let oid = ObjectId::parse_str(&created.id).unwrap();
    assert_eq!(result.inserted_id, Bson::ObjectId(oid));

    let stored = database.driver().documents("space").await;
    assert_eq!(stored[0].get("_id"), Some(&Bson::ObjectId(oid)));

    let found = spaces.find_by_id(&created, None).await.unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn opaque_identifiers_stay_strings() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let key = uuid::Uuid::new_v4().to_string();
    let mut created = Space { id: key.clone(), ..space("keyed", "u1", 1) };
    let result = spaces.insert_one(&mut created, None).await.unwrap();

    assert_eq!(result.inserted_id, Bson::String(key.clone()));
    assert_eq!(created.id, key);

    let found = spaces
        .find_by_id(&Space { id: key, ..Default::default() }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "keyed");
}

#[tokio::test]
async fn find_by_id_misses_are_none() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let missing = Space { id: ObjectId::new().to_hex(), ..Default::default() };
    assert_eq!(spaces.find_by_id(&missing, None).await.unwrap(), None);

    let missing = Space { id: "notanobjectid".into(), ..Default::default() };
    assert_eq!(spaces.find_by_id(&missing, None).await.unwrap(), None);
}

#[tokio::test]
async fn find_matches_non_zero_fields() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    for mut created in [space("a", "u1", 1), space("b", "u2", 1), space("c", "u1", 0)] {
        spaces.insert_one(&mut created, None).await.unwrap();
    }

    let by_founder = spaces
        .find(&Space { founder: "u1".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let names = by_founder.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "c"]);

    let everything = spaces.find(&Space::default(), None).await.unwrap();
    assert_eq!(everything.len(), 3);

    let with_id_only = Space { id: everything[0].id.clone(), ..Default::default() };
    assert_eq!(spaces.find(&with_id_only, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn update_sets_only_non_zero_fields() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let mut created = Space { members: vec!["u1".into()], ..space("before", "u1", 5) };
    spaces.insert_one(&mut created, None).await.unwrap();

    let patch = Space { id: created.id.clone(), name: "after".into(), ..Default::default() };
    let result = spaces.update_by_id(&patch, None).await.unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);

    let found = spaces.find_by_id(&created, None).await.unwrap().unwrap();
    assert_eq!(found, Space { name: "after".into(), ..created });
}

#[tokio::test]
async fn replace_overwrites_every_field() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let mut created = Space { members: vec!["u1".into()], ..space("before", "u1", 5) };
    spaces.insert_one(&mut created, None).await.unwrap();

    let replacement = Space { id: created.id.clone(), name: "after".into(), ..Default::default() };
    let result = spaces.replace_by_id(&replacement, None).await.unwrap();
    assert_eq!(result.matched_count, 1);

    let found = spaces.find_by_id(&created, None).await.unwrap().unwrap();
    assert_eq!(found, replacement);

    let stored = database.driver().documents("space").await;
    assert_eq!(stored[0].get_i32("capacity").unwrap(), 0);
    assert!(matches!(stored[0].get("_id"), Some(Bson::ObjectId(_))));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let mut created = space("gone", "u1", 1);
    spaces.insert_one(&mut created, None).await.unwrap();

    assert_eq!(spaces.delete_by_id(&created, None).await.unwrap().deleted_count, 1);
    assert_eq!(spaces.delete_by_id(&created, None).await.unwrap().deleted_count, 0);
    assert_eq!(spaces.find_by_id(&created, None).await.unwrap(), None);
}

#[tokio::test]
async fn page_returns_a_sorted_window() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    for capacity in [5, 3, 1, 4, 2] {
        let mut created = space(&format!("s{capacity}"), "u1", capacity);
        spaces.insert_one(&mut created, None).await.unwrap();
    }

    let page = spaces
        .page(doc! { "founder": "u1" }, Some(doc! { "capacity": 1 }), "2", "2")
        .await
        .unwrap();

    let capacities = page.items.iter().map(|s| s.capacity).collect::<Vec<_>>();
    assert_eq!(capacities, vec![3, 4]);
    assert_eq!(page.page, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.previous_page, Some(1));

    let clamped = spaces.page(doc! {}, None, "a", "-10").await.unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.per_page, 1);
    assert_eq!(clamped.previous_page, None);
    assert_eq!(clamped.items.len(), 1);
    assert_eq!(clamped.items[0].capacity, 5);

    let past_the_end = spaces.page(doc! {}, None, "9", "2").await.unwrap();
    assert!(past_the_end.items.is_empty());
}

#[tokio::test]
async fn identifier_operations_need_an_identifier() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();
    let unsaved = space("unsaved", "u1", 1);

    assert!(matches!(
        spaces.find_by_id(&unsaved, None).await,
        Err(MangoError::MissingIdentifierField)
    ));
    assert!(matches!(
        spaces.update_by_id(&unsaved, None).await,
        Err(MangoError::MissingIdentifierField)
    ));
    assert!(matches!(
        spaces.replace_by_id(&unsaved, None).await,
        Err(MangoError::MissingIdentifierField)
    ));
    assert!(matches!(
        spaces.delete_by_id(&unsaved, None).await,
        Err(MangoError::MissingIdentifierField)
    ));
}

#[tokio::test]
async fn records_without_identifier_field() {
    let database = Database::new(InMemoryDriver::new());
    let notes = database.typed_collection::<NotHaveId>();

    let mut note = NotHaveId { name: "test".into() };
    notes.insert_one(&mut note, None).await.unwrap();
    assert_eq!(note, NotHaveId { name: "test".into() });

    let found = notes.find(&NotHaveId::default(), None).await.unwrap();
    assert_eq!(found, vec![note.clone()]);

    assert!(matches!(
        notes.find_by_id(&note, None).await,
        Err(MangoError::MissingIdentifierField)
    ));
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let database = Database::new(InMemoryDriver::new());
    let spaces = database.typed_collection::<Space>();

    let mut first = Space { id: "dup".into(), ..space("one", "u1", 1) };
    spaces.insert_one(&mut first, None).await.unwrap();

    let mut second = Space { id: "dup".into(), ..space("two", "u1", 1) };
    let err = spaces.insert_one(&mut second, None).await.unwrap_err();

    assert!(matches!(err, MangoError::Driver(_)));
    assert!(matches!(
        err.driver_error::<MemoryError>(),
        Some(MemoryError::DuplicateKey(..))
    ));
}

#[tokio::test]
async fn collections_can_be_renamed_and_retyped() {
    let database = Database::new(InMemoryDriver::new());
    let archive = database.collection::<Space>("space_archive");

    let mut created = space("old", "u1", 1);
    archive.insert_one(&mut created, None).await.unwrap();

    assert_eq!(archive.name(), "space_archive");
    assert!(database.driver().documents("space").await.is_empty());

    let notes = archive.with_type::<NotHaveId>();
    let found = notes.find(&NotHaveId { name: "old".into() }, None).await.unwrap();
    assert_eq!(found, vec![NotHaveId { name: "old".into() }]);

    let timed = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        archive.find_by_id(&created, None),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(timed, Some(created));
}

#[tokio::test]
async fn identifiers_under_their_own_key_round_trip() {
    let database = Database::new(InMemoryDriver::new());
    let people = database.typed_collection::<Person>();

    let mut keyed = Person { person_key: "p-1".into(), display_name: "Ana".into() };
    people.insert_one(&mut keyed, None).await.unwrap();
    assert_eq!(keyed.person_key, "p-1");

    let mut fresh = Person { display_name: "Bo".into(), ..Default::default() };
    people.insert_one(&mut fresh, None).await.unwrap();
    let assigned = ObjectId::parse_str(&fresh.person_key).unwrap();

    let stored = database.driver().documents("person").await;
    assert_eq!(stored[0].get_str("personKey").unwrap(), "p-1");
    assert_eq!(stored[1].get("personKey"), Some(&Bson::ObjectId(assigned)));

    assert_eq!(people.find_by_id(&keyed, None).await.unwrap(), Some(keyed.clone()));
    assert_eq!(people.find_by_id(&fresh, None).await.unwrap(), Some(fresh.clone()));

    let patch = Person { person_key: "p-1".into(), display_name: "Ana B".into() };
    assert_eq!(people.update_by_id(&patch, None).await.unwrap().modified_count, 1);
    assert_eq!(people.find_by_id(&keyed, None).await.unwrap(), Some(patch));

    let replacement = Person { person_key: fresh.person_key.clone(), display_name: "Bo C".into() };
    assert_eq!(people.replace_by_id(&replacement, None).await.unwrap().matched_count, 1);
    let replaced = people.find_by_id(&fresh, None).await.unwrap().unwrap();
    assert_eq!(replaced.display_name, "Bo C");

    assert_eq!(people.delete_by_id(&keyed, None).await.unwrap().deleted_count, 1);
    assert_eq!(people.delete_by_id(&fresh, None).await.unwrap().deleted_count, 1);
    assert!(database.driver().documents("person").await.is_empty());
}
