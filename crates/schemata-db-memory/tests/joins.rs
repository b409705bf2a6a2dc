//! End-to-end join resolution through in-memory managers.

use std::sync::Arc;

use assert_json_diff::assert_json_include;
use schemata_core::{Record, RequestContext};
use schemata_db_memory::{MemoryManager, MemoryManagers};
use schemata_schema::{Field, Format, JoinOptions, Schemas, kinds};
use schemata_storage::{ContentManager, Criteria, GetOptions, WithJoins};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn book_schema() -> Vec<Field> {
    vec![
        Field::new("title", kinds::STRING),
        Field::join_by_one("_author", "person", "authorId"),
    ]
}

async fn library() -> (Arc<MemoryManagers>, Arc<MemoryManager>, Arc<MemoryManager>) {
    let managers = MemoryManagers::new();
    let people = managers.register_dedicated("person", MemoryManager::new("person"));
    let books = managers.register_dedicated(
        "book",
        MemoryManager::new("book").with_schema(book_schema()),
    );
    people
        .insert_all([
            json!({"_id": "p1", "title": "Ursula K. Le Guin"}),
            json!({"_id": "p2", "title": "Octavia Butler"}),
        ])
        .await
        .unwrap();
    books
        .insert_all([
            json!({"_id": "b1", "title": "The Dispossessed", "authorId": "p1"}),
            json!({"_id": "b2", "title": "Kindred", "authorId": "p2"}),
            json!({"_id": "b3", "title": "Anonymous", "authorId": "gone"}),
        ])
        .await
        .unwrap();
    (managers, people, books)
}

#[tokio::test]
async fn test_get_resolves_author_join() {
    let (_managers, people, books) = library().await;
    let cx = RequestContext::anonymous();

    let result = books
        .get(&cx, &Criteria::All, &GetOptions::default())
        .await
        .unwrap();

    assert_eq!(result.len(), 3);
    assert_json_include!(
        actual: Value::Object(result.items[0].clone()),
        expected: json!({"title": "The Dispossessed", "_author": {"_id": "p1", "title": "Ursula K. Le Guin"}})
    );
    assert_eq!(result.items[1]["_author"]["title"], json!("Octavia Butler"));
    assert!(!result.items[2].contains_key("_author"));
    // Both authors fetched in one call.
    assert_eq!(people.fetch_count(), 1);
}

#[tokio::test]
async fn test_with_joins_disabled_skips_related_fetches() {
    let (_managers, people, books) = library().await;
    let cx = RequestContext::anonymous();

    let result = books
        .get(&cx, &Criteria::All, &GetOptions::with_joins(WithJoins::Disabled))
        .await
        .unwrap();

    assert!(result.items.iter().all(|book| !book.contains_key("_author")));
    assert_eq!(people.fetch_count(), 0);
}

#[tokio::test]
async fn test_csv_import_then_join() {
    let (managers, _people, _books) = library().await;
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut imported = Record::new();

    schemas
        .convert_fields(
            &cx,
            &book_schema(),
            &Format::Csv,
            &record(json!({"title": "Parable of the Sower", "_author": "octavia butler"})),
            &mut imported,
        )
        .await
        .unwrap();
    assert_eq!(imported.get("authorId"), Some(&json!("p2")));

    schemas
        .join_one(&cx, &book_schema(), &mut imported, &JoinOptions::default())
        .await
        .unwrap();
    assert_eq!(imported["_author"]["_id"], json!("p2"));
}

#[tokio::test]
async fn test_required_title_then_form_join() {
    let managers = MemoryManagers::new();
    let people = managers.register_dedicated("person", MemoryManager::new("person"));
    people
        .insert(json!({"_id": "123", "title": "Pat"}))
        .await
        .unwrap();
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let schema = vec![
        Field::new("title", kinds::STRING).required(),
        Field::join_by_one("_author", "person", "authorId"),
    ];

    let err = schemas
        .convert_fields(&cx, &schema, &Format::Form, &record(json!({"authorId": "123"})), &mut Record::new())
        .await
        .unwrap_err();
    assert_eq!(err.failed_fields(), ["title"]);

    let mut post = Record::new();
    schemas
        .convert_fields(
            &cx,
            &schema,
            &Format::Form,
            &record(json!({"title": "Hi", "authorId": "123"})),
            &mut post,
        )
        .await
        .unwrap();
    schemas
        .join_one(&cx, &schema, &mut post, &JoinOptions::default())
        .await
        .unwrap();

    assert_eq!(post["_author"]["title"], json!("Pat"));
    assert_eq!(people.fetch_count(), 1);
}

fn page_schema() -> Vec<Field> {
    vec![
        Field::new("title", kinds::STRING),
        Field::array(
            "events",
            vec![
                Field::new("name", kinds::STRING),
                Field::join_by_one("_location", "place", "locationId"),
            ],
        ),
    ]
}

#[tokio::test]
async fn test_joins_inside_array_elements() {
    let managers = MemoryManagers::new();
    let places = managers.register_dedicated("place", MemoryManager::new("place"));
    places
        .insert_all([
            json!({"_id": "l1", "title": "Town Hall"}),
            json!({"_id": "l2", "title": "Library"}),
        ])
        .await
        .unwrap();
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut pages = vec![record(json!({
        "_id": "page1",
        "title": "Calendar",
        "events": [
            {"id": "e1", "name": "Opening", "locationId": "l2"},
            {"id": "e2", "name": "Debate", "locationId": "l1"},
            {"id": "e3", "name": "TBD"}
        ]
    }))];

    schemas
        .join(&cx, &page_schema(), &mut pages, &JoinOptions::default())
        .await
        .unwrap();

    let events = pages[0]["events"].as_array().unwrap();
    assert_eq!(events[0]["_location"]["title"], json!("Library"));
    assert_eq!(events[1]["_location"]["title"], json!("Town Hall"));
    assert!(events[2].get("_location").is_none());
    assert_eq!(places.fetch_count(), 1);
}

/// person -> events (joinByArray) -> locations (joinByArray)
async fn calendar() -> (Arc<MemoryManagers>, Arc<MemoryManager>, Vec<Field>) {
    let managers = MemoryManagers::new();
    let places = managers.register_dedicated("place", MemoryManager::new("place"));
    let events = managers.register_dedicated(
        "event",
        MemoryManager::new("event").with_schema(vec![
            Field::new("title", kinds::STRING),
            Field::join_by_array("_locations", "place", "locationIds"),
        ]),
    );
    places
        .insert_all([json!({"_id": "l1", "title": "Pier"}), json!({"_id": "l2", "title": "Park"})])
        .await
        .unwrap();
    events
        .insert_all([json!({"_id": "e1", "title": "Regatta", "locationIds": ["l1", "l2"]})])
        .await
        .unwrap();
    let person_schema = vec![
        Field::new("title", kinds::STRING),
        Field::join_by_array("_events", "event", "eventIds").relationships(
            "eventRelationships",
            vec![Field::new("role", kinds::STRING)],
        ),
    ];
    (managers, places, person_schema)
}

#[tokio::test]
async fn test_dot_path_selector_continues_into_related_joins() {
    let (managers, places, person_schema) = calendar().await;
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut person = record(json!({
        "_id": "u1",
        "title": "Sam",
        "eventIds": ["e1"],
        "eventRelationships": {"e1": {"role": "judge"}}
    }));

    schemas
        .join_one(&cx, &person_schema, &mut person, &JoinOptions::only(["_events._locations"]))
        .await
        .unwrap();

    let event = &person["_events"][0];
    assert_eq!(event["_relationship"], json!({"role": "judge"}));
    let locations: Vec<&str> = event["_locations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["title"].as_str())
        .collect();
    assert_eq!(locations, ["Pier", "Park"]);
    assert_eq!(places.fetch_count(), 1);
}

#[tokio::test]
async fn test_single_level_selector_stops_at_related() {
    let (managers, places, person_schema) = calendar().await;
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut person = record(json!({"_id": "u1", "eventIds": ["e1"]}));

    schemas
        .join_one(&cx, &person_schema, &mut person, &JoinOptions::only(["_events"]))
        .await
        .unwrap();

    let event = &person["_events"][0];
    assert_eq!(event["title"], json!("Regatta"));
    assert!(event.get("_locations").is_none());
    assert_eq!(places.fetch_count(), 0);
}

#[tokio::test]
async fn test_default_mode_does_not_recurse_without_static_list() {
    let (managers, places, person_schema) = calendar().await;
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut person = record(json!({"_id": "u1", "eventIds": ["e1"]}));

    schemas
        .join_one(&cx, &person_schema, &mut person, &JoinOptions::default())
        .await
        .unwrap();

    assert!(person["_events"][0].get("_locations").is_none());
    assert_eq!(places.fetch_count(), 0);
}

#[tokio::test]
async fn test_generic_manager_filters_by_type() {
    let managers = MemoryManagers::new();
    let shared = managers.register_generic("place", MemoryManager::generic());
    managers.alias("person", &shared, true);
    shared
        .insert_all([
            json!({"_id": "x1", "type": "place", "title": "Dock"}),
            json!({"_id": "x2", "type": "person", "title": "Dock"}),
        ])
        .await
        .unwrap();
    let schemas = Schemas::builder(managers.clone()).build();
    let cx = RequestContext::anonymous();
    let mut imported = Record::new();

    schemas
        .convert_fields(
            &cx,
            &[Field::join_by_one("_venue", "place", "venueId")],
            &Format::Csv,
            &record(json!({"_venue": "Dock"})),
            &mut imported,
        )
        .await
        .unwrap();

    assert_eq!(imported.get("venueId"), Some(&json!("x1")));
}
