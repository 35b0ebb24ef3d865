//! Schema-level behavior: derived shapes, dropped fields and compiled
//! pipelines for the library schema.

use gnx_core::{RecordId, Stage, Value};
use gnx_query::{FilterCompiler, FilterInput, FilterTerm, FilterTree};
use gnx_session::{OperationKind, Session};
use gnx_shape::{derive_all, InputType, ShapeError};
use gnx_storage::MemoryStore;
use gnx_tests::prelude::*;
use pretty_assertions::assert_eq;

// ========== TEST: input_shapes ==========

#[test]
fn test_library_shapes() {
    // GIVEN
    let registry = fixtures::library().unwrap();

    // WHEN
    let shapes = derive_all(&registry).unwrap();

    // THEN
    let book = shapes.create_shape("Book").unwrap();
    assert!(!book.get_field("id").unwrap().required);
    assert!(book.get_field("title").unwrap().required);
    assert_eq!(book.get_field("author").unwrap().ty, InputType::IdReference);
    assert_eq!(
        book.get_field("reviews").unwrap().ty,
        InputType::Buckets("OneToManyReviews".into())
    );
    assert_eq!(
        book.get_field("locations").unwrap().ty.to_string(),
        "[CityInput!]"
    );

    let update = shapes.update_shape("Book").unwrap();
    assert!(update.get_field("id").unwrap().required);
    assert!(!update.get_field("title").unwrap().required);
    assert_eq!(
        update.get_field("publisher").unwrap().ty,
        InputType::Shape("PublisherInputForUpdate".into())
    );
}

#[test]
fn test_embedded_types_get_shapes_but_no_operations() {
    let registry = fixtures::library().unwrap();
    let store = MemoryStore::new();

    let session = Session::new(&registry, &store).unwrap();

    assert!(session.shapes().create_shape("City").is_some());
    assert!(session.shapes().update_shape("Publisher").is_some());
    assert!(session.operations().all(|op| op.entity != "City" && op.entity != "Publisher"));
}

#[test]
fn test_self_referencing_category_derives() {
    let shapes = derive_all(&fixtures::library().unwrap()).unwrap();

    let bucket = shapes.bucket("OneToManyChildren").unwrap();
    assert_eq!(bucket.added, "CategoryInput");
    assert_eq!(bucket.updated, "CategoryInputForUpdate");
    assert_eq!(
        shapes.create_shape("Category").unwrap().get_field("parent").unwrap().ty,
        InputType::IdReference
    );
}

#[test]
fn test_shapes_render_as_input_declarations() {
    let shapes = derive_all(&fixtures::library().unwrap()).unwrap();

    let rendered = shapes.to_string();

    assert!(rendered.contains("input ReviewInput {\n  id: Id\n  stars: Float!\n  text: String\n}"));
    assert!(rendered.contains(
        "input OneToManyReviews {\n  added: [ReviewInput!]\n  updated: [ReviewInputForUpdate!]\n  deleted: [ReviewInput!]\n}"
    ));
}

// ========== TEST: schema_errors ==========

#[test]
fn test_embedding_cycle_is_rejected() {
    // GIVEN
    let registry = fixtures::embedding_cycle().unwrap();
    let store = MemoryStore::new();

    // WHEN
    let err = derive_all(&registry).unwrap_err();
    let session_err = Session::new(&registry, &store).err().unwrap();

    // THEN
    let ShapeError::EmbeddingCycle(names) = &err else {
        panic!("expected an embedding cycle, got {:?}", err);
    };
    assert!(names.contains(&"Node".to_string()));
    assert!(names.contains(&"Link".to_string()));
    assert_eq!(session_err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_field_without_relation_is_dropped() {
    // GIVEN
    let registry = fixtures::missing_relation().unwrap();

    // WHEN
    let shapes = derive_all(&registry).unwrap();

    // THEN
    let dropped = registry.dropped_fields();
    assert_eq!(dropped.len(), 1);
    assert_eq!((dropped[0].entity.as_str(), dropped[0].field.as_str()), ("Note", "tags"));
    assert!(shapes.create_shape("Note").unwrap().get_field("tags").is_none());
}

#[tokio::test]
async fn test_dropped_field_cannot_be_filtered_or_written() {
    Scenario::new("dropped_field", fixtures::missing_relation)
        .step(
            "filter_on_dropped",
            "notes",
            json!({ "filters": { "tags": { "value": "t1" } } }),
            |a| a.error_kind(ErrorKind::Configuration).error("tags"),
        )
        .step(
            "write_dropped",
            "addNote",
            json!({ "input": { "body": "hello", "tags": [] } }),
            |a| a.error_kind(ErrorKind::InvalidInput),
        )
        .run()
        .await
        .unwrap();
}

// ========== TEST: root_operations ==========

#[test]
fn test_library_operation_names() {
    let registry = fixtures::library().unwrap();
    let store = MemoryStore::new();
    let session = Session::new(&registry, &store).unwrap();

    let book_ops: Vec<(&str, OperationKind)> = session
        .operations()
        .filter(|op| op.entity == "Book")
        .map(|op| (op.name.as_str(), op.kind))
        .collect();

    assert_eq!(
        book_ops,
        vec![
            ("book", OperationKind::Get),
            ("books", OperationKind::List),
            ("addBook", OperationKind::Create),
            ("updateBook", OperationKind::Update),
            ("deleteBook", OperationKind::Delete),
        ]
    );
}

// ========== TEST: compiled_pipelines ==========

#[test]
fn test_one_hop_compiles_to_single_join() {
    // GIVEN
    let registry = fixtures::library().unwrap();
    let book = registry.resolve("Book").unwrap();
    let tree = FilterTree::new().with(
        "author",
        FilterInput::terms(vec![
            FilterTerm::eq("city.name", "Tacoma"),
            FilterTerm::eq("name", "Frank Herbert"),
        ]),
    );

    // WHEN
    let pipeline = FilterCompiler::new(&registry).compile(&tree, book).unwrap().into_pipeline();

    // THEN
    let stages = pipeline.stages();
    assert_eq!(stages.len(), 3);
    assert_eq!(
        stages[0],
        Stage::Join {
            from: "authors".into(),
            local_field: "authorId".into(),
            foreign_field: "_id".into(),
            alias: "author".into(),
        }
    );
    assert_eq!(stages[1], Stage::Flatten { alias: "author".into() });
    let matches = pipeline.match_stage().unwrap();
    assert_eq!(matches.get("author.city.name"), Some(&[Value::from("Tacoma")][..]));
    assert_eq!(matches.get("author.name"), Some(&[Value::from("Frank Herbert")][..]));
}

#[test]
fn test_identifier_filter_targets_storage_key() {
    let registry = fixtures::library().unwrap();
    let book = registry.resolve("Book").unwrap();
    let tree = FilterTree::new().with("id", FilterInput::eq("b1"));

    let compiled = FilterCompiler::new(&registry).compile(&tree, book).unwrap();

    assert!(compiled.stages.is_empty());
    assert_eq!(
        compiled.matches.get("_id"),
        Some(&[Value::Id(RecordId::new("b1"))][..])
    );
}
