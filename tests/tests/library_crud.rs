//! Library - root operation round trips.

use gnx_tests::prelude::*;

mod crud {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("crud", fixtures::library)
            .step(
                "add_author",
                "addAuthor",
                json!({ "input": {
                    "id": "a1",
                    "name": "Frank Herbert",
                    "city": { "name": "Tacoma", "country": "US" },
                } }),
                |a| a.record(json!({ "id": "a1", "city": { "name": "Tacoma" } })),
            )
            .step(
                "add_book",
                "addBook",
                json!({ "input": {
                    "id": "b1",
                    "title": "Dune",
                    "year": 1965,
                    "author": { "id": "a1" },
                    "publisher": { "name": "Chilton", "address": { "name": "Philadelphia" } },
                } }),
                |a| a.record(json!({ "id": "b1", "author": { "id": "a1" }, "publisher": { "name": "Chilton" } })),
            )
            .step("get_book", "book", json!({ "id": "b1" }), |a| {
                a.record(json!({ "title": "Dune", "year": 1965 }))
            })
            .step("list_books", "books", json!({}), |a| a.rows(1))
            .step(
                "update_book",
                "updateBook",
                json!({ "input": { "id": "b1", "subtitle": "Book One" } }),
                |a| a.record(json!({ "title": "Dune", "subtitle": "Book One" })),
            )
            .step("delete_book", "deleteBook", json!({ "id": "b1" }), |a| {
                a.record(json!({ "id": "b1" }))
            })
            .step("get_deleted", "book", json!({ "id": "b1" }), |a| a.missing())
            .step("list_empty", "books", json!(null), |a| a.empty())
    }

    #[tokio::test]
    async fn test_crud_operations_on_library() {
        scenario().run().await.unwrap();
    }
}

mod generated_ids {
    use super::*;

    #[tokio::test]
    async fn test_add_without_id_generates_one() {
        let scenario = Scenario::new("generated_ids", fixtures::library).step(
            "add_category",
            "addCategory",
            json!({ "input": { "name": "Fiction" } }),
            |a| a.assert_fn(|r| r.record().is_some_and(|doc| doc.contains_key("id"))),
        );

        scenario.run().await.unwrap();
        assert_eq!(scenario.store_handle().count("categories"), 1);
    }
}

mod request_errors {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("request_errors", fixtures::library)
            .step("unknown_operation", "addPublisher", json!({}), |a| {
                a.error("unknown operation")
            })
            .step("missing_id", "book", json!({}), |a| {
                a.error_kind(ErrorKind::InvalidInput)
            })
            .step(
                "missing_required_field",
                "addBook",
                json!({ "input": { "year": 1965 } }),
                |a| a.error_kind(ErrorKind::InvalidInput).error("title"),
            )
            .step(
                "unknown_field",
                "addBook",
                json!({ "input": { "title": "Dune", "isbn": "0441" } }),
                |a| a.error_matches(r"isbn"),
            )
            .step(
                "update_without_id",
                "updateBook",
                json!({ "input": { "title": "Dune" } }),
                |a| a.error_kind(ErrorKind::InvalidInput),
            )
            .step(
                "update_missing_record",
                "updateBook",
                json!({ "input": { "id": "nope", "title": "Dune" } }),
                |a| a.error_kind(ErrorKind::NotFound),
            )
            .step("delete_missing_record", "deleteBook", json!({ "id": "nope" }), |a| {
                a.error_kind(ErrorKind::NotFound)
            })
    }

    #[tokio::test]
    async fn test_request_errors_are_classified() {
        scenario().run().await.unwrap();
    }
}
