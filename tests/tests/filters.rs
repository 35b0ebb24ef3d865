//! Library - filtered listing across embedded and referenced relations.

use gnx_tests::prelude::*;

/// Two authors, a category tree and four books with reviews.
fn seeded(name: &str) -> Scenario {
    Scenario::new(name, fixtures::library)
        .step(
            "add_herbert",
            "addAuthor",
            json!({ "input": { "id": "a1", "name": "Frank Herbert", "city": { "name": "Tacoma" } } }),
            |a| a.ok(),
        )
        .step(
            "add_asimov",
            "addAuthor",
            json!({ "input": { "id": "a2", "name": "Isaac Asimov", "city": { "name": "Brooklyn" } } }),
            |a| a.ok(),
        )
        .step(
            "add_fiction",
            "addCategory",
            json!({ "input": { "id": "c1", "name": "Fiction" } }),
            |a| a.ok(),
        )
        .step(
            "add_scifi",
            "addCategory",
            json!({ "input": { "id": "c2", "name": "Science Fiction", "parent": { "id": "c1" } } }),
            |a| a.ok(),
        )
        .step(
            "add_history",
            "addCategory",
            json!({ "input": { "id": "c3", "name": "History" } }),
            |a| a.ok(),
        )
        .step(
            "add_dune",
            "addBook",
            json!({ "input": {
                "id": "b1",
                "title": "Dune",
                "year": 1965,
                "author": { "id": "a1" },
                "category": { "id": "c2" },
                "locations": [{ "name": "Arrakis" }, { "name": "Caladan" }],
                "publisher": { "name": "Chilton", "address": { "name": "Philadelphia" } },
                "reviews": { "added": [{ "stars": 5, "text": "epic" }, { "stars": 4 }] },
            } }),
            |a| a.ok(),
        )
        .step(
            "add_foundation",
            "addBook",
            json!({ "input": {
                "id": "b2",
                "title": "Foundation",
                "year": 1951,
                "author": { "id": "a2" },
                "category": { "id": "c2" },
                "reviews": { "added": [{ "stars": 4 }] },
            } }),
            |a| a.ok(),
        )
        .step(
            "add_children_of_dune",
            "addBook",
            json!({ "input": {
                "id": "b3",
                "title": "Children of Dune",
                "year": 1976,
                "author": { "id": "a1" },
                "category": { "id": "c2" },
            } }),
            |a| a.ok(),
        )
        .step(
            "add_spqr",
            "addBook",
            json!({ "input": { "id": "b4", "title": "SPQR", "year": 2015, "category": { "id": "c3" } } }),
            |a| a.ok(),
        )
}

fn titles(titles: &[&str]) -> Vec<serde_json::Value> {
    titles.iter().map(|t| json!({ "title": t })).collect()
}

mod scalar {
    use super::*;

    #[tokio::test]
    async fn test_scalar_filters() {
        seeded("scalar")
            .step(
                "by_title",
                "books",
                json!({ "filters": { "title": { "value": "Dune" } } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .step(
                "by_identifier",
                "books",
                json!({ "filters": { "id": { "value": "b2" } } }),
                |a| a.returns(titles(&["Foundation"])),
            )
            .step(
                "conditions_are_anded",
                "books",
                json!({ "filters": { "title": { "value": "Dune" }, "year": { "value": 1951 } } }),
                |a| a.empty(),
            )
            .step(
                "other_operators_compare_by_equality",
                "books",
                json!({ "filters": { "year": { "operator": "gt", "value": 1965 } } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .run()
            .await
            .unwrap();
    }
}

mod referenced {
    use super::*;

    #[tokio::test]
    async fn test_single_reference_hop() {
        seeded("single_reference")
            .step(
                "author_city",
                "books",
                json!({ "filters": {
                    "author": { "terms": [{ "path": "city.name", "value": "Tacoma" }] },
                } }),
                |a| a.returns(titles(&["Dune", "Children of Dune"])),
            )
            .step(
                "same_hop_twice",
                "books",
                json!({ "filters": {
                    "author": { "terms": [
                        { "path": "name", "value": "Frank Herbert" },
                        { "path": "city.name", "value": "Tacoma" },
                    ] },
                } }),
                |a| a.rows(2),
            )
            .step(
                "same_hop_conflicting_values",
                "books",
                json!({ "filters": {
                    "author": { "terms": [
                        { "path": "name", "value": "Frank Herbert" },
                        { "path": "name", "value": "Isaac Asimov" },
                    ] },
                } }),
                |a| a.empty(),
            )
            .step(
                "scalar_and_relation",
                "books",
                json!({ "filters": {
                    "year": { "value": 1965 },
                    "author": { "terms": [{ "path": "name", "value": "Frank Herbert" }] },
                } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_referenced_list_rows_are_returned_once() {
        seeded("referenced_list")
            .step(
                "reviews_with_four_stars",
                "books",
                json!({ "filters": { "reviews": { "terms": [{ "path": "stars", "value": 4 }] } } }),
                |a| a.returns(titles(&["Dune", "Foundation"])).without_key("reviews"),
            )
            .step(
                "reviews_with_five_stars",
                "books",
                json!({ "filters": { "reviews": { "terms": [{ "path": "stars", "value": 5 }] } } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .step(
                "authors_by_book_title",
                "authors",
                json!({ "filters": { "books": { "terms": [{ "path": "title", "value": "Foundation" }] } } }),
                |a| a.returns(vec![json!({ "id": "a2", "name": "Isaac Asimov" })]),
            )
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_multi_hop_paths() {
        seeded("multi_hop")
            .step(
                "category_parent",
                "books",
                json!({ "filters": {
                    "category": { "terms": [{ "path": "parent.name", "value": "Fiction" }] },
                } }),
                |a| a.returns(titles(&["Dune", "Foundation", "Children of Dune"])),
            )
            .step(
                "list_then_reference",
                "authors",
                json!({ "filters": {
                    "books": { "terms": [{ "path": "category.name", "value": "Science Fiction" }] },
                } }),
                |a| a.rows(2).contains(json!({ "id": "a1" })).contains(json!({ "id": "a2" })),
            )
            .run()
            .await
            .unwrap();
    }
}

mod embedded {
    use super::*;

    #[tokio::test]
    async fn test_embedded_paths() {
        seeded("embedded")
            .step(
                "nested_embedded_object",
                "books",
                json!({ "filters": {
                    "publisher": { "terms": [{ "path": "address.name", "value": "Philadelphia" }] },
                } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .step(
                "embedded_list_element",
                "books",
                json!({ "filters": { "locations": { "terms": [{ "path": "name", "value": "Caladan" }] } } }),
                |a| a.returns(titles(&["Dune"])),
            )
            .run()
            .await
            .unwrap();
    }
}

mod pagination {
    use super::*;

    #[tokio::test]
    async fn test_pagination_after_filtering() {
        seeded("pagination")
            .step(
                "second_page",
                "books",
                json!({
                    "filters": { "author": { "terms": [{ "path": "name", "value": "Frank Herbert" }] } },
                    "pagination": { "page": 2, "size": 1 },
                }),
                |a| a.returns(titles(&["Children of Dune"])),
            )
            .step(
                "page_without_size_is_ignored",
                "books",
                json!({ "pagination": { "page": 2 } }),
                |a| a.rows(4),
            )
            .run()
            .await
            .unwrap();
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_unresolvable_filters() {
        seeded("filter_errors")
            .step(
                "unknown_field",
                "books",
                json!({ "filters": { "isbn": { "value": "0441" } } }),
                |a| a.error_kind(ErrorKind::Configuration),
            )
            .step(
                "unknown_path_segment",
                "books",
                json!({ "filters": { "author": { "terms": [{ "path": "city.mayor", "value": "x" }] } } }),
                |a| a.error_kind(ErrorKind::Configuration).error("mayor"),
            )
            .step(
                "path_ends_on_relation",
                "books",
                json!({ "filters": { "author": { "terms": [{ "path": "city", "value": "x" }] } } }),
                |a| a.error_kind(ErrorKind::Configuration),
            )
            .step(
                "terms_on_scalar",
                "books",
                json!({ "filters": { "title": { "terms": [{ "path": "x", "value": "y" }] } } }),
                |a| a.error_kind(ErrorKind::InvalidInput),
            )
            .run()
            .await
            .unwrap();
    }
}
