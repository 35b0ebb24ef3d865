//! Shared schema for unit tests.

use gnx_registry::{Endpoint, FieldSpec, Registry, RegistryBuilder, ScalarKind};

/// Book / Author / Review with an embedded City.
pub(crate) fn library() -> Registry {
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            "City",
            None,
            vec![
                FieldSpec::scalar("name", ScalarKind::String),
                FieldSpec::scalar("zip", ScalarKind::String),
            ],
        )
        .unwrap();
    builder
        .register(
            "Author",
            Some(Endpoint::new("authors", "author", "authors")),
            vec![
                FieldSpec::id("id").required(),
                FieldSpec::scalar("name", ScalarKind::String).required(),
                FieldSpec::object("city", "City").embedded(),
            ],
        )
        .unwrap();
    builder
        .register(
            "Review",
            Some(Endpoint::new("reviews", "review", "reviews")),
            vec![
                FieldSpec::id("id").required(),
                FieldSpec::scalar("stars", ScalarKind::Float),
                FieldSpec::scalar("text", ScalarKind::String),
            ],
        )
        .unwrap();
    builder
        .register(
            "Book",
            Some(Endpoint::new("books", "book", "books")),
            vec![
                FieldSpec::id("id").required(),
                FieldSpec::scalar("title", ScalarKind::String).required(),
                FieldSpec::scalar("subtitle", ScalarKind::String),
                FieldSpec::object("author", "Author").referenced("authorId"),
                FieldSpec::list("reviews", "Review").referenced("bookId"),
                FieldSpec::list("locations", "City").embedded(),
            ],
        )
        .unwrap();
    builder.build().unwrap()
}
