//! Schemas used by the integration tests.

use gnx_registry::{FieldSpec, Registry, RegistryBuilder, RegistryResult, ScalarKind};

/// A library: books with a referenced author and category, referenced
/// reviews, and embedded cities and publishers.
///
/// `Author.books` and `Book.author` share the `authorId` connection field:
/// it lives on each book. `Category` refers to itself through `parentId`.
pub fn library() -> RegistryResult<Registry> {
    let mut builder = RegistryBuilder::new();

    builder
        .add_type("City")
        .field(FieldSpec::scalar("name", ScalarKind::String).required())
        .field(FieldSpec::scalar("country", ScalarKind::String))
        .done()?;

    builder
        .add_type("Publisher")
        .field(FieldSpec::scalar("name", ScalarKind::String).required())
        .field(FieldSpec::object("address", "City").embedded())
        .done()?;

    builder
        .add_type("Author")
        .endpoint("authors", "author", "authors")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("name", ScalarKind::String).required())
        .field(FieldSpec::object("city", "City").embedded())
        .field(FieldSpec::list("books", "Book").referenced("authorId"))
        .done()?;

    builder
        .add_type("Review")
        .endpoint("reviews", "review", "reviews")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("stars", ScalarKind::Float).required())
        .field(FieldSpec::scalar("text", ScalarKind::String))
        .done()?;

    builder
        .add_type("Category")
        .endpoint("categories", "category", "categories")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("name", ScalarKind::String).required())
        .field(FieldSpec::object("parent", "Category").referenced("parentId"))
        .field(FieldSpec::list("children", "Category").referenced("parentId"))
        .done()?;

    builder
        .add_type("Book")
        .endpoint("books", "book", "books")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("title", ScalarKind::String).required())
        .field(FieldSpec::scalar("year", ScalarKind::Int))
        .field(FieldSpec::scalar("subtitle", ScalarKind::String))
        .field(FieldSpec::object("author", "Author").referenced("authorId"))
        .field(FieldSpec::object("category", "Category").referenced("categoryId"))
        .field(FieldSpec::list("reviews", "Review").referenced("bookId"))
        .field(FieldSpec::list("locations", "City").embedded())
        .field(FieldSpec::object("publisher", "Publisher").embedded())
        .done()?;

    builder.build()
}

/// Two embedded-only types that embed each other.
pub fn embedding_cycle() -> RegistryResult<Registry> {
    let mut builder = RegistryBuilder::new();
    builder
        .add_type("Node")
        .field(FieldSpec::scalar("label", ScalarKind::String))
        .field(FieldSpec::object("link", "Link").embedded())
        .done()?;
    builder
        .add_type("Link")
        .field(FieldSpec::object("node", "Node").embedded())
        .done()?;
    builder
        .add_type("Graph")
        .endpoint("graphs", "graph", "graphs")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::object("root", "Node").embedded())
        .done()?;
    builder.build()
}

/// A type with one field that lacks relation metadata.
pub fn missing_relation() -> RegistryResult<Registry> {
    let mut builder = RegistryBuilder::new();
    builder
        .add_type("Tag")
        .endpoint("tags", "tag", "tags")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("label", ScalarKind::String))
        .done()?;
    builder
        .add_type("Note")
        .endpoint("notes", "note", "notes")
        .field(FieldSpec::id("id").required())
        .field(FieldSpec::scalar("body", ScalarKind::String))
        .field(FieldSpec::list("tags", "Tag"))
        .done()?;
    builder.build()
}
