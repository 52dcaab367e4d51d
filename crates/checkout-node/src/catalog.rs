//! Book catalog identifiers.
//!
//! Stateless and independent of the ledger: an identifier is a content hash
//! of the book's ISBN and publish date, nothing more.

use crate::constants::CATALOG_ID_BYTES;
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct BookIn {
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub isbn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub isbn: String,
}

/// Hex identifier derived from `"{isbn} {publish_date}"`.
pub fn catalog_id(isbn: &str, publish_date: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(isbn.as_bytes());
    hasher.update(b" ");
    hasher.update(publish_date.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..CATALOG_ID_BYTES])
}

impl From<BookIn> for Book {
    fn from(book: BookIn) -> Self {
        Self {
            id: catalog_id(&book.isbn, &book.publish_date),
            title: book.title,
            author: book.author,
            publish_date: book.publish_date,
            isbn: book.isbn,
        }
    }
}

/// POST /new
pub async fn new_book(Json(book): Json<BookIn>) -> Json<Book> {
    let book = Book::from(book);
    debug!(id = %book.id, isbn = %book.isbn, "catalog id issued");
    Json(book)
}
