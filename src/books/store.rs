//! BookStore trait and its in-memory implementation

use super::models::{Book, BookRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Key-by-id book storage.
///
/// A returned `Ok` means the mutation is committed.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book and assign its id
    async fn create_book(&self, req: BookRequest) -> Result<Book>;

    async fn get_book(&self, id: u64) -> Result<Option<Book>>;

    /// List books ordered by id, skipping `offset` and returning at most `limit`
    async fn list_books(&self, offset: usize, limit: usize) -> Result<Vec<Book>>;

    /// Replace all fields of an existing book. `None` if it does not exist.
    async fn update_book(&self, id: u64, req: BookRequest) -> Result<Option<Book>>;

    /// Delete a book, returning the removed record if it existed
    async fn delete_book(&self, id: u64) -> Result<Option<Book>>;
}

/// In-memory book store. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryBookStore {
    inner: RwLock<Books>,
}

#[derive(Default)]
struct Books {
    last_id: u64,
    records: BTreeMap<u64, Book>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create_book(&self, req: BookRequest) -> Result<Book> {
        let mut books = self.inner.write().await;
        books.last_id += 1;
        let book = Book::from_request(books.last_id, req);
        books.records.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_book(&self, id: u64) -> Result<Option<Book>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list_books(&self, offset: usize, limit: usize) -> Result<Vec<Book>> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_book(&self, id: u64, req: BookRequest) -> Result<Option<Book>> {
        let mut books = self.inner.write().await;
        Ok(books.records.get_mut(&id).map(|book| {
            book.apply(req);
            book.clone()
        }))
    }

    async fn delete_book(&self, id: u64) -> Result<Option<Book>> {
        Ok(self.inner.write().await.records.remove(&id))
    }
}
