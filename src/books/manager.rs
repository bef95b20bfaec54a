//! Book management operations

use super::models::{Book, BookRequest};
use super::store::BookStore;
use crate::events::{CrudAction, EventEmitter};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// CRUD service over a [`BookStore`].
///
/// Every successful mutation is followed by exactly one emitted event.
/// Reads and failed mutations emit nothing, and emitting never affects the
/// result returned to the caller.
pub struct BookManager {
    store: Arc<dyn BookStore>,
    emitter: Arc<dyn EventEmitter>,
}

impl BookManager {
    pub fn new(store: Arc<dyn BookStore>, emitter: Arc<dyn EventEmitter>) -> Self {
        Self { store, emitter }
    }

    pub async fn create_book(&self, req: BookRequest) -> Result<Book> {
        let book = self.store.create_book(req).await?;
        info!(book_id = book.id, title = %book.title, "Book created");
        self.emitter.emit_book(CrudAction::Created, &book);
        Ok(book)
    }

    pub async fn get_book(&self, id: u64) -> Result<Option<Book>> {
        self.store.get_book(id).await
    }

    pub async fn list_books(&self, offset: usize, limit: usize) -> Result<Vec<Book>> {
        self.store.list_books(offset, limit).await
    }

    pub async fn update_book(&self, id: u64, req: BookRequest) -> Result<Option<Book>> {
        let updated = self.store.update_book(id, req).await?;
        if let Some(ref book) = updated {
            info!(book_id = book.id, "Book updated");
            self.emitter.emit_book(CrudAction::Updated, book);
        }
        Ok(updated)
    }

    /// Delete a book. Returns `false` if it did not exist.
    pub async fn delete_book(&self, id: u64) -> Result<bool> {
        match self.store.delete_book(id).await? {
            Some(book) => {
                info!(book_id = book.id, "Book deleted");
                self.emitter.emit_book(CrudAction::Deleted, &book);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
