//! Book records: models, storage and the CRUD service

mod manager;
pub mod models;
pub mod store;

pub use manager::BookManager;
pub use models::{Book, BookRequest};
pub use store::{BookStore, InMemoryBookStore};
