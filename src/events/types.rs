//! Change event types and the producer-side emitter contract

use crate::books::models::Book;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The CRUD action performed on a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    Created,
    Updated,
    Deleted,
}

impl CrudAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Created => "created",
            CrudAction::Updated => "updated",
            CrudAction::Deleted => "deleted",
        }
    }
}

/// A change notification emitted after a successful mutation.
///
/// Opaque human-readable text. Events carry no identity and no ordering key
/// beyond the order in which they were pushed onto the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    description: String,
}

impl Event {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Describe a committed book mutation, e.g. `Book "Dune" (id 1) was created`
    pub fn book(action: CrudAction, book: &Book) -> Self {
        Self::new(format!(
            "Book \"{}\" (id {}) was {}",
            book.title,
            book.id,
            action.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.description
    }

    pub fn into_string(self) -> String {
        self.description
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl From<String> for Event {
    fn from(description: String) -> Self {
        Self::new(description)
    }
}

impl From<&str> for Event {
    fn from(description: &str) -> Self {
        Self::new(description)
    }
}

/// Producer side of the event stream.
///
/// Called by CRUD code after the mutation has been committed. Emitting is
/// fire-and-forget: implementations never block and never return an error to
/// the caller, a failed enqueue is logged and the event dropped.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: Event);

    fn emit_book(&self, action: CrudAction, book: &Book) {
        self.emit(Event::book(action, book));
    }
}
