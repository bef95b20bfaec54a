//! Book models and DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
    pub summary: String,
    pub genre: String,
}

impl Book {
    pub fn from_request(id: u64, req: BookRequest) -> Self {
        Self {
            id,
            title: req.title,
            author: req.author,
            published_date: req.published_date,
            summary: req.summary,
            genre: req.genre,
        }
    }

    /// Replace every field except the id
    pub fn apply(&mut self, req: BookRequest) {
        self.title = req.title;
        self.author = req.author;
        self.published_date = req.published_date;
        self.summary = req.summary;
        self.genre = req.genre;
    }
}

/// Request body for creating or replacing a book. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Published date (YYYY-MM-DD)
    pub published_date: NaiveDate,
    /// Summary of the book
    pub summary: String,
    /// Genre of the book
    pub genre: String,
}
