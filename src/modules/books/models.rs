use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored catalog entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Sequential identifier, starting at 1
    pub id: u64,
    /// Title of the book, trimmed
    pub title: String,
    /// Author of the book, trimmed
    pub author: String,
    /// 13 ASCII digits
    pub isbn: String,
    /// `YYYY-MM-DD`, exactly as submitted
    pub publication_date: String,
    /// Page count in 1..=5000
    pub number_of_pages: u32,
}

/// A submission that passed validation but has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_date: String,
    pub number_of_pages: u32,
}

impl NewBook {
    pub(crate) fn with_id(self, id: u64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_date: self.publication_date,
            number_of_pages: self.number_of_pages,
        }
    }
}

/// Request model for creating a new book.
///
/// Every field is loosely typed; JSON `null` and an absent key both
/// deserialize to `None`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookSubmission {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub isbn: Option<Value>,
    #[serde(default)]
    pub publication_date: Option<Value>,
    #[serde(default)]
    pub number_of_pages: Option<Value>,
}
