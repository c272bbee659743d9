use std::collections::VecDeque;
use std::sync::Arc;

use bookshelf_http::error::FieldErrors;
use parking_lot::Mutex;
use time::{Date, OffsetDateTime};

use super::models::{Book, BookSubmission, NewBook};
use super::validation;

/// Source of "today" for the publication date check.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Current calendar date in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[derive(Debug)]
struct Catalog {
    books: VecDeque<Book>,
    next_id: u64,
}

/// In-memory book catalog, newest first.
///
/// Id assignment and insertion share one lock, so concurrent creates never
/// observe the same id and list order matches lock acquisition order.
pub struct BookStore {
    catalog: Mutex<Catalog>,
    clock: Arc<dyn Clock>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(UtcClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: Mutex::new(Catalog {
                books: VecDeque::new(),
                next_id: 1,
            }),
            clock,
        }
    }

    /// Every stored book, most recently created first.
    pub fn list(&self) -> Vec<Book> {
        self.catalog.lock().books.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.catalog.lock().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate `submission` and store it on success.
    pub fn create(&self, submission: &BookSubmission) -> Result<Book, FieldErrors> {
        let new_book = validation::validate(submission, self.clock.today())?;
        Ok(self.insert(new_book))
    }

    fn insert(&self, new_book: NewBook) -> Book {
        let mut catalog = self.catalog.lock();
        let book = new_book.with_id(catalog.next_id);
        catalog.next_id += 1;
        catalog.books.push_front(book.clone());
        book
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}
