//! BTreeMap-backed book store for development and tests.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{Book, BookEntry, BookId};
use crate::repo::BookRepo;

#[derive(Default)]
struct Shelf {
    books: BTreeMap<BookId, Book>,
    last_id: BookId,
}

/// In-memory book store. Clones share the same shelf.
#[derive(Clone, Default)]
pub struct InMemoryBookRepo {
    shelf: Arc<Mutex<Shelf>>,
}

impl InMemoryBookRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookRepo for InMemoryBookRepo {
    type Error = Infallible;

    async fn list_books(&self) -> Result<Vec<BookEntry>, Infallible> {
        let shelf = self.shelf.lock().await;

        Ok(shelf
            .books
            .iter()
            .map(|(id, book)| BookEntry {
                id: *id,
                book: book.clone(),
            })
            .collect())
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, Infallible> {
        Ok(self.shelf.lock().await.books.get(&id).cloned())
    }

    async fn add_book(&mut self, book: Book) -> Result<BookId, Infallible> {
        let mut shelf = self.shelf.lock().await;

        shelf.last_id += 1;
        let id = shelf.last_id;
        shelf.books.insert(id, book);
        debug!("Stored book {} in memory", id);

        Ok(id)
    }

    async fn update_book(&mut self, id: BookId, book: Book) -> Result<bool, Infallible> {
        let mut shelf = self.shelf.lock().await;

        match shelf.books.get_mut(&id) {
            Some(stored) => {
                *stored = Book {
                    date_added: stored.date_added,
                    ..book
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_book(&mut self, id: BookId) -> Result<bool, Infallible> {
        Ok(self.shelf.lock().await.books.remove(&id).is_some())
    }
}
