use crate::models::{Book, BookEntry, BookId};
use std::error::Error;
use std::future::Future;

/// The CRUD storage boundary. Implementations assign identifiers on insert and
/// never reuse them.
pub trait BookRepo {
    type Error: Error + Send + Sync + 'static;

    fn list_books(&self) -> impl Future<Output = Result<Vec<BookEntry>, Self::Error>> + Send;

    fn get_book(
        &self,
        id: BookId,
    ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send;

    fn add_book(&mut self, book: Book) -> impl Future<Output = Result<BookId, Self::Error>> + Send;

    /// Returns true if the book existed and was updated. The stored `date_added`
    /// is kept as is.
    fn update_book(
        &mut self,
        id: BookId,
        book: Book,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Returns true if the book existed and was deleted, false otherwise
    fn delete_book(&mut self, id: BookId) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
