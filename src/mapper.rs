use std::cmp::Reverse;

use tracing::{error, info};

use crate::error::CatalogError;
use crate::models::BookEntry;
use crate::repo::BookRepo;

/// Fetches the store's full snapshot, newest first. Books added at the same
/// instant keep the order the store returned them in.
pub async fn load_all<R: BookRepo>(repo: &R) -> Result<Vec<BookEntry>, CatalogError> {
    let entries = repo.list_books().await.map_err(|e| {
        error!("Failed to load books: {}", e);
        CatalogError::fetch(e)
    })?;

    let entries = newest_first(entries);
    info!("Loaded {} books", entries.len());

    Ok(entries)
}

pub fn newest_first(mut entries: Vec<BookEntry>) -> Vec<BookEntry> {
    entries.sort_by_key(|entry| Reverse(entry.book.date_added));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBookRepo;
    use crate::models::{Book, BookDraft};

    fn entry(id: i64, date_added: i64) -> BookEntry {
        BookEntry {
            id,
            book: Book::from_draft(
                BookDraft {
                    title: format!("Book {id}"),
                    author: "Author".to_string(),
                    ..BookDraft::default()
                },
                date_added,
            ),
        }
    }

    fn ids(entries: &[BookEntry]) -> Vec<i64> {
        entries.iter().map(|entry| entry.id).collect()
    }

    #[test]
    fn sorts_newest_first_whatever_the_input_order() {
        let sorted = newest_first(vec![entry(1, 10), entry(2, 30), entry(3, 20)]);
        assert_eq!(vec![2, 3, 1], ids(&sorted));

        let sorted = newest_first(vec![entry(3, 20), entry(1, 10), entry(2, 30)]);
        assert_eq!(vec![2, 3, 1], ids(&sorted));
    }

    #[test]
    fn ties_keep_store_order() {
        let sorted = newest_first(vec![entry(4, 5), entry(9, 7), entry(2, 5), entry(6, 5)]);
        assert_eq!(vec![9, 4, 2, 6], ids(&sorted));
    }

    #[tokio::test]
    async fn loads_everything_from_the_store() {
        let mut repo = InMemoryBookRepo::new();
        repo.add_book(entry(0, 100).book).await.unwrap();
        repo.add_book(entry(0, 300).book).await.unwrap();
        repo.add_book(entry(0, 200).book).await.unwrap();

        let loaded = load_all(&repo).await.unwrap();

        let dates: Vec<i64> = loaded.iter().map(|e| e.book.date_added).collect();
        assert_eq!(vec![300, 200, 100], dates);
    }
}
