use chrono::DateTime;
use tracing::debug;

use crate::controller::{Clock, Intent, LibraryController, Notice, View};
use crate::error::CatalogError;
use crate::form::InFlight;
use crate::models::{Book, BookId, ReadingStatus, Timestamp};
use crate::repo::BookRepo;

/// Formats a timestamp like "March 4, 2024" (UTC)
pub fn format_date(timestamp: Timestamp) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "Unknown date".to_string(),
    }
}

pub fn status_label(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Reading => "Currently Reading",
        other => other.label(),
    }
}

#[derive(Debug, Clone)]
pub struct BookDetail {
    id: BookId,
    book: Book,
    confirming_delete: bool,
    is_deleting: bool,
}

impl BookDetail {
    pub fn new(id: BookId, book: Book) -> Self {
        BookDetail {
            id,
            book,
            confirming_delete: false,
            is_deleting: false,
        }
    }

    pub fn from_view(view: &View) -> Option<Self> {
        match view {
            View::DetailView { id, book } => Some(Self::new(*id, book.clone())),
            _ => None,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    pub fn date_added(&self) -> String {
        format_date(self.book.date_added)
    }

    pub fn status(&self) -> &'static str {
        status_label(self.book.status)
    }

    pub fn rating(&self) -> String {
        match self.book.rating {
            0 => "Not rated".to_string(),
            rating => format!("{rating}/5"),
        }
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    /// Asks the user to confirm before anything is removed
    pub fn request_delete(&mut self) {
        self.confirming_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Deletes the book once the user has confirmed; does nothing otherwise
    pub async fn confirm_delete<R, C>(
        &mut self,
        controller: &mut LibraryController<R, C>,
    ) -> Result<Option<Notice>, CatalogError>
    where
        R: BookRepo,
        C: Clock,
    {
        if !self.confirming_delete {
            debug!("Delete of book {} was never requested", self.id);
            return Ok(None);
        }
        self.confirming_delete = false;

        let _deleting = InFlight::start(&mut self.is_deleting);
        controller.dispatch(Intent::Delete).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBookRepo;
    use crate::models::BookDraft;

    #[test]
    fn dates_are_written_out() {
        // 2024-03-04T12:00:00Z
        assert_eq!("March 4, 2024", format_date(1_709_553_600_000));
        assert_eq!("January 1, 1970", format_date(0));
        assert_eq!("Unknown date", format_date(i64::MAX));
    }

    #[test]
    fn labels_match_the_detail_screen() {
        let mut book = Book::from_draft(
            BookDraft {
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                status: ReadingStatus::Reading,
                ..BookDraft::default()
            },
            0,
        );
        assert_eq!("Currently Reading", BookDetail::new(1, book.clone()).status());
        assert_eq!("Not rated", BookDetail::new(1, book.clone()).rating());

        book.rating = 4;
        assert_eq!("4/5", BookDetail::new(1, book).rating());
    }

    #[tokio::test]
    async fn deleting_returns_to_the_library() {
        let mut repo = InMemoryBookRepo::new();
        let book = Book::from_draft(
            BookDraft {
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                ..BookDraft::default()
            },
            5,
        );
        let id = repo.add_book(book.clone()).await.unwrap();
        let mut controller = LibraryController::new(repo.clone());
        controller.load_books().await.unwrap();
        controller.navigate_to_detail(id, book);

        let mut detail = BookDetail::from_view(controller.view()).unwrap();
        assert_eq!(None, detail.confirm_delete(&mut controller).await.unwrap());
        assert_eq!(1, repo.list_books().await.unwrap().len());

        detail.request_delete();
        detail.cancel_delete();
        assert!(!detail.is_confirming_delete());
        assert_eq!(None, detail.confirm_delete(&mut controller).await.unwrap());

        detail.request_delete();
        let notice = detail.confirm_delete(&mut controller).await.unwrap();

        assert_eq!(Some(Notice::Success("Book removed from library".to_string())), notice);
        assert!(!detail.is_deleting());
        assert!(!detail.is_confirming_delete());
        assert_eq!(&View::Library, controller.view());
        assert!(controller.books().is_empty());
    }
}
