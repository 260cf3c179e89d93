use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::books;

pub type BookId = i64;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadingStatus {
    #[default]
    WantToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::WantToRead,
        ReadingStatus::Reading,
        ReadingStatus::Read,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "wantToRead",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
        }
    }

    /// Short label used on badges and filter tabs
    pub fn label(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "Want to Read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Read => "Read",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = InvalidRow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidRow(format!("unknown reading status: {s}")))
    }
}

/// A catalogued book. `date_added` is stamped once, when the book is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub notes: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub status: ReadingStatus,
    pub date_added: Timestamp,
}

impl Book {
    pub fn from_draft(draft: BookDraft, date_added: Timestamp) -> Self {
        Book {
            title: draft.title,
            author: draft.author,
            genre: draft.genre,
            notes: draft.notes,
            rating: draft.rating,
            cover_url: draft.cover_url,
            status: draft.status,
            date_added,
        }
    }

    /// Checks the invariants every stored book has to satisfy
    pub fn check(&self) -> Result<(), InvalidBook> {
        check_fields(&self.title, &self.author, self.rating)
    }
}

fn check_fields(title: &str, author: &str, rating: u8) -> Result<(), InvalidBook> {
    if title.trim().is_empty() {
        return Err(InvalidBook::BlankTitle);
    }
    if author.trim().is_empty() {
        return Err(InvalidBook::BlankAuthor);
    }
    if rating > MAX_RATING {
        return Err(InvalidBook::RatingOutOfRange(rating));
    }
    Ok(())
}

/// Book minus its `date_added`, as submitted from a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub notes: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub status: ReadingStatus,
}

impl BookDraft {
    /// Trims every text field; a blank cover URL becomes `None`
    pub fn trimmed(self) -> Self {
        let cover_url = self
            .cover_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        BookDraft {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            notes: self.notes.trim().to_string(),
            cover_url,
            ..self
        }
    }

    pub fn check(&self) -> Result<(), InvalidBook> {
        check_fields(&self.title, &self.author, self.rating)
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        BookDraft {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            notes: book.notes.clone(),
            rating: book.rating,
            cover_url: book.cover_url.clone(),
            status: book.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub id: BookId,
    pub book: Book,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBook {
    pub id: BookId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidBook {
    BlankTitle,
    BlankAuthor,
    RatingOutOfRange(u8),
}

impl fmt::Display for InvalidBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidBook::BlankTitle => write!(f, "title must not be blank"),
            InvalidBook::BlankAuthor => write!(f, "author must not be blank"),
            InvalidBook::RatingOutOfRange(rating) => {
                write!(f, "rating must be between 0 and {MAX_RATING}, got {rating}")
            }
        }
    }
}

impl Error for InvalidBook {}

/// A stored row that cannot be turned back into a [`Book`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRow(pub String);

impl fmt::Display for InvalidRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for InvalidRow {}

#[derive(Debug, Clone, PartialEq, Eq, diesel::Queryable, diesel::Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub notes: String,
    pub rating: i16,
    pub cover_url: Option<String>,
    pub status: String,
    pub date_added: i64,
}

impl TryFrom<BookRow> for BookEntry {
    type Error = InvalidRow;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .ok()
            .filter(|rating| *rating <= MAX_RATING)
            .ok_or_else(|| InvalidRow(format!("book {} has rating {}", row.id, row.rating)))?;

        Ok(BookEntry {
            id: row.id,
            book: Book {
                title: row.title,
                author: row.author,
                genre: row.genre,
                notes: row.notes,
                rating,
                cover_url: row.cover_url,
                status: row.status.parse()?,
                date_added: row.date_added,
            },
        })
    }
}

#[derive(Clone, diesel::Insertable)]
#[diesel(table_name = books)]
pub struct NewBookRow {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub notes: String,
    pub rating: i16,
    pub cover_url: Option<String>,
    pub status: String,
    pub date_added: i64,
}

impl From<Book> for NewBookRow {
    fn from(book: Book) -> Self {
        NewBookRow {
            title: book.title,
            author: book.author,
            genre: book.genre,
            notes: book.notes,
            rating: i16::from(book.rating),
            cover_url: book.cover_url,
            status: book.status.as_str().to_string(),
            date_added: book.date_added,
        }
    }
}

// No date_added here: it is fixed at insert time
#[derive(Clone, diesel::AsChangeset)]
#[diesel(table_name = books)]
#[diesel(treat_none_as_null = true)]
pub struct BookChangeset {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub notes: String,
    pub rating: i16,
    pub cover_url: Option<String>,
    pub status: String,
}

impl From<Book> for BookChangeset {
    fn from(book: Book) -> Self {
        BookChangeset {
            title: book.title,
            author: book.author,
            genre: book.genre,
            notes: book.notes,
            rating: i16::from(book.rating),
            cover_url: book.cover_url,
            status: book.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, rating: i16) -> BookRow {
        BookRow {
            id: 7,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Science Fiction".to_string(),
            notes: String::new(),
            rating,
            cover_url: None,
            status: status.to_string(),
            date_added: 1_700_000_000_000,
        }
    }

    #[test]
    fn status_uses_camel_case_on_the_wire() {
        let json = serde_json::to_string(&ReadingStatus::WantToRead).unwrap();
        assert_eq!("\"wantToRead\"", json);
        assert_eq!(Ok(ReadingStatus::Reading), "reading".parse::<ReadingStatus>());
        assert!("finished".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn book_json_omits_missing_cover() {
        let book = Book::from_draft(
            BookDraft {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                ..BookDraft::default()
            },
            42,
        );
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["dateAdded"], 42);
        assert_eq!(json["status"], "wantToRead");
        assert!(json.get("coverUrl").is_none());
    }

    #[test]
    fn check_rejects_blank_fields_and_bad_ratings() {
        let mut book = Book::from_draft(
            BookDraft {
                title: "  ".to_string(),
                author: "Someone".to_string(),
                ..BookDraft::default()
            },
            0,
        );
        assert_eq!(Err(InvalidBook::BlankTitle), book.check());

        book.title = "Title".to_string();
        book.rating = 6;
        assert_eq!(Err(InvalidBook::RatingOutOfRange(6)), book.check());

        book.rating = 5;
        assert_eq!(Ok(()), book.check());
    }

    #[test]
    fn trimmed_drafts_drop_blank_covers() {
        let draft = BookDraft {
            title: "  Dune ".to_string(),
            author: "\tHerbert".to_string(),
            notes: " spice ".to_string(),
            cover_url: Some("   ".to_string()),
            rating: 3,
            ..BookDraft::default()
        }
        .trimmed();

        assert_eq!("Dune", draft.title);
        assert_eq!("Herbert", draft.author);
        assert_eq!("spice", draft.notes);
        assert_eq!(None, draft.cover_url);
        assert_eq!(3, draft.rating);
        assert_eq!(Ok(()), draft.check());
    }

    #[test]
    fn rows_convert_to_entries() {
        let entry = BookEntry::try_from(row("read", 4)).unwrap();
        assert_eq!(7, entry.id);
        assert_eq!(ReadingStatus::Read, entry.book.status);
        assert_eq!(4, entry.book.rating);

        assert!(BookEntry::try_from(row("lost", 4)).is_err());
        assert!(BookEntry::try_from(row("read", 9)).is_err());
        assert!(BookEntry::try_from(row("read", -1)).is_err());
    }
}
