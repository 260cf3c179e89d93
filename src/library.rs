use crate::models::{BookEntry, ReadingStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReadingStatus),
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(ReadingStatus::WantToRead),
        StatusFilter::Only(ReadingStatus::Reading),
        StatusFilter::Only(ReadingStatus::Read),
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn matches(self, status: ReadingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoMatches,
    EmptyLibrary,
}

impl EmptyState {
    pub fn title(self) -> &'static str {
        match self {
            EmptyState::NoMatches => "No matches found",
            EmptyState::EmptyLibrary => "Your library awaits",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            EmptyState::NoMatches => "Try a different search or filter",
            EmptyState::EmptyLibrary => "Start cataloging your books by adding your first one",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub total: usize,
    pub want_to_read: usize,
    pub reading: usize,
    pub read: usize,
}

impl LibraryStats {
    pub fn of(books: &[BookEntry]) -> Self {
        books.iter().fold(
            LibraryStats {
                total: books.len(),
                ..LibraryStats::default()
            },
            |mut stats, entry| {
                match entry.book.status {
                    ReadingStatus::WantToRead => stats.want_to_read += 1,
                    ReadingStatus::Reading => stats.reading += 1,
                    ReadingStatus::Read => stats.read += 1,
                }
                stats
            },
        )
    }
}

pub fn count_label(count: usize) -> String {
    match count {
        1 => "1 book cataloged".to_string(),
        n => format!("{n} books cataloged"),
    }
}

/// Search box and status tab of the library grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryView {
    search: String,
    status_filter: StatusFilter,
}

impl LibraryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_status_filter(&mut self, status_filter: StatusFilter) {
        self.status_filter = status_filter;
    }

    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || self.status_filter != StatusFilter::All
    }

    /// Books passing both the status tab and the case-insensitive title/author search
    pub fn filter<'a>(&self, books: &'a [BookEntry]) -> Vec<&'a BookEntry> {
        let query = self.search.trim().to_lowercase();

        books
            .iter()
            .filter(|entry| self.status_filter.matches(entry.book.status))
            .filter(|entry| {
                query.is_empty()
                    || entry.book.title.to_lowercase().contains(&query)
                    || entry.book.author.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn empty_state(&self) -> EmptyState {
        if self.is_filtered() {
            EmptyState::NoMatches
        } else {
            EmptyState::EmptyLibrary
        }
    }
}
