use tracing::{debug, error, info};

use crate::error::CatalogError;
use crate::mapper::load_all;
use crate::models::{Book, BookDraft, BookEntry, BookId, Timestamp};
use crate::repo::BookRepo;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The screen currently shown. Edit and detail carry a copy of the book taken
/// when the user navigated there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Library,
    AddForm,
    EditForm { id: BookId, book: Book },
    DetailView { id: BookId, book: Book },
}

/// What the user asked for on the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add,
    ViewDetail { id: BookId, book: Book },
    Edit,
    Save(BookDraft),
    Delete,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Add,
    Update,
    Delete,
}

impl Operation {
    fn failure_text(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load your library",
            Operation::Add => "Failed to add book",
            Operation::Update => "Failed to update book",
            Operation::Delete => "Failed to delete book",
        }
    }
}

/// Message for the user after an operation, shown as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    fn success(text: &str) -> Self {
        Notice::Success(text.to_string())
    }

    pub fn failure(operation: Operation, error: &CatalogError) -> Self {
        let text = match error {
            CatalogError::Connection => "Not connected to your library",
            CatalogError::NotFound(_) => "That book is no longer in your library",
            CatalogError::Validation(_) | CatalogError::Invalid(_) => {
                "Please fill in the required fields"
            }
            CatalogError::Save(_) | CatalogError::Delete(_) | CatalogError::Fetch(_) => {
                operation.failure_text()
            }
        };
        Notice::Error(text.to_string())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }
}

/// Trims the draft and rejects it if it would break the record invariants
fn checked(draft: BookDraft) -> Result<BookDraft, CatalogError> {
    let draft = draft.trimmed();
    draft.check().map_err(|invalid| {
        info!("Rejected invalid book: {}", invalid);
        CatalogError::Invalid(invalid)
    })?;
    Ok(draft)
}

/// Owns the current view and the loaded collection. All changes go through the
/// store and are followed by a full reload.
pub struct LibraryController<R, C = SystemClock> {
    repo: Option<R>,
    clock: C,
    view: View,
    books: Vec<BookEntry>,
    is_loading: bool,
}

impl<R: BookRepo> LibraryController<R, SystemClock> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(Some(repo), SystemClock)
    }

    /// A controller whose store is not reachable yet, see [`LibraryController::connect`]
    pub fn disconnected() -> Self {
        Self::with_clock(None, SystemClock)
    }
}

impl<R: BookRepo, C: Clock> LibraryController<R, C> {
    pub fn with_clock(repo: Option<R>, clock: C) -> Self {
        LibraryController {
            repo,
            clock,
            view: View::Library,
            books: Vec::new(),
            is_loading: true,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    /// True until the first load succeeds
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_connected(&self) -> bool {
        self.repo.is_some()
    }

    /// Attaches the store and loads the library from it
    pub async fn connect(&mut self, repo: R) -> Result<(), CatalogError> {
        self.repo = Some(repo);
        self.load_books().await
    }

    pub async fn load_books(&mut self) -> Result<(), CatalogError> {
        let Some(repo) = self.repo.as_ref() else {
            debug!("Store not connected yet, skipping load");
            return Ok(());
        };

        self.books = load_all(repo).await?;
        self.is_loading = false;

        Ok(())
    }

    pub async fn add_book(&mut self, draft: BookDraft) -> Result<Notice, CatalogError> {
        let book = Book::from_draft(checked(draft)?, self.clock.now());

        let id = self.repo_mut()?.add_book(book).await.map_err(|e| {
            error!("Failed to add book: {}", e);
            CatalogError::save(e)
        })?;
        info!("Added book with ID: {}", id);

        self.reload_into_library().await;
        Ok(Notice::success("Book added to your library"))
    }

    pub async fn update_book(
        &mut self,
        id: BookId,
        draft: BookDraft,
    ) -> Result<Notice, CatalogError> {
        let draft = checked(draft)?;
        let date_added = match self.books.iter().find(|entry| entry.id == id) {
            Some(entry) => entry.book.date_added,
            None => self.stored_date_added(id).await?,
        };
        let book = Book::from_draft(draft, date_added);

        let updated = self.repo_mut()?.update_book(id, book).await.map_err(|e| {
            error!("Failed to update book {}: {}", id, e);
            CatalogError::save(e)
        })?;
        if !updated {
            info!("Tried to update non-existent book with ID: {}", id);
            return Err(CatalogError::NotFound(id));
        }
        info!("Updated book with ID: {}", id);

        self.reload_into_library().await;
        Ok(Notice::success("Book updated"))
    }

    pub async fn delete_book(&mut self, id: BookId) -> Result<Notice, CatalogError> {
        let deleted = self.repo_mut()?.delete_book(id).await.map_err(|e| {
            error!("Failed to delete book {}: {}", id, e);
            CatalogError::delete(e)
        })?;
        if !deleted {
            info!("Tried to delete non-existent book with ID: {}", id);
            return Err(CatalogError::NotFound(id));
        }
        info!("Deleted book with ID: {}", id);

        self.reload_into_library().await;
        Ok(Notice::success("Book removed from library"))
    }

    pub fn navigate_to_add(&mut self) {
        self.set_view(View::AddForm);
    }

    pub fn navigate_to_edit(&mut self, id: BookId, book: Book) {
        self.set_view(View::EditForm { id, book });
    }

    pub fn navigate_to_detail(&mut self, id: BookId, book: Book) {
        self.set_view(View::DetailView { id, book });
    }

    pub fn navigate_to_library(&mut self) {
        self.set_view(View::Library);
    }

    /// Applies a user intent to the current view. Intents that make no sense on
    /// the current screen are ignored.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<Option<Notice>, CatalogError> {
        match (self.view.clone(), intent) {
            (View::Library, Intent::Add) => self.navigate_to_add(),
            (View::Library, Intent::ViewDetail { id, book }) => self.navigate_to_detail(id, book),
            (View::DetailView { id, book }, Intent::Edit) => self.navigate_to_edit(id, book),
            (View::AddForm, Intent::Save(draft)) => return self.add_book(draft).await.map(Some),
            (View::EditForm { id, .. }, Intent::Save(draft)) => {
                return self.update_book(id, draft).await.map(Some)
            }
            (View::DetailView { id, .. }, Intent::Delete) => {
                return self.delete_book(id).await.map(Some)
            }
            (View::AddForm | View::EditForm { .. } | View::DetailView { .. }, Intent::Back) => {
                self.navigate_to_library()
            }
            (view, intent) => debug!("Ignoring {:?} on {:?}", intent, view),
        }
        Ok(None)
    }

    fn repo_mut(&mut self) -> Result<&mut R, CatalogError> {
        self.repo.as_mut().ok_or(CatalogError::Connection)
    }

    /// Fetches the creation time of a book we don't have locally
    async fn stored_date_added(&self, id: BookId) -> Result<Timestamp, CatalogError> {
        let repo = self.repo.as_ref().ok_or(CatalogError::Connection)?;

        let stored = repo.get_book(id).await.map_err(|e| {
            error!("Failed to look up book {}: {}", id, e);
            CatalogError::save(e)
        })?;

        stored
            .map(|book| book.date_added)
            .ok_or(CatalogError::NotFound(id))
    }

    // The store already accepted the change, so a failed reload only leaves the
    // previous collection on screen
    async fn reload_into_library(&mut self) {
        if let Err(e) = self.load_books().await {
            error!("Failed to reload library after a change: {}", e);
        }
        self.navigate_to_library();
    }

    fn set_view(&mut self, view: View) {
        debug!("Navigating from {:?} to {:?}", self.view, view);
        self.view = view;
    }
}
