use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::controller::{Clock, Intent, LibraryController, Notice};
use crate::error::CatalogError;
use crate::models::{Book, BookDraft, ReadingStatus, MAX_RATING};
use crate::repo::BookRepo;

pub const GENRES: [&str; 15] = [
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Science Fiction",
    "Fantasy",
    "Romance",
    "Thriller",
    "Biography",
    "History",
    "Self-Help",
    "Science",
    "Poetry",
    "Graphic Novel",
    "Children's",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Title,
    Author,
    Genre,
    Status,
    Rating,
    CoverUrl,
    Notes,
}

/// Validation messages, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }

    fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().copied().collect();
        f.write_str(&messages.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

/// State of the add/edit form. Text fields hold exactly what the user typed;
/// trimming happens when the draft is built.
#[derive(Debug, Clone)]
pub struct BookForm {
    mode: FormMode,
    title: String,
    author: String,
    genre: String,
    notes: String,
    cover_url: String,
    status: ReadingStatus,
    rating: u8,
    errors: FieldErrors,
    is_saving: bool,
}

impl BookForm {
    pub fn new_add() -> Self {
        BookForm {
            mode: FormMode::Add,
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            notes: String::new(),
            cover_url: String::new(),
            status: ReadingStatus::WantToRead,
            rating: 0,
            errors: FieldErrors::default(),
            is_saving: false,
        }
    }

    pub fn new_edit(book: &Book) -> Self {
        BookForm {
            mode: FormMode::Edit,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            notes: book.notes.clone(),
            cover_url: book.cover_url.clone().unwrap_or_default(),
            status: book.status,
            rating: book.rating.min(MAX_RATING),
            errors: FieldErrors::default(),
            is_saving: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Book",
            FormMode::Edit => "Edit Book",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.is_saving, self.mode) {
            (true, _) => "Saving...",
            (false, FormMode::Add) => "Add to Library",
            (false, FormMode::Edit) => "Save Changes",
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn cover_url(&self) -> &str {
        &self.cover_url
    }

    pub fn status(&self) -> ReadingStatus {
        self.status
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.errors.clear(Field::Title);
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
        self.errors.clear(Field::Author);
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
        self.errors.clear(Field::Genre);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.errors.clear(Field::Notes);
    }

    pub fn set_cover_url(&mut self, cover_url: impl Into<String>) {
        self.cover_url = cover_url.into();
        self.errors.clear(Field::CoverUrl);
    }

    pub fn set_status(&mut self, status: ReadingStatus) {
        self.status = status;
        self.errors.clear(Field::Status);
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.rating = rating.min(MAX_RATING);
        self.errors.clear(Field::Rating);
    }

    /// Picking the star that is already selected clears the rating
    pub fn pick_star(&mut self, star: u8) {
        let rating = if star == self.rating { 0 } else { star };
        self.set_rating(rating);
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.title.trim().is_empty() {
            errors.insert(Field::Title, "Title is required");
        }
        if self.author.trim().is_empty() {
            errors.insert(Field::Author, "Author is required");
        }
        errors
    }

    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            notes: self.notes.clone(),
            rating: self.rating,
            cover_url: Some(self.cover_url.clone()),
            status: self.status,
        }
        .trimmed()
    }

    /// Validates and, if the form is clean, hands the draft to the controller as a
    /// save intent. Invalid forms never reach the store.
    pub async fn submit<R, C>(
        &mut self,
        controller: &mut LibraryController<R, C>,
    ) -> Result<Option<Notice>, CatalogError>
    where
        R: BookRepo,
        C: Clock,
    {
        let errors = self.validate();
        if !errors.is_empty() {
            debug!("Form has {} invalid fields", errors.len());
            self.errors = errors.clone();
            return Err(CatalogError::Validation(errors));
        }

        let draft = self.to_draft();
        let _saving = InFlight::start(&mut self.is_saving);
        controller.dispatch(Intent::Save(draft)).await
    }
}

/// Holds a control's busy flag up while its request is outstanding. Dropping
/// the request future also lowers the flag.
pub(crate) struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    pub(crate) fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        InFlight(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::View;
    use crate::memory::InMemoryBookRepo;

    #[test]
    fn edit_form_starts_from_the_snapshot() {
        let book = Book {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: "Science Fiction".to_string(),
            notes: "Spice".to_string(),
            rating: 4,
            cover_url: None,
            status: ReadingStatus::Read,
            date_added: 10,
        };

        let form = BookForm::new_edit(&book);

        assert_eq!(FormMode::Edit, form.mode());
        assert_eq!("", form.cover_url());
        assert_eq!(BookDraft::from(&book), form.to_draft());
        assert_eq!("Save Changes", form.submit_label());
    }

    #[test]
    fn blank_title_and_author_get_one_message_each() {
        let mut form = BookForm::new_add();
        form.set_title("   ");

        let errors = form.validate();

        assert_eq!(2, errors.len());
        assert_eq!(Some("Title is required"), errors.get(Field::Title));
        assert_eq!(Some("Author is required"), errors.get(Field::Author));
    }

    #[test]
    fn draft_is_trimmed_and_empty_cover_dropped() {
        let mut form = BookForm::new_add();
        form.set_title("  Dune ");
        form.set_author(" Herbert");
        form.set_genre(" Science Fiction ");
        form.set_notes("\n");
        form.set_cover_url("   ");

        let draft = form.to_draft();

        assert_eq!("Dune", draft.title);
        assert_eq!("Herbert", draft.author);
        assert_eq!("Science Fiction", draft.genre);
        assert_eq!("", draft.notes);
        assert_eq!(None, draft.cover_url);
    }

    #[test]
    fn picking_the_selected_star_clears_the_rating() {
        let mut form = BookForm::new_add();

        form.pick_star(3);
        assert_eq!(3, form.rating());
        form.pick_star(3);
        assert_eq!(0, form.rating());
        form.pick_star(9);
        assert_eq!(MAX_RATING, form.rating());
    }

    #[test]
    fn busy_flag_is_lowered_when_the_guard_goes_away() {
        let mut form = BookForm::new_add();
        {
            let _saving = InFlight::start(&mut form.is_saving);
        }
        assert!(!form.is_saving());
        assert_eq!("Add to Library", form.submit_label());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let repo = InMemoryBookRepo::new();
        let mut controller = LibraryController::new(repo.clone());
        controller.navigate_to_add();
        let mut form = BookForm::new_add();
        form.set_author("Herbert");

        let result = form.submit(&mut controller).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(Some("Title is required"), form.errors().get(Field::Title));
        assert_eq!(None, form.errors().get(Field::Author));
        assert!(repo.list_books().await.unwrap().is_empty());
        assert_eq!(&View::AddForm, controller.view());

        form.set_title("Dune");
        assert!(form.errors().is_empty());
        assert!(!form.is_saving());
    }

    #[tokio::test]
    async fn valid_form_is_saved() {
        let repo = InMemoryBookRepo::new();
        let mut controller = LibraryController::new(repo.clone());
        controller.navigate_to_add();
        let mut form = BookForm::new_add();
        form.set_title("Dune");
        form.set_author("Herbert");

        let notice = form.submit(&mut controller).await.unwrap();

        assert!(matches!(notice, Some(Notice::Success(_))));
        assert!(!form.is_saving());
        assert_eq!(1, repo.list_books().await.unwrap().len());
        assert_eq!(&View::Library, controller.view());
    }
}
