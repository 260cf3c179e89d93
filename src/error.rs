use std::error::Error;
use std::fmt;

use crate::form::FieldErrors;
use crate::models::{BookId, InvalidBook};

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Everything that can go wrong between a user intent and the store
#[derive(Debug)]
pub enum CatalogError {
    /// The store has not been connected yet
    Connection,
    NotFound(BookId),
    Validation(FieldErrors),
    /// A draft that breaks the record invariants, rejected before any store call
    Invalid(InvalidBook),
    Save(BoxError),
    Delete(BoxError),
    Fetch(BoxError),
}

impl CatalogError {
    pub fn save(error: impl Error + Send + Sync + 'static) -> Self {
        CatalogError::Save(Box::new(error))
    }

    pub fn delete(error: impl Error + Send + Sync + 'static) -> Self {
        CatalogError::Delete(Box::new(error))
    }

    pub fn fetch(error: impl Error + Send + Sync + 'static) -> Self {
        CatalogError::Fetch(Box::new(error))
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Connection => write!(f, "not connected to the book store"),
            CatalogError::NotFound(id) => write!(f, "no book found with ID: {id}"),
            CatalogError::Validation(errors) => write!(f, "invalid book: {errors}"),
            CatalogError::Invalid(e) => write!(f, "invalid book: {e}"),
            CatalogError::Save(e) => write!(f, "problem saving the book: {e}"),
            CatalogError::Delete(e) => write!(f, "problem deleting the book: {e}"),
            CatalogError::Fetch(e) => write!(f, "problem loading the library: {e}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Save(e) | CatalogError::Delete(e) | CatalogError::Fetch(e) => {
                Some(e.as_ref())
            }
            CatalogError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}
