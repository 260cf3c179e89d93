use std::error::Error;
use std::fmt;

use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::models::{Book, BookEntry, BookId, CreatedBook};
use crate::repo::BookRepo;

#[derive(Debug)]
pub enum ClientError {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "problem talking to the book server: {e}"),
            ClientError::Status { status, body } => {
                write!(f, "book server answered {status}: {body}")
            }
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            ClientError::Status { .. } => None,
        }
    }
}

/// Talks to a running book server over HTTP
#[derive(Clone)]
pub struct HttpBookRepo {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookRepo {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpBookRepo {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    fn book_url(&self, id: BookId) -> String {
        format!("{}/books/{id}", self.base_url)
    }
}

async fn error_for_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

impl BookRepo for HttpBookRepo {
    type Error = ClientError;

    async fn list_books(&self) -> Result<Vec<BookEntry>, ClientError> {
        let response = self.client.get(self.books_url()).send().await?;

        Ok(error_for_status(response).await?.json().await?)
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, ClientError> {
        let response = self.client.get(self.book_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Server has no book with ID: {}", id);
            return Ok(None);
        }

        Ok(Some(error_for_status(response).await?.json().await?))
    }

    async fn add_book(&mut self, book: Book) -> Result<BookId, ClientError> {
        let response = self.client.post(self.books_url()).json(&book).send().await?;
        let created: CreatedBook = error_for_status(response).await?.json().await?;

        Ok(created.id)
    }

    async fn update_book(&mut self, id: BookId, book: Book) -> Result<bool, ClientError> {
        let response = self.client.put(self.book_url(id)).json(&book).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        error_for_status(response).await?;
        Ok(true)
    }

    async fn delete_book(&mut self, id: BookId) -> Result<bool, ClientError> {
        let response = self.client.delete(self.book_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        error_for_status(response).await?;
        Ok(true)
    }
}
