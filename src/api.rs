use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::error::Error;
use tracing::{error, info};

use crate::models::{Book, BookEntry, BookId, CreatedBook};
use crate::repo::BookRepo;

#[derive(Clone)]
struct AppState<R> {
    repo: R,
}

pub fn build_api<R>(repo: R) -> Router
where
    R: BookRepo + Send + Sync + Clone + 'static,
{
    Router::new()
        .route("/books", get(list_books::<R>).post(add_book::<R>))
        .route(
            "/books/{id}",
            get(get_book::<R>)
                .put(update_book::<R>)
                .delete(delete_book::<R>),
        )
        .with_state(AppState { repo })
}

async fn list_books<R>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<BookEntry>>, (StatusCode, String)>
where
    R: BookRepo,
{
    let results = state.repo.list_books().await.map_err(internal_error)?;

    info!("Retrieved {} books from the store", results.len());

    Ok(Json(results))
}

async fn get_book<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, (StatusCode, String)>
where
    R: BookRepo,
{
    let id = parse_book_id(id)?;

    let book = state.repo.get_book(id).await.map_err(internal_error)?;

    match book {
        Some(book) => {
            info!("Retrieved book from the store: {:?}", book);
            Ok(Json(book))
        }
        None => {
            info!("No book found in the store with ID: {}", id);
            Err(not_found(id))
        }
    }
}

async fn add_book<R>(
    State(mut state): State<AppState<R>>,
    Json(book): Json<Book>,
) -> Result<(StatusCode, Json<CreatedBook>), (StatusCode, String)>
where
    R: BookRepo,
{
    check_book(&book)?;

    let id = state.repo.add_book(book).await.map_err(internal_error)?;

    info!("Inserted book into the store with ID: {}", id);

    Ok((StatusCode::CREATED, Json(CreatedBook { id })))
}

async fn update_book<R>(
    State(mut state): State<AppState<R>>,
    Path(id): Path<String>,
    Json(book): Json<Book>,
) -> Result<StatusCode, (StatusCode, String)>
where
    R: BookRepo,
{
    let id = parse_book_id(id)?;
    check_book(&book)?;

    let updated = state
        .repo
        .update_book(id, book)
        .await
        .map_err(internal_error)?;

    if updated {
        info!("Updated book in the store with ID: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        info!("Tried to update non-existent book with ID: {}", id);
        Err(not_found(id))
    }
}

async fn delete_book<R>(State(state): State<AppState<R>>, Path(id): Path<String>) -> Response
where
    R: BookRepo,
{
    let deleted_or_error = try_to_delete_book(state.repo, id.clone()).await;

    match deleted_or_error {
        Ok(true) => {
            info!("Deleted book from the store with ID: {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => {
            info!("Tried to delete non-existent book with ID: {}", id);
            (
                StatusCode::NOT_FOUND,
                format!("No book found with ID: {}", id),
            )
                .into_response()
        }
        Err(error_response) => error_response.into_response(),
    }
}

async fn try_to_delete_book<R: BookRepo>(
    mut repo: R,
    id: String,
) -> Result<bool, (StatusCode, String)> {
    let id = parse_book_id(id)?;
    repo.delete_book(id).await.map_err(internal_error)
}

fn check_book(book: &Book) -> Result<(), (StatusCode, String)> {
    book.check().map_err(|invalid| {
        info!("Rejected invalid book: {}", invalid);
        (StatusCode::UNPROCESSABLE_ENTITY, invalid.to_string())
    })
}

/// Build a 500 response for an error
fn internal_error<E>(err: E) -> (StatusCode, String)
where
    E: Error,
{
    error!("Store error: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn not_found(id: BookId) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("No book found with ID: {}", id),
    )
}

fn parse_book_id(id: String) -> Result<BookId, (StatusCode, String)> {
    id.parse::<BookId>()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid book ID: {}", id)))
}
