use std::error::Error;
use std::fmt;

use crate::models::{Book, BookChangeset, BookEntry, BookId, BookRow, InvalidRow, NewBookRow};
use crate::repo::BookRepo;
use crate::schema::books;
use bb8::Pool;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{
    pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection, RunQueryDsl,
};
use tracing::info;

pub type DBPool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub async fn create_db_pool(
    connection_string: String,
    max_size: u32,
) -> Result<DBPool, DatabaseError> {
    let config =
        AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(connection_string);
    let pool = Pool::builder().max_size(max_size).build(config).await?;

    info!("Created DB connection pool with max size {}", max_size);

    Ok(pool)
}

#[derive(Debug)]
pub enum DatabaseError {
    ConnectError(diesel_async::pooled_connection::PoolError),
    PoolError(bb8::RunError<diesel_async::pooled_connection::PoolError>),
    ResultError(diesel::result::Error),
    CorruptRow(InvalidRow),
}

impl From<diesel_async::pooled_connection::PoolError> for DatabaseError {
    fn from(error: diesel_async::pooled_connection::PoolError) -> Self {
        DatabaseError::ConnectError(error)
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for DatabaseError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        DatabaseError::PoolError(error)
    }
}

impl From<diesel::result::Error> for DatabaseError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseError::ResultError(error)
    }
}

impl From<InvalidRow> for DatabaseError {
    fn from(error: InvalidRow) -> Self {
        DatabaseError::CorruptRow(error)
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::ConnectError(e) => {
                write!(f, "problem creating the connection pool: {e}")
            }
            DatabaseError::PoolError(e) => {
                write!(f, "problem getting a connection from the connection pool: {e}")
            }
            DatabaseError::ResultError(e) => {
                write!(f, "problem executing a statement against the DB: {e}")
            }
            DatabaseError::CorruptRow(e) => {
                write!(f, "found a book row that could not be read: {e}")
            }
        }
    }
}

impl Error for DatabaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DatabaseError::ConnectError(e) => Some(e),
            DatabaseError::PoolError(e) => Some(e),
            DatabaseError::ResultError(e) => Some(e),
            DatabaseError::CorruptRow(e) => Some(e),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseBookRepo {
    pool: DBPool,
}

impl DatabaseBookRepo {
    pub fn new(pool: DBPool) -> Self {
        DatabaseBookRepo { pool }
    }
}

impl BookRepo for DatabaseBookRepo {
    type Error = DatabaseError;

    async fn list_books(&self) -> Result<Vec<BookEntry>, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let rows = books::table
            .select(BookRow::as_select())
            .order(books::id.asc())
            .load(&mut conn)
            .await?;

        let entries = rows
            .into_iter()
            .map(BookEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let maybe_row = books::table
            .find(id)
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        match maybe_row {
            Some(row) => Ok(Some(BookEntry::try_from(row)?.book)),
            None => Ok(None),
        }
    }

    async fn add_book(&mut self, book: Book) -> Result<BookId, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(books::table)
            .values(NewBookRow::from(book))
            .returning(books::id)
            .get_result(&mut conn)
            .await?;

        Ok(id)
    }

    async fn update_book(&mut self, id: BookId, book: Book) -> Result<bool, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(books::table.find(id))
            .set(BookChangeset::from(book))
            .execute(&mut conn)
            .await
            .map(|affected_rows| affected_rows == 1)?;

        Ok(updated)
    }

    async fn delete_book(&mut self, id: BookId) -> Result<bool, DatabaseError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(books::table.find(id))
            .execute(&mut conn)
            .await
            .map(|affected_rows| affected_rows == 1)?;

        Ok(deleted)
    }
}
