pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod database;
pub mod detail;
pub mod error;
pub mod form;
pub mod library;
pub mod mapper;
pub mod memory;
pub mod models;
pub mod repo;
mod schema;

use std::error::Error;
use std::fmt;
use std::io;

use axum::{serve::Serve, Router};
use tokio::net::TcpListener;
use tracing::info;

use api::build_api;
use config::Config;
use database::{create_db_pool, DatabaseBookRepo, DatabaseError};

#[derive(Debug)]
pub enum StartupError {
    Database(DatabaseError),
    Bind(io::Error),
}

impl From<DatabaseError> for StartupError {
    fn from(error: DatabaseError) -> Self {
        StartupError::Database(error)
    }
}

impl From<io::Error> for StartupError {
    fn from(error: io::Error) -> Self {
        StartupError::Bind(error)
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Database(e) => write!(f, "could not set up the database: {e}"),
            StartupError::Bind(e) => write!(f, "could not bind the listener: {e}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StartupError::Database(e) => Some(e),
            StartupError::Bind(e) => Some(e),
        }
    }
}

pub async fn start_server(
    config: Config,
) -> Result<Serve<TcpListener, Router, Router>, StartupError> {
    let pool = create_db_pool(config.database_url, config.pool_max_size).await?;
    let repo = DatabaseBookRepo::new(pool);

    let router = build_api(repo);

    let listener = TcpListener::bind(config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    Ok(axum::serve(listener, router))
}
