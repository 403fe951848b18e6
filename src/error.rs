//! Crate-wide error type.
//!
//! Per the error-handling design, nothing in the core pipeline (workers,
//! publisher, engine, snapshotter, pruner) lets an `Error` escape to the
//! process boundary — each task's run loop matches on its own `Result` and
//! logs + continues. `Error` surfaces across API boundaries within the core
//! (store operations, config loading, `Publisher::publish`) where the caller
//! decides whether to log-and-continue or fail startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cache/store connection error: {0}")]
    Connection(String),

    #[error("redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("database error: {0}")]
    Database(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid quote: {0}")]
    InvalidQuote(String),
}

pub type Result<T> = std::result::Result<T, Error>;
