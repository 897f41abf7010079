//! Postgres persistence for a `World`.

mod fetch;
mod load;
mod migrate;

use thiserror::Error;

pub use fetch::fetch_world;
pub use load::{insert_political_memory, load_world};
pub use migrate::migrate;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("malformed JSON in {column}: {source}")]
    Json {
        column: &'static str,
        source: serde_json::Error,
    },
    #[error("invalid value in {column}: {message}")]
    Invalid {
        column: &'static str,
        message: String,
    },
    #[error(
        "political memory ({source_faction_id}, {target_faction_id}, {factor_key}) already exists"
    )]
    DuplicatePoliticalMemory {
        source_faction_id: String,
        target_faction_id: String,
        factor_key: String,
    },
}
