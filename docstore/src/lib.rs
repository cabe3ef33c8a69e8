//! # docstore
//!
//! Document metadata store over Axum and Sea-ORM. Listings accept a filter
//! (`q`), a sort (`s`) and paging (`page`, `size`) and answer with the five
//! `X-*` pagination headers.
//!
//! The [`criteria`] module holds the backend-independent grammar; [`storage`]
//! evaluates it against Sea-ORM or in memory.

pub mod config;
pub mod criteria;
pub mod documents;
pub mod errors;
pub mod listing;
pub mod migration;
pub mod routes;
pub mod storage;

pub use config::{Config, ConfigError};
pub use errors::ApiError;
pub use routes::{AppState, router};
