/// Yatube Service Library
///
/// A server-rendered blog: authors publish posts, gather them into groups,
/// readers comment and follow the authors they like.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers rendering HTML pages
/// - `services`: Blog rules (listings, posting, comments, follows, accounts)
/// - `models`: Users, posts, groups, comments and follows
/// - `forms`: Input normalisation and validation
/// - `db`: Storage trait with PostgreSQL and in-memory backends
/// - `cache`: Whole-page cache for the index listing
/// - `middleware`: Session cookie handling and auth extractors
/// - `templates`: Embedded Tera templates
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus counters
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod security;
pub mod services;
pub mod startup;
pub mod state;
pub mod templates;
pub mod urls;

pub use config::Config;
pub use error::{AppError, Result};
pub use startup::build_app;
pub use state::AppState;
