/// Comment Service Library
///
/// Posts, threaded comments and reactions, with deterministic paginated
/// rankings (recent, top, most liked/disliked, most active).
///
/// # Modules
///
/// - `handlers`: HTTP request handlers under `/api/v1`
/// - `models`: Entities, ranked projections and request bodies
/// - `ranking`: Ranking engine, ordering keys and page windows
/// - `services`: Validation and write paths
/// - `db`: Persistence gateway trait with PostgreSQL and in-memory backends
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
/// - `state`: Shared handler state
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
