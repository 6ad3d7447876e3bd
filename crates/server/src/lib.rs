//! HTTP surface of the notes index service.
//!
//! - `GET /api/commits` - recent commits as JSON (CORS open)
//! - `GET /api/rebuild` - rebuild `notes.json` now
//!
//! Everything else answers `404` with an empty body.

mod args;
mod error;
mod routes;
mod state;

pub use args::Args;
pub use error::ApiError;
pub use routes::{api_routes, COMMIT_FEED_LIMIT};
pub use state::AppState;
