//! HTTP server for the redline daemon.
//!
//! Provides REST API for:
//! - Health checks
//! - Text comparison
//! - Change categorization
//! - Document text extraction

mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
