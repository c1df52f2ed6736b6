//! # AutoWeb API
//!
//! HTTP surface of the automation engine.
//!
//! ```text
//! POST   /automation                 - Dispatch one action (always 200 with a response body)
//! GET    /automation/sessions        - List prepared runs
//! GET    /automation/sessions/{id}   - One prepared run
//! GET    /health                     - Uptime, session count, browser connection
//! GET    /livez                      - Liveness probe
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
