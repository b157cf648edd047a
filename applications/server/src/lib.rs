//! Duaelmix Server Library
//!
//! Hosts the remote mode endpoint: a remote control calls
//! `/api/v1?session=<id>&on=<0|1>` and players follow their session's
//! record through `/api/v1/state`.
//!
//! This library exposes the router and its state for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use api::create_router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;
