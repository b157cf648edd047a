//! Duaelmix Remote
//!
//! The remote mode channel: a remote control switches the audible variant of
//! a running player by calling a URL bound to the player's session.
//!
//! # Features
//!
//! - **Validation**: session ids (`[a-z0-9]{10}`) and `on=<0|1>` requests
//! - **Session store**: one overwrite-on-upsert record per session, with
//!   watch subscriptions
//! - **Channels**: `LocalModeChannel` over an in-process store and
//!   `HttpModeClient` over the HTTP endpoint
//!
//! # Example
//!
//! ```ignore
//! use duaelmix_remote::{HttpModeClient, ModeChannel, RemoteConfig, SessionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionId::parse("k3v9x0a1bq")?;
//!     let client = HttpModeClient::new(RemoteConfig::new("https://duaelmix.example.com", session))?;
//!
//!     let mut modes = client.subscribe().await?;
//!     while let Some(mode) = modes.recv().await {
//!         println!("Mode is now {}", mode);
//!     }
//!     Ok(())
//! }
//! ```

mod channel;
mod client;
mod error;
mod store;
mod types;

pub use channel::{LocalModeChannel, ModeChannel};
pub use client::{HttpModeClient, RemoteConfig, DEFAULT_POLL_INTERVAL};
pub use error::{RemoteError, Result};
pub use store::{MemorySessionStore, SessionStore};
pub use types::{mode_of, ModeRequest, SessionId, SessionRecord, SESSION_ID_LEN};
