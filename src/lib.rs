//! rcsync - RingCentral identity sync connector.
//!
//! Mirrors RingCentral extensions (users) and account roles into an
//! access-governance model, and grants or revokes role assignments.
//!
//! # Example
//!
//! ```no_run
//! use rcsync::config::Config;
//! use rcsync::connector::{Connector, PageToken};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let connector = Connector::new(&config).await?;
//!
//! for syncer in connector.resource_syncers() {
//!     let mut token = PageToken::new(100);
//!     loop {
//!         let page = syncer.list(None, &token).await?;
//!         println!("{}: {} resources", syncer.resource_type().id, page.items.len());
//!         if page.is_last() {
//!             break;
//!         }
//!         token.token = page.next_token;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;

pub use error::{ApiError, AuthError, SyncError};
