//! Radar Bot Directory API client library.
//!
//! Posts guild/shard counts for a bot (once, or on a fixed autopost interval) and
//! fetches the bot's listing, widget image, and per-user vote timestamps.

pub mod autopost;
pub mod client;
pub mod error;
pub mod helpers;
pub mod identity;
pub mod transport;

pub use autopost::AutopostHandle;
pub use client::{Client, ClientBuilder, StatsPayload, Widget, API_BASE, AUTOPOST_INTERVAL};
pub use error::Error;
pub use helpers::{epoch_to_datetime, format_epoch_display, last_voted_timestamp};
pub use identity::{Identity, StaticIdentity};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
