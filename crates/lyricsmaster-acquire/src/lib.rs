//! Lyrics acquisition: site adapters, the retrying HTTP client, the
//! optional Tor transport and the discography download engine.

pub mod adapter;
pub mod error;
pub mod fuzzy;
pub mod http;
pub mod normalize;
pub mod output;
pub mod page;
pub mod provider;
pub mod sites;
pub mod tor;
pub mod types;

#[cfg(test)]
mod testing;

pub use adapter::SiteAdapter;
pub use error::{AcquireError, AdapterError, TransportError};
pub use http::{ClientConfig, Fetch, HttpClient};
pub use provider::LyricsProvider;
pub use tor::{ControlPort, TorConfig, TorController};
