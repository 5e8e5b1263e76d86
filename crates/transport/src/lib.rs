//! WebSocket transport adapter.
//!
//! Opens one persistent connection per session and turns the raw frame
//! stream into decoded [`protocol::ServerMessage`] values, delivered
//! exactly once each, in arrival order: first to any pending
//! request/response correlation, then to typed per-kind routes, then to the
//! generic broadcast stream the reducer pipeline consumes.
//!
//! Reconnect/backoff is deliberately absent; a dropped connection simply
//! ends the streams and the layer above decides what to do.
pub mod dispatcher;
pub mod error;
pub mod handle;

pub use error::TransportError;
pub use handle::{Transport, TransportConfig, TransportHandle};
