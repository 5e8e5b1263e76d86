//! Failures surfaced by the transport adapter.
use std::time::Duration;

use protocol::{ClientMessageKind, ServerMessageKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to establish connection")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("failed to encode outbound {kind}")]
    Encode {
        kind: ClientMessageKind,
        #[source]
        source: serde_json::Error,
    },

    /// The writer task is gone; the connection is effectively dead.
    #[error("outbound channel closed")]
    ChannelClosed,

    /// A correlated wait expired. Session state is untouched: a message
    /// that never arrived was never applied.
    #[error("timed out after {waited:?} waiting for {expected}")]
    Timeout {
        expected: ServerMessageKind,
        waited: Duration,
    },

    #[error("connection closed while waiting for {expected}")]
    Closed { expected: ServerMessageKind },
}
