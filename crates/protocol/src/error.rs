//! Decode failures surfaced by the message vocabulary.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("message has no MessageType field")]
    MissingType,

    /// The discriminator names a type outside the known vocabulary.
    ///
    /// Policy: callers report and skip. This must never tear down a session;
    /// servers grow their vocabulary faster than clients update.
    #[error("unknown message type {message_type:?}")]
    UnknownType { message_type: String },

    #[error("malformed {message_type} payload")]
    Malformed {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Returns true for the report-and-skip case of an unrecognized type.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, DecodeError::UnknownType { .. })
    }
}
