//! Wire protocol shared with the game server.
//!
//! Every message is a flat keyed JSON record with a `MessageType`
//! discriminator. This crate owns the closed vocabulary of client requests
//! and server notifications, decoded once at the transport boundary into
//! typed enums so downstream consumers can pattern-match exhaustively.
//!
//! Unknown fields are ignored on decode; missing optional fields fall back
//! to documented defaults. An unrecognized `MessageType` is reported as
//! [`DecodeError::UnknownType`] rather than an exhaustive-match failure,
//! keeping long-running sessions alive across server protocol additions.
pub mod error;
pub mod messages;
pub mod types;

pub use error::DecodeError;
pub use messages::{ClientMessage, ClientMessageKind, ServerMessage, ServerMessageKind};
pub use types::{
    CardId, CardInfo, CombatantState, EffectKind, FightId, MapId, MapInfo, MapPosition, PlayerId,
    PlayerMapInfo, StatusEffectInfo, TilemapData,
};
