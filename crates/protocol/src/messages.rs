//! The closed message vocabulary: client requests and server notifications.
//!
//! Both enums are internally tagged on `MessageType`, so the JSON wire form
//! stays a flat record while Rust code gets an exhaustive tagged union.
//! [`ServerMessageKind`]/[`ClientMessageKind`] are the field-less tag enums
//! used for handler registration, correlation keys, and log labels.
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use crate::error::DecodeError;
use crate::types::{
    CardId, CardInfo, CombatantState, EffectKind, MapId, MapInfo, MapPosition, PlayerId,
    PlayerMapInfo, TilemapData,
};

/// Requests initiated by this client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "MessageType")]
#[strum_discriminants(name(ClientMessageKind), derive(Hash, strum::Display, strum::EnumString))]
pub enum ClientMessage {
    PlayerIdRequest,
    MapListRequest,
    #[serde(rename_all = "PascalCase")]
    JoinMapRequest { map_id: MapId },
    LeaveMapRequest,
    #[serde(rename_all = "PascalCase")]
    PlayerMoveRequest { new_position: MapPosition },
    #[serde(rename_all = "PascalCase")]
    FightChallengeRequest { target_id: PlayerId },
    #[serde(rename_all = "PascalCase")]
    FightChallengeAccepted { target_id: PlayerId },
    #[serde(rename_all = "PascalCase")]
    PlayCardRequest { card_id: CardId },
    EndTurnRequest,
}

impl ClientMessage {
    /// Serializes into the flat `MessageType`-tagged wire form.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> ClientMessageKind {
        ClientMessageKind::from(self)
    }

    /// Default server reply to correlate against when blocking on this
    /// request.
    ///
    /// This is the typed rendition of the "request name + `Response` suffix"
    /// convention, with overrides where the server answers with a
    /// differently-named completion notification. Callers of
    /// `send_and_wait` can always pass an explicit kind instead.
    pub fn expected_response(&self) -> ServerMessageKind {
        match self.kind() {
            ClientMessageKind::PlayerIdRequest => ServerMessageKind::PlayerIdResponse,
            ClientMessageKind::MapListRequest => ServerMessageKind::MapListResponse,
            ClientMessageKind::JoinMapRequest => ServerMessageKind::JoinMapCompleted,
            ClientMessageKind::LeaveMapRequest => ServerMessageKind::LeaveMapCompleted,
            ClientMessageKind::PlayerMoveRequest => ServerMessageKind::MoveCompleted,
            ClientMessageKind::FightChallengeRequest => ServerMessageKind::FightStarted,
            ClientMessageKind::FightChallengeAccepted => ServerMessageKind::FightStarted,
            ClientMessageKind::PlayCardRequest => ServerMessageKind::CardPlayCompleted,
            ClientMessageKind::EndTurnRequest => ServerMessageKind::TurnEnded,
        }
    }
}

/// Notifications and responses pushed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "MessageType")]
#[strum_discriminants(name(ServerMessageKind), derive(Hash, strum::Display, strum::EnumString))]
pub enum ServerMessage {
    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------
    #[serde(rename_all = "PascalCase")]
    PlayerIdResponse { player_id: PlayerId },

    // ------------------------------------------------------------------
    // Map membership
    // ------------------------------------------------------------------
    #[serde(rename_all = "PascalCase")]
    MapListResponse {
        #[serde(default)]
        maps: Vec<MapInfo>,
    },
    #[serde(rename_all = "PascalCase")]
    JoinMapInitiated { map_id: MapId },
    #[serde(rename_all = "PascalCase")]
    JoinMapCompleted {
        map_id: MapId,
        #[serde(default)]
        player_id: PlayerId,
        #[serde(default)]
        position: MapPosition,
        #[serde(default)]
        tilemap_data: TilemapData,
        #[serde(default)]
        player_info: BTreeMap<PlayerId, PlayerMapInfo>,
    },
    #[serde(rename_all = "PascalCase")]
    JoinMapFailed {
        #[serde(default)]
        error: String,
    },
    LeaveMapInitiated,
    LeaveMapCompleted,
    #[serde(rename_all = "PascalCase")]
    LeaveMapFailed {
        #[serde(default)]
        error: String,
    },
    #[serde(rename_all = "PascalCase")]
    PlayerJoinedMap {
        player_id: PlayerId,
        #[serde(default)]
        position: MapPosition,
    },
    #[serde(rename_all = "PascalCase")]
    PlayerLeftMap { player_id: PlayerId },
    /// An absent position signals the player departed rather than moved.
    #[serde(rename_all = "PascalCase")]
    PlayerPositionChange {
        player_id: PlayerId,
        #[serde(default)]
        position: Option<MapPosition>,
    },

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------
    #[serde(rename_all = "PascalCase")]
    MoveInitiated { new_position: MapPosition },
    #[serde(rename_all = "PascalCase")]
    MoveCompleted { new_position: MapPosition },
    #[serde(rename_all = "PascalCase")]
    MoveFailed {
        #[serde(default)]
        error: String,
    },

    // ------------------------------------------------------------------
    // Fight lifecycle
    // ------------------------------------------------------------------
    #[serde(rename_all = "PascalCase")]
    FightChallengeReceived { challenger_id: PlayerId },
    #[serde(rename_all = "PascalCase")]
    FightStarted {
        player1_id: PlayerId,
        player2_id: PlayerId,
    },
    #[serde(rename_all = "PascalCase")]
    FightEnded {
        winner_id: PlayerId,
        loser_id: PlayerId,
        #[serde(default)]
        reason: String,
    },

    // ------------------------------------------------------------------
    // Card battle
    // ------------------------------------------------------------------
    #[serde(rename_all = "PascalCase")]
    CardImages {
        #[serde(default)]
        card_svg_data: BTreeMap<CardId, String>,
    },
    #[serde(rename_all = "PascalCase")]
    CardDrawn {
        #[serde(default)]
        card_info: CardInfo,
        #[serde(default)]
        svg_data: String,
    },
    #[serde(rename_all = "PascalCase")]
    TurnStarted { active_player_id: PlayerId },
    #[serde(rename_all = "PascalCase")]
    TurnEnded { player_id: PlayerId },
    #[serde(rename_all = "PascalCase")]
    CardPlayInitiated {
        #[serde(default)]
        card_id: CardId,
    },
    #[serde(rename_all = "PascalCase")]
    CardPlayCompleted {
        player_id: PlayerId,
        played_card: CardInfo,
        #[serde(default)]
        effect: String,
        #[serde(default = "default_true")]
        is_visible: bool,
    },
    #[serde(rename_all = "PascalCase")]
    CardPlayFailed {
        #[serde(default)]
        error: String,
    },
    #[serde(rename_all = "PascalCase")]
    EffectApplied {
        target_player_id: PlayerId,
        #[serde(default)]
        effect_type: EffectKind,
        #[serde(default)]
        value: u32,
        #[serde(default)]
        source: String,
    },
    /// Authoritative full resync of both combatants; overwrites, never merges.
    #[serde(rename_all = "PascalCase")]
    FightStateUpdate {
        current_turn_player_id: PlayerId,
        player_state: CombatantState,
        opponent_state: CombatantState,
    },
}

impl ServerMessage {
    /// Decodes one wire frame.
    ///
    /// Distinguishes an out-of-vocabulary `MessageType` (report and skip)
    /// from a known type with a payload we cannot interpret.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(DecodeError::InvalidJson)?;
        let tag = value
            .get("MessageType")
            .and_then(serde_json::Value::as_str)
            .ok_or(DecodeError::MissingType)?;
        if ServerMessageKind::from_str(tag).is_err() {
            return Err(DecodeError::UnknownType {
                message_type: tag.to_string(),
            });
        }
        let message_type = tag.to_string();
        serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
            message_type,
            source,
        })
    }

    /// Serializes into the flat `MessageType`-tagged wire form.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> ServerMessageKind {
        ServerMessageKind::from(self)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_message_type_tag() {
        let encoded = ClientMessage::JoinMapRequest {
            map_id: MapId::from("map1"),
        }
        .encode()
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["MessageType"], "JoinMapRequest");
        assert_eq!(value["MapId"], "map1");
    }

    #[test]
    fn decodes_position_change_with_absent_position() {
        let msg = ServerMessage::decode(
            r#"{"MessageType":"PlayerPositionChange","PlayerId":"p7"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::PlayerPositionChange {
                player_id: PlayerId::from("p7"),
                position: None,
            }
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let msg = ServerMessage::decode(
            r#"{"MessageType":"TurnStarted","ActivePlayerId":"p1","RoundNumber":3}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::TurnStarted {
                active_player_id: PlayerId::from("p1"),
            }
        );
    }

    #[test]
    fn unknown_type_is_reported_not_conflated() {
        let err = ServerMessage::decode(r#"{"MessageType":"SeasonRewardGranted"}"#).unwrap_err();
        assert!(err.is_unknown_type());

        // A known type with a broken payload is a different failure.
        let err = ServerMessage::decode(
            r#"{"MessageType":"TurnStarted","ActivePlayerId":{"nested":true}}"#,
        )
        .unwrap_err();
        assert!(!err.is_unknown_type());
    }

    #[test]
    fn missing_fight_id_means_not_fighting() {
        let msg = ServerMessage::decode(
            r#"{"MessageType":"JoinMapCompleted","MapId":"m","PlayerId":"me",
                "Position":{"X":1,"Y":2},
                "TilemapData":{"Width":2,"Height":2,"TileData":[0,0,0,0]},
                "PlayerInfo":{"other":{"Position":{"X":3,"Y":4}}}}"#,
        )
        .unwrap();
        let ServerMessage::JoinMapCompleted { player_info, .. } = msg else {
            panic!("wrong variant");
        };
        assert_eq!(player_info[&PlayerId::from("other")].fight_id, None);
    }

    #[test]
    fn default_response_pairing() {
        assert_eq!(
            ClientMessage::PlayerIdRequest.expected_response(),
            ServerMessageKind::PlayerIdResponse
        );
        assert_eq!(
            ClientMessage::JoinMapRequest {
                map_id: MapId::from("m")
            }
            .expected_response(),
            ServerMessageKind::JoinMapCompleted
        );
        assert_eq!(
            ClientMessage::EndTurnRequest.expected_response(),
            ServerMessageKind::TurnEnded
        );
    }

    #[test]
    fn server_message_round_trips() {
        let msg = ServerMessage::EffectApplied {
            target_player_id: PlayerId::from("p1"),
            effect_type: EffectKind::Damage,
            value: 7,
            source: "atk_3".to_string(),
        };
        let decoded = ServerMessage::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }
}
