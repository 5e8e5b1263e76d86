//! Value records embedded in wire messages.
//!
//! These mirror the server's DTO shapes exactly: flat keyed records with
//! PascalCase field names. Identifier newtypes keep the different id spaces
//! (players, maps, cards, fights) from being mixed up in the state mirror.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque server-assigned player identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier for a joinable map.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Card identifier.
///
/// Note: this names a card *type*, not an instance. A hand may legally hold
/// several entries with the same id. Removal-by-identity therefore means
/// removing exactly one matching entry, never all of them.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier for one fight between two players.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FightId(pub String);

impl FightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the fight identifier for a participant pair.
    ///
    /// The wire announces fights by participants only; both ends derive the
    /// same id from the pair in server order.
    pub fn between(player1: &PlayerId, player2: &PlayerId) -> Self {
        Self(format!("fight_{}_{}", player1, player2))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete tile coordinate on a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapPosition {
    pub x: i32,
    pub y: i32,
}

impl MapPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for MapPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Immutable grid data for one map, replaced wholesale on map join.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TilemapData {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tile_data: Vec<i32>,
}

impl TilemapData {
    /// Tile code at (x, y), row-major. None outside the grid.
    pub fn tile(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tile_data.get((y * self.width + x) as usize).copied()
    }
}

/// Map catalogue entry from `MapListResponse`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapInfo {
    #[serde(default)]
    pub id: MapId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub player_count: u32,
}

/// Per-player record embedded in map join payloads.
///
/// An absent `FightId` means the player is not in a fight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerMapInfo {
    #[serde(default)]
    pub position: MapPosition,
    #[serde(default)]
    pub fight_id: Option<FightId>,
}

/// A single card as the server describes it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CardInfo {
    #[serde(default)]
    pub id: CardId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: u32,
}

/// An active status effect on one combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusEffectInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default, rename = "Type")]
    pub effect_type: String,
    #[serde(default)]
    pub magnitude: i32,
}

/// Effect discriminator carried by `EffectApplied`.
///
/// Anything outside the known set folds into [`EffectKind::Other`] and is
/// treated as a no-op by consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum EffectKind {
    Damage,
    Heal,
    #[default]
    Other,
}

impl From<String> for EffectKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Damage" => EffectKind::Damage,
            "Heal" => EffectKind::Heal,
            _ => EffectKind::Other,
        }
    }
}

/// One side's complete fight snapshot (the wire's `PlayerFightState` DTO).
///
/// Carried in pairs by `FightStateUpdate`; the `player_id` tag, not the
/// positional slot, says whose snapshot it is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CombatantState {
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default = "full_health")]
    pub hit_points: u32,
    #[serde(default)]
    pub action_points: u32,
    #[serde(default)]
    pub hand: Vec<CardInfo>,
    #[serde(default)]
    pub deck_count: u32,
    #[serde(default)]
    pub discard_pile_count: u32,
    #[serde(default)]
    pub status_effects: Vec<StatusEffectInfo>,
}

impl Default for CombatantState {
    fn default() -> Self {
        Self {
            player_id: PlayerId::default(),
            hit_points: full_health(),
            action_points: 0,
            hand: Vec::new(),
            deck_count: 0,
            discard_pile_count: 0,
            status_effects: Vec::new(),
        }
    }
}

/// A missing hit-point field reads as unhurt, not dead.
fn full_health() -> u32 {
    50
}
