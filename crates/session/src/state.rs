//! The per-connection state aggregate.
use std::collections::BTreeMap;

use protocol::{CardId, FightId, MapId, MapPosition, PlayerId, TilemapData};

use crate::fight::{FightOutcome, FightState};

/// What this session knows about one other player on the same map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterEntry {
    pub position: MapPosition,
    /// Set while the player is in a fight; doubles as the availability
    /// marker for challenges.
    pub fight_id: Option<FightId>,
}

impl RosterEntry {
    pub fn at(position: MapPosition) -> Self {
        Self {
            position,
            fight_id: None,
        }
    }

    pub fn is_in_fight(&self) -> bool {
        self.fight_id.is_some()
    }
}

/// One connected player's local mirror of the server's world.
///
/// Single-writer: only the message-delivery path mutates this, one message
/// at a time, in arrival order. Queries are cheap and may run between any
/// two `apply` calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerSession {
    /// Assigned by the server on connect; survives `reset()`.
    pub player_id: Option<PlayerId>,
    /// Own tile position; None while not on a map.
    pub position: Option<MapPosition>,
    pub current_map_id: Option<MapId>,
    /// Grid data for the current map, replaced wholesale on join.
    pub tilemap: Option<TilemapData>,
    /// Other players on the current map. Never contains this session's own
    /// id. BTreeMap keeps challenge-target ordering deterministic.
    pub roster: BTreeMap<PlayerId, RosterEntry>,
    /// Target of an in-flight move request; exposes "is moving" status only
    /// and never blocks reducer updates.
    pub pending_move: Option<MapPosition>,
    /// Present iff this session is a combatant in exactly one fight.
    pub fight: Option<FightState>,
    /// Card rendering payloads, merged append-only across the whole
    /// connection; fight boundaries do not clear it.
    pub card_art: BTreeMap<CardId, String>,
    /// Outcome of the most recently finished fight this session fought in.
    pub last_outcome: Option<FightOutcome>,
}

impl PlayerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_fight(&self) -> bool {
        self.fight.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.pending_move.is_some()
    }

    /// True when a fight is active and the turn belongs to this session.
    pub fn is_own_turn(&self) -> bool {
        match (&self.fight, &self.player_id) {
            (Some(fight), Some(me)) => fight.current_turn.as_ref() == Some(me),
            _ => false,
        }
    }

    /// True when `player_id` names this session itself.
    pub fn is_self(&self, player_id: &PlayerId) -> bool {
        self.player_id.as_ref() == Some(player_id)
    }

    /// Roster members not currently in a fight, in deterministic order.
    pub fn available_opponents(&self) -> impl Iterator<Item = &PlayerId> {
        self.roster
            .iter()
            .filter(|(_, entry)| !entry.is_in_fight())
            .map(|(id, _)| id)
    }

    /// Whether the recorded outcome of the last fight says this session won.
    ///
    /// None when no outcome is recorded or the session's own id is unknown.
    pub fn won_last_fight(&self) -> Option<bool> {
        let outcome = self.last_outcome.as_ref()?;
        let me = self.player_id.as_ref()?;
        Some(&outcome.winner == me)
    }

    /// Forces the aggregate back to initial values, keeping only the
    /// server-assigned player id. Used between training episodes.
    ///
    /// Reconstructing wholesale (rather than clearing field by field) makes
    /// it impossible to forget a field.
    pub fn reset(&mut self) {
        let player_id = self.player_id.take();
        *self = Self {
            player_id,
            ..Self::default()
        };
    }
}
