//! Structured snapshots of session state, one of two modes.
//!
//! The projection keeps raw values; flattening and normalization live in
//! [`crate::encoding`]. The reward shaper diffs consecutive snapshots, so
//! hit points and action points are preserved un-normalized here.
use protocol::{CardInfo, FightId, MapPosition, PlayerId, StatusEffectInfo};
use session::PlayerSession;

/// One roster member as seen in map mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterSlot {
    pub player_id: PlayerId,
    pub position: MapPosition,
    pub in_fight: bool,
}

/// Observation while not in a fight: who is around and where.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapObservation {
    pub player_id: Option<PlayerId>,
    pub position: Option<MapPosition>,
    pub roster: Vec<RosterSlot>,
}

/// One combatant's numeric stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatantStats {
    pub hit_points: u32,
    pub action_points: u32,
    pub deck_count: u32,
    pub discard_count: u32,
}

/// Observation while fighting.
///
/// Own hand carries full card detail; the opponent's hand is exposed as a
/// count only (the server reveals no more than that).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleObservation {
    pub fight_id: FightId,
    pub is_own_turn: bool,
    pub player: CombatantStats,
    pub opponent: CombatantStats,
    pub hand: Vec<CardInfo>,
    pub opponent_hand_count: usize,
    pub player_effects: Vec<StatusEffectInfo>,
    pub opponent_effects: Vec<StatusEffectInfo>,
    pub last_played_card: Option<CardInfo>,
}

/// Two-moded observation; total over every reachable session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    Map(MapObservation),
    Battle(BattleObservation),
}

impl Observation {
    /// Projects the current session state. Pure and deterministic; "not in
    /// a fight" produces the smaller map-centric shape rather than erroring.
    pub fn project(session: &PlayerSession) -> Self {
        match &session.fight {
            None => Observation::Map(MapObservation {
                player_id: session.player_id.clone(),
                position: session.position,
                roster: session
                    .roster
                    .iter()
                    .map(|(id, entry)| RosterSlot {
                        player_id: id.clone(),
                        position: entry.position,
                        in_fight: entry.is_in_fight(),
                    })
                    .collect(),
            }),
            Some(fight) => Observation::Battle(BattleObservation {
                fight_id: fight.fight_id.clone(),
                is_own_turn: session.is_own_turn(),
                player: CombatantStats {
                    hit_points: fight.player_view.hit_points,
                    action_points: fight.player_view.action_points,
                    deck_count: fight.player_view.deck_count,
                    discard_count: fight.player_view.discard_count,
                },
                opponent: CombatantStats {
                    hit_points: fight.opponent_view.hit_points,
                    action_points: fight.opponent_view.action_points,
                    deck_count: fight.opponent_view.deck_count,
                    discard_count: fight.opponent_view.discard_count,
                },
                hand: fight.player_view.hand.clone(),
                opponent_hand_count: fight.opponent_view.hand.len(),
                player_effects: fight.player_view.status_effects.clone(),
                opponent_effects: fight.opponent_view.status_effects.clone(),
                last_played_card: fight.last_played_card.clone(),
            }),
        }
    }

    pub fn is_in_fight(&self) -> bool {
        matches!(self, Observation::Battle(_))
    }
}
