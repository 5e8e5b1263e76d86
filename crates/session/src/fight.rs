//! Fight-scoped state: one [`FightState`] lives from `FightStarted` to
//! `FightEnded`.
use protocol::{CardInfo, CombatantState, FightId, PlayerId, StatusEffectInfo};

use crate::rules::BattleRules;

/// One side's fight-relevant stats and hand.
///
/// Both combatants use the same shape; for the opponent the server only
/// populates `hand` when cards are explicitly revealed, so its length is the
/// only reliable signal there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatantView {
    pub hit_points: u32,
    pub action_points: u32,
    pub deck_count: u32,
    pub discard_count: u32,
    pub hand: Vec<CardInfo>,
    pub status_effects: Vec<StatusEffectInfo>,
}

impl CombatantView {
    /// Fresh combatant at full health, before any server snapshot arrives.
    pub fn fresh() -> Self {
        Self {
            hit_points: BattleRules::MAX_HIT_POINTS,
            action_points: 0,
            deck_count: 0,
            discard_count: 0,
            hand: Vec::new(),
            status_effects: Vec::new(),
        }
    }

    /// Applies damage, clamped at zero.
    pub fn apply_damage(&mut self, value: u32) {
        self.hit_points = self.hit_points.saturating_sub(value);
    }

    /// Applies healing, clamped at the hit-point ceiling.
    pub fn apply_heal(&mut self, value: u32) {
        self.hit_points = (self.hit_points + value).min(BattleRules::MAX_HIT_POINTS);
    }

    /// Moves the whole hand to the discard pile (turn end).
    pub fn discard_hand(&mut self) {
        self.discard_count += self.hand.len() as u32;
        self.hand.clear();
    }

    /// Removes exactly one hand entry with the given id, by first
    /// occurrence. Duplicate card ids in hand must lose only one copy.
    pub fn remove_card(&mut self, id: &protocol::CardId) -> Option<CardInfo> {
        let index = self.hand.iter().position(|card| &card.id == id)?;
        Some(self.hand.remove(index))
    }

    /// Overwrites this view from an authoritative resync snapshot.
    ///
    /// This is a full replacement, not a merge: individual deltas are not
    /// reconciled against hand contents, so the periodic snapshot is the
    /// drift corrector. Hand entries without an id are dropped; the rest of
    /// the snapshot still applies.
    pub fn absorb(&mut self, snapshot: &CombatantState) {
        self.hit_points = snapshot
            .hit_points
            .min(BattleRules::MAX_HIT_POINTS);
        self.action_points = snapshot.action_points;
        self.deck_count = snapshot.deck_count;
        self.discard_count = snapshot.discard_pile_count;
        self.hand = snapshot
            .hand
            .iter()
            .filter(|card| !card.id.is_empty())
            .cloned()
            .collect();
        self.status_effects = snapshot.status_effects.clone();
    }
}

impl Default for CombatantView {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Card-battle sub-state for the fight this session is currently in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FightState {
    pub fight_id: FightId,
    pub opponent_id: PlayerId,
    /// None until the first turn notification arrives.
    pub current_turn: Option<PlayerId>,
    pub player_view: CombatantView,
    pub opponent_view: CombatantView,
    /// Most recent card played by either side; survives turn boundaries
    /// until overwritten.
    pub last_played_card: Option<CardInfo>,
}

impl FightState {
    pub fn new(fight_id: FightId, opponent_id: PlayerId) -> Self {
        Self {
            fight_id,
            opponent_id,
            current_turn: None,
            player_view: CombatantView::fresh(),
            opponent_view: CombatantView::fresh(),
            last_played_card: None,
        }
    }
}

/// Result of the most recently finished fight this session took part in.
///
/// Recorded by the reducer on `FightEnded` and consumed by the reward
/// shaper's terminal component; cleared when the next fight starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FightOutcome {
    pub fight_id: FightId,
    pub winner: PlayerId,
    pub loser: PlayerId,
}
