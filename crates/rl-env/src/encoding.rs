//! Fixed-width numeric encoding of observations.
//!
//! The layout and normalization constants are load-bearing: checkpoints and
//! replay buffers are only comparable across runs if every feature keeps
//! its index and scale. Change nothing here without versioning trained
//! models.
//!
//! Normalization policy: hit points ÷ 50, action points ÷ 15, deck and
//! discard counts ÷ 30, slot counts ÷ capacity, all clamped to `[0, 1]`.
//! The action-point ceiling is an unvalidated domain assumption; the clamp
//! is what keeps an over-ceiling value from leaking >1.0 into the policy.
use protocol::{CardId, CardInfo, StatusEffectInfo};
use session::BattleRules;

use crate::observation::{BattleObservation, MapObservation, Observation};

/// Closed 4-way card taxonomy derived from the id prefix.
///
/// Unrecognized prefixes land in [`CardKind::Unknown`] rather than erroring;
/// the taxonomy is not extensible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Attack,
    Defense,
    Special,
    Utility,
    Unknown,
}

impl CardKind {
    pub fn of(id: &CardId) -> Self {
        let id = id.as_str();
        if id.starts_with("atk") {
            CardKind::Attack
        } else if id.starts_with("def") {
            CardKind::Defense
        } else if id.starts_with("spc") {
            CardKind::Special
        } else if id.starts_with("utl") {
            CardKind::Utility
        } else {
            CardKind::Unknown
        }
    }

    /// Index into the one-hot kind block.
    fn one_hot_index(self) -> usize {
        match self {
            CardKind::Attack => 0,
            CardKind::Defense => 1,
            CardKind::Special => 2,
            CardKind::Utility => 3,
            CardKind::Unknown => 4,
        }
    }
}

/// Features per encoded card slot: 5-way kind one-hot + normalized cost.
pub const CARD_FEATURES: usize = 6;
/// Features per encoded status-effect slot: kind code, magnitude, duration.
pub const EFFECT_FEATURES: usize = 3;
/// Roster slots encoded in map mode.
pub const MAP_ROSTER_SLOTS: usize = 10;

/// Flattened length of a map-mode observation.
pub const MAP_FEATURES: usize = 2 + MAP_ROSTER_SLOTS * 3;

/// Flattened length of a battle-mode observation:
/// turn flag, 4 stats per side, both hand-size counts, 10 own-hand card
/// slots, 10 status-effect slots per side, last played card.
pub const BATTLE_FEATURES: usize = 1
    + 4 * 2
    + 2
    + BattleRules::MAX_HAND_SIZE * CARD_FEATURES
    + BattleRules::MAX_STATUS_EFFECTS * EFFECT_FEATURES * 2
    + CARD_FEATURES;

pub fn normalize_hit_points(hp: u32) -> f32 {
    normalize(hp as f32, BattleRules::MAX_HIT_POINTS as f32)
}

pub fn normalize_action_points(ap: u32) -> f32 {
    normalize(ap as f32, BattleRules::MAX_ACTION_POINTS as f32)
}

pub fn normalize_count(count: u32) -> f32 {
    normalize(count as f32, BattleRules::MAX_DECK_COUNT as f32)
}

pub fn normalize_slot_count(count: usize, capacity: usize) -> f32 {
    normalize(count as f32, capacity as f32)
}

fn normalize(value: f32, ceiling: f32) -> f32 {
    (value / ceiling).clamp(0.0, 1.0)
}

impl Observation {
    /// Flattens into the fixed-width vector for this mode.
    ///
    /// Map mode yields [`MAP_FEATURES`] values, battle mode
    /// [`BATTLE_FEATURES`]; slots beyond the actual counts are zero-padded.
    pub fn features(&self) -> Vec<f32> {
        match self {
            Observation::Map(map) => encode_map(map),
            Observation::Battle(battle) => encode_battle(battle),
        }
    }
}

fn encode_map(map: &MapObservation) -> Vec<f32> {
    let mut features = Vec::with_capacity(MAP_FEATURES);
    let own = map.position.unwrap_or_default();
    features.push(own.x as f32);
    features.push(own.y as f32);

    for slot in map.roster.iter().take(MAP_ROSTER_SLOTS) {
        features.push(slot.position.x as f32);
        features.push(slot.position.y as f32);
        features.push(if slot.in_fight { 1.0 } else { 0.0 });
    }
    features.resize(MAP_FEATURES, 0.0);
    features
}

fn encode_battle(battle: &BattleObservation) -> Vec<f32> {
    let mut features = Vec::with_capacity(BATTLE_FEATURES);
    features.push(if battle.is_own_turn { 1.0 } else { 0.0 });

    for stats in [&battle.player, &battle.opponent] {
        features.push(normalize_hit_points(stats.hit_points));
        features.push(normalize_action_points(stats.action_points));
        features.push(normalize_count(stats.deck_count));
        features.push(normalize_count(stats.discard_count));
    }
    features.push(normalize_slot_count(
        battle.hand.len(),
        BattleRules::MAX_HAND_SIZE,
    ));
    features.push(normalize_slot_count(
        battle.opponent_hand_count,
        BattleRules::MAX_HAND_SIZE,
    ));

    for slot in 0..BattleRules::MAX_HAND_SIZE {
        encode_card(battle.hand.get(slot), &mut features);
    }
    for effects in [&battle.player_effects, &battle.opponent_effects] {
        for slot in 0..BattleRules::MAX_STATUS_EFFECTS {
            encode_effect(effects.get(slot), &mut features);
        }
    }
    encode_card(battle.last_played_card.as_ref(), &mut features);

    debug_assert_eq!(features.len(), BATTLE_FEATURES);
    features
}

fn encode_card(card: Option<&CardInfo>, features: &mut Vec<f32>) {
    let mut block = [0.0f32; CARD_FEATURES];
    if let Some(card) = card {
        block[CardKind::of(&card.id).one_hot_index()] = 1.0;
        block[CARD_FEATURES - 1] = normalize_action_points(card.cost);
    }
    features.extend_from_slice(&block);
}

fn encode_effect(effect: Option<&StatusEffectInfo>, features: &mut Vec<f32>) {
    let mut block = [0.0f32; EFFECT_FEATURES];
    if let Some(effect) = effect {
        block[0] = effect_code(effect);
        block[1] = effect.magnitude as f32 / 10.0;
        block[2] = effect.duration as f32 / 5.0;
    }
    features.extend_from_slice(&block);
}

/// Coarse status-effect category from its type string.
fn effect_code(effect: &StatusEffectInfo) -> f32 {
    let kind = effect.effect_type.to_lowercase();
    if kind.contains("damage") {
        1.0
    } else if kind.contains("heal") {
        2.0
    } else if kind.contains("shield") {
        3.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::CombatantStats;
    use protocol::FightId;

    fn card(id: &str, cost: u32) -> CardInfo {
        CardInfo {
            id: CardId::from(id),
            name: id.to_string(),
            description: String::new(),
            cost,
        }
    }

    fn empty_battle() -> BattleObservation {
        BattleObservation {
            fight_id: FightId::new("fight_p1_p2"),
            is_own_turn: true,
            player: CombatantStats {
                hit_points: 50,
                action_points: 3,
                deck_count: 15,
                discard_count: 0,
            },
            opponent: CombatantStats::default(),
            hand: Vec::new(),
            opponent_hand_count: 0,
            player_effects: Vec::new(),
            opponent_effects: Vec::new(),
            last_played_card: None,
        }
    }

    #[test]
    fn card_kind_taxonomy_is_closed() {
        assert_eq!(CardKind::of(&CardId::from("atk_3")), CardKind::Attack);
        assert_eq!(CardKind::of(&CardId::from("def_1")), CardKind::Defense);
        assert_eq!(CardKind::of(&CardId::from("spc_2")), CardKind::Special);
        assert_eq!(CardKind::of(&CardId::from("utl_4")), CardKind::Utility);
        assert_eq!(CardKind::of(&CardId::from("mystery")), CardKind::Unknown);
    }

    #[test]
    fn normalization_clamps_above_ceiling() {
        assert_eq!(normalize_action_points(15), 1.0);
        assert_eq!(normalize_action_points(22), 1.0);
        assert_eq!(normalize_hit_points(50), 1.0);
        assert_eq!(normalize_count(45), 1.0);
        assert!((normalize_action_points(3) - 0.2).abs() < f32::EPSILON);
    }

    fn features_len(battle: &BattleObservation) -> usize {
        Observation::Battle(battle.clone()).features().len()
    }

    #[test]
    fn battle_features_have_fixed_width() {
        let mut battle = empty_battle();
        assert_eq!(features_len(&battle), BATTLE_FEATURES);

        battle.hand = vec![card("atk_1", 2); 3];
        battle.opponent_hand_count = 4;
        battle.last_played_card = Some(card("spc_1", 5));
        assert_eq!(features_len(&battle), BATTLE_FEATURES);
    }

    #[test]
    fn map_features_are_zero_padded() {
        let obs = Observation::Map(MapObservation::default());
        let features = obs.features();
        assert_eq!(features.len(), MAP_FEATURES);
        assert!(features.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn hand_slot_encodes_kind_and_cost() {
        let mut battle = empty_battle();
        battle.hand = vec![card("def_1", 3)];
        let features = Observation::Battle(battle).features();

        // First hand slot starts after turn flag, 8 stats, 2 counts.
        let base = 11;
        assert_eq!(features[base], 0.0); // not attack
        assert_eq!(features[base + 1], 1.0); // defense
        assert!((features[base + 5] - 0.2).abs() < f32::EPSILON); // 3 / 15
    }
}
