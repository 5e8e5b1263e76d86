//! Shaped reward signal between consecutive snapshots.
//!
//! Additive components:
//! - terminal ±1.0 on fight end, by recorded outcome;
//! - dense hit-point deltas while the same fight continues (multiple
//!   effects within one step net out, since only the delta is read);
//! - an optional efficiency bonus and an optional end-turn penalty, both
//!   independently toggleable because the reference applied them
//!   inconsistently.
use session::PlayerSession;

use crate::action::AgentAction;
use crate::observation::Observation;

pub const TERMINAL_REWARD: f32 = 1.0;
pub const DAMAGE_WEIGHT: f32 = 0.1;
pub const HEAL_WEIGHT: f32 = 0.05;
pub const EFFICIENCY_WEIGHT: f32 = 0.05;
pub const END_TURN_PENALTY: f32 = 0.05;

/// Toggles for the optional reward components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardConfig {
    /// Scale reward by damage-per-cost when a card play is identifiable.
    /// Off by default: it changes the reward scale and only one reference
    /// path used it.
    pub efficiency_bonus: bool,
    /// Charge a small penalty for ending the turn instead of playing a
    /// card, discouraging pass-only policies. On by default.
    pub end_turn_penalty: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            efficiency_bonus: false,
            end_turn_penalty: true,
        }
    }
}

/// Pure reward computation over (previous snapshot, current session).
#[derive(Clone, Copy, Debug, Default)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    /// State-diff reward. Returns 0.0 when the previous snapshot was not a
    /// battle: map-mode transitions carry no shaping signal.
    pub fn shape(&self, prev: &Observation, session: &PlayerSession) -> f32 {
        let Observation::Battle(prev) = prev else {
            return 0.0;
        };

        match &session.fight {
            // Fight over: terminal credit from the recorded outcome, never
            // both signs, never neither.
            None => match session.won_last_fight() {
                Some(true) => TERMINAL_REWARD,
                Some(false) => -TERMINAL_REWARD,
                None => 0.0,
            },
            Some(fight) if fight.fight_id == prev.fight_id => {
                let dealt =
                    prev.opponent.hit_points.saturating_sub(fight.opponent_view.hit_points) as f32;
                let taken =
                    prev.player.hit_points.saturating_sub(fight.player_view.hit_points) as f32;
                let healed =
                    fight.player_view.hit_points.saturating_sub(prev.player.hit_points) as f32;

                let mut reward = DAMAGE_WEIGHT * dealt - DAMAGE_WEIGHT * taken + HEAL_WEIGHT * healed;

                if self.config.efficiency_bonus
                    && fight.player_view.action_points < prev.player.action_points
                    && dealt > 0.0
                    && let Some(card) = &fight.last_played_card
                    && card.cost > 0
                {
                    reward += EFFICIENCY_WEIGHT * dealt / card.cost as f32;
                }
                reward
            }
            // A different fight already started; the old one's signal is
            // gone.
            Some(_) => 0.0,
        }
    }

    /// Selection-time penalty component, kept out of [`Self::shape`] so the
    /// snapshot diff stays a pure function of two states.
    pub fn action_penalty(&self, action: &AgentAction) -> f32 {
        if self.config.end_turn_penalty && matches!(action, AgentAction::EndTurn) {
            -END_TURN_PENALTY
        } else {
            0.0
        }
    }
}
