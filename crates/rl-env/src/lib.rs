//! RL-facing projection of a [`session::PlayerSession`].
//!
//! Pure functions only: observations, legality masks over the fixed
//! discrete action space, and shaped rewards are all derived from session
//! snapshots without touching the transport. The policy network itself is
//! an external collaborator; this crate defines everything it consumes.
pub mod action;
pub mod encoding;
pub mod observation;
pub mod reward;

pub use action::{ACTION_SPACE, ActionMask, AgentAction, CARD_SLOTS, PASS_SLOT, decode_action};
pub use encoding::CardKind;
pub use observation::{BattleObservation, CombatantStats, MapObservation, Observation, RosterSlot};
pub use reward::{RewardConfig, RewardShaper};
