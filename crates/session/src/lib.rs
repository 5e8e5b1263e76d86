//! Client-side mirror of server-authoritative game state.
//!
//! One [`PlayerSession`] per connected agent. The transport feeds decoded
//! messages into [`PlayerSession::apply`] strictly in arrival order; the
//! reducer applies a deterministic partial update per message and never
//! performs I/O, blocks, or returns a value. Everything else in the crate is
//! plain data and queries over it.
//!
//! The session tolerates missing deltas (the periodic `FightStateUpdate`
//! resync is authoritative) and re-entrant fight starts, but assumes
//! in-order, at-most-once delivery per connection.
pub mod fight;
pub mod reducer;
pub mod rules;
pub mod state;

pub use fight::{CombatantView, FightOutcome, FightState};
pub use rules::BattleRules;
pub use state::{PlayerSession, RosterEntry};
