//! The message reducer: one deterministic partial update per server message.
//!
//! Each message type updates exactly the fields it semantically owns.
//! Messages scoped to a fight are skipped while no fight is active; the
//! periodic `FightStateUpdate` resync corrects any drift from deltas that
//! raced a fight boundary.
use protocol::{EffectKind, FightId, ServerMessage};

use crate::fight::{FightOutcome, FightState};
use crate::rules::BattleRules;
use crate::state::{PlayerSession, RosterEntry};

impl PlayerSession {
    /// Consumes one inbound message. Total over the vocabulary: every known
    /// message either updates state or is deliberately a no-op. Never
    /// returns a value, performs I/O, or blocks.
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            // ----------------------------------------------------------
            // Connection
            // ----------------------------------------------------------
            ServerMessage::PlayerIdResponse { player_id } => {
                // First assignment in practice; re-assignment is tolerated.
                self.player_id = Some(player_id.clone());
            }

            // ----------------------------------------------------------
            // Map membership
            // ----------------------------------------------------------
            ServerMessage::JoinMapInitiated { map_id } => {
                self.current_map_id = Some(map_id.clone());
            }
            ServerMessage::JoinMapCompleted {
                map_id,
                position,
                tilemap_data,
                player_info,
                ..
            } => {
                self.current_map_id = Some(map_id.clone());
                self.tilemap = Some(tilemap_data.clone());
                self.position = Some(*position);
                // Wholesale roster replacement; the local player never
                // appears in its own roster.
                let roster = player_info
                    .iter()
                    .filter(|(id, _)| !self.is_self(id))
                    .map(|(id, info)| {
                        (
                            id.clone(),
                            RosterEntry {
                                position: info.position,
                                fight_id: info.fight_id.clone(),
                            },
                        )
                    })
                    .collect();
                self.roster = roster;
            }
            ServerMessage::LeaveMapCompleted => {
                self.current_map_id = None;
                self.tilemap = None;
                self.position = None;
                self.roster.clear();
            }
            ServerMessage::PlayerJoinedMap {
                player_id,
                position,
            } => {
                if !self.is_self(player_id) {
                    self.roster
                        .insert(player_id.clone(), RosterEntry::at(*position));
                }
            }
            ServerMessage::PlayerLeftMap { player_id } => {
                self.roster.remove(player_id);
            }
            ServerMessage::PlayerPositionChange {
                player_id,
                position,
            } => match position {
                Some(position) if self.is_self(player_id) => {
                    self.position = Some(*position);
                }
                Some(position) => {
                    // Upsert, preserving any fight membership marker.
                    self.roster
                        .entry(player_id.clone())
                        .and_modify(|entry| entry.position = *position)
                        .or_insert_with(|| RosterEntry::at(*position));
                }
                // An absent position is a departure signal.
                None if !self.is_self(player_id) => {
                    self.roster.remove(player_id);
                }
                None => {}
            },

            // ----------------------------------------------------------
            // Movement
            // ----------------------------------------------------------
            ServerMessage::MoveInitiated { new_position } => {
                self.pending_move = Some(*new_position);
            }
            ServerMessage::MoveCompleted { new_position } => {
                self.position = Some(*new_position);
                self.pending_move = None;
            }
            ServerMessage::MoveFailed { .. } => {
                self.pending_move = None;
            }

            // ----------------------------------------------------------
            // Fight lifecycle
            // ----------------------------------------------------------
            ServerMessage::FightStarted {
                player1_id,
                player2_id,
            } => {
                let fight_id = FightId::between(player1_id, player2_id);

                // Roster fight markers update for both participants whether
                // or not this session is involved.
                for id in [player1_id, player2_id] {
                    if let Some(entry) = self.roster.get_mut(id) {
                        entry.fight_id = Some(fight_id.clone());
                    }
                }

                let Some(me) = self.player_id.clone() else {
                    return;
                };
                if me != *player1_id && me != *player2_id {
                    return;
                }

                // Idempotent re-delivery for the fight we are already in:
                // must not re-clear hand state populated by an interleaved
                // resync.
                if self
                    .fight
                    .as_ref()
                    .is_some_and(|fight| fight.fight_id == fight_id)
                {
                    return;
                }

                let opponent_id = if me == *player1_id {
                    player2_id.clone()
                } else {
                    player1_id.clone()
                };
                self.fight = Some(FightState::new(fight_id, opponent_id));
                self.last_outcome = None;
            }
            ServerMessage::FightEnded {
                winner_id,
                loser_id,
                reason,
            } => {
                for id in [winner_id, loser_id] {
                    if let Some(entry) = self.roster.get_mut(id) {
                        entry.fight_id = None;
                    }
                }
                // An involuntary disconnect removes the departed player from
                // the map entirely, not just from the fight.
                if reason == BattleRules::DISCONNECT_REASON {
                    self.roster.remove(loser_id);
                }

                if self.is_self(winner_id) || self.is_self(loser_id) {
                    let fight_id = self
                        .fight
                        .take()
                        .map(|fight| fight.fight_id)
                        .unwrap_or_else(|| FightId::between(winner_id, loser_id));
                    self.last_outcome = Some(FightOutcome {
                        fight_id,
                        winner: winner_id.clone(),
                        loser: loser_id.clone(),
                    });
                }
            }

            // ----------------------------------------------------------
            // Card battle
            // ----------------------------------------------------------
            ServerMessage::TurnStarted { active_player_id } => {
                let me = self.player_id.clone();
                let Some(fight) = self.fight.as_mut() else {
                    return;
                };
                if me.as_ref() == Some(active_player_id)
                    || fight.opponent_id == *active_player_id
                {
                    fight.current_turn = Some(active_player_id.clone());
                }
            }
            ServerMessage::TurnEnded { player_id } => {
                let Some(me) = self.player_id.clone() else {
                    return;
                };
                let Some(fight) = self.fight.as_mut() else {
                    return;
                };
                // Ending a turn moves that side's hand to its discard pile
                // and passes the turn; applied optimistically, no round-trip.
                if *player_id == me {
                    fight.player_view.discard_hand();
                    fight.current_turn = Some(fight.opponent_id.clone());
                } else if *player_id == fight.opponent_id {
                    fight.opponent_view.discard_hand();
                    fight.current_turn = Some(me);
                }
            }
            ServerMessage::CardPlayCompleted {
                player_id,
                played_card,
                ..
            } => {
                let me = self.player_id.clone();
                let Some(fight) = self.fight.as_mut() else {
                    return;
                };
                // A card entry without an id cannot be matched against any
                // hand; drop the sub-entry and keep the session alive.
                if played_card.id.is_empty() {
                    return;
                }
                fight.last_played_card = Some(played_card.clone());
                if me.as_ref() == Some(player_id) {
                    fight.player_view.remove_card(&played_card.id);
                } else if fight.opponent_id == *player_id {
                    fight.opponent_view.remove_card(&played_card.id);
                }
            }
            ServerMessage::EffectApplied {
                target_player_id,
                effect_type,
                value,
                ..
            } => {
                let me = self.player_id.clone();
                let Some(fight) = self.fight.as_mut() else {
                    return;
                };
                let view = if me.as_ref() == Some(target_player_id) {
                    &mut fight.player_view
                } else {
                    &mut fight.opponent_view
                };
                match effect_type {
                    EffectKind::Damage => view.apply_damage(*value),
                    EffectKind::Heal => view.apply_heal(*value),
                    // Unrecognized effect kinds are no-ops, not errors.
                    EffectKind::Other => {}
                }
            }
            ServerMessage::FightStateUpdate {
                current_turn_player_id,
                player_state,
                opponent_state,
            } => {
                let me = self.player_id.clone();
                let Some(fight) = self.fight.as_mut() else {
                    return;
                };
                fight.current_turn = Some(current_turn_player_id.clone());

                // Views are matched by embedded id, never by positional
                // slot; positional order is only the fallback when neither
                // slot names this session.
                let (own, theirs) = if me.as_ref() == Some(&opponent_state.player_id) {
                    (opponent_state, player_state)
                } else {
                    (player_state, opponent_state)
                };
                fight.player_view.absorb(own);
                fight.opponent_view.absorb(theirs);
            }
            ServerMessage::CardImages { card_svg_data } => {
                // Merge, never replace: the art cache is append-only for the
                // lifetime of the session.
                for (id, svg) in card_svg_data {
                    self.card_art.insert(id.clone(), svg.clone());
                }
            }
            ServerMessage::CardDrawn {
                card_info,
                svg_data,
            } => {
                // Only the art cache updates; hand contents are owned by the
                // authoritative resync.
                if !card_info.id.is_empty() && !svg_data.is_empty() {
                    self.card_art.insert(card_info.id.clone(), svg_data.clone());
                }
            }

            // ----------------------------------------------------------
            // Deliberate no-ops: nothing in the mirror is owned by these.
            // ----------------------------------------------------------
            ServerMessage::MapListResponse { .. }
            | ServerMessage::JoinMapFailed { .. }
            | ServerMessage::LeaveMapInitiated
            | ServerMessage::LeaveMapFailed { .. }
            | ServerMessage::FightChallengeReceived { .. }
            | ServerMessage::CardPlayInitiated { .. }
            | ServerMessage::CardPlayFailed { .. } => {}
        }
    }
}
