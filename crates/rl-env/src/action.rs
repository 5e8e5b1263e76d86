//! Discrete action space and legality masking.
//!
//! The space is fixed at 11 slots: up to 10 targeted slots plus the pass
//! slot pinned to the last index. In battle mode the targeted slots are
//! hand positions and the pass slot is End Turn; in map mode the targeted
//! slots are challengeable roster members and the pass slot is Wait.
//!
//! Illegal selections decode to `None` and are never turned into outbound
//! requests; the mask layer is the last line before the transport.
use protocol::{CardId, ClientMessage, PlayerId};
use session::{BattleRules, PlayerSession};

/// Targeted slots: card positions in battle, challenge targets on the map.
pub const CARD_SLOTS: usize = BattleRules::MAX_HAND_SIZE;
/// Full width of the discrete action space.
pub const ACTION_SPACE: usize = CARD_SLOTS + 1;
/// The pass slot: End Turn in battle, Wait on the map. Always last.
pub const PASS_SLOT: usize = ACTION_SPACE - 1;

/// A concrete action the agent has decided on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentAction {
    Challenge(PlayerId),
    PlayCard(CardId),
    EndTurn,
    Wait,
}

impl AgentAction {
    /// Outbound request for this action; `None` for Wait, which sends
    /// nothing.
    pub fn to_message(&self) -> Option<ClientMessage> {
        match self {
            AgentAction::Challenge(target_id) => Some(ClientMessage::FightChallengeRequest {
                target_id: target_id.clone(),
            }),
            AgentAction::PlayCard(card_id) => Some(ClientMessage::PlayCardRequest {
                card_id: card_id.clone(),
            }),
            AgentAction::EndTurn => Some(ClientMessage::EndTurnRequest),
            AgentAction::Wait => None,
        }
    }
}

/// Fixed-width legality mask over [`ACTION_SPACE`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionMask {
    slots: [bool; ACTION_SPACE],
}

impl ActionMask {
    /// Computes legality for the current session state.
    ///
    /// The mask is all-zero exactly when a fight is running and the turn
    /// belongs to the opponent: the caller must wait, not error.
    pub fn compute(session: &PlayerSession) -> Self {
        let mut slots = [false; ACTION_SPACE];
        match &session.fight {
            Some(fight) => {
                if session.is_own_turn() {
                    let budget = fight.player_view.action_points;
                    for (index, card) in
                        fight.player_view.hand.iter().take(CARD_SLOTS).enumerate()
                    {
                        slots[index] = card.cost <= budget;
                    }
                    // End Turn is always legal on one's own turn.
                    slots[PASS_SLOT] = true;
                }
            }
            None => {
                for (index, _) in session.available_opponents().take(CARD_SLOTS).enumerate() {
                    slots[index] = true;
                }
                slots[PASS_SLOT] = true;
            }
        }
        Self { slots }
    }

    pub fn is_legal(&self, index: usize) -> bool {
        index < ACTION_SPACE && self.slots[index]
    }

    /// True when nothing is legal (opponent's turn).
    pub fn must_wait(&self) -> bool {
        self.slots.iter().all(|legal| !legal)
    }

    pub fn legal_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, legal)| legal.then_some(index))
    }

    /// The mask as 0/1 floats, policy-network shaped.
    pub fn as_f32(&self) -> [f32; ACTION_SPACE] {
        let mut mask = [0.0; ACTION_SPACE];
        for (slot, legal) in mask.iter_mut().zip(self.slots) {
            *slot = if legal { 1.0 } else { 0.0 };
        }
        mask
    }
}

/// Resolves an action index against the current state.
///
/// Returns `None` for any index that is illegal right now (out of range,
/// unaffordable card, empty slot, wrong turn); such selections must never
/// reach the server.
pub fn decode_action(session: &PlayerSession, index: usize) -> Option<AgentAction> {
    if index >= ACTION_SPACE {
        return None;
    }
    match &session.fight {
        Some(fight) => {
            if !session.is_own_turn() {
                return None;
            }
            if index == PASS_SLOT {
                return Some(AgentAction::EndTurn);
            }
            let card = fight.player_view.hand.get(index)?;
            (card.cost <= fight.player_view.action_points)
                .then(|| AgentAction::PlayCard(card.id.clone()))
        }
        None => {
            if index == PASS_SLOT {
                return Some(AgentAction::Wait);
            }
            session
                .available_opponents()
                .nth(index)
                .map(|target| AgentAction::Challenge(target.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{CardInfo, MapPosition, ServerMessage};
    use session::RosterEntry;

    fn card(id: &str, cost: u32) -> CardInfo {
        CardInfo {
            id: CardId::from(id),
            name: id.to_string(),
            description: String::new(),
            cost,
        }
    }

    fn session_with_id(id: &str) -> PlayerSession {
        let mut session = PlayerSession::new();
        session.apply(&ServerMessage::PlayerIdResponse {
            player_id: PlayerId::from(id),
        });
        session
    }

    fn battle_session(own_turn: bool) -> PlayerSession {
        let mut session = session_with_id("p1");
        session.apply(&ServerMessage::FightStarted {
            player1_id: PlayerId::from("p1"),
            player2_id: PlayerId::from("p2"),
        });
        let fight = session.fight.as_mut().unwrap();
        fight.current_turn = Some(PlayerId::from(if own_turn { "p1" } else { "p2" }));
        fight.player_view.action_points = 3;
        fight.player_view.hand = vec![card("atk_1", 2), card("spc_1", 5)];
        session
    }

    #[test]
    fn map_mode_offers_free_opponents_and_wait() {
        let mut session = session_with_id("p1");
        session
            .roster
            .insert(PlayerId::from("p2"), RosterEntry::at(MapPosition::new(1, 1)));
        session.roster.insert(
            PlayerId::from("p3"),
            RosterEntry {
                position: MapPosition::new(2, 2),
                fight_id: Some(protocol::FightId::new("f")),
            },
        );

        let mask = ActionMask::compute(&session);
        assert!(mask.is_legal(0)); // p2, the only free opponent
        assert!(!mask.is_legal(1));
        assert!(mask.is_legal(PASS_SLOT));
        assert!(!mask.must_wait());

        assert_eq!(
            decode_action(&session, 0),
            Some(AgentAction::Challenge(PlayerId::from("p2")))
        );
        assert_eq!(decode_action(&session, PASS_SLOT), Some(AgentAction::Wait));
        assert_eq!(decode_action(&session, 1), None);
    }

    #[test]
    fn empty_map_still_allows_waiting() {
        let session = session_with_id("p1");
        let mask = ActionMask::compute(&session);
        assert!(!mask.must_wait());
        assert_eq!(mask.legal_indices().collect::<Vec<_>>(), vec![PASS_SLOT]);
    }

    #[test]
    fn own_turn_masks_unaffordable_cards() {
        let session = battle_session(true);
        let mask = ActionMask::compute(&session);

        assert!(mask.is_legal(0)); // atk_1 costs 2 <= 3
        assert!(!mask.is_legal(1)); // spc_1 costs 5 > 3
        assert!(mask.is_legal(PASS_SLOT));

        assert_eq!(
            decode_action(&session, 0),
            Some(AgentAction::PlayCard(CardId::from("atk_1")))
        );
        assert_eq!(decode_action(&session, 1), None);
        assert_eq!(
            decode_action(&session, PASS_SLOT),
            Some(AgentAction::EndTurn)
        );
    }

    #[test]
    fn opponent_turn_is_the_only_all_zero_mask() {
        let session = battle_session(false);
        let mask = ActionMask::compute(&session);
        assert!(mask.must_wait());
        assert_eq!(decode_action(&session, 0), None);
        assert_eq!(decode_action(&session, PASS_SLOT), None);
    }

    #[test]
    fn out_of_range_index_is_illegal() {
        let session = battle_session(true);
        assert_eq!(decode_action(&session, ACTION_SPACE), None);
    }

    #[test]
    fn wait_maps_to_no_outbound_message() {
        assert_eq!(AgentAction::Wait.to_message(), None);
        assert!(matches!(
            AgentAction::EndTurn.to_message(),
            Some(ClientMessage::EndTurnRequest)
        ));
    }
}
