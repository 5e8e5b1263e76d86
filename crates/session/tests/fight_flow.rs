//! End-to-end reducer scenario driven by raw wire frames.
//!
//! Replays a full session: handshake, map join, a complete fight with a
//! resync, card play, effects, turn handoff, and the fight ending, checking
//! the mirrored state after each stage.
use protocol::{CardId, MapId, MapPosition, PlayerId, ServerMessage};
use session::PlayerSession;

fn apply_frame(session: &mut PlayerSession, raw: &str) {
    let message = ServerMessage::decode(raw).expect("frame should decode");
    session.apply(&message);
}

#[test]
fn full_session_lifecycle() {
    let mut session = PlayerSession::new();

    // Handshake.
    apply_frame(
        &mut session,
        r#"{"MessageType":"PlayerIdResponse","PlayerId":"p1"}"#,
    );
    assert_eq!(session.player_id, Some(PlayerId::from("p1")));

    // Map join with one other player already fighting and one free.
    apply_frame(
        &mut session,
        r#"{"MessageType":"JoinMapCompleted","MapId":"arena","PlayerId":"p1",
            "Position":{"X":2,"Y":3},
            "TilemapData":{"Width":2,"Height":2,"TileData":[0,1,1,0]},
            "PlayerInfo":{
                "p1":{"Position":{"X":2,"Y":3}},
                "p2":{"Position":{"X":4,"Y":4}},
                "p3":{"Position":{"X":0,"Y":1},"FightId":"fight_p3_p4"}
            }}"#,
    );
    assert_eq!(session.current_map_id, Some(MapId::from("arena")));
    assert_eq!(session.position, Some(MapPosition::new(2, 3)));
    assert_eq!(session.roster.len(), 2);
    assert_eq!(
        session.available_opponents().collect::<Vec<_>>(),
        vec![&PlayerId::from("p2")]
    );

    // The free player challenges us and the fight begins.
    apply_frame(
        &mut session,
        r#"{"MessageType":"FightChallengeReceived","ChallengerId":"p2"}"#,
    );
    assert!(!session.is_in_fight());

    apply_frame(
        &mut session,
        r#"{"MessageType":"FightStarted","Player1Id":"p2","Player2Id":"p1"}"#,
    );
    assert!(session.is_in_fight());
    assert_eq!(
        session.fight.as_ref().unwrap().opponent_id,
        PlayerId::from("p2")
    );
    assert!(session.roster[&PlayerId::from("p2")].is_in_fight());

    // Authoritative resync carries our state in the OpponentState slot.
    apply_frame(
        &mut session,
        r#"{"MessageType":"FightStateUpdate","CurrentTurnPlayerId":"p1",
            "PlayerState":{"PlayerId":"p2","HitPoints":50,"ActionPoints":3,
                "Hand":[],"DeckCount":15,"DiscardPileCount":0,"StatusEffects":[]},
            "OpponentState":{"PlayerId":"p1","HitPoints":50,"ActionPoints":3,
                "Hand":[{"Id":"atk_1","Name":"Strike","Cost":2},
                        {"Id":"def_1","Name":"Guard","Cost":1}],
                "DeckCount":13,"DiscardPileCount":0,"StatusEffects":[]}}"#,
    );
    assert!(session.is_own_turn());
    {
        let fight = session.fight.as_ref().unwrap();
        assert_eq!(fight.player_view.hand.len(), 2);
        assert_eq!(fight.opponent_view.deck_count, 15);
    }

    // We play the attack card; the server confirms and applies its effect.
    apply_frame(
        &mut session,
        r#"{"MessageType":"CardPlayCompleted","PlayerId":"p1",
            "PlayedCard":{"Id":"atk_1","Name":"Strike","Cost":2}}"#,
    );
    apply_frame(
        &mut session,
        r#"{"MessageType":"EffectApplied","TargetPlayerId":"p2",
            "EffectType":"Damage","Value":8,"Source":"atk_1"}"#,
    );
    {
        let fight = session.fight.as_ref().unwrap();
        assert_eq!(fight.player_view.hand.len(), 1);
        assert_eq!(fight.opponent_view.hit_points, 42);
        assert_eq!(
            fight.last_played_card.as_ref().unwrap().id,
            CardId::from("atk_1")
        );
    }

    // Ending our turn discards the remaining hand and passes the turn.
    apply_frame(&mut session, r#"{"MessageType":"TurnEnded","PlayerId":"p1"}"#);
    {
        let fight = session.fight.as_ref().unwrap();
        assert!(fight.player_view.hand.is_empty());
        assert_eq!(fight.player_view.discard_count, 1);
        assert_eq!(fight.current_turn, Some(PlayerId::from("p2")));
    }

    // Opponent acts out of our sight; an oversized heal clamps at the cap.
    apply_frame(
        &mut session,
        r#"{"MessageType":"EffectApplied","TargetPlayerId":"p2",
            "EffectType":"Heal","Value":99}"#,
    );
    assert_eq!(session.fight.as_ref().unwrap().opponent_view.hit_points, 50);

    apply_frame(&mut session, r#"{"MessageType":"TurnStarted","ActivePlayerId":"p1"}"#);
    assert!(session.is_own_turn());

    // The fight ends in our favor.
    apply_frame(
        &mut session,
        r#"{"MessageType":"FightEnded","WinnerId":"p1","LoserId":"p2",
            "Reason":"Defeated"}"#,
    );
    assert!(!session.is_in_fight());
    assert_eq!(session.won_last_fight(), Some(true));
    assert!(!session.roster[&PlayerId::from("p2")].is_in_fight());

    // Between episodes the aggregate resets but keeps its identity.
    session.reset();
    assert_eq!(session.player_id, Some(PlayerId::from("p1")));
    assert!(session.roster.is_empty());
}

#[test]
fn unknown_frames_are_skippable_without_state_damage() {
    let mut session = PlayerSession::new();
    session.apply(&ServerMessage::PlayerIdResponse {
        player_id: PlayerId::from("p1"),
    });

    let err = ServerMessage::decode(r#"{"MessageType":"GuildInviteReceived","GuildId":"g1"}"#)
        .unwrap_err();
    assert!(err.is_unknown_type());

    // The skipped frame never reaches the reducer; state is untouched.
    assert_eq!(session.player_id, Some(PlayerId::from("p1")));
    assert!(!session.is_in_fight());
}
