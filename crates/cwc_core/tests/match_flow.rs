//! Match flow tests: kickoff synchronization, per-agent error isolation,
//! play turns and stale replies.
//!
//! These drive a full [`Match`] through recording collaborators.

use cwc_core::prelude::*;
use cwc_test_utils::fixtures::{
    complete_phase, empty_reply, kickoff_reply, move_to, play_empty_turns, play_reply,
    started_match, test_match, test_match_with, turn_to, TestMatch,
};

fn position_of(game: &TestMatch, number: PlayerNumber) -> Vec2 {
    let team = if number <= 5 {
        TeamNumber::One
    } else {
        TeamNumber::Two
    };
    game.team(team)
        .player(number)
        .map(|player| player.dynamic().position)
        .expect("player exists")
}

// =============================================================================
// Squads
// =============================================================================

#[test]
fn test_squads_are_assembled() {
    let game = test_match();

    let players: Vec<_> = game.teams().iter().flat_map(Team::players).collect();
    assert_eq!(players.len(), 12);
    assert_eq!(players.iter().filter(|p| p.is_player()).count(), 10);
    assert_eq!(players.iter().filter(|p| p.is_goalkeeper()).count(), 2);

    let numbers: Vec<_> = players.iter().map(|p| p.number()).collect();
    assert_eq!(numbers, (0..12).collect::<Vec<_>>());
}

#[test]
fn test_default_formation_is_in_own_half() {
    let game = test_match();
    let pitch = &game.config().pitch;
    for team in game.teams() {
        for player in team.players() {
            assert!(team.own_half_contains(pitch, player.dynamic().position));
        }
    }
}

// =============================================================================
// Kickoff
// =============================================================================

#[test]
fn test_kickoff_applies_both_placements() {
    let (mut game, phase) = started_match(TeamNumber::One);

    let first = game.deliver(
        phase,
        AgentId::Agent1,
        kickoff_reply(&[(2, 45.0, 25.0, 0.0)]),
    );
    assert_eq!(first, Delivery::Stored);
    assert_eq!(game.transport().requests.len(), 2);

    let second = game.deliver(
        phase,
        AgentId::Agent2,
        kickoff_reply(&[(8, 70.0, 25.0, 180.0)]),
    );
    assert_eq!(second, Delivery::Completed);

    // Kickoff positions are applied before the first turn is simulated.
    assert_eq!(position_of(&game, 2), Vec2::new(45.0, 25.0));
    assert_eq!(position_of(&game, 8), Vec2::new(70.0, 25.0));

    // Exactly one transition: one new request per agent, all PLAY.
    let requests = &game.transport().requests;
    assert_eq!(requests.len(), 4);
    assert!(requests[2..]
        .iter()
        .all(|(_, request)| request.kind() == RequestKind::Play));
    assert!(game.transport().errors.is_empty());
    assert_eq!(game.events().state_count(), 1);
}

#[test]
fn test_kickoff_reply_order_is_irrelevant() {
    let (mut game, phase) = started_match(TeamNumber::Two);

    game.deliver(phase, AgentId::Agent2, kickoff_reply(&[(6, 55.0, 25.0, 180.0)]));
    assert_eq!(game.pending_agents(), vec![AgentId::Agent1]);
    game.deliver(phase, AgentId::Agent1, kickoff_reply(&[(0, 30.0, 5.0, 0.0)]));

    assert_eq!(position_of(&game, 6), Vec2::new(55.0, 25.0));
    assert_eq!(position_of(&game, 0), Vec2::new(30.0, 5.0));
    assert_eq!(game.current_request_kind(), Some(RequestKind::Play));
}

#[test]
fn test_malformed_kickoff_is_isolated() {
    let (mut game, phase) = started_match(TeamNumber::One);

    let garbage = AgentResponse::new(RequestKind::Kickoff, serde_json::json!({"players": 7}));
    game.deliver(phase, AgentId::Agent1, garbage.into());
    game.deliver(phase, AgentId::Agent2, kickoff_reply(&[(7, 60.0, 40.0, 90.0)]));

    assert_eq!(position_of(&game, 7), Vec2::new(60.0, 40.0));

    let transport = game.transport();
    assert_eq!(transport.errors_for(AgentId::Agent1).len(), 1);
    assert!(transport.errors_for(AgentId::Agent2).is_empty());
    assert_eq!(game.current_request_kind(), Some(RequestKind::Play));
}

#[test]
fn test_wrong_request_type_is_reported() {
    let (mut game, phase) = started_match(TeamNumber::One);

    game.deliver(phase, AgentId::Agent1, empty_reply(RequestKind::Kickoff));
    game.deliver(phase, AgentId::Agent2, empty_reply(RequestKind::Play));

    let errors = game.transport().errors_for(AgentId::Agent2);
    assert_eq!(errors, vec!["Expected a KICKOFF response, got 'PLAY'."]);
    assert_eq!(game.current_request_kind(), Some(RequestKind::Play));
}

#[test]
fn test_opponent_player_cannot_be_placed() {
    let (mut game, phase) = started_match(TeamNumber::One);
    let before = position_of(&game, 9);

    game.deliver(phase, AgentId::Agent1, kickoff_reply(&[(9, 20.0, 20.0, 0.0)]));
    game.deliver(phase, AgentId::Agent2, empty_reply(RequestKind::Kickoff));

    assert_eq!(position_of(&game, 9), before);
    assert_eq!(game.transport().errors_for(AgentId::Agent1).len(), 1);
}

#[test]
fn test_defending_team_kept_out_of_centre_circle() {
    let (mut game, phase) = started_match(TeamNumber::One);
    let before = position_of(&game, 6);

    game.deliver(phase, AgentId::Agent1, kickoff_reply(&[(0, 48.0, 25.0, 0.0)]));
    game.deliver(phase, AgentId::Agent2, kickoff_reply(&[(6, 52.0, 25.0, 180.0)]));

    assert_eq!(position_of(&game, 0), Vec2::new(48.0, 25.0));
    assert_eq!(position_of(&game, 6), before);
    assert_eq!(game.transport().errors_for(AgentId::Agent2).len(), 1);
}

#[test]
fn test_timed_out_agent_is_told() {
    let (mut game, phase) = started_match(TeamNumber::One);

    game.deliver(phase, AgentId::Agent1, AgentReply::TimedOut);
    game.deliver(phase, AgentId::Agent2, empty_reply(RequestKind::Kickoff));

    assert_eq!(game.transport().errors_for(AgentId::Agent1).len(), 1);
    assert_eq!(game.current_request_kind(), Some(RequestKind::Play));
}

// =============================================================================
// Duplicate and stale replies
// =============================================================================

#[test]
fn test_duplicate_reply_has_no_effect() {
    let (mut game, phase) = started_match(TeamNumber::One);

    game.deliver(phase, AgentId::Agent1, kickoff_reply(&[(1, 10.0, 10.0, 0.0)]));
    let hash = game.state_hash();
    let duplicate = game.deliver(phase, AgentId::Agent1, kickoff_reply(&[(1, 20.0, 20.0, 0.0)]));

    assert_eq!(duplicate, Delivery::Duplicate);
    assert_eq!(game.state_hash(), hash);
    assert_eq!(game.transport().requests.len(), 2);

    game.deliver(phase, AgentId::Agent2, empty_reply(RequestKind::Kickoff));
    assert_eq!(position_of(&game, 1), Vec2::new(10.0, 10.0));
}

#[test]
fn test_late_reply_has_no_effect() {
    let (mut game, phase) = started_match(TeamNumber::One);
    complete_phase(
        &mut game,
        empty_reply(RequestKind::Kickoff),
        empty_reply(RequestKind::Kickoff),
    );

    let hash = game.state_hash();
    let requests = game.transport().requests.len();
    let events = game.events().events.len();

    let late = game.deliver(phase, AgentId::Agent2, kickoff_reply(&[(6, 70.0, 25.0, 0.0)]));
    assert_eq!(late, Delivery::Stale);
    assert_eq!(game.state_hash(), hash);
    assert_eq!(game.transport().requests.len(), requests);
    assert_eq!(game.events().events.len(), events);
    assert!(game.transport().errors.is_empty());
}

#[test]
fn test_reply_after_abandon_is_stale() {
    let (mut game, phase) = started_match(TeamNumber::One);
    game.deliver(phase, AgentId::Agent1, empty_reply(RequestKind::Kickoff));
    game.abandon();

    let result = game.deliver(phase, AgentId::Agent2, empty_reply(RequestKind::Kickoff));
    assert_eq!(result, Delivery::Stale);
    assert_eq!(game.status(), MatchStatus::Finished);
    assert_eq!(game.transport().requests.len(), 2);
}

// =============================================================================
// Play
// =============================================================================

#[test]
fn test_play_request_hides_opponent_intentions() {
    let (mut game, _) = started_match(TeamNumber::One);
    complete_phase(
        &mut game,
        empty_reply(RequestKind::Kickoff),
        empty_reply(RequestKind::Kickoff),
    );
    complete_phase(
        &mut game,
        play_reply(&[(0, turn_to(90.0))]),
        play_reply(&[(6, move_to(70.0, 10.0))]),
    );

    let request = game
        .transport()
        .requests_for(AgentId::Agent1)
        .last()
        .map(|request| serde_json::to_value(request).expect("serializable"))
        .expect("agent 1 has a request");

    assert_eq!(request["requestType"], "PLAY");
    assert!(request["team"]["players"][0].get("intentions").is_some());
    assert!(request["opponent"]["players"][0].get("intentions").is_none());
}

#[test]
fn test_play_actions_drive_players() {
    let (mut game, _) = started_match(TeamNumber::One);
    complete_phase(
        &mut game,
        kickoff_reply(&[(3, 20.0, 25.0, 0.0)]),
        empty_reply(RequestKind::Kickoff),
    );

    complete_phase(
        &mut game,
        play_reply(&[(3, move_to(30.0, 25.0))]),
        play_reply(&[(6, turn_to(90.0))]),
    );

    // One turn is 0.1 s at 5 m/s.
    let moved = position_of(&game, 3);
    assert!((moved.x - 20.5).abs() < 1e-9);
    assert!((moved.y - 25.0).abs() < 1e-9);

    let facing = game
        .team(TeamNumber::Two)
        .player(6)
        .map(|p| p.dynamic().direction)
        .expect("player exists");
    assert!((facing - 120.0).abs() < 1e-9);
}

#[test]
fn test_invalid_play_reply_keeps_previous_intentions() {
    let (mut game, _) = started_match(TeamNumber::One);
    complete_phase(
        &mut game,
        empty_reply(RequestKind::Kickoff),
        empty_reply(RequestKind::Kickoff),
    );
    complete_phase(
        &mut game,
        play_reply(&[(1, turn_to(45.0))]),
        empty_reply(RequestKind::Play),
    );
    complete_phase(
        &mut game,
        play_reply(&[(1, turn_to(270.0)), (2, move_to(500.0, 0.0))]),
        empty_reply(RequestKind::Play),
    );

    let intentions = game
        .team(TeamNumber::One)
        .player(1)
        .map(|p| *p.intentions())
        .expect("player exists");
    assert_eq!(intentions, Intentions::Turn { direction: 45.0 });
    assert_eq!(game.transport().errors_for(AgentId::Agent1).len(), 1);
}

#[test]
fn test_match_ends_with_game_over() {
    let config = MatchConfig {
        match_duration_seconds: 0.5,
        ..MatchConfig::default()
    };
    let mut game = test_match_with(config);
    game.start(TeamNumber::One).expect("fresh match");
    complete_phase(
        &mut game,
        empty_reply(RequestKind::Kickoff),
        empty_reply(RequestKind::Kickoff),
    );
    play_empty_turns(&mut game, 10);

    assert_eq!(game.status(), MatchStatus::Finished);
    assert_eq!(game.events().state_count(), 5);
    assert!(matches!(game.events().last(), Some(MatchEvent::GameOver { .. })));
    assert!((game.game_time_seconds() - 0.5).abs() < 1e-9);
}

#[test]
fn test_clear_all_actions_and_reset() {
    let (mut game, _) = started_match(TeamNumber::One);
    complete_phase(
        &mut game,
        kickoff_reply(&[(0, 10.0, 10.0, 0.0)]),
        empty_reply(RequestKind::Kickoff),
    );
    complete_phase(
        &mut game,
        play_reply(&[(0, move_to(40.0, 10.0))]),
        empty_reply(RequestKind::Play),
    );

    game.clear_all_actions();
    game.set_default_kickoff_positions();

    let fresh = test_match();
    for (team, reference) in game.teams().iter().zip(fresh.teams()) {
        for (player, expected) in team.players().iter().zip(reference.players()) {
            assert_eq!(player.dynamic(), expected.dynamic());
            assert_eq!(*player.intentions(), Intentions::None);
        }
    }
}
