//! Integration tests for the round engine: transitions, edits, deletion and finalization.

use carrom_tournament_web::{
    BoardResult, FirstRoundOrder, MatchInput, MatchRecord, Pairing, PairingContext,
    PairingGenerator, RequestContext, RoundState, ScoringMode, ScoringRules, StandardPairing,
    TournamentError, TournamentId, TournamentRoundEngine, TournamentSettings, TournamentSystem,
};
use uuid::Uuid;

fn owner() -> RequestContext {
    RequestContext::user("alice")
}

fn engine() -> TournamentRoundEngine {
    TournamentRoundEngine::new(StandardPairing::new(FirstRoundOrder::Registration))
}

fn setup<P: PairingGenerator>(
    engine: &TournamentRoundEngine<P>,
    settings: TournamentSettings,
    names: &[&str],
) -> TournamentId {
    let t = engine.create_tournament(&owner(), settings).unwrap();
    for name in names {
        engine.add_competitor(&owner(), t.id, name).unwrap();
    }
    t.id
}

fn swiss(names: &[&str]) -> (TournamentRoundEngine, TournamentId) {
    let engine = engine();
    let id = setup(&engine, TournamentSettings::default(), names);
    (engine, id)
}

fn boards(coins1: u32, coins2: u32) -> MatchInput {
    MatchInput::Boards {
        boards: vec![BoardResult::new(coins1, coins2, None)],
    }
}

/// Side 1 wins 10-0 on every real match of the round.
fn score_round(engine: &TournamentRoundEngine, id: TournamentId, turn: u32) {
    for m in engine.round_matches(id, turn).unwrap() {
        if !m.is_phantom() {
            engine.save_match_results(&owner(), id, m.id, boards(10, 0)).unwrap();
        }
    }
}

fn play_ranked_round(engine: &TournamentRoundEngine, id: TournamentId) -> RoundState {
    let outcome = engine.new_turn(&mut owner(), id).unwrap();
    score_round(engine, id, outcome.state.current_turn);
    engine.update_ranking(&owner(), id).unwrap().state
}

fn state(engine: &TournamentRoundEngine, id: TournamentId) -> RoundState {
    engine.tournament(id).unwrap().state
}

fn is_illegal<T: std::fmt::Debug>(result: Result<T, TournamentError>) -> bool {
    matches!(result, Err(TournamentError::IllegalTransition(_)))
}

#[test]
fn new_turn_creates_pairings_and_leaves_round_unranked() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    let outcome = engine.new_turn(&mut owner(), id).unwrap();

    assert_eq!(outcome.state.current_turn, 1);
    assert_eq!(outcome.state.ranked_turn, 0);
    assert_eq!(outcome.matches.len(), 2);
    let boards: Vec<u32> = outcome.matches.iter().map(|m| m.board).collect();
    assert_eq!(boards, vec![1, 2]);
    assert!(outcome.matches.iter().all(|m| m.turn == 1 && !m.is_scored()));
}

#[test]
fn new_turn_refused_while_current_round_is_unranked() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    engine.new_turn(&mut owner(), id).unwrap();

    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
    let s = state(&engine, id);
    assert_eq!((s.current_turn, s.ranked_turn), (1, 0));
}

#[test]
fn new_turn_needs_competitors() {
    let (engine, id) = swiss(&[]);
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
    assert_eq!(state(&engine, id), RoundState::default());
}

#[test]
fn odd_field_gets_a_phantom_with_walkover_score() {
    let (engine, id) = swiss(&["A", "B", "C"]);
    let outcome = engine.new_turn(&mut owner(), id).unwrap();
    let phantom: Vec<&MatchRecord> = outcome.matches.iter().filter(|m| m.is_phantom()).collect();

    assert_eq!(phantom.len(), 1);
    assert_eq!((phantom[0].score1, phantom[0].score2), (25, 0));
    assert_eq!(phantom[0].board, 2);
}

#[test]
fn update_ranking_refuses_incomplete_scores_without_changing_state() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    let outcome = engine.new_turn(&mut owner(), id).unwrap();
    engine
        .save_match_results(&owner(), id, outcome.matches[0].id, boards(10, 0))
        .unwrap();

    assert_eq!(
        engine.update_ranking(&owner(), id),
        Err(TournamentError::IncompleteScores { boards: vec![2] })
    );
    assert_eq!(state(&engine, id).ranked_turn, 0);

    engine
        .save_match_results(&owner(), id, outcome.matches[1].id, boards(0, 7))
        .unwrap();
    let ranked = engine.update_ranking(&owner(), id).unwrap();
    assert_eq!(ranked.state.ranked_turn, 1);
    assert!(ranked.matches.is_empty());
    assert!(!ranked.state.prized);
}

#[test]
fn phantom_matches_count_as_scored() {
    let (engine, id) = swiss(&["A", "B", "C"]);
    engine.new_turn(&mut owner(), id).unwrap();
    assert_eq!(
        engine.update_ranking(&owner(), id),
        Err(TournamentError::IncompleteScores { boards: vec![1] })
    );
    score_round(&engine, id, 1);
    assert_eq!(engine.update_ranking(&owner(), id).unwrap().state.ranked_turn, 1);
}

#[test]
fn incomplete_training_input_resets_scores() {
    let engine = engine();
    let settings = TournamentSettings {
        scoring: carrom_tournament_web::ScoringRules {
            mode: carrom_tournament_web::ScoringMode::TrainingBoards { boards: 2 },
            ..Default::default()
        },
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B"]);
    let m = engine.new_turn(&mut owner(), id).unwrap().matches.remove(0);

    let edited = engine
        .save_match_results(&owner(), id, m.id, MatchInput::Direct { score1: 20, score2: 12 })
        .unwrap();
    assert_eq!((edited.matches[0].score1, edited.matches[0].score2), (20, 12));

    let input = MatchInput::Training {
        boards: vec![
            carrom_tournament_web::TrainingBoard::new(Some(20), Some(12)),
            carrom_tournament_web::TrainingBoard::new(None, Some(11)),
        ],
    };
    let edited = engine.save_match_results(&owner(), id, m.id, input.clone()).unwrap();
    let record = &edited.matches[0];
    assert!(!record.is_scored());
    assert_eq!(record.input.as_ref(), Some(&input));
    assert!(record.modified.is_some());
}

#[test]
fn invalid_board_result_leaves_match_untouched() {
    let (engine, id) = swiss(&["A", "B"]);
    let m = engine.new_turn(&mut owner(), id).unwrap().matches.remove(0);
    let input = MatchInput::Boards {
        boards: vec![BoardResult::new(3, 0, None), BoardResult::new(4, 2, None)],
    };

    assert_eq!(
        engine.save_match_results(&owner(), id, m.id, input),
        Err(TournamentError::InvalidBoardResult { board: 2 })
    );
    let stored = engine.match_at_board(id, 1, 1).unwrap();
    assert_eq!(stored, m);
}

#[test]
fn delete_from_first_turn_resets_everything() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    play_ranked_round(&engine, id);
    engine.new_turn(&mut owner(), id).unwrap();

    let outcome = engine.delete_from_turn(&mut owner(), id, 1).unwrap();

    assert_eq!(outcome.state, RoundState::default());
    assert_eq!(outcome.matches.len(), 4);
    assert!(engine.round_matches(id, 1).unwrap().is_empty());
    assert!(engine.round_matches(id, 2).unwrap().is_empty());
    assert!(engine.standings(id).unwrap().is_empty());
}

#[test]
fn delete_from_later_turn_keeps_earlier_rounds() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    play_ranked_round(&engine, id);
    play_ranked_round(&engine, id);
    engine.new_turn(&mut owner(), id).unwrap();

    let outcome = engine.delete_from_turn(&mut owner(), id, 2).unwrap();

    assert_eq!(outcome.state.current_turn, 1);
    assert_eq!(outcome.state.ranked_turn, 1);
    assert_eq!(engine.round_matches(id, 1).unwrap().len(), 2);
    assert!(engine.round_matches(id, 3).unwrap().is_empty());
    let standings = engine.standings(id).unwrap();
    assert!(standings.iter().all(|s| s.played == 1));
}

#[test]
fn delete_from_turn_rejects_missing_rounds() {
    let (engine, id) = swiss(&["A", "B"]);
    assert!(is_illegal(engine.delete_from_turn(&mut owner(), id, 0)));
    assert!(is_illegal(engine.delete_from_turn(&mut owner(), id, 1)));
}

#[test]
fn phantom_match_is_never_editable() {
    let (engine, id) = swiss(&["A", "B", "C"]);
    play_ranked_round(&engine, id);
    engine.new_turn(&mut owner(), id).unwrap();
    let phantom_now = engine
        .round_matches(id, 2)
        .unwrap()
        .into_iter()
        .find(|m| m.is_phantom())
        .unwrap();
    assert!(is_illegal(engine.save_match_results(&owner(), id, phantom_now.id, boards(1, 0))));

    let o = engine.allow_edit_previous_turns(&owner(), id).unwrap();
    let ctx = owner().with_override(o);
    let phantom_before = engine
        .round_matches(id, 1)
        .unwrap()
        .into_iter()
        .find(|m| m.is_phantom())
        .unwrap();
    assert!(is_illegal(engine.save_match_results(&ctx, id, phantom_before.id, boards(1, 0))));
    assert!(is_illegal(engine.save_match_results(&ctx, id, phantom_now.id, boards(1, 0))));
}

#[test]
fn previous_rounds_need_an_override_that_transitions_void() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    play_ranked_round(&engine, id);
    engine.new_turn(&mut owner(), id).unwrap();
    let first = engine.match_at_board(id, 1, 1).unwrap();

    assert!(is_illegal(engine.save_match_results(&owner(), id, first.id, boards(0, 10))));

    let mut ctx = owner().with_override(engine.allow_edit_previous_turns(&owner(), id).unwrap());
    engine.save_match_results(&ctx, id, first.id, boards(0, 10)).unwrap();
    // B now beat A and ties C on points and scores; registration order breaks the tie.
    let standings = engine.standings(id).unwrap();
    assert_eq!(standings[0].name, "B");
    assert_eq!(state(&engine, id).current_turn, 2);
    assert_eq!(engine.round_matches(id, 2).unwrap().len(), 2);

    score_round(&engine, id, 2);
    engine.update_ranking(&ctx, id).unwrap();
    let stale = ctx.clone();
    engine.new_turn(&mut ctx, id).unwrap();
    assert_eq!(ctx.edit_override, None);
    assert!(is_illegal(engine.save_match_results(&stale, id, first.id, boards(10, 0))));
}

#[test]
fn override_needs_a_previous_round() {
    let (engine, id) = swiss(&["A", "B"]);
    engine.new_turn(&mut owner(), id).unwrap();
    assert!(is_illegal(engine.allow_edit_previous_turns(&owner(), id)));
}

#[test]
fn finished_swiss_becomes_prized_and_frozen() {
    let engine = engine();
    let settings = TournamentSettings {
        duration: 1,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B", "C", "D"]);
    let s = play_ranked_round(&engine, id);
    assert!(s.prized && s.read_only);

    let m = engine.match_at_board(id, 1, 1).unwrap();
    let o = RequestContext::admin("root");
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
    assert!(is_illegal(engine.final_turn(&mut owner(), id)));
    assert!(is_illegal(engine.delete_from_turn(&mut owner(), id, 1)));
    assert!(is_illegal(engine.update_ranking(&owner(), id)));
    assert!(is_illegal(engine.save_match_results(&o, id, m.id, boards(3, 0))));
    assert!(is_illegal(engine.add_competitor(&owner(), id, "E")));
    assert_eq!(state(&engine, id), s);
}

#[test]
fn knockout_stops_after_log2_rounds() {
    let engine = engine();
    let settings = TournamentSettings {
        system: TournamentSystem::Knockout,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B", "C", "D"]);
    let t = engine.tournament(id).unwrap();
    let name = |cid| t.competitor(cid).map(|c| c.name.clone()).unwrap();

    let first = engine.new_turn(&mut owner(), id).unwrap();
    let pairs: Vec<(String, String)> = first
        .matches
        .iter()
        .map(|m| (name(m.competitor1_id), name(m.competitor2_id.unwrap())))
        .collect();
    assert_eq!(pairs, vec![("A".into(), "D".into()), ("B".into(), "C".into())]);
    assert!(is_illegal(engine.final_turn(&mut owner(), id)));
    score_round(&engine, id, 1);
    assert!(!engine.update_ranking(&owner(), id).unwrap().state.prized);

    let second = engine.new_turn(&mut owner(), id).unwrap();
    assert_eq!(second.matches.len(), 1);
    assert_eq!(name(second.matches[0].competitor1_id), "A");
    assert_eq!(second.matches[0].competitor2_id.map(name), Some("B".to_string()));
    score_round(&engine, id, 2);
    let s = engine.update_ranking(&owner(), id).unwrap().state;
    assert!(s.prized);
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
}

fn knockout(names: &[&str]) -> (TournamentRoundEngine, TournamentId) {
    let engine = engine();
    let settings = TournamentSettings {
        system: TournamentSystem::Knockout,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, names);
    (engine, id)
}

fn tied() -> MatchInput {
    MatchInput::Boards {
        boards: vec![BoardResult::new(5, 0, None), BoardResult::new(0, 5, None)],
    }
}

#[test]
fn knockout_tie_cannot_be_ranked() {
    let (engine, id) = knockout(&["A", "B", "C", "D"]);
    let first = engine.new_turn(&mut owner(), id).unwrap();
    engine.save_match_results(&owner(), id, first.matches[0].id, boards(10, 0)).unwrap();
    engine.save_match_results(&owner(), id, first.matches[1].id, tied()).unwrap();

    assert!(!engine.available_actions(&owner(), id).unwrap().update_ranking);
    assert!(is_illegal(engine.update_ranking(&owner(), id)));
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
    let s = state(&engine, id);
    assert_eq!((s.current_turn, s.ranked_turn), (1, 0));
}

#[test]
fn knockout_round_edited_into_a_tie_blocks_the_next_round() {
    let (engine, id) = knockout(&["A", "B", "C", "D"]);
    let first = engine.new_turn(&mut owner(), id).unwrap();
    score_round(&engine, id, 1);
    engine.update_ranking(&owner(), id).unwrap();
    assert!(engine.available_actions(&owner(), id).unwrap().new_turn);

    engine.save_match_results(&owner(), id, first.matches[1].id, tied()).unwrap();
    assert!(!engine.available_actions(&owner(), id).unwrap().new_turn);
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));
    assert_eq!(state(&engine, id).current_turn, 1);
}

#[test]
fn tied_knockout_final_does_not_prize_the_tournament() {
    let (engine, id) = knockout(&["A", "B", "C", "D"]);
    play_ranked_round(&engine, id);
    let last = engine.new_turn(&mut owner(), id).unwrap();
    let final_match = last.matches[0].id;
    engine.save_match_results(&owner(), id, final_match, tied()).unwrap();

    assert!(is_illegal(engine.update_ranking(&owner(), id)));
    let s = state(&engine, id);
    assert!(!s.prized && !s.read_only);
    assert_eq!(s.ranked_turn, 1);

    engine.save_match_results(&owner(), id, final_match, boards(0, 7)).unwrap();
    assert!(engine.update_ranking(&owner(), id).unwrap().state.prized);
}

#[test]
fn drawn_knockout_bracket_takes_no_new_competitors() {
    let (engine, id) = knockout(&["A", "B", "C", "D"]);
    engine.new_turn(&mut owner(), id).unwrap();
    assert!(is_illegal(engine.add_competitor(&owner(), id, "E")));
    assert_eq!(engine.tournament(id).unwrap().participant_count(), 4);

    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    play_ranked_round(&engine, id);
    let t = engine.add_competitor(&owner(), id, "E").unwrap();
    assert_eq!(t.participant_count(), 5);
}

#[test]
fn scoring_rules_that_cannot_finish_a_round_are_rejected() {
    let engine = engine();
    let rejected = [
        ScoringRules {
            phantom_score: 0,
            ..ScoringRules::default()
        },
        ScoringRules {
            score_cap: 0,
            ..ScoringRules::default()
        },
        ScoringRules {
            phantom_score: 30,
            ..ScoringRules::default()
        },
        ScoringRules {
            mode: ScoringMode::TrainingBoards { boards: 0 },
            ..ScoringRules::default()
        },
    ];
    for scoring in rejected {
        let settings = TournamentSettings {
            scoring,
            ..TournamentSettings::default()
        };
        assert!(matches!(
            engine.create_tournament(&owner(), settings),
            Err(TournamentError::InvalidScores(_))
        ));
    }
    assert!(engine.is_empty());

    let settings = TournamentSettings {
        scoring: ScoringRules {
            phantom_score: 13,
            ..ScoringRules::default()
        },
        ..TournamentSettings::default()
    };
    assert!(engine.create_tournament(&owner(), settings).is_ok());
}

#[test]
fn final_series_decide_the_podium() {
    let engine = engine();
    let settings = TournamentSettings {
        finals: true,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B", "C", "D"]);
    assert!(is_illegal(engine.final_turn(&mut owner(), id)));
    play_ranked_round(&engine, id);

    // Standings after round 1: A, C, B, D
    let first_final = engine.final_turn(&mut owner(), id).unwrap();
    assert_eq!(first_final.state.final_turns, 1);
    assert_eq!(first_final.matches.len(), 2);
    assert!(first_final.matches.iter().all(|m| m.is_final));
    assert!(is_illegal(engine.new_turn(&mut owner(), id)));

    // C wins the 1-2 series twice, B wins the 3-4 series twice.
    let play_finals = |turn: u32| {
        for m in engine.round_matches(id, turn).unwrap() {
            let input = if m.board == 1 { boards(0, 10) } else { boards(10, 0) };
            engine.save_match_results(&owner(), id, m.id, input).unwrap();
        }
    };
    play_finals(2);
    let s = engine.update_ranking(&owner(), id).unwrap().state;
    assert!(!s.prized);

    let second_final = engine.final_turn(&mut owner(), id).unwrap();
    assert_eq!(second_final.state.final_turns, 2);
    assert_eq!(second_final.matches.len(), 2);
    play_finals(3);
    let s = engine.update_ranking(&owner(), id).unwrap().state;
    assert!(s.prized);

    let names: Vec<String> = engine.standings(id).unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["C", "A", "B", "D"]);
}

#[test]
fn deleting_final_rounds_recounts_final_turns() {
    let engine = engine();
    let settings = TournamentSettings {
        finals: true,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B"]);
    play_ranked_round(&engine, id);
    engine.final_turn(&mut owner(), id).unwrap();
    score_round(&engine, id, 2);
    engine.update_ranking(&owner(), id).unwrap();
    assert_eq!(engine.final_turn(&mut owner(), id).unwrap().state.final_turns, 2);

    let s = engine.delete_from_turn(&mut owner(), id, 3).unwrap().state;
    assert_eq!((s.current_turn, s.ranked_turn, s.final_turns), (2, 2, 1));
    let s = engine.delete_from_turn(&mut owner(), id, 2).unwrap().state;
    assert_eq!((s.current_turn, s.ranked_turn, s.final_turns), (1, 1, 0));
    engine.new_turn(&mut owner(), id).unwrap();
}

struct BrokenPairing;

impl PairingGenerator for BrokenPairing {
    fn next_round(&self, _ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError> {
        Ok(vec![Pairing::new(Uuid::new_v4(), None)])
    }

    fn final_round(&self, _ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError> {
        Err(TournamentError::CommunicationError("pairing service unavailable".to_string()))
    }
}

#[test]
fn bad_pairings_do_not_advance_the_round() {
    let engine = TournamentRoundEngine::new(BrokenPairing);
    let settings = TournamentSettings {
        finals: true,
        ..TournamentSettings::default()
    };
    let id = setup(&engine, settings, &["A", "B"]);

    assert!(matches!(
        engine.new_turn(&mut owner(), id),
        Err(TournamentError::CommunicationError(_))
    ));
    let t = engine.tournament(id).unwrap();
    assert_eq!(t.state, RoundState::default());
    assert_eq!(t.transition_epoch, 0);
    assert!(engine.round_matches(id, 1).unwrap().is_empty());
}

#[test]
fn only_owner_and_admins_mutate() {
    let (engine, id) = swiss(&["A", "B"]);
    let mut bob = RequestContext::user("bob");
    let mut anonymous = RequestContext::anonymous();

    assert_eq!(engine.new_turn(&mut bob, id), Err(TournamentError::Unauthorized));
    assert_eq!(engine.new_turn(&mut anonymous, id), Err(TournamentError::Unauthorized));
    assert_eq!(engine.add_competitor(&bob, id, "C"), Err(TournamentError::Unauthorized));
    assert_eq!(
        engine.create_tournament(&anonymous, TournamentSettings::default()).map(|t| t.id),
        Err(TournamentError::Unauthorized)
    );

    let mut admin = RequestContext::admin("root");
    assert_eq!(engine.new_turn(&mut admin, id).unwrap().state.current_turn, 1);
}

#[test]
fn unknown_ids_are_not_found() {
    let (engine, id) = swiss(&["A", "B"]);
    let missing = Uuid::new_v4();
    assert_eq!(
        engine.new_turn(&mut owner(), missing),
        Err(TournamentError::TournamentNotFound(missing))
    );
    assert_eq!(
        engine.save_match_results(&owner(), id, missing, boards(1, 0)),
        Err(TournamentError::MatchNotFound(missing))
    );
    assert_eq!(
        engine.match_at_board(id, 1, 1),
        Err(TournamentError::BoardNotFound { turn: 1, board: 1 })
    );
}

#[test]
fn competitors_are_fixed_once_play_starts() {
    let (engine, id) = swiss(&["A", "B"]);
    assert_eq!(
        engine.add_competitor(&owner(), id, " a "),
        Err(TournamentError::DuplicateCompetitorName)
    );
    let extra = engine.add_competitor(&owner(), id, "C").unwrap();
    let c = extra.competitors.last().unwrap().id;
    engine.remove_competitor(&owner(), id, c).unwrap();
    engine.new_turn(&mut owner(), id).unwrap();
    let a = engine.tournament(id).unwrap().competitors[0].id;
    assert!(is_illegal(engine.remove_competitor(&owner(), id, a)));
}

#[test]
fn available_actions_follow_the_state() {
    let (engine, id) = swiss(&["A", "B", "C", "D"]);
    let actions = engine.available_actions(&owner(), id).unwrap();
    assert!(actions.new_turn);
    assert!(!actions.final_turn);
    assert!(!actions.delete_current_turn);
    assert!(!actions.edit_current_turn);

    engine.new_turn(&mut owner(), id).unwrap();
    let actions = engine.available_actions(&owner(), id).unwrap();
    assert!(!actions.new_turn);
    assert!(!actions.update_ranking);
    assert!(actions.delete_current_turn);
    assert!(actions.edit_current_turn);
    assert!(!actions.allow_edit_previous_turns);

    score_round(&engine, id, 1);
    assert!(engine.available_actions(&owner(), id).unwrap().update_ranking);

    let visitor = engine
        .available_actions(&RequestContext::user("bob"), id)
        .unwrap();
    assert_eq!(visitor, Default::default());
}

#[test]
fn ranked_turn_never_exceeds_current_turn() {
    let (engine, id) = swiss(&["A", "B", "C", "D", "E"]);
    let check = |engine: &TournamentRoundEngine| {
        let s = state(engine, id);
        assert!(s.ranked_turn <= s.current_turn);
    };
    for _ in 0..3 {
        play_ranked_round(&engine, id);
        check(&engine);
    }
    engine.new_turn(&mut owner(), id).unwrap();
    check(&engine);
    engine.delete_from_turn(&mut owner(), id, 3).unwrap();
    check(&engine);
    let _ = engine.update_ranking(&owner(), id);
    check(&engine);
}

#[test]
fn idle_tournaments_are_evicted() {
    let (engine, _id) = swiss(&["A"]);
    assert_eq!(engine.evict_idle(std::time::Duration::from_secs(3600)), 0);
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.evict_idle(std::time::Duration::ZERO), 1);
    assert!(engine.is_empty());
}
