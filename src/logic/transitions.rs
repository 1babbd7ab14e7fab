//! Legality of round transitions: one pure predicate per transition.
//!
//! The engine calls these before mutating anything, and `available_actions` reuses them so the
//! client never enables an action the server would refuse.

use crate::logic::context::RequestContext;
use crate::logic::ranking::{final_series, MAX_FINAL_TURNS};
use crate::models::{MatchRecord, Tournament, TournamentError, TournamentSystem};
use serde::Serialize;

fn check_writable(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.state.prized {
        return Err(TournamentError::illegal("tournament is prized"));
    }
    if tournament.state.read_only {
        return Err(TournamentError::illegal("tournament is read-only"));
    }
    Ok(())
}

/// `2^turns < participants`: a knockout bracket still has rounds to play.
fn knockout_rounds_left(turns: u32, participants: usize) -> bool {
    1u64.checked_shl(turns)
        .map_or(false, |played| played < participants as u64)
}

/// A knockout round needs a winner on every real board before anyone can advance.
fn check_knockout_winners(tournament: &Tournament, round: &[&MatchRecord]) -> Result<(), TournamentError> {
    if tournament.system != TournamentSystem::Knockout {
        return Ok(());
    }
    match round
        .iter()
        .find(|m| !m.is_phantom() && m.is_scored() && m.winner().is_none())
    {
        Some(m) => Err(TournamentError::illegal(format!(
            "knockout match on board {} has no winner",
            m.board
        ))),
        None => Ok(()),
    }
}

/// OpenNextRound. `history` is every match of the tournament.
pub fn check_new_turn(tournament: &Tournament, history: &[&MatchRecord]) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    let state = &tournament.state;
    if state.has_pending_round() {
        return Err(TournamentError::illegal(format!(
            "round {} is not ranked yet",
            state.current_turn
        )));
    }
    if tournament.participant_count() == 0 {
        return Err(TournamentError::illegal("no competitors"));
    }
    if state.final_turns > 0 {
        return Err(TournamentError::illegal("the final phase has started"));
    }
    if tournament.system == TournamentSystem::Knockout
        && !knockout_rounds_left(state.current_turn, tournament.participant_count())
    {
        return Err(TournamentError::illegal("the knockout bracket is complete"));
    }
    let previous: Vec<&MatchRecord> = history
        .iter()
        .copied()
        .filter(|m| m.turn == state.current_turn)
        .collect();
    check_knockout_winners(tournament, &previous)
}

/// OpenFinalRound. `history` is every match of the tournament.
pub fn check_final_turn(tournament: &Tournament, history: &[&MatchRecord]) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    let state = &tournament.state;
    if !tournament.finals {
        return Err(TournamentError::illegal("no final phase configured"));
    }
    if tournament.system == TournamentSystem::Knockout {
        return Err(TournamentError::illegal("knockout tournaments have no final rounds"));
    }
    if state.has_pending_round() {
        return Err(TournamentError::illegal(format!(
            "round {} is not ranked yet",
            state.current_turn
        )));
    }
    if state.current_turn == 0 {
        return Err(TournamentError::illegal("play at least one round before the finals"));
    }
    if tournament.participant_count() < 2 {
        return Err(TournamentError::illegal("finals need at least two competitors"));
    }
    if state.final_turns > 0 {
        let undecided = final_series(history).iter().any(|s| !s.is_decided());
        if !undecided || state.final_turns >= MAX_FINAL_TURNS {
            return Err(TournamentError::illegal("the finals are decided"));
        }
    }
    Ok(())
}

/// RecomputeRanking. `current_round` is the matches of the current turn; a tied knockout
/// match has to be replayed before the round can be ranked.
pub fn check_update_ranking(
    tournament: &Tournament,
    current_round: &[&MatchRecord],
) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    let boards: Vec<u32> = current_round
        .iter()
        .filter(|m| !m.is_scored())
        .map(|m| m.board)
        .collect();
    if !boards.is_empty() {
        return Err(TournamentError::IncompleteScores { boards });
    }
    check_knockout_winners(tournament, current_round)
}

/// DeleteFromTurn.
pub fn check_delete_from_turn(tournament: &Tournament, turn: u32) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    if turn == 0 {
        return Err(TournamentError::illegal("turns start at 1"));
    }
    if turn > tournament.state.current_turn {
        return Err(TournamentError::illegal(format!(
            "round {} does not exist",
            turn
        )));
    }
    Ok(())
}

/// EditMatchResult.
pub fn check_edit_match(
    tournament: &Tournament,
    m: &MatchRecord,
    ctx: &RequestContext,
) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    if m.is_phantom() {
        return Err(TournamentError::illegal("phantom matches cannot be edited"));
    }
    let current = tournament.state.current_turn;
    if m.turn == current || (m.turn < current && ctx.may_edit_previous_turns(tournament)) {
        return Ok(());
    }
    Err(TournamentError::illegal(format!(
        "round {} is not the current round",
        m.turn
    )))
}

/// AllowEditPreviousTurns: only meaningful once a previous round exists.
pub fn check_allow_edit_previous_turns(tournament: &Tournament) -> Result<(), TournamentError> {
    check_writable(tournament)?;
    if tournament.state.current_turn < 2 {
        return Err(TournamentError::illegal("there are no previous rounds"));
    }
    Ok(())
}

/// Whether every round of the format has been played and ranked.
pub fn format_complete(tournament: &Tournament, history: &[&MatchRecord]) -> bool {
    let state = &tournament.state;
    if state.current_turn == 0 || state.has_pending_round() {
        return false;
    }
    match tournament.system {
        TournamentSystem::Knockout => {
            !knockout_rounds_left(state.current_turn, tournament.participant_count())
        }
        TournamentSystem::Swiss if tournament.finals => {
            let series = final_series(history);
            state.final_turns > 0 && !series.is_empty() && series.iter().all(|s| s.is_decided())
        }
        TournamentSystem::Swiss => tournament.duration > 0 && state.current_turn >= tournament.duration,
    }
}

/// Which actions the client should enable, derived from the same predicates the engine enforces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableActions {
    pub new_turn: bool,
    pub final_turn: bool,
    pub update_ranking: bool,
    pub delete_current_turn: bool,
    pub edit_current_turn: bool,
    pub allow_edit_previous_turns: bool,
    pub edit_previous_turns: bool,
}

pub fn available_actions(
    tournament: &Tournament,
    history: &[&MatchRecord],
    ctx: &RequestContext,
) -> AvailableActions {
    if !ctx.may_mutate(tournament) {
        return AvailableActions::default();
    }
    let current = tournament.state.current_turn;
    let current_round: Vec<&MatchRecord> = history
        .iter()
        .copied()
        .filter(|m| m.turn == current)
        .collect();
    let writable = check_writable(tournament).is_ok();
    AvailableActions {
        new_turn: check_new_turn(tournament, history).is_ok(),
        final_turn: check_final_turn(tournament, history).is_ok(),
        update_ranking: check_update_ranking(tournament, &current_round).is_ok(),
        delete_current_turn: check_delete_from_turn(tournament, current).is_ok(),
        edit_current_turn: writable && current > 0,
        allow_edit_previous_turns: check_allow_edit_previous_turns(tournament).is_ok(),
        edit_previous_turns: writable && ctx.may_edit_previous_turns(tournament),
    }
}
