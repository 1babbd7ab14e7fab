//! Tournament round engine: every round transition, one tournament at a time.
//!
//! Each tournament lives in its own slot behind a mutex, so operations on the same tournament
//! are serialized while different tournaments proceed in parallel. Every operation checks
//! authorization and legality first, stages its work, and only then commits; a failure leaves
//! the tournament exactly as it was.

use crate::logic::context::{EditOverride, RequestContext};
use crate::logic::export::round_csv;
use crate::logic::pairing::{validate_pairings, PairingContext, PairingGenerator, StandardPairing};
use crate::logic::ranking::compute_standings;
use crate::logic::scoring::ScoreValidator;
use crate::logic::transitions::{
    available_actions, check_allow_edit_previous_turns, check_delete_from_turn, check_edit_match,
    check_final_turn, check_new_turn, check_update_ranking, format_complete, AvailableActions,
};
use crate::models::{
    CompetitorId, MatchId, MatchInput, MatchRecord, MatchStore, Standing, Tournament,
    TournamentError, TournamentId, TournamentSettings, TransitionOutcome,
};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// One tournament with its matches and last activity time (for idle eviction).
struct TournamentSlot {
    tournament: Tournament,
    matches: MatchStore,
    last_activity: Instant,
}

/// Orchestrates round creation, final rounds, deletion, ranking and match edits.
pub struct TournamentRoundEngine<P = StandardPairing> {
    pairing: P,
    tournaments: RwLock<HashMap<TournamentId, Arc<Mutex<TournamentSlot>>>>,
}

impl Default for TournamentRoundEngine<StandardPairing> {
    fn default() -> Self {
        Self::new(StandardPairing::default())
    }
}

fn authorize(ctx: &RequestContext, tournament: &Tournament) -> Result<(), TournamentError> {
    if ctx.may_mutate(tournament) {
        Ok(())
    } else {
        Err(TournamentError::Unauthorized)
    }
}

fn refused(op: &str, id: TournamentId, e: TournamentError) -> TournamentError {
    log::debug!("{} refused for tournament {}: {}", op, id, e);
    e
}

impl<P: PairingGenerator> TournamentRoundEngine<P> {
    pub fn new(pairing: P) -> Self {
        Self {
            pairing,
            tournaments: RwLock::new(HashMap::new()),
        }
    }

    /// Run `f` on the tournament's slot while holding its lock. Touching a slot refreshes its activity.
    fn with_slot<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut TournamentSlot) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let slot = self
            .tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))?;
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.last_activity = Instant::now();
        f(&mut *slot)
    }

    /// Create a tournament owned by the acting user.
    pub fn create_tournament(
        &self,
        ctx: &RequestContext,
        settings: TournamentSettings,
    ) -> Result<Tournament, TournamentError> {
        let owner = ctx.actor.clone().ok_or(TournamentError::Unauthorized)?;
        settings.scoring.check()?;
        let tournament = Tournament::new(settings, owner);
        let snapshot = tournament.clone();
        self.tournaments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                tournament.id,
                Arc::new(Mutex::new(TournamentSlot {
                    tournament,
                    matches: MatchStore::new(),
                    last_activity: Instant::now(),
                })),
            );
        log::info!("Created tournament {} ({}) for {}", snapshot.id, snapshot.name, snapshot.owner);
        Ok(snapshot)
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_slot(id, |slot| Ok(slot.tournament.clone()))
    }

    pub fn add_competitor(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
        name: &str,
    ) -> Result<Tournament, TournamentError> {
        self.with_slot(id, |slot| {
            authorize(ctx, &slot.tournament)?;
            slot.tournament.add_competitor(name)?;
            Ok(slot.tournament.clone())
        })
    }

    pub fn remove_competitor(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
        competitor_id: CompetitorId,
    ) -> Result<Tournament, TournamentError> {
        self.with_slot(id, |slot| {
            authorize(ctx, &slot.tournament)?;
            slot.tournament.remove_competitor(competitor_id)?;
            Ok(slot.tournament.clone())
        })
    }

    /// What the client should enable for this caller right now.
    pub fn available_actions(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
    ) -> Result<AvailableActions, TournamentError> {
        self.with_slot(id, |slot| {
            let history = slot.matches.all(id);
            Ok(available_actions(&slot.tournament, &history, ctx))
        })
    }

    pub fn standings(&self, id: TournamentId) -> Result<Vec<Standing>, TournamentError> {
        self.with_slot(id, |slot| Ok(slot.tournament.standings.clone()))
    }

    pub fn round_matches(&self, id: TournamentId, turn: u32) -> Result<Vec<MatchRecord>, TournamentError> {
        self.with_slot(id, |slot| {
            Ok(slot.matches.round(id, turn).into_iter().cloned().collect())
        })
    }

    pub fn match_at_board(
        &self,
        id: TournamentId,
        turn: u32,
        board: u32,
    ) -> Result<MatchRecord, TournamentError> {
        self.with_slot(id, |slot| {
            slot.matches
                .at_board(id, turn, board)
                .cloned()
                .ok_or(TournamentError::BoardNotFound { turn, board })
        })
    }

    pub fn export_round_csv(&self, id: TournamentId, turn: u32) -> Result<String, TournamentError> {
        self.with_slot(id, |slot| round_csv(&slot.tournament, &slot.matches.round(id, turn)))
    }

    /// Open the next regular round (OpenNextRound).
    pub fn new_turn(
        &self,
        ctx: &mut RequestContext,
        id: TournamentId,
    ) -> Result<TransitionOutcome, TournamentError> {
        self.open_round(ctx, id, false)
    }

    /// Open a final round (OpenFinalRound).
    pub fn final_turn(
        &self,
        ctx: &mut RequestContext,
        id: TournamentId,
    ) -> Result<TransitionOutcome, TournamentError> {
        self.open_round(ctx, id, true)
    }

    fn open_round(
        &self,
        ctx: &mut RequestContext,
        id: TournamentId,
        is_final: bool,
    ) -> Result<TransitionOutcome, TournamentError> {
        let op = if is_final { "final_turn" } else { "new_turn" };
        self.with_slot(id, |slot| {
            let TournamentSlot {
                tournament,
                matches,
                ..
            } = slot;
            authorize(ctx, tournament)?;
            let history = matches.all(id);
            let legal = if is_final {
                check_final_turn(tournament, &history)
            } else {
                check_new_turn(tournament, &history)
            };
            legal.map_err(|e| refused(op, id, e))?;

            let turn = tournament.state.current_turn + 1;
            let pctx = PairingContext {
                tournament: &*tournament,
                history: &history,
                turn,
            };
            let pairings = if is_final {
                self.pairing.final_round(&pctx)
            } else {
                self.pairing.next_round(&pctx)
            }
            .map_err(|e| refused(op, id, e))?;
            validate_pairings(tournament, &pairings).map_err(|e| refused(op, id, e))?;

            let phantom_score = tournament.scoring.phantom_score;
            let records: Vec<MatchRecord> = pairings
                .iter()
                .zip(1u32..)
                .map(|(p, board)| {
                    let mut m = MatchRecord::new(id, turn, board, p.competitor1, p.competitor2, phantom_score);
                    m.is_final = is_final;
                    m
                })
                .collect();

            matches.insert_round(records.clone());
            tournament.state.current_turn = turn;
            if is_final {
                tournament.state.final_turns += 1;
            }
            tournament.transition_epoch += 1;
            ctx.edit_override = None;
            log::info!(
                "Tournament {}: opened {}round {} with {} match(es)",
                id,
                if is_final { "final " } else { "" },
                turn,
                records.len()
            );
            Ok(TransitionOutcome {
                state: tournament.state,
                matches: records,
            })
        })
    }

    /// Score the current round into standings (RecomputeRanking).
    pub fn update_ranking(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
    ) -> Result<TransitionOutcome, TournamentError> {
        self.with_slot(id, |slot| {
            let TournamentSlot {
                tournament,
                matches,
                ..
            } = slot;
            authorize(ctx, tournament)?;
            let current = tournament.state.current_turn;
            check_update_ranking(tournament, &matches.round(id, current))
                .map_err(|e| refused("update_ranking", id, e))?;

            let history = matches.up_to(id, current);
            tournament.standings = compute_standings(tournament, &history);
            tournament.state.ranked_turn = current;
            if format_complete(tournament, &history) {
                tournament.state.prized = true;
                tournament.state.read_only = true;
                log::info!("Tournament {}: all rounds played, results are final", id);
            }
            log::info!("Tournament {}: ranking updated through round {}", id, current);
            Ok(TransitionOutcome {
                state: tournament.state,
                matches: Vec::new(),
            })
        })
    }

    /// Delete round `from_turn` and every later round (DeleteFromTurn). Returns the removed matches.
    pub fn delete_from_turn(
        &self,
        ctx: &mut RequestContext,
        id: TournamentId,
        from_turn: u32,
    ) -> Result<TransitionOutcome, TournamentError> {
        self.with_slot(id, |slot| {
            let TournamentSlot {
                tournament,
                matches,
                ..
            } = slot;
            authorize(ctx, tournament)?;
            check_delete_from_turn(tournament, from_turn)
                .map_err(|e| refused("delete_from_turn", id, e))?;

            let removed = matches.remove_from_turn(id, from_turn);
            let state = &mut tournament.state;
            state.current_turn = from_turn - 1;
            state.ranked_turn = state.ranked_turn.min(state.current_turn);
            state.final_turns = matches
                .all(id)
                .iter()
                .filter(|m| m.is_final)
                .map(|m| m.turn)
                .collect::<BTreeSet<u32>>()
                .len() as u32;
            state.prized = false;
            state.read_only = false;
            let ranked = state.ranked_turn;
            tournament.standings = if ranked == 0 {
                Vec::new()
            } else {
                compute_standings(tournament, &matches.up_to(id, ranked))
            };
            tournament.transition_epoch += 1;
            ctx.edit_override = None;
            log::info!(
                "Tournament {}: deleted rounds from {} ({} match(es) removed)",
                id,
                from_turn,
                removed.len()
            );
            Ok(TransitionOutcome {
                state: tournament.state,
                matches: removed,
            })
        })
    }

    /// Store a match result (EditMatchResult). Returns the edited match.
    ///
    /// Editing an already ranked round refreshes the standings, but later rounds keep their pairings.
    pub fn save_match_results(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
        match_id: MatchId,
        input: MatchInput,
    ) -> Result<TransitionOutcome, TournamentError> {
        self.with_slot(id, |slot| {
            let TournamentSlot {
                tournament,
                matches,
                ..
            } = slot;
            authorize(ctx, tournament)?;
            let existing = matches
                .get(match_id)
                .filter(|m| m.tournament_id == id)
                .ok_or(TournamentError::MatchNotFound(match_id))?;
            check_edit_match(tournament, existing, ctx).map_err(|e| refused("save_match_results", id, e))?;
            let (score1, score2) = ScoreValidator::new(tournament.scoring)
                .validate(&input)?
                .unwrap_or((0, 0));

            let record = matches
                .get_mut(match_id)
                .ok_or(TournamentError::MatchNotFound(match_id))?;
            record.score1 = score1;
            record.score2 = score2;
            record.input = Some(input);
            record.modified = Some(Utc::now());
            let edited = record.clone();

            let ranked = tournament.state.ranked_turn;
            if edited.turn <= ranked {
                tournament.standings = compute_standings(tournament, &matches.up_to(id, ranked));
                log::info!(
                    "Tournament {}: edited ranked round {}, standings refreshed",
                    id,
                    edited.turn
                );
            }
            log::debug!(
                "Tournament {}: board {} of round {} is now {}-{}",
                id,
                edited.board,
                edited.turn,
                score1,
                score2
            );
            Ok(TransitionOutcome {
                state: tournament.state,
                matches: vec![edited],
            })
        })
    }

    /// Grant the caller a one-time permission to edit rounds before the current one.
    pub fn allow_edit_previous_turns(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
    ) -> Result<EditOverride, TournamentError> {
        self.with_slot(id, |slot| {
            authorize(ctx, &slot.tournament)?;
            check_allow_edit_previous_turns(&slot.tournament)?;
            log::info!(
                "Tournament {}: {} may edit previous rounds",
                id,
                ctx.actor.as_deref().unwrap_or_default()
            );
            Ok(EditOverride {
                tournament_id: id,
                epoch: slot.tournament.transition_epoch,
            })
        })
    }

    /// Drop tournaments idle for at least `timeout`. Returns how many were removed.
    pub fn evict_idle(&self, timeout: Duration) -> usize {
        let mut g = self.tournaments.write().unwrap_or_else(PoisonError::into_inner);
        let before = g.len();
        g.retain(|_, slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last_activity
                .elapsed()
                < timeout
        });
        before - g.len()
    }

    pub fn len(&self) -> usize {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
