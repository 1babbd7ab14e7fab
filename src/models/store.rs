//! MatchStore: keyed match container with round and board indexes.

use crate::models::match_record::{MatchId, MatchRecord};
use crate::models::tournament::TournamentId;
use std::collections::{BTreeMap, HashMap};

/// Matches by id, indexed by `(tournament, turn)` and `(tournament, turn, board)`.
///
/// Only the engine writes to it; readers get shared references or clones.
#[derive(Clone, Debug, Default)]
pub struct MatchStore {
    matches: HashMap<MatchId, MatchRecord>,
    by_turn: BTreeMap<(TournamentId, u32), Vec<MatchId>>,
    by_board: HashMap<(TournamentId, u32, u32), MatchId>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, id: MatchId) -> Option<&MatchRecord> {
        self.matches.get(&id)
    }

    /// Matches of one round, ordered by board.
    pub fn round(&self, tournament_id: TournamentId, turn: u32) -> Vec<&MatchRecord> {
        let mut round: Vec<&MatchRecord> = self
            .by_turn
            .get(&(tournament_id, turn))
            .map(|ids| ids.iter().filter_map(|id| self.matches.get(id)).collect())
            .unwrap_or_default();
        round.sort_by_key(|m| m.board);
        round
    }

    pub fn at_board(&self, tournament_id: TournamentId, turn: u32, board: u32) -> Option<&MatchRecord> {
        self.by_board
            .get(&(tournament_id, turn, board))
            .and_then(|id| self.matches.get(id))
    }

    /// Every match of a tournament with `turn <= up_to`, by turn then board.
    pub fn up_to(&self, tournament_id: TournamentId, up_to: u32) -> Vec<&MatchRecord> {
        if up_to == 0 {
            return Vec::new();
        }
        self.by_turn
            .range((tournament_id, 1)..=(tournament_id, up_to))
            .flat_map(|(&(_, turn), _)| self.round(tournament_id, turn))
            .collect()
    }

    /// Every match of a tournament.
    pub fn all(&self, tournament_id: TournamentId) -> Vec<&MatchRecord> {
        self.up_to(tournament_id, u32::MAX)
    }

    pub(crate) fn get_mut(&mut self, id: MatchId) -> Option<&mut MatchRecord> {
        self.matches.get_mut(&id)
    }

    /// Insert a freshly paired round.
    pub(crate) fn insert_round(&mut self, matches: Vec<MatchRecord>) {
        for m in matches {
            self.by_turn
                .entry((m.tournament_id, m.turn))
                .or_default()
                .push(m.id);
            self.by_board.insert((m.tournament_id, m.turn, m.board), m.id);
            self.matches.insert(m.id, m);
        }
    }

    /// Remove every match of the tournament with `turn >= from_turn`. Returns the removed matches.
    pub(crate) fn remove_from_turn(&mut self, tournament_id: TournamentId, from_turn: u32) -> Vec<MatchRecord> {
        let turns: Vec<u32> = self
            .by_turn
            .range((tournament_id, from_turn)..=(tournament_id, u32::MAX))
            .map(|(&(_, turn), _)| turn)
            .collect();
        let mut removed = Vec::new();
        for turn in turns {
            for id in self.by_turn.remove(&(tournament_id, turn)).unwrap_or_default() {
                if let Some(m) = self.matches.remove(&id) {
                    self.by_board.remove(&(tournament_id, m.turn, m.board));
                    removed.push(m);
                }
            }
        }
        removed
    }
}
