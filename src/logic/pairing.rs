//! Pairing generation: who plays whom in the next round.
//!
//! The engine treats the generator as an external collaborator and validates what it returns.

use crate::logic::ranking::final_series;
use crate::models::{CompetitorId, MatchRecord, Tournament, TournamentError, TournamentSystem};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// One pairing of a new round. `competitor2 == None` is a phantom (bye).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pairing {
    pub competitor1: CompetitorId,
    pub competitor2: Option<CompetitorId>,
}

impl Pairing {
    pub fn new(competitor1: CompetitorId, competitor2: Option<CompetitorId>) -> Self {
        Self {
            competitor1,
            competitor2,
        }
    }
}

/// Everything a generator may look at.
pub struct PairingContext<'a> {
    pub tournament: &'a Tournament,
    /// Every match played so far, by turn then board.
    pub history: &'a [&'a MatchRecord],
    /// Turn being paired.
    pub turn: u32,
}

impl PairingContext<'_> {
    fn have_met(&self, a: CompetitorId, b: CompetitorId) -> bool {
        self.history
            .iter()
            .any(|m| m.involves(a) && m.competitor2_id.is_some() && m.involves(b))
    }

    fn had_bye(&self, id: CompetitorId) -> bool {
        self.history
            .iter()
            .any(|m| m.is_phantom() && m.competitor1_id == id)
    }
}

/// Produces the pairings of a new round.
pub trait PairingGenerator: Send + Sync {
    fn next_round(&self, ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError>;

    fn final_round(&self, ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError>;
}

/// Order of competitors before any standings exist.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FirstRoundOrder {
    /// Registration order doubles as seeding.
    Registration,
    #[default]
    Shuffled,
}

/// Swiss, knockout and best-of-three finals.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPairing {
    pub first_round: FirstRoundOrder,
}

impl StandardPairing {
    pub fn new(first_round: FirstRoundOrder) -> Self {
        Self { first_round }
    }

    fn seeds(&self, tournament: &Tournament) -> Vec<CompetitorId> {
        let mut seeds: Vec<CompetitorId> = tournament.competitors.iter().map(|c| c.id).collect();
        if self.first_round == FirstRoundOrder::Shuffled {
            seeds.shuffle(&mut rand::thread_rng());
        }
        seeds
    }

    /// Standings order, with competitors registered after the last ranking appended.
    fn ranked_order(tournament: &Tournament) -> Vec<CompetitorId> {
        let mut order: Vec<CompetitorId> = tournament
            .standings
            .iter()
            .map(|s| s.competitor_id)
            .filter(|id| tournament.competitor(*id).is_some())
            .collect();
        for c in &tournament.competitors {
            if !order.contains(&c.id) {
                order.push(c.id);
            }
        }
        order
    }

    fn swiss(&self, ctx: &PairingContext<'_>) -> Vec<Pairing> {
        let mut pool = if ctx.turn <= 1 {
            self.seeds(ctx.tournament)
        } else {
            Self::ranked_order(ctx.tournament)
        };

        let bye = if pool.len() % 2 == 1 {
            let idx = pool
                .iter()
                .rposition(|id| !ctx.had_bye(*id))
                .unwrap_or(pool.len() - 1);
            Some(pool.remove(idx))
        } else {
            None
        };

        let mut pairings = Vec::with_capacity(pool.len() / 2 + 1);
        while !pool.is_empty() {
            let a = pool.remove(0);
            if pool.is_empty() {
                pairings.push(Pairing::new(a, None));
                break;
            }
            let j = pool.iter().position(|b| !ctx.have_met(a, *b)).unwrap_or(0);
            let b = pool.remove(j);
            pairings.push(Pairing::new(a, Some(b)));
        }
        if let Some(bye) = bye {
            pairings.push(Pairing::new(bye, None));
        }
        pairings
    }

    fn knockout(&self, ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError> {
        if ctx.turn <= 1 {
            let mut seeds = self.seeds(ctx.tournament);
            let bye = if seeds.len() % 2 == 1 {
                Some(seeds.remove(0))
            } else {
                None
            };
            let n = seeds.len();
            let mut pairings: Vec<Pairing> = (0..n / 2)
                .map(|i| Pairing::new(seeds[i], Some(seeds[n - 1 - i])))
                .collect();
            if let Some(bye) = bye {
                pairings.push(Pairing::new(bye, None));
            }
            return Ok(pairings);
        }

        let previous: Vec<&&MatchRecord> = ctx
            .history
            .iter()
            .filter(|m| m.turn == ctx.turn - 1)
            .collect();
        let mut winners = Vec::with_capacity(previous.len());
        for m in previous {
            let winner = if m.is_phantom() {
                m.competitor1_id
            } else {
                m.winner()
                    .and_then(|side| m.competitor(side))
                    .ok_or_else(|| {
                        TournamentError::illegal(format!(
                            "knockout match on board {} has no winner",
                            m.board
                        ))
                    })?
            };
            winners.push(winner);
        }
        Ok(winners
            .chunks(2)
            .map(|pair| Pairing::new(pair[0], pair.get(1).copied()))
            .collect())
    }
}

impl PairingGenerator for StandardPairing {
    fn next_round(&self, ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError> {
        match ctx.tournament.system {
            TournamentSystem::Swiss => Ok(self.swiss(ctx)),
            TournamentSystem::Knockout => self.knockout(ctx),
        }
    }

    fn final_round(&self, ctx: &PairingContext<'_>) -> Result<Vec<Pairing>, TournamentError> {
        let series = final_series(ctx.history);
        if !series.is_empty() {
            return Ok(series
                .iter()
                .filter(|s| !s.is_decided())
                .map(|s| Pairing::new(s.competitor1, Some(s.competitor2)))
                .collect());
        }

        let order = Self::ranked_order(ctx.tournament);
        if order.len() < 2 {
            return Err(TournamentError::illegal("finals need at least two competitors"));
        }
        let mut pairings = vec![Pairing::new(order[0], Some(order[1]))];
        if order.len() >= 4 {
            pairings.push(Pairing::new(order[2], Some(order[3])));
        }
        Ok(pairings)
    }
}

/// Check generator output against the tournament before anything is committed.
pub(crate) fn validate_pairings(
    tournament: &Tournament,
    pairings: &[Pairing],
) -> Result<(), TournamentError> {
    if pairings.is_empty() {
        return Err(TournamentError::CommunicationError(
            "pairing generator returned no pairings".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for p in pairings {
        for id in std::iter::once(p.competitor1).chain(p.competitor2) {
            if tournament.competitor(id).is_none() {
                return Err(TournamentError::CommunicationError(format!(
                    "pairing references unknown competitor {}",
                    id
                )));
            }
            if !seen.insert(id) {
                return Err(TournamentError::CommunicationError(format!(
                    "competitor {} is paired twice",
                    id
                )));
            }
        }
    }
    Ok(())
}
