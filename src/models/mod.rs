//! Data structures for the tournament: competitors, matches, round state, standings.

mod competitor;
mod match_record;
mod response;
mod standing;
mod store;
mod tournament;

pub use competitor::{Competitor, CompetitorId};
pub use match_record::{BoardResult, MatchId, MatchInput, MatchRecord, Side, TrainingBoard};
pub use response::{ErrorResponse, TransitionOutcome, TransitionResponse};
pub use standing::Standing;
pub use store::MatchStore;
pub use tournament::{
    RoundState, ScoringMode, ScoringRules, Tournament, TournamentError, TournamentId,
    TournamentSettings, TournamentSystem,
};
