//! Results of engine operations and their wire envelopes.

use crate::models::match_record::MatchRecord;
use crate::models::tournament::{RoundState, TournamentError};
use serde::{Deserialize, Serialize};

/// What a transition returns: the new round state and the matches it touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub state: RoundState,
    /// Newly created pairings, surviving or edited matches; empty on a pure ranking recompute.
    pub matches: Vec<MatchRecord>,
}

/// `{success: true, currentTurn, rankedTurn, finalTurns, prized, matches}`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub success: bool,
    pub current_turn: u32,
    pub ranked_turn: u32,
    pub final_turns: u32,
    pub prized: bool,
    pub matches: Vec<MatchRecord>,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            success: true,
            current_turn: outcome.state.current_turn,
            ranked_turn: outcome.state.ranked_turn,
            final_turns: outcome.state.final_turns,
            prized: outcome.state.prized,
            matches: outcome.matches,
        }
    }
}

/// `{success: false, message}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl From<&TournamentError> for ErrorResponse {
    fn from(e: &TournamentError) -> Self {
        Self {
            success: false,
            message: e.to_string(),
        }
    }
}
