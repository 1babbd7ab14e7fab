//! Tournament business logic: scoring, transitions, pairing, ranking and the round engine.

mod context;
mod engine;
mod export;
mod pairing;
mod ranking;
mod scoring;
mod transitions;

pub use context::{EditOverride, RequestContext};
pub use engine::TournamentRoundEngine;
pub use export::round_csv;
pub use pairing::{FirstRoundOrder, Pairing, PairingContext, PairingGenerator, StandardPairing};
pub use ranking::{compute_standings, final_series, FinalSeries, FINAL_SERIES_WINS, MAX_FINAL_TURNS};
pub use scoring::ScoreValidator;
pub use transitions::{
    available_actions, check_allow_edit_previous_turns, check_delete_from_turn, check_edit_match,
    check_final_turn, check_new_turn, check_update_ranking, format_complete, AvailableActions,
};
