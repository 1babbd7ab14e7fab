//! CSV export of one round, for printing or spreadsheets.

use crate::models::{MatchRecord, Tournament, TournamentError};
use serde::Serialize;

#[derive(Serialize)]
struct RoundRow<'a> {
    turn: u32,
    board: u32,
    competitor1: &'a str,
    competitor2: &'a str,
    score1: u32,
    score2: u32,
    #[serde(rename = "final")]
    is_final: bool,
}

const PHANTOM_NAME: &str = "Phantom";

/// One row per match, in board order. The phantom side is written as "Phantom".
pub fn round_csv(tournament: &Tournament, round: &[&MatchRecord]) -> Result<String, TournamentError> {
    let name = |id| {
        tournament
            .competitor(id)
            .map(|c| c.name.as_str())
            .unwrap_or_default()
    };
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for m in round {
        wtr.serialize(RoundRow {
            turn: m.turn,
            board: m.board,
            competitor1: name(m.competitor1_id),
            competitor2: m.competitor2_id.map(name).unwrap_or(PHANTOM_NAME),
            score1: m.score1,
            score2: m.score2,
            is_final: m.is_final,
        })
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::Export(e.to_string()))
}
