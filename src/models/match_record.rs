//! MatchRecord, per-board inputs, and Side.

use crate::models::competitor::CompetitorId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

/// One board in bonus-coin mode: coins pocketed by each side and who covered the queen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardResult {
    pub coins1: u32,
    pub coins2: u32,
    #[serde(default)]
    pub queen: Option<Side>,
}

impl BoardResult {
    pub fn new(coins1: u32, coins2: u32, queen: Option<Side>) -> Self {
        Self {
            coins1,
            coins2,
            queen,
        }
    }
}

/// One board in training mode: the raw count of each side, `None` until entered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrainingBoard {
    pub side1: Option<u32>,
    pub side2: Option<u32>,
}

impl TrainingBoard {
    pub fn new(side1: Option<u32>, side2: Option<u32>) -> Self {
        Self { side1, side2 }
    }
}

/// Result input submitted for a match. Stored on the record so edits can be re-opened.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchInput {
    /// Bonus-coin boards.
    Boards { boards: Vec<BoardResult> },
    /// Training boards (direct-score mode).
    Training { boards: Vec<TrainingBoard> },
    /// Final scores typed in directly (training mode only).
    Direct { score1: u32, score2: u32 },
}

/// A single match of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round this match belongs to (1-based).
    pub turn: u32,
    /// Position within the round (1-based).
    pub board: u32,
    pub competitor1_id: CompetitorId,
    /// None for a phantom (bye) opponent.
    pub competitor2_id: Option<CompetitorId>,
    pub score1: u32,
    pub score2: u32,
    /// Belongs to a final round.
    #[serde(rename = "final")]
    pub is_final: bool,
    pub input: Option<MatchInput>,
    pub modified: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Create an unscored match. Phantom matches get their walkover score right away.
    pub fn new(
        tournament_id: TournamentId,
        turn: u32,
        board: u32,
        competitor1_id: CompetitorId,
        competitor2_id: Option<CompetitorId>,
        phantom_score: u32,
    ) -> Self {
        let score1 = if competitor2_id.is_none() { phantom_score } else { 0 };
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            turn,
            board,
            competitor1_id,
            competitor2_id,
            score1,
            score2: 0,
            is_final: false,
            input: None,
            modified: None,
        }
    }

    pub fn is_phantom(&self) -> bool {
        self.competitor2_id.is_none()
    }

    /// A (0, 0) result means nobody entered a score yet; it is never read as a tie.
    pub fn is_scored(&self) -> bool {
        self.score1 != 0 || self.score2 != 0
    }

    /// Winning side, None while unscored or tied.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_scored() {
            return None;
        }
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Competitor id on the given side (None for the phantom side).
    pub fn competitor(&self, side: Side) -> Option<CompetitorId> {
        match side {
            Side::One => Some(self.competitor1_id),
            Side::Two => self.competitor2_id,
        }
    }

    pub fn involves(&self, id: CompetitorId) -> bool {
        self.competitor1_id == id || self.competitor2_id == Some(id)
    }
}
