//! Tournament, RoundState, scoring rules and errors.

use crate::models::competitor::{Competitor, CompetitorId};
use crate::models::match_record::MatchId;
use crate::models::standing::Standing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The precondition of a state transition is not met.
    IllegalTransition(String),
    /// Both sides scored on the same board (1-based board number).
    InvalidBoardResult { board: usize },
    /// Some matches of the current round have no result yet (board numbers).
    IncompleteScores { boards: Vec<u32> },
    /// Submitted scores do not fit the tournament's scoring mode.
    InvalidScores(String),
    /// Actor is neither the owner nor an admin.
    Unauthorized,
    TournamentNotFound(TournamentId),
    MatchNotFound(MatchId),
    /// No match at this board of this round.
    BoardNotFound { turn: u32, board: u32 },
    CompetitorNotFound(CompetitorId),
    /// A collaborator (pairing generator) returned something unusable.
    CommunicationError(String),
    /// A competitor with this name already exists (names are unique, case-insensitive).
    DuplicateCompetitorName,
    /// Empty competitor name.
    InvalidCompetitorName,
    /// Round export failed.
    Export(String),
}

impl TournamentError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TournamentError::TournamentNotFound(_)
                | TournamentError::MatchNotFound(_)
                | TournamentError::BoardNotFound { .. }
                | TournamentError::CompetitorNotFound(_)
        )
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        TournamentError::IllegalTransition(msg.into())
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::IllegalTransition(msg) => write!(f, "Not allowed: {}", msg),
            TournamentError::InvalidBoardResult { board } => {
                write!(f, "Board {}: only one side may score on a board", board)
            }
            TournamentError::IncompleteScores { boards } => {
                let list: Vec<String> = boards.iter().map(|b| b.to_string()).collect();
                write!(f, "Incomplete scores on board(s) {}", list.join(", "))
            }
            TournamentError::InvalidScores(msg) => write!(f, "Invalid scores: {}", msg),
            TournamentError::Unauthorized => write!(f, "You are not allowed to change this tournament"),
            TournamentError::TournamentNotFound(_) => write!(f, "No tournament"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::BoardNotFound { turn, board } => {
                write!(f, "No match on board {} of round {}", board, turn)
            }
            TournamentError::CompetitorNotFound(_) => write!(f, "Competitor not found"),
            TournamentError::CommunicationError(msg) => write!(f, "Communication error: {}", msg),
            TournamentError::DuplicateCompetitorName => {
                write!(f, "A competitor with this name already exists")
            }
            TournamentError::InvalidCompetitorName => write!(f, "Competitor name must not be empty"),
            TournamentError::Export(msg) => write!(f, "Export failed: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Pairing system.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentSystem {
    #[default]
    Swiss,
    Knockout,
}

/// How per-board inputs become match scores.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringMode {
    /// Coins per board, at most one side scoring, queen bonus.
    #[default]
    BonusCoins,
    /// Per-board raw counts averaged per side.
    TrainingBoards { boards: u32 },
}

/// Numeric scoring rules of a tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub mode: ScoringMode,
    /// Maximum final score of either side.
    pub score_cap: u32,
    /// Points added for covering the queen.
    pub queen_bonus: u32,
    /// Queen bonus only applies while the running total is below this.
    pub bonus_ceiling: u32,
    /// Walkover score given against a phantom.
    pub phantom_score: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            mode: ScoringMode::BonusCoins,
            score_cap: 25,
            queen_bonus: 3,
            bonus_ceiling: 22,
            phantom_score: 25,
        }
    }
}

impl ScoringRules {
    /// Reject rules under which a round could never be fully scored.
    pub fn check(&self) -> Result<(), TournamentError> {
        if matches!(self.mode, ScoringMode::TrainingBoards { boards: 0 }) {
            return Err(TournamentError::InvalidScores(
                "training mode needs at least one board".to_string(),
            ));
        }
        if self.score_cap == 0 {
            return Err(TournamentError::InvalidScores(
                "the score cap must be positive".to_string(),
            ));
        }
        if self.phantom_score == 0 || self.phantom_score > self.score_cap {
            return Err(TournamentError::InvalidScores(format!(
                "the phantom score must be between 1 and {}",
                self.score_cap
            )));
        }
        Ok(())
    }
}

/// Progress of a tournament through its rounds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub current_turn: u32,
    /// Most recent round incorporated into standings. Never above `current_turn`.
    pub ranked_turn: u32,
    /// Number of final rounds played.
    pub final_turns: u32,
    /// Results frozen; implies `read_only`.
    pub prized: bool,
    pub read_only: bool,
}

impl RoundState {
    /// True while the current round has not been scored into standings.
    pub fn has_pending_round(&self) -> bool {
        self.current_turn > self.ranked_turn
    }
}

/// Settings chosen when creating a tournament.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub name: String,
    pub system: TournamentSystem,
    /// Whether a final phase follows the Swiss rounds.
    pub finals: bool,
    /// Planned number of Swiss rounds (0 = open-ended).
    pub duration: u32,
    pub scoring: ScoringRules,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            name: "New tournament".to_string(),
            system: TournamentSystem::Swiss,
            finals: false,
            duration: 0,
            scoring: ScoringRules::default(),
        }
    }
}

/// Full tournament: configuration, competitors, round state and the latest standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// User who created the tournament.
    pub owner: String,
    pub created: DateTime<Utc>,
    pub system: TournamentSystem,
    pub finals: bool,
    pub duration: u32,
    pub scoring: ScoringRules,
    pub competitors: Vec<Competitor>,
    pub state: RoundState,
    pub standings: Vec<Standing>,
    /// Bumped by every open/delete transition; edit overrides are stamped with it.
    pub transition_epoch: u64,
}

impl Tournament {
    /// Create a tournament with no competitors and no rounds.
    pub fn new(settings: TournamentSettings, owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: settings.name,
            owner: owner.into(),
            created: Utc::now(),
            system: settings.system,
            finals: settings.finals,
            duration: settings.duration,
            scoring: settings.scoring,
            competitors: Vec::new(),
            state: RoundState::default(),
            standings: Vec::new(),
            transition_epoch: 0,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.competitors.len()
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    /// Add a competitor. Names must be unique (case-insensitive). A drawn knockout bracket is closed.
    pub fn add_competitor(&mut self, name: &str) -> Result<CompetitorId, TournamentError> {
        if self.state.read_only {
            return Err(TournamentError::illegal("tournament is read-only"));
        }
        if self.system == TournamentSystem::Knockout && self.state.current_turn > 0 {
            return Err(TournamentError::illegal("the knockout bracket is already drawn"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidCompetitorName);
        }
        if self
            .competitors
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
        {
            return Err(TournamentError::DuplicateCompetitorName);
        }
        let competitor = Competitor::new(name);
        let id = competitor.id;
        self.competitors.push(competitor);
        Ok(id)
    }

    /// Remove a competitor (only before the first round is opened).
    pub fn remove_competitor(&mut self, id: CompetitorId) -> Result<(), TournamentError> {
        if self.state.current_turn > 0 {
            return Err(TournamentError::illegal(
                "competitors can only be removed before the first round",
            ));
        }
        let idx = self
            .competitors
            .iter()
            .position(|c| c.id == id)
            .ok_or(TournamentError::CompetitorNotFound(id))?;
        self.competitors.remove(idx);
        Ok(())
    }
}
