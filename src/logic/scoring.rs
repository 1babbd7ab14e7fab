//! Score validation: per-board inputs of one match become its two final scores.

use crate::models::{
    BoardResult, MatchInput, ScoringMode, ScoringRules, Side, TournamentError, TrainingBoard,
};

/// Turns raw board inputs into capped final scores according to a tournament's [`ScoringRules`].
///
/// Pure: the same input always yields the same scores.
#[derive(Clone, Copy, Debug)]
pub struct ScoreValidator {
    rules: ScoringRules,
}

impl ScoreValidator {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Validate any submitted input. `Ok(None)` means the input is accepted but not complete yet.
    pub fn validate(&self, input: &MatchInput) -> Result<Option<(u32, u32)>, TournamentError> {
        match (self.rules.mode, input) {
            (ScoringMode::BonusCoins, MatchInput::Boards { boards }) => {
                self.bonus_coins(boards).map(Some)
            }
            (ScoringMode::TrainingBoards { boards: expected }, MatchInput::Training { boards }) => {
                if boards.len() != expected as usize {
                    return Err(TournamentError::InvalidScores(format!(
                        "expected {} training boards, got {}",
                        expected,
                        boards.len()
                    )));
                }
                Ok(self.training(boards))
            }
            (ScoringMode::TrainingBoards { .. }, MatchInput::Direct { score1, score2 }) => {
                self.direct(*score1, *score2).map(Some)
            }
            (ScoringMode::BonusCoins, _) => Err(TournamentError::InvalidScores(
                "this tournament is scored with bonus-coin boards".to_string(),
            )),
            (ScoringMode::TrainingBoards { .. }, MatchInput::Boards { .. }) => Err(
                TournamentError::InvalidScores("this tournament is scored with training boards".to_string()),
            ),
        }
    }

    /// Bonus-coin boards: at most one side may pocket coins on a board; the queen adds a bonus
    /// while the winner of the board is still below the bonus ceiling. Totals are capped.
    pub fn bonus_coins(&self, boards: &[BoardResult]) -> Result<(u32, u32), TournamentError> {
        let mut total1 = 0u32;
        let mut total2 = 0u32;
        for (idx, board) in boards.iter().enumerate() {
            if board.coins1 > 0 && board.coins2 > 0 {
                return Err(TournamentError::InvalidBoardResult { board: idx + 1 });
            }
            let (winner, coins, total) = if board.coins1 > board.coins2 {
                (Side::One, board.coins1, &mut total1)
            } else if board.coins2 > board.coins1 {
                (Side::Two, board.coins2, &mut total2)
            } else {
                continue;
            };
            *total = total.saturating_add(coins);
            if board.queen == Some(winner) && *total < self.rules.bonus_ceiling {
                *total = total.saturating_add(self.rules.queen_bonus);
            }
        }
        Ok((total1.min(self.rules.score_cap), total2.min(self.rules.score_cap)))
    }

    /// Training boards: each side scores the rounded average of its board values, capped.
    ///
    /// Returns `None` until every value of both sides is filled in. When the cap or rounding ties
    /// two different raw totals, the side with the higher total gets one more point, or the other
    /// side one less if the cap is already reached.
    pub fn training(&self, boards: &[TrainingBoard]) -> Option<(u32, u32)> {
        if boards.is_empty() {
            return None;
        }
        let mut total1 = 0u64;
        let mut total2 = 0u64;
        for board in boards {
            total1 += u64::from(board.side1?);
            total2 += u64::from(board.side2?);
        }
        let n = boards.len() as u64;
        let cap = self.rules.score_cap;
        let mut score1 = rounded_average(total1, n).min(u64::from(cap)) as u32;
        let mut score2 = rounded_average(total2, n).min(u64::from(cap)) as u32;

        if score1 == score2 && total1 != total2 {
            let (favored, other) = if total1 > total2 {
                (&mut score1, &mut score2)
            } else {
                (&mut score2, &mut score1)
            };
            if *favored < cap {
                *favored += 1;
            } else {
                *other = other.saturating_sub(1);
            }
        }
        Some((score1, score2))
    }

    /// Scores typed in directly; each must fit under the cap.
    pub fn direct(&self, score1: u32, score2: u32) -> Result<(u32, u32), TournamentError> {
        let cap = self.rules.score_cap;
        if score1 > cap || score2 > cap {
            return Err(TournamentError::InvalidScores(format!(
                "scores must not exceed {}",
                cap
            )));
        }
        Ok((score1, score2))
    }
}

/// Average rounded half away from zero, in integers.
fn rounded_average(total: u64, n: u64) -> u64 {
    (2 * total + n) / (2 * n)
}
