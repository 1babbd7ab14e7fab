//! Standing: one row of the ranking.

use crate::models::competitor::CompetitorId;
use serde::{Deserialize, Serialize};

/// Ranking row for one competitor.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// 1-based position.
    pub rank: u32,
    pub competitor_id: CompetitorId,
    pub name: String,
    /// 2 per win, 1 per draw.
    pub points: u32,
    /// Sum of the points of every opponent met.
    pub bucholz: u32,
    pub net_score: i64,
    pub total_score: u32,
    pub played: u32,
    /// Games won in final series.
    pub final_wins: u32,
}
