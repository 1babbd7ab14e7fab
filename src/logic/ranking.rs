//! Standings: points, bucholz, net and total score, then final series.

use crate::models::{CompetitorId, MatchRecord, Side, Standing, Tournament};
use std::collections::HashMap;

/// Wins needed to take a best-of-three final series.
pub const FINAL_SERIES_WINS: u32 = 2;
/// Most final rounds a tournament can play.
pub const MAX_FINAL_TURNS: u32 = 3;

const WIN_POINTS: u32 = 2;
const DRAW_POINTS: u32 = 1;

/// Best-of-three series between two finalists, built from the final matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FinalSeries {
    pub competitor1: CompetitorId,
    pub competitor2: CompetitorId,
    pub wins1: u32,
    pub wins2: u32,
}

impl FinalSeries {
    pub fn is_decided(&self) -> bool {
        self.wins1 >= FINAL_SERIES_WINS || self.wins2 >= FINAL_SERIES_WINS
    }

    pub fn winner(&self) -> Option<CompetitorId> {
        if self.wins1 >= FINAL_SERIES_WINS {
            Some(self.competitor1)
        } else if self.wins2 >= FINAL_SERIES_WINS {
            Some(self.competitor2)
        } else {
            None
        }
    }

    fn is_between(&self, a: CompetitorId, b: CompetitorId) -> bool {
        (self.competitor1 == a && self.competitor2 == b) || (self.competitor1 == b && self.competitor2 == a)
    }
}

/// Group final matches into series, in order of first appearance.
pub fn final_series(matches: &[&MatchRecord]) -> Vec<FinalSeries> {
    let mut series: Vec<FinalSeries> = Vec::new();
    for m in matches.iter().filter(|m| m.is_final) {
        let Some(c2) = m.competitor2_id else { continue };
        let idx = match series.iter().position(|s| s.is_between(m.competitor1_id, c2)) {
            Some(idx) => idx,
            None => {
                series.push(FinalSeries {
                    competitor1: m.competitor1_id,
                    competitor2: c2,
                    wins1: 0,
                    wins2: 0,
                });
                series.len() - 1
            }
        };
        let winner = match m.winner() {
            Some(Side::One) => m.competitor1_id,
            Some(Side::Two) => c2,
            None => continue,
        };
        let s = &mut series[idx];
        if winner == s.competitor1 {
            s.wins1 += 1;
        } else {
            s.wins2 += 1;
        }
    }
    series
}

/// Compute standings over the given matches (callers pass the matches up to the ranked turn).
///
/// Unscored matches are ignored. Final matches only count toward `final_wins` and reorder
/// finalists once their series is decided.
pub fn compute_standings(tournament: &Tournament, matches: &[&MatchRecord]) -> Vec<Standing> {
    let mut rows: HashMap<CompetitorId, Standing> = tournament
        .competitors
        .iter()
        .map(|c| {
            (
                c.id,
                Standing {
                    competitor_id: c.id,
                    name: c.name.clone(),
                    ..Standing::default()
                },
            )
        })
        .collect();
    let mut opponents: HashMap<CompetitorId, Vec<CompetitorId>> = HashMap::new();

    for m in matches.iter().filter(|m| !m.is_final && m.is_scored()) {
        let (p1, p2) = match m.score1.cmp(&m.score2) {
            std::cmp::Ordering::Greater => (WIN_POINTS, 0),
            std::cmp::Ordering::Less => (0, WIN_POINTS),
            std::cmp::Ordering::Equal => (DRAW_POINTS, DRAW_POINTS),
        };
        record_side(&mut rows, m.competitor1_id, m.score1, m.score2, p1);
        if let Some(c2) = m.competitor2_id {
            record_side(&mut rows, c2, m.score2, m.score1, p2);
            opponents.entry(m.competitor1_id).or_default().push(c2);
            opponents.entry(c2).or_default().push(m.competitor1_id);
        }
    }

    let points: HashMap<CompetitorId, u32> = rows.iter().map(|(id, s)| (*id, s.points)).collect();
    for (id, row) in rows.iter_mut() {
        row.bucholz = opponents
            .get(id)
            .map(|opps| opps.iter().filter_map(|o| points.get(o)).sum())
            .unwrap_or(0);
    }

    let series = final_series(matches);
    for s in &series {
        if let Some(row) = rows.get_mut(&s.competitor1) {
            row.final_wins = s.wins1;
        }
        if let Some(row) = rows.get_mut(&s.competitor2) {
            row.final_wins = s.wins2;
        }
    }

    let order: HashMap<CompetitorId, usize> = tournament
        .competitors
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();
    let mut standings: Vec<Standing> = rows.into_values().collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.bucholz.cmp(&a.bucholz))
            .then(b.net_score.cmp(&a.net_score))
            .then(b.total_score.cmp(&a.total_score))
            .then(order.get(&a.competitor_id).cmp(&order.get(&b.competitor_id)))
    });

    for s in series.iter().filter(|s| s.is_decided()) {
        let pos = |id: CompetitorId| standings.iter().position(|r| r.competitor_id == id);
        let (Some(a), Some(b), Some(winner)) = (pos(s.competitor1), pos(s.competitor2), s.winner()) else {
            continue;
        };
        let (top, bottom) = (a.min(b), a.max(b));
        if standings[bottom].competitor_id == winner {
            standings.swap(top, bottom);
        }
    }

    for (idx, row) in standings.iter_mut().enumerate() {
        row.rank = idx as u32 + 1;
    }
    standings
}

fn record_side(rows: &mut HashMap<CompetitorId, Standing>, id: CompetitorId, own: u32, opp: u32, points: u32) {
    if let Some(row) = rows.get_mut(&id) {
        row.played += 1;
        row.points += points;
        row.total_score += own;
        row.net_score += i64::from(own) - i64::from(opp);
    }
}
