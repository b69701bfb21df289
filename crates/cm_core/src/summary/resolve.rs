//! Cross-side goal resolution.
//!
//! An own goal committed by side X counts as a goal for every opponent of X
//! and against X itself. This module distributes that credit across all
//! sides of one match in two phases: every side's base tally is computed
//! first, then the cross terms are derived from the totals.

use serde::{Deserialize, Serialize};

use crate::models::MatchClubId;
use crate::summary::tally::GoalTally;

/// One side's identity plus its base tally, input to the resolver.
#[derive(Debug, Clone, Copy)]
pub struct SideBase {
    pub match_club_id: MatchClubId,
    pub tally: GoalTally,
}

/// Final published goal line for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalLine {
    pub scored: u32,
    pub conceded: u32,
    pub own_committed: u32,
    pub own_received: u32,
}

/// Resolve final scored/conceded for every side of one match.
///
/// Tolerates any N >= 1. A side with no opponents degenerates to its own
/// base values with zero cross terms.
pub fn resolve_sides(bases: &[SideBase]) -> Vec<(MatchClubId, GoalLine)> {
    let total_scored_base: u32 = bases.iter().map(|b| b.tally.scored_base).sum();
    let total_own: u32 = bases.iter().map(|b| b.tally.own_committed).sum();

    bases
        .iter()
        .map(|base| {
            let own_received = total_own - base.tally.own_committed;
            let opponent_scored_base = total_scored_base - base.tally.scored_base;
            let line = GoalLine {
                scored: base.tally.scored_base + own_received,
                conceded: opponent_scored_base + base.tally.own_committed,
                own_committed: base.tally.own_committed,
                own_received,
            };
            (base.match_club_id, line)
        })
        .collect()
}
