//! Match summary composition.
//!
//! Pure aggregators live in the submodules; this module joins store rows
//! into the flat inputs they expect and assembles the published
//! `MatchSummary` / `MatchClubSummary` shapes.

pub mod mom;
pub mod resolve;
pub mod tally;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{Attendance, Goal, MatchClub, MatchClubId, MatchId};
use crate::store::ClubStore;

pub use mom::{select_mom, AttendeeLine, MomCandidate};
pub use resolve::{resolve_sides, GoalLine, SideBase};
pub use tally::{count_attendance, tally_goals, AttendanceCount, GoalTally};

/// Club identity carried on a published summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubBadge {
    pub name: String,
    #[serde(default)]
    pub emblem_url: Option<String>,
}

/// Published per-side summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchClubSummary {
    pub match_club_id: MatchClubId,
    pub club: ClubBadge,
    pub goals: GoalLine,
    pub attendance: AttendanceCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mom: Option<MomCandidate>,
}

/// Published whole-match summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub sides: Vec<MatchClubSummary>,
}

fn side_goals<'a>(store: &'a ClubStore, attendances: &[&Attendance]) -> Vec<&'a Goal> {
    attendances
        .iter()
        .flat_map(|att| store.goals_scored_by(att.id))
        .collect()
}

fn attendee_lines(store: &ClubStore, attendances: &[&Attendance]) -> Vec<AttendeeLine> {
    attendances
        .iter()
        .map(|att| {
            let identity = store.display_identity(att);
            let evals = store.evaluations_received(att.id);
            let scores: Vec<u32> = evals.iter().filter_map(|e| e.score).collect();
            let like_count = evals.iter().filter(|e| e.liked).count() as u32;
            let goal_count =
                store.goals_scored_by(att.id).iter().filter(|g| !g.own_goal).count() as u32;
            AttendeeLine {
                attendance_id: att.id,
                name: identity.as_ref().map(|i| i.name.clone()),
                image_url: identity.as_ref().and_then(|i| i.image_url.clone()),
                member_type: att.member_type(),
                scores,
                like_count,
                goal_count,
            }
        })
        .collect()
}

fn summarize_sides(store: &ClubStore, sides: &[&MatchClub]) -> Result<Vec<MatchClubSummary>> {
    // Phase one: every side's base tally before any cross term.
    let mut bases = Vec::with_capacity(sides.len());
    let mut side_attendances = Vec::with_capacity(sides.len());
    for side in sides {
        let attendances = store.attendances_of_side(side.id);
        let goals = side_goals(store, &attendances);
        bases.push(SideBase {
            match_club_id: side.id,
            tally: tally_goals(goals.into_iter()),
        });
        side_attendances.push(attendances);
    }

    // Phase two: distribute own-goal credit across opponents.
    let lines = resolve_sides(&bases);

    sides
        .iter()
        .zip(side_attendances)
        .zip(lines)
        .map(|((side, attendances), (_, goals))| {
            let club = store.club(side.club_id).map_err(|_| {
                CoreError::Processing(format!("match club {} has no club", side.id))
            })?;
            Ok(MatchClubSummary {
                match_club_id: side.id,
                club: ClubBadge { name: club.name.clone(), emblem_url: club.emblem_url.clone() },
                goals,
                attendance: count_attendance(&attendances),
                mom: select_mom(attendee_lines(store, &attendances)),
            })
        })
        .collect()
}

/// Summarize every active side of one match.
pub fn match_summary(store: &ClubStore, match_id: MatchId) -> Result<MatchSummary> {
    store.match_row(match_id)?;
    let mut sides: Vec<&MatchClub> =
        store.sides_of_match(match_id).into_iter().filter(|mc| mc.active).collect();
    sides.sort_by_key(|mc| mc.id);
    Ok(MatchSummary { match_id, sides: summarize_sides(store, &sides)? })
}

/// Summarize one side.
///
/// Cross terms come from the match's other active sides; a withdrawn or
/// opponentless side degenerates to its own base tallies.
pub fn match_club_summary(store: &ClubStore, match_club_id: MatchClubId) -> Result<MatchClubSummary> {
    let side = store.match_club(match_club_id)?;
    let mut sides: Vec<&MatchClub> = store
        .sides_of_match(side.match_id)
        .into_iter()
        .filter(|mc| mc.active || mc.id == match_club_id)
        .collect();
    sides.sort_by_key(|mc| mc.id);
    let summaries = summarize_sides(store, &sides)?;
    summaries
        .into_iter()
        .find(|s| s.match_club_id == match_club_id)
        .ok_or_else(|| CoreError::NotFound(format!("match club {}", match_club_id)))
}
