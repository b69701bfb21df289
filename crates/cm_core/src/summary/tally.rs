//! Attendance and goal tallies for one match side.

use serde::{Deserialize, Serialize};

use crate::models::{Attendance, Goal};

/// 참석 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCount {
    pub total: u32,
    pub voted: u32,
    pub checked_in: u32,
}

/// Goals scored by one side's own attendees, before cross-side resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTally {
    /// Goals not flagged own-goal.
    pub scored_base: u32,
    /// Own goals committed by this side's attendees.
    pub own_committed: u32,
}

/// Count attendance rows for one side. Absent data yields all zeros.
pub fn count_attendance(rows: &[&Attendance]) -> AttendanceCount {
    let mut count = AttendanceCount::default();
    for att in rows {
        count.total += 1;
        if att.voted {
            count.voted += 1;
        }
        if att.checked_in {
            count.checked_in += 1;
        }
    }
    count
}

/// Tally goal events reachable from one side's attendances.
pub fn tally_goals<'a, I>(goals: I) -> GoalTally
where
    I: IntoIterator<Item = &'a Goal>,
{
    let mut tally = GoalTally::default();
    for goal in goals {
        if goal.own_goal {
            tally.own_committed += 1;
        } else {
            tally.scored_base += 1;
        }
    }
    tally
}
