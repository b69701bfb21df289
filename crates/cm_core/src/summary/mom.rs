//! Man of the Match selection for one match side.

use serde::{Deserialize, Serialize};

use crate::models::{AttendanceId, MemberType};

/// Flat per-attendee input, decoupled from any query shape.
///
/// `name` is the resolved display name (player name or mercenary name);
/// attendees with no resolvable name are skipped entirely. `scores` are
/// the raw 0-100 evaluation scores received, `goal_count` counts non-own
/// goals only.
#[derive(Debug, Clone)]
pub struct AttendeeLine {
    pub attendance_id: AttendanceId,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub member_type: MemberType,
    pub scores: Vec<u32>,
    pub like_count: u32,
    pub goal_count: u32,
}

/// The published MOM shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomCandidate {
    pub attendance_id: AttendanceId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub member_type: MemberType,
    /// Display scale out of 5 (raw average / 20); null when nobody scored.
    pub score_average: Option<f64>,
    pub like_count: u32,
    pub goal_count: u32,
}

/// Select the single standout attendee for one side.
///
/// Ranking is descending by score average (absent ranks as -1), then like
/// count, then goal count; the final tie-break is ascending attendance id
/// so selection never depends on input order. Attendees with no score, no
/// like and no goal are not candidates. Returns `None` when nobody
/// qualifies.
pub fn select_mom(lines: Vec<AttendeeLine>) -> Option<MomCandidate> {
    let mut candidates: Vec<MomCandidate> = lines
        .into_iter()
        .filter_map(|line| {
            let name = line.name?;
            let score_average = if line.scores.is_empty() {
                None
            } else {
                let total: u32 = line.scores.iter().sum();
                Some(total as f64 / line.scores.len() as f64 / 20.0)
            };
            if score_average.is_none() && line.like_count == 0 && line.goal_count == 0 {
                return None;
            }
            Some(MomCandidate {
                attendance_id: line.attendance_id,
                name,
                image_url: line.image_url,
                member_type: line.member_type,
                score_average,
                like_count: line.like_count,
                goal_count: line.goal_count,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        let a_score = a.score_average.unwrap_or(-1.0);
        let b_score = b.score_average.unwrap_or(-1.0);
        b_score
            .total_cmp(&a_score)
            .then(b.like_count.cmp(&a.like_count))
            .then(b.goal_count.cmp(&a.goal_count))
            .then(a.attendance_id.cmp(&b.attendance_id))
    });

    candidates.into_iter().next()
}
