//! Mutation entry points consumed by the external route layer.
//!
//! Each write goes through here so the recompute triggers in
//! `stats::recalc` fire on every change, never by convention at call
//! sites. Organizer-gated actions fail closed before touching any row.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};
use crate::models::{
    AttendanceId, Evaluation, Goal, GoalId, MatchClubId, Role, UserId,
};
use crate::stats::recalc::{on_evaluation_changed, on_goal_changed};
use crate::store::ClubStore;

pub const MAX_SCORE: u32 = 100;

/// Upsert one rater's score for one attendance, then recompute.
pub fn upsert_score(
    store: &mut ClubStore,
    rater_user_id: UserId,
    match_club_id: MatchClubId,
    attendance_id: AttendanceId,
    score: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    if score > MAX_SCORE {
        return Err(CoreError::Validation(format!("score {} exceeds {}", score, MAX_SCORE)));
    }
    store.match_club(match_club_id)?;
    let target = store.attendance(attendance_id)?;
    if target.match_club_id != match_club_id {
        return Err(CoreError::Validation(format!(
            "attendance {} does not belong to match club {}",
            attendance_id, match_club_id
        )));
    }
    if target.user_id == Some(rater_user_id) {
        return Err(CoreError::Validation("cannot rate own attendance".into()));
    }

    let liked = store
        .evaluations_given(rater_user_id, match_club_id)
        .iter()
        .find(|e| e.attendance_id == attendance_id)
        .map(|e| e.liked)
        .unwrap_or(false);
    store.upsert_evaluation(Evaluation {
        rater_user_id,
        match_club_id,
        attendance_id,
        score: Some(score),
        liked,
    });
    on_evaluation_changed(store, rater_user_id, match_club_id, attendance_id, now)
}

/// Upsert one rater's like flag, preserving any existing score.
pub fn upsert_like(
    store: &mut ClubStore,
    rater_user_id: UserId,
    match_club_id: MatchClubId,
    attendance_id: AttendanceId,
    liked: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    store.match_club(match_club_id)?;
    let target = store.attendance(attendance_id)?;
    if target.match_club_id != match_club_id {
        return Err(CoreError::Validation(format!(
            "attendance {} does not belong to match club {}",
            attendance_id, match_club_id
        )));
    }
    if target.user_id == Some(rater_user_id) {
        return Err(CoreError::Validation("cannot like own attendance".into()));
    }

    let score = store
        .evaluations_given(rater_user_id, match_club_id)
        .iter()
        .find(|e| e.attendance_id == attendance_id)
        .and_then(|e| e.score);
    store.upsert_evaluation(Evaluation {
        rater_user_id,
        match_club_id,
        attendance_id,
        score,
        liked,
    });
    on_evaluation_changed(store, rater_user_id, match_club_id, attendance_id, now)
}

/// Record a goal for an attendance, then recompute affected history.
///
/// Organizer only.
pub fn create_goal(
    store: &mut ClubStore,
    role: Role,
    attendance_id: AttendanceId,
    quarter: u8,
    own_goal: bool,
    assist_attendance_id: Option<AttendanceId>,
    now: DateTime<Utc>,
) -> Result<GoalId> {
    if role != Role::Organizer {
        return Err(CoreError::NotAuthorized("goal recording requires organizer role".into()));
    }
    store.attendance(attendance_id)?;
    if let Some(assist_id) = assist_attendance_id {
        let assist = store.attendance(assist_id)?;
        let scorer = store.attendance(attendance_id)?;
        if assist.match_club_id != scorer.match_club_id {
            return Err(CoreError::Validation(
                "assist must come from the scorer's own side".into(),
            ));
        }
    }

    let id = store.next_goal_id();
    store.insert_goal(Goal { id, attendance_id, quarter, own_goal, assist_attendance_id });
    on_goal_changed(store, attendance_id, assist_attendance_id, now)?;
    Ok(id)
}

/// Delete a goal (correction), then recompute affected history.
///
/// Organizer only.
pub fn delete_goal(
    store: &mut ClubStore,
    role: Role,
    goal_id: GoalId,
    now: DateTime<Utc>,
) -> Result<()> {
    if role != Role::Organizer {
        return Err(CoreError::NotAuthorized("goal deletion requires organizer role".into()));
    }
    let goal = store.remove_goal(goal_id)?;
    on_goal_changed(store, goal.attendance_id, goal.assist_attendance_id, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, Club, Match, MatchClub, PeriodType, Player};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 20, 12, 0, 0).unwrap()
    }

    fn base_store() -> ClubStore {
        let mut store = ClubStore::new();
        store.insert_club(Club { id: 1, name: "FC Alpha".into(), emblem_url: None });
        store.insert_match(Match {
            id: 1,
            scheduled_at: Utc.with_ymd_and_hms(2024, 7, 13, 10, 0, 0).unwrap(),
        });
        store.insert_match_club(MatchClub {
            id: 1,
            match_id: 1,
            club_id: 1,
            is_self_match: false,
            active: true,
        });
        for (player_id, user_id, att_id) in [(1, 10, 1), (2, 11, 2)] {
            store.insert_player(Player {
                id: player_id,
                club_id: 1,
                user_id,
                name: format!("Player {}", player_id),
                image_url: None,
            });
            store.insert_attendance(Attendance {
                id: att_id,
                match_club_id: 1,
                player_id: Some(player_id),
                user_id: Some(user_id),
                mercenary: None,
                voted: true,
                checked_in: true,
            });
        }
        store
    }

    #[test]
    fn test_upsert_score_twice_keeps_single_row() {
        let mut store = base_store();
        upsert_score(&mut store, 10, 1, 2, 40, now()).unwrap();
        upsert_score(&mut store, 10, 1, 2, 90, now()).unwrap();
        assert_eq!(store.evaluations.len(), 1);
        assert_eq!(store.evaluations[0].score, Some(90));
        assert_eq!(store.rating_stats.get(&2).unwrap().average_rating, 90.0);
    }

    #[test]
    fn test_upsert_like_preserves_score() {
        let mut store = base_store();
        upsert_score(&mut store, 10, 1, 2, 80, now()).unwrap();
        upsert_like(&mut store, 10, 1, 2, true, now()).unwrap();
        assert_eq!(store.evaluations.len(), 1);
        assert_eq!(store.evaluations[0].score, Some(80));
        assert!(store.evaluations[0].liked);
        assert_eq!(store.rating_stats.get(&2).unwrap().like_count, 1);
    }

    #[test]
    fn test_like_before_score_leaves_average_null() {
        let mut store = base_store();
        upsert_like(&mut store, 10, 1, 2, true, now()).unwrap();
        let stats = store.rating_stats.get(&2).unwrap();
        assert_eq!(stats.voter_count, 0);
        assert_eq!(stats.like_count, 1);
    }

    #[test]
    fn test_self_rating_rejected() {
        let mut store = base_store();
        assert!(matches!(
            upsert_score(&mut store, 10, 1, 1, 80, now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let mut store = base_store();
        assert!(matches!(
            upsert_score(&mut store, 10, 1, 2, 101, now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_goal_mutations_require_organizer() {
        let mut store = base_store();
        assert!(matches!(
            create_goal(&mut store, Role::Member, 1, 1, false, None, now()),
            Err(CoreError::NotAuthorized(_))
        ));
        assert!(store.goals.is_empty());
    }

    #[test]
    fn test_goal_create_and_delete_recompute_history() {
        let mut store = base_store();
        let goal_id =
            create_goal(&mut store, Role::Organizer, 1, 2, false, Some(2), now()).unwrap();

        let scorer = store.history(1, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(scorer.total_goal, 1);
        let assist = store.history(2, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(assist.total_assist, 1);

        delete_goal(&mut store, Role::Organizer, goal_id, now()).unwrap();
        let scorer = store.history(1, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(scorer.total_goal, 0);
        let assist = store.history(2, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(assist.total_assist, 0);
    }

    #[test]
    fn test_assist_must_be_same_side() {
        let mut store = base_store();
        store.insert_match_club(MatchClub {
            id: 2,
            match_id: 1,
            club_id: 1,
            is_self_match: true,
            active: true,
        });
        store.insert_attendance(Attendance {
            id: 9,
            match_club_id: 2,
            player_id: None,
            user_id: None,
            mercenary: None,
            voted: true,
            checked_in: true,
        });
        assert!(matches!(
            create_goal(&mut store, Role::Organizer, 1, 1, false, Some(9), now()),
            Err(CoreError::Validation(_))
        ));
    }
}
