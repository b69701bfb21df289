//! Derived-stat recomputation.
//!
//! Every function here fully recomputes its target row from current base
//! rows and upserts the result, so derived state is always a pure function
//! of the underlying evaluations and goals. The trigger contract:
//!
//! - evaluation changed -> rating stats, rater vote bookkeeping, player
//!   history for the rated attendance;
//! - goal changed -> player history for scorer and assist attendances.
//!
//! Batch paths isolate per-unit failures: one attendance failing to
//! recompute is logged and skipped, the rest proceed.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::models::{
    AttendanceId, AttendanceRatingStats, AttendanceRatingVote, Evaluation, MatchClubId,
    PeriodType, PlayerStatsHistory, UserId,
};
use crate::stats::period::{bucket_bounds, period_key};
use crate::store::ClubStore;

/// Default score assigned by the bulk-seeding path.
pub const SEED_SCORE: u32 = 60;
/// Self credit booked for the seeding rater's own attendance.
pub const SEED_SELF_RATING: u32 = 100;

/// Recompute the received-rating aggregate for one attendance.
pub fn recalc_attendance_rating_stats(
    store: &mut ClubStore,
    attendance_id: AttendanceId,
) -> Result<AttendanceRatingStats> {
    store.attendance(attendance_id)?;
    let evals = store.evaluations_received(attendance_id);
    let scores: Vec<u32> = evals.iter().filter_map(|e| e.score).collect();
    let total_rating: u32 = scores.iter().sum();
    let voter_count = scores.len() as u32;
    let like_count = evals.iter().filter(|e| e.liked).count() as u32;

    let stats = AttendanceRatingStats {
        attendance_id,
        average_rating: if voter_count == 0 {
            0.0
        } else {
            total_rating as f64 / voter_count as f64
        },
        total_rating,
        voter_count,
        like_count,
    };
    store.upsert_rating_stats(stats.clone());
    Ok(stats)
}

/// Recompute how much rating budget one rater has spent within one side.
///
/// Aggregates the scores/likes the rater gave to others (their own
/// attendance never counts) onto the rater's own attendance row. Silently
/// skipped when the rater has no attendance in that side.
pub fn recalc_attendance_rating_vote(
    store: &mut ClubStore,
    rater_user_id: UserId,
    match_club_id: MatchClubId,
) -> Result<Option<AttendanceRatingVote>> {
    store.match_club(match_club_id)?;
    let own_attendance_id = match store.attendance_of_user(rater_user_id, match_club_id) {
        Some(att) => att.id,
        None => {
            debug!(rater_user_id, match_club_id, "rater has no attendance in side, skipping");
            return Ok(None);
        }
    };

    let given = store.evaluations_given(rater_user_id, match_club_id);
    let scores: Vec<u32> = given
        .iter()
        .filter(|e| e.attendance_id != own_attendance_id)
        .filter_map(|e| e.score)
        .collect();
    let used_like_count = given
        .iter()
        .filter(|e| e.attendance_id != own_attendance_id && e.liked)
        .count() as u32;

    let voted_member_count = scores.len() as u32;
    let vote = AttendanceRatingVote {
        attendance_id: own_attendance_id,
        total_used_rating: scores.iter().sum(),
        has_voted: voted_member_count > 0,
        voted_member_count,
        used_like_count,
    };
    store.upsert_rating_vote(vote.clone());
    Ok(Some(vote))
}

/// Recompute every period bucket touched by one attendance's match date.
///
/// Attendances with no resolvable player (mercenaries) are skipped, not
/// an error.
pub fn recalc_player_stats_history_by_attendance(
    store: &mut ClubStore,
    attendance_id: AttendanceId,
    now: DateTime<Utc>,
) -> Result<()> {
    let att = store.attendance(attendance_id)?;
    let player_id = match att.player_id {
        Some(id) => id,
        None => {
            debug!(attendance_id, "attendance has no player, skipping history recompute");
            return Ok(());
        }
    };
    let side = store.match_club(att.match_club_id)?;
    let club_id = side.club_id;
    let match_date = store.match_row(side.match_id)?.scheduled_at;

    for period in PeriodType::ALL {
        let key = period_key(period, match_date.date_naive());
        let (start, end) = bucket_bounds(period, match_date.date_naive(), now);

        let attendances: Vec<_> = store
            .player_attendances_in_window(player_id, start, end)
            .into_iter()
            .map(|a| (a.id, a.voted))
            .collect();

        let mut total_rating = 0u32;
        let mut voter_count = 0u32;
        let mut total_like = 0u32;
        let mut total_goal = 0u32;
        let mut total_assist = 0u32;
        for &(att_id, _) in &attendances {
            for eval in store.evaluations_received(att_id) {
                if let Some(score) = eval.score {
                    total_rating += score;
                    voter_count += 1;
                }
                if eval.liked {
                    total_like += 1;
                }
            }
            total_goal +=
                store.goals_scored_by(att_id).iter().filter(|g| !g.own_goal).count() as u32;
            total_assist += store.assists_by(att_id);
        }

        let club_match_count = store.club_sides_in_window(club_id, start, end).len() as u32;
        let voted_count = attendances.iter().filter(|&&(_, voted)| voted).count() as u32;

        store.upsert_history(PlayerStatsHistory {
            player_id,
            period_type: period,
            period_key: key,
            average_rating: if voter_count == 0 {
                0.0
            } else {
                total_rating as f64 / voter_count as f64
            },
            total_rating,
            match_count: attendances.len() as u32,
            total_goal,
            total_assist,
            total_like,
            vote_rate: if club_match_count == 0 {
                0.0
            } else {
                voted_count as f64 / club_match_count as f64
            },
        });
    }
    Ok(())
}

/// Full recompute chain after one evaluation upsert.
pub fn on_evaluation_changed(
    store: &mut ClubStore,
    rater_user_id: UserId,
    match_club_id: MatchClubId,
    attendance_id: AttendanceId,
    now: DateTime<Utc>,
) -> Result<()> {
    recalc_attendance_rating_stats(store, attendance_id)?;
    recalc_attendance_rating_vote(store, rater_user_id, match_club_id)?;
    recalc_player_stats_history_by_attendance(store, attendance_id, now)
}

/// History recompute after a goal event create/delete.
pub fn on_goal_changed(
    store: &mut ClubStore,
    scorer_attendance_id: AttendanceId,
    assist_attendance_id: Option<AttendanceId>,
    now: DateTime<Utc>,
) -> Result<()> {
    recalc_player_stats_history_by_attendance(store, scorer_attendance_id, now)?;
    if let Some(assist_id) = assist_attendance_id {
        recalc_player_stats_history_by_attendance(store, assist_id, now)?;
    }
    Ok(())
}

/// Bulk-seed default ratings for one rater across one side.
///
/// Gated on the rater not having voted in this side yet, so no prior
/// evaluations by this rater can exist when seeding runs. Gives every
/// other voted attendee the default score and books the self credit onto
/// the rater's own attendance without ever creating a self-evaluation
/// row. Recompute failures are isolated per attendance.
pub fn update_seeds(
    store: &mut ClubStore,
    match_club_id: MatchClubId,
    rater_user_id: UserId,
    now: DateTime<Utc>,
) -> Result<()> {
    store.match_club(match_club_id)?;
    if !store.evaluations_given(rater_user_id, match_club_id).is_empty() {
        return Err(CoreError::AlreadyVoted(format!(
            "user {} already voted in match club {}",
            rater_user_id, match_club_id
        )));
    }

    let my_attendance_id =
        store.attendance_of_user(rater_user_id, match_club_id).map(|att| att.id);

    let mut affected: Vec<AttendanceId> = Vec::new();

    let targets: Vec<AttendanceId> = store
        .attendances_of_side(match_club_id)
        .into_iter()
        .filter(|att| att.voted && Some(att.id) != my_attendance_id)
        .map(|att| att.id)
        .collect();

    for &attendance_id in &targets {
        store.upsert_evaluation(Evaluation {
            rater_user_id,
            match_club_id,
            attendance_id,
            score: Some(SEED_SCORE),
            liked: false,
        });
        affected.push(attendance_id);
    }

    if let Some(own_id) = my_attendance_id {
        store.upsert_rating_vote(AttendanceRatingVote {
            attendance_id: own_id,
            total_used_rating: SEED_SELF_RATING + SEED_SCORE * targets.len() as u32,
            has_voted: true,
            voted_member_count: 1 + targets.len() as u32,
            used_like_count: 0,
        });
    }

    affected.sort_unstable();
    affected.dedup();
    for attendance_id in affected {
        if let Err(err) = recalc_attendance_rating_stats(store, attendance_id) {
            warn!(attendance_id, %err, "rating stats recompute failed, continuing");
            continue;
        }
        if let Err(err) = recalc_player_stats_history_by_attendance(store, attendance_id, now) {
            warn!(attendance_id, %err, "history recompute failed, continuing");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, Club, Goal, Match, MatchClub, MercenaryInfo, Player};
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
        for (player_id, user_id, att_id) in [(1, 10, 1), (2, 11, 2), (3, 12, 3)] {
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
    fn test_rating_stats_store_raw_average() {
        let mut store = base_store();
        for (rater, score) in [(11, 80), (12, 100)] {
            store.upsert_evaluation(Evaluation {
                rater_user_id: rater,
                match_club_id: 1,
                attendance_id: 1,
                score: Some(score),
                liked: rater == 11,
            });
        }
        let stats = recalc_attendance_rating_stats(&mut store, 1).unwrap();
        assert_eq!(stats.average_rating, 90.0);
        assert_eq!(stats.total_rating, 180);
        assert_eq!(stats.voter_count, 2);
        assert_eq!(stats.like_count, 1);
    }

    #[test]
    fn test_rating_stats_zero_when_no_voters() {
        let mut store = base_store();
        let stats = recalc_attendance_rating_stats(&mut store, 1).unwrap();
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.voter_count, 0);
    }

    #[test]
    fn test_like_only_evaluation_keeps_voter_count_zero() {
        let mut store = base_store();
        store.upsert_evaluation(Evaluation {
            rater_user_id: 11,
            match_club_id: 1,
            attendance_id: 1,
            score: None,
            liked: true,
        });
        let stats = recalc_attendance_rating_stats(&mut store, 1).unwrap();
        assert_eq!(stats.voter_count, 0);
        assert_eq!(stats.like_count, 1);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn test_vote_bookkeeping_excludes_self() {
        let mut store = base_store();
        // User 10 rates attendances 2 and 3 and, somehow, their own row 1.
        for att_id in [1, 2, 3] {
            store.upsert_evaluation(Evaluation {
                rater_user_id: 10,
                match_club_id: 1,
                attendance_id: att_id,
                score: Some(70),
                liked: att_id == 2,
            });
        }
        let vote = recalc_attendance_rating_vote(&mut store, 10, 1).unwrap().unwrap();
        assert_eq!(vote.attendance_id, 1);
        assert_eq!(vote.total_used_rating, 140);
        assert_eq!(vote.voted_member_count, 2);
        assert_eq!(vote.used_like_count, 1);
        assert!(vote.has_voted);
    }

    #[test]
    fn test_vote_bookkeeping_skips_non_attending_rater() {
        let mut store = base_store();
        let vote = recalc_attendance_rating_vote(&mut store, 99, 1).unwrap();
        assert!(vote.is_none());
    }

    #[test]
    fn test_history_buckets_written_for_all_periods() {
        let mut store = base_store();
        store.insert_goal(Goal {
            id: 1,
            attendance_id: 1,
            quarter: 1,
            own_goal: false,
            assist_attendance_id: Some(2),
        });
        store.upsert_evaluation(Evaluation {
            rater_user_id: 11,
            match_club_id: 1,
            attendance_id: 1,
            score: Some(80),
            liked: true,
        });

        recalc_player_stats_history_by_attendance(&mut store, 1, now()).unwrap();

        let month = store.history(1, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(month.match_count, 1);
        assert_eq!(month.total_goal, 1);
        assert_eq!(month.total_like, 1);
        assert_eq!(month.average_rating, 80.0);
        assert_eq!(month.vote_rate, 1.0);
        assert!(store.history(1, PeriodType::Quarter, "2024-Q3").is_some());
        assert!(store.history(1, PeriodType::HalfYear, "2024-H2").is_some());
        assert!(store.history(1, PeriodType::Year, "2024").is_some());

        // Assist lands on player 2's buckets.
        recalc_player_stats_history_by_attendance(&mut store, 2, now()).unwrap();
        let month = store.history(2, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(month.total_assist, 1);
        assert_eq!(month.total_goal, 0);
    }

    #[test]
    fn test_history_excludes_matches_after_now() {
        let mut store = base_store();
        // Second match later in the same month but after "now".
        store.insert_match(Match {
            id: 2,
            scheduled_at: Utc.with_ymd_and_hms(2024, 7, 27, 10, 0, 0).unwrap(),
        });
        store.insert_match_club(MatchClub {
            id: 2,
            match_id: 2,
            club_id: 1,
            is_self_match: false,
            active: true,
        });
        store.insert_attendance(Attendance {
            id: 9,
            match_club_id: 2,
            player_id: Some(1),
            user_id: Some(10),
            mercenary: None,
            voted: true,
            checked_in: false,
        });
        store.insert_goal(Goal {
            id: 1,
            attendance_id: 9,
            quarter: 1,
            own_goal: false,
            assist_attendance_id: None,
        });

        recalc_player_stats_history_by_attendance(&mut store, 1, now()).unwrap();
        let month = store.history(1, PeriodType::Month, "2024-07").unwrap();
        // Only the July 13 match counts; the 27th is in the future.
        assert_eq!(month.match_count, 1);
        assert_eq!(month.total_goal, 0);
        assert_eq!(month.vote_rate, 1.0);
    }

    #[test]
    fn test_match_at_recompute_instant_counts_next_time() {
        let mut store = base_store();
        store.insert_match(Match { id: 2, scheduled_at: now() });
        store.insert_match_club(MatchClub {
            id: 2,
            match_id: 2,
            club_id: 1,
            is_self_match: false,
            active: true,
        });
        store.insert_attendance(Attendance {
            id: 9,
            match_club_id: 2,
            player_id: Some(1),
            user_id: Some(10),
            mercenary: None,
            voted: true,
            checked_in: false,
        });

        // The window cap is exclusive, so the match at exactly `now` waits.
        recalc_player_stats_history_by_attendance(&mut store, 1, now()).unwrap();
        let month = store.history(1, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(month.match_count, 1);

        let later = now() + chrono::Duration::seconds(1);
        recalc_player_stats_history_by_attendance(&mut store, 1, later).unwrap();
        let month = store.history(1, PeriodType::Month, "2024-07").unwrap();
        assert_eq!(month.match_count, 2);
    }

    #[test]
    fn test_history_skips_mercenary_attendance() {
        let mut store = base_store();
        store.insert_attendance(Attendance {
            id: 9,
            match_club_id: 1,
            player_id: None,
            user_id: None,
            mercenary: Some(MercenaryInfo { name: "Guest".into(), image_url: None }),
            voted: true,
            checked_in: true,
        });
        recalc_player_stats_history_by_attendance(&mut store, 9, now()).unwrap();
        assert!(store.stats_history.is_empty());
    }

    #[test]
    fn test_update_seeds_never_rates_self() {
        let mut store = base_store();
        update_seeds(&mut store, 1, 10, now()).unwrap();

        assert!(store
            .evaluations
            .iter()
            .all(|e| !(e.rater_user_id == 10 && e.attendance_id == 1)));
        let seeded: Vec<_> =
            store.evaluations.iter().filter(|e| e.rater_user_id == 10).collect();
        assert_eq!(seeded.len(), 2);
        assert!(seeded.iter().all(|e| e.score == Some(SEED_SCORE) && !e.liked));
    }

    #[test]
    fn test_update_seeds_books_self_credit() {
        let mut store = base_store();
        update_seeds(&mut store, 1, 10, now()).unwrap();

        let vote = store.rating_votes.get(&1).unwrap();
        assert_eq!(vote.total_used_rating, SEED_SELF_RATING + 2 * SEED_SCORE);
        assert_eq!(vote.voted_member_count, 3);
        assert!(vote.has_voted);
        assert_eq!(vote.used_like_count, 0);

        // Seeded attendances got their received stats recomputed.
        assert_eq!(store.rating_stats.get(&2).unwrap().average_rating, SEED_SCORE as f64);
        assert_eq!(store.rating_stats.get(&3).unwrap().voter_count, 1);
    }

    #[test]
    fn test_update_seeds_skips_unvoted_attendees() {
        let mut store = base_store();
        store.attendances.get_mut(&3).unwrap().voted = false;
        update_seeds(&mut store, 1, 10, now()).unwrap();
        assert!(store.evaluations.iter().all(|e| e.attendance_id != 3));
    }

    #[test]
    fn test_update_seeds_gated_on_prior_vote() {
        let mut store = base_store();
        store.upsert_evaluation(Evaluation {
            rater_user_id: 10,
            match_club_id: 1,
            attendance_id: 2,
            score: Some(90),
            liked: false,
        });
        assert!(matches!(
            update_seeds(&mut store, 1, 10, now()),
            Err(CoreError::AlreadyVoted(_))
        ));
    }

    #[test]
    fn test_recompute_converges_after_repeat() {
        let mut store = base_store();
        store.upsert_evaluation(Evaluation {
            rater_user_id: 11,
            match_club_id: 1,
            attendance_id: 1,
            score: Some(80),
            liked: false,
        });
        let first = recalc_attendance_rating_stats(&mut store, 1).unwrap();
        let second = recalc_attendance_rating_stats(&mut store, 1).unwrap();
        assert_eq!(first, second);
    }
}
