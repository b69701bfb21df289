//! Rolling player statistics and derived-rating recomputation.

pub mod period;
pub mod recalc;

pub use period::{bucket_bounds, bucket_start, next_bucket_start, period_key};
pub use recalc::{
    on_evaluation_changed, on_goal_changed, recalc_attendance_rating_stats,
    recalc_attendance_rating_vote, recalc_player_stats_history_by_attendance, update_seeds,
    SEED_SCORE, SEED_SELF_RATING,
};
