//! # cm_core - Club Matchday Aggregation Core
//!
//! This library turns raw attendance, goal and evaluation rows into
//! published match summaries and rolling player statistics:
//!
//! - per-side attendance and goal tallies with cross-side own-goal
//!   attribution
//! - Man of the Match selection with a deterministic tie-break order
//! - per-attendance rating aggregates and per-player calendar-bucket
//!   history (month / quarter / half year / year), fully recomputed on
//!   every evaluation or goal mutation
//!
//! Derived stats are always a pure function of current base rows; the
//! JSON API facade mirrors that contract by running the recompute chain
//! inside every mutation call.

pub mod api;
pub mod error;
pub mod models;
pub mod mutation;
pub mod state;
pub mod stats;
pub mod store;
pub mod summary;

// Re-export main API functions
pub use api::{match_summary_json, mutate_rating_json};
pub use error::{CoreError, Result};

// Re-export domain and published shapes
pub use models::{
    Attendance, AttendanceRatingStats, AttendanceRatingVote, Club, Evaluation, Goal, Match,
    MatchClub, MemberType, MercenaryInfo, PeriodType, Player, PlayerStatsHistory, Role,
};
pub use store::ClubStore;
pub use summary::{
    match_club_summary, match_summary, select_mom, AttendanceCount, GoalLine, MatchClubSummary,
    MatchSummary, MomCandidate,
};

// Re-export state management
pub use state::{get_state, get_state_mut, reset_state, set_state, CLUB_STATE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
