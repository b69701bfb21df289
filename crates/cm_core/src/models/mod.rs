//! Domain rows for club matchday aggregation.
//!
//! These are flat, ORM-independent row structs. Derived rows
//! (`AttendanceRatingStats`, `AttendanceRatingVote`, `PlayerStatsHistory`)
//! are always fully recomputed from base rows, never patched in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ClubId = i64;
pub type MatchId = i64;
pub type MatchClubId = i64;
pub type PlayerId = i64;
pub type UserId = i64;
pub type AttendanceId = i64;
pub type GoalId = i64;

/// 클럽 기본 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    #[serde(default)]
    pub emblem_url: Option<String>,
}

/// 예정된 경기
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub scheduled_at: DateTime<Utc>,
}

/// One club's participation in one match ("match side").
///
/// Soft-deactivated via `active` when withdrawn, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchClub {
    pub id: MatchClubId,
    pub match_id: MatchId,
    pub club_id: ClubId,
    /// Both sides belong to the same club (intra-squad match).
    #[serde(default)]
    pub is_self_match: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// 클럽 소속 선수
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub club_id: ClubId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Guest participant info carried inline on the attendance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercenaryInfo {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One person's participation record for a match side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub match_club_id: MatchClubId,
    /// Registered club player behind this attendance, if any.
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    /// Account behind this attendance; raters are identified by user id.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Set when this attendance is a non-member guest.
    #[serde(default)]
    pub mercenary: Option<MercenaryInfo>,
    /// Opted in to play.
    #[serde(default)]
    pub voted: bool,
    /// Physically present on matchday.
    #[serde(default)]
    pub checked_in: bool,
}

impl Attendance {
    pub fn member_type(&self) -> MemberType {
        if self.player_id.is_some() {
            MemberType::Player
        } else {
            MemberType::Mercenary
        }
    }
}

/// One goal attributed to an attendance within a quarter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub attendance_id: AttendanceId,
    pub quarter: u8,
    /// Counted against the scorer's own side.
    #[serde(default)]
    pub own_goal: bool,
    #[serde(default)]
    pub assist_attendance_id: Option<AttendanceId>,
}

/// One rater's score/like for one attendance, scoped to one match side.
///
/// Unique per (rater_user_id, attendance_id); written only via upsert.
/// `score` is on the raw 0-100 scale; the UI divides by 20 for display.
/// A like without a score leaves `score` as `None` so the attendee's
/// average stays null instead of being dragged to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub rater_user_id: UserId,
    pub match_club_id: MatchClubId,
    pub attendance_id: AttendanceId,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    Player,
    Mercenary,
}

/// Actor role for organizer-gated mutations (goal recording).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Organizer,
    Member,
}

/// Per-attendance received-rating aggregate (derived).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRatingStats {
    pub attendance_id: AttendanceId,
    /// Raw 0-100 scale; 0.0 when nobody has scored yet.
    pub average_rating: f64,
    pub total_rating: u32,
    pub voter_count: u32,
    pub like_count: u32,
}

/// Per-attendance given-rating bookkeeping (derived).
///
/// Tracks how much rating budget this attendee has spent on others,
/// not what they received themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRatingVote {
    pub attendance_id: AttendanceId,
    pub total_used_rating: u32,
    pub has_voted: bool,
    pub voted_member_count: u32,
    pub used_like_count: u32,
}

/// 통계 집계 기간 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] =
        [PeriodType::Month, PeriodType::Quarter, PeriodType::HalfYear, PeriodType::Year];
}

/// Per-player rolling stats for one calendar bucket (derived).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsHistory {
    pub player_id: PlayerId,
    pub period_type: PeriodType,
    /// e.g. "2024-07", "2024-Q3", "2024-H2", "2024".
    pub period_key: String,
    pub average_rating: f64,
    pub total_rating: u32,
    pub match_count: u32,
    pub total_goal: u32,
    pub total_assist: u32,
    pub total_like: u32,
    /// Voted matches over total club matches in the bucket window.
    pub vote_rate: f64,
}
