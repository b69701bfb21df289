//! Rating and goal mutation JSON API.
//!
//! Every mutation runs its recompute chain before the envelope is
//! returned, so callers always observe derived stats consistent with the
//! rows they just changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceId, GoalId, MatchClubId, Role, UserId};
use crate::mutation::{create_goal, delete_goal, upsert_like, upsert_score};
use crate::state::get_state_mut;
use crate::stats::recalc::update_seeds;
use crate::SCHEMA_VERSION;

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub schema_version: u8,
    pub request_type: RatingRequestType,
    /// Recompute reference time; defaults to the wall clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RatingRequestType {
    /// 점수 입력/수정
    UpsertScore {
        rater_user_id: UserId,
        match_club_id: MatchClubId,
        attendance_id: AttendanceId,
        score: u32,
    },
    /// 좋아요 토글
    UpsertLike {
        rater_user_id: UserId,
        match_club_id: MatchClubId,
        attendance_id: AttendanceId,
        liked: bool,
    },
    /// 골 기록 (운영진 전용)
    CreateGoal {
        role: Role,
        attendance_id: AttendanceId,
        quarter: u8,
        #[serde(default)]
        own_goal: bool,
        #[serde(default)]
        assist_attendance_id: Option<AttendanceId>,
    },
    /// 골 기록 정정 (운영진 전용)
    DeleteGoal { role: Role, goal_id: GoalId },
    /// 기본 점수 일괄 시드
    UpdateSeeds { match_club_id: MatchClubId, rater_user_id: UserId },
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub schema_version: u8,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<RatingResponseType>,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum RatingResponseType {
    Ok { ok: bool },
    GoalCreated { ok: bool, goal_id: GoalId },
}

fn error_response(message: String) -> String {
    serde_json::to_string(&RatingResponse {
        schema_version: SCHEMA_VERSION,
        success: false,
        response_type: None,
        error_message: Some(message),
    })
    .unwrap_or_else(|_| r#"{"success":false,"error_message":"Serialization failed"}"#.to_string())
}

/// Apply one rating/goal mutation to the global store.
pub fn mutate_rating_json(request_json: &str) -> String {
    let request: RatingRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => return error_response(format!("Invalid request format: {}", e)),
    };
    if request.schema_version != SCHEMA_VERSION {
        return error_response(format!(
            "Unsupported schema version: {}",
            request.schema_version
        ));
    }
    let now = request.now.unwrap_or_else(Utc::now);

    let mut store = get_state_mut();
    let result = match request.request_type {
        RatingRequestType::UpsertScore { rater_user_id, match_club_id, attendance_id, score } => {
            upsert_score(&mut store, rater_user_id, match_club_id, attendance_id, score, now)
                .map(|_| RatingResponseType::Ok { ok: true })
        }
        RatingRequestType::UpsertLike { rater_user_id, match_club_id, attendance_id, liked } => {
            upsert_like(&mut store, rater_user_id, match_club_id, attendance_id, liked, now)
                .map(|_| RatingResponseType::Ok { ok: true })
        }
        RatingRequestType::CreateGoal {
            role,
            attendance_id,
            quarter,
            own_goal,
            assist_attendance_id,
        } => create_goal(&mut store, role, attendance_id, quarter, own_goal, assist_attendance_id, now)
            .map(|goal_id| RatingResponseType::GoalCreated { ok: true, goal_id }),
        RatingRequestType::DeleteGoal { role, goal_id } => {
            delete_goal(&mut store, role, goal_id, now)
                .map(|_| RatingResponseType::Ok { ok: true })
        }
        RatingRequestType::UpdateSeeds { match_club_id, rater_user_id } => {
            update_seeds(&mut store, match_club_id, rater_user_id, now)
                .map(|_| RatingResponseType::Ok { ok: true })
        }
    };

    let response = match result {
        Ok(response_type) => RatingResponse {
            schema_version: SCHEMA_VERSION,
            success: true,
            response_type: Some(response_type),
            error_message: None,
        },
        Err(e) => return error_response(e.to_string()),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"error_message":"Serialization failed"}"#.to_string())
}
