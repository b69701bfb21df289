//! Match summary JSON API.
//!
//! Read-only facade over the global club store. Errors never panic and
//! never surface as `Err`; every outcome is a serialized envelope.

use serde::{Deserialize, Serialize};

use crate::state::get_state;
use crate::summary::{match_club_summary, match_summary, MatchClubSummary, MatchSummary};
use crate::SCHEMA_VERSION;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub schema_version: u8,
    pub request_type: SummaryRequestType,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum SummaryRequestType {
    /// 경기 전체 요약
    Match { match_id: i64 },
    /// 한쪽 참가 클럽 요약
    MatchClub { match_club_id: i64 },
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub schema_version: u8,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<SummaryResponseType>,
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SummaryResponseType {
    Match { summary: MatchSummary },
    MatchClub { summary: MatchClubSummary },
}

fn error_response(message: String) -> String {
    serde_json::to_string(&SummaryResponse {
        schema_version: SCHEMA_VERSION,
        success: false,
        response_type: None,
        error_message: Some(message),
    })
    .unwrap_or_else(|_| r#"{"success":false,"error_message":"Serialization failed"}"#.to_string())
}

/// Compute a summary from the global store and return the JSON envelope.
pub fn match_summary_json(request_json: &str) -> String {
    let request: SummaryRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => return error_response(format!("Invalid request format: {}", e)),
    };
    if request.schema_version != SCHEMA_VERSION {
        return error_response(format!(
            "Unsupported schema version: {}",
            request.schema_version
        ));
    }

    let store = get_state();
    let result = match request.request_type {
        SummaryRequestType::Match { match_id } => {
            match_summary(&store, match_id).map(|summary| SummaryResponseType::Match { summary })
        }
        SummaryRequestType::MatchClub { match_club_id } => match_club_summary(&store, match_club_id)
            .map(|summary| SummaryResponseType::MatchClub { summary }),
    };

    let response = match result {
        Ok(response_type) => SummaryResponse {
            schema_version: SCHEMA_VERSION,
            success: true,
            response_type: Some(response_type),
            error_message: None,
        },
        Err(e) => {
            return error_response(e.to_string());
        }
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"error_message":"Serialization failed"}"#.to_string())
}
