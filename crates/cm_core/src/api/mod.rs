pub mod rating_json;
pub mod summary_json;

pub use rating_json::{
    mutate_rating_json, RatingRequest, RatingRequestType, RatingResponse, RatingResponseType,
};
pub use summary_json::{
    match_summary_json, SummaryRequest, SummaryRequestType, SummaryResponse, SummaryResponseType,
};
