//! Review authority DTOs

use serde::Deserialize;
use validator::Validate;

use domain_listing::ReviewDecision;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewListingRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
}
