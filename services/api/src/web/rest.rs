//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::response::Json;
use comment_lottery_core::link;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        validate_link_handler,
    ),
    components(
        schemas(ValidateLinkRequest, ValidateLinkResponse)
    ),
    tags(
        (name = "Comment Lottery API", description = "API endpoints for the YouTube comment lottery wheel.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ValidateLinkRequest {
    pub link: String,
}

/// The verdict on a candidate link.
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct ValidateLinkResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Check whether a link can be submitted.
///
/// Lets the client show an inline validation message before submission is possible.
#[utoipa::path(
    post,
    path = "/links/validate",
    request_body = ValidateLinkRequest,
    responses(
        (status = 200, description = "Validation verdict", body = ValidateLinkResponse),
        (status = 400, description = "Bad request (e.g., missing link field)")
    )
)]
pub async fn validate_link_handler(
    Json(request): Json<ValidateLinkRequest>,
) -> Json<ValidateLinkResponse> {
    Json(validate_link(&request.link))
}

pub fn validate_link(raw: &str) -> ValidateLinkResponse {
    match link::parse(raw) {
        Ok(video_id) => ValidateLinkResponse {
            valid: true,
            video_id: Some(video_id.to_string()),
            message: None,
        },
        Err(e) => ValidateLinkResponse {
            valid: false,
            video_id: None,
            message: Some(e.to_string()),
        },
    }
}
