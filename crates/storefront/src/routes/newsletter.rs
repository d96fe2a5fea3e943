//! Newsletter subscription route handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use forgeline_core::Email;

use crate::db::{NewsletterRepository, RepositoryError};
use crate::state::AppState;

/// Request body for a newsletter opt-in.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Subscription outcome.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubscribeResponse {
    fn subscribed() -> Self {
        Self {
            success: true,
            message: Some(
                "Successfully subscribed! Check your inbox for your discount code.".to_string(),
            ),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Subscribe an email address to the newsletter.
///
/// Addresses are normalized before insert; a duplicate gets a distinct
/// 409 outcome instead of the generic failure.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Response {
    if request.email.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Email is required");
    }

    let Ok(email) = Email::parse(&request.email) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "Please enter a valid email address",
        );
    };

    match NewsletterRepository::new(state.pool()).subscribe(&email).await {
        Ok(id) => {
            tracing::info!(subscriber_id = %id, "Newsletter subscription created");
            (StatusCode::OK, Json(SubscribeResponse::subscribed())).into_response()
        }
        Err(RepositoryError::Conflict(_)) => {
            failure(StatusCode::CONFLICT, "This email is already subscribed")
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Newsletter subscription failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to subscribe. Please try again.",
            )
        }
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(SubscribeResponse::failure(error))).into_response()
}
