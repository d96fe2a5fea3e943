//! Custom order intake route handler.
//!
//! The customize flow uploads the reference image straight to object
//! storage, then posts the form fields plus the stored path here. The
//! row is created `pending`; everything after that belongs to the back
//! office.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use forgeline_core::Email;

use crate::db::CustomOrderRepository;
use crate::db::custom_orders::NewCustomOrder;
use crate::state::AppState;

/// Request body for a custom piece request.
#[derive(Debug, Deserialize)]
pub struct CustomOrderForm {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Storage path of the already-uploaded reference image.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferred_material: Option<String>,
    #[serde(default)]
    pub preferred_size: Option<String>,
    #[serde(default)]
    pub preferred_thickness: Option<String>,
}

/// Intake outcome.
#[derive(Debug, Serialize)]
pub struct CustomOrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CustomOrderResponse {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Validate and normalize a submission into a persistable record.
///
/// Blank optional fields collapse to `None`. Returns the first failing
/// message, field order matching the form.
fn validate(form: CustomOrderForm) -> Result<NewCustomOrder, String> {
    let name = form.customer_name.trim();
    if name.len() < 2 {
        return Err("Name must be at least 2 characters".to_string());
    }
    if name.len() > 100 {
        return Err("Name is too long".to_string());
    }

    let email = Email::parse(&form.customer_email)
        .map_err(|_| "Please enter a valid email address".to_string())?;

    let description = normalize(form.description);
    if description.as_deref().is_some_and(|d| d.len() > 1000) {
        return Err("Description is too long".to_string());
    }

    let Some(image_url) = form.image_url.filter(|url| !url.trim().is_empty()) else {
        return Err("Image is required.".to_string());
    };

    Ok(NewCustomOrder {
        customer_name: name.to_string(),
        customer_email: email,
        customer_phone: normalize(form.customer_phone),
        image_url,
        description,
        preferred_material: normalize(form.preferred_material),
        preferred_size: normalize(form.preferred_size),
        preferred_thickness: normalize(form.preferred_thickness),
    })
}

/// Trim an optional field, collapsing blank values to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submit a custom piece request.
#[instrument(skip(state, form), fields(email = %form.customer_email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<CustomOrderForm>,
) -> Response {
    let request = match validate(form) {
        Ok(request) => request,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    match CustomOrderRepository::new(state.pool())
        .create(&request)
        .await
    {
        Ok(id) => {
            tracing::info!(custom_order_id = %id, "Custom order request received");
            (
                StatusCode::OK,
                Json(CustomOrderResponse {
                    success: true,
                    error: None,
                }),
            )
                .into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Custom order insert failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to submit your request. Please try again.",
            )
        }
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(CustomOrderResponse::failure(error))).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> CustomOrderForm {
        CustomOrderForm {
            customer_name: "Bilal Sheikh".to_string(),
            customer_email: "bilal@example.com".to_string(),
            customer_phone: Some("03001234567".to_string()),
            image_url: Some("custom-orders/req-42/reference.png".to_string()),
            description: Some("A falcon silhouette for the study wall".to_string()),
            preferred_material: Some("steel".to_string()),
            preferred_size: Some("3x3".to_string()),
            preferred_thickness: None,
        }
    }

    #[test]
    fn test_validate_happy_path() {
        let request = validate(form()).unwrap();
        assert_eq!(request.customer_name, "Bilal Sheikh");
        assert_eq!(request.customer_email.as_str(), "bilal@example.com");
        assert_eq!(request.image_url, "custom-orders/req-42/reference.png");
        assert_eq!(request.preferred_thickness, None);
    }

    #[test]
    fn test_validate_rejects_short_and_long_names() {
        let mut short = form();
        short.customer_name = "B".to_string();
        assert_eq!(
            validate(short).unwrap_err(),
            "Name must be at least 2 characters"
        );

        let mut long = form();
        long.customer_name = "x".repeat(101);
        assert_eq!(validate(long).unwrap_err(), "Name is too long");

        let mut boundary = form();
        boundary.customer_name = "x".repeat(100);
        assert!(validate(boundary).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut bad = form();
        bad.customer_email = "not-an-email".to_string();
        assert_eq!(
            validate(bad).unwrap_err(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_validate_rejects_long_description() {
        let mut long = form();
        long.description = Some("d".repeat(1001));
        assert_eq!(validate(long).unwrap_err(), "Description is too long");

        let mut boundary = form();
        boundary.description = Some("d".repeat(1000));
        assert!(validate(boundary).is_ok());
    }

    #[test]
    fn test_validate_requires_image() {
        let mut missing = form();
        missing.image_url = None;
        assert_eq!(validate(missing).unwrap_err(), "Image is required.");

        let mut blank = form();
        blank.image_url = Some("   ".to_string());
        assert_eq!(validate(blank).unwrap_err(), "Image is required.");
    }

    #[test]
    fn test_validate_collapses_blank_optionals() {
        let mut blanks = form();
        blanks.customer_phone = Some("  ".to_string());
        blanks.description = Some(String::new());
        blanks.preferred_material = None;

        let request = validate(blanks).unwrap();
        assert_eq!(request.customer_phone, None);
        assert_eq!(request.description, None);
        assert_eq!(request.preferred_material, None);
    }
}
