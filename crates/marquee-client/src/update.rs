//! Marquee edit and review (approve/reject) flows.

use marquee_api_models::{
    BookingStatus, DataEnvelope, Location, Marquee, MarqueeStatusUpdate, MarqueeUpdate, Pricing,
};
use tracing::{info, warn};

use crate::error::{ApiError, EndpointContext, EntityKind, map_failure, parse_entity_id};
use crate::http::{ApiClient, ApiRequest};
use crate::session::UnauthorizedPolicy;

/// Raised when an edit is attempted without a stored token.
pub const MISSING_TOKEN_MESSAGE: &str = "No authentication token found. Please log in.";

/// Editable marquee fields as typed by the user.
///
/// Numeric fields stay strings until [`MarqueeForm::validate`] so partially
/// typed input can be held without loss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarqueeForm {
    /// Identifier of the marquee being edited.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
    /// Guest capacity.
    pub capacity: String,
    /// Price per hour.
    pub per_hour: String,
    /// Price per day.
    pub per_day: String,
    /// Booking status to keep or set.
    pub booking_status: BookingStatus,
}

impl MarqueeForm {
    /// Pre-fill the form from a loaded marquee.
    #[must_use]
    pub fn from_marquee(marquee: &Marquee) -> Self {
        Self {
            id: marquee.id.to_string(),
            name: marquee.name.clone(),
            description: marquee.description.clone(),
            address: marquee.location.address.clone(),
            city: marquee.location.city.clone(),
            state: marquee.location.state.clone(),
            country: marquee.location.country.clone(),
            capacity: marquee.capacity.max(1).to_string(),
            per_hour: marquee.pricing.per_hour.to_string(),
            per_day: marquee.pricing.per_day.to_string(),
            booking_status: marquee.effective_status().unwrap_or_default(),
        }
    }

    /// Check the fields and build the request payload.
    ///
    /// Rules run in display order and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<MarqueeUpdate, ApiError> {
        let required = [
            (&self.name, "Name is required"),
            (&self.description, "Description is required"),
            (&self.address, "Address is required"),
            (&self.city, "City is required"),
            (&self.state, "State is required"),
            (&self.country, "Country is required"),
        ];
        if let Some((_, message)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(ApiError::validation(*message));
        }

        let capacity = self
            .capacity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|capacity| *capacity > 0)
            .ok_or_else(|| ApiError::validation("Capacity must be a positive number"))?;
        let per_hour = parse_price(&self.per_hour)
            .ok_or_else(|| ApiError::validation("Price per hour must be non-negative"))?;
        let per_day = parse_price(&self.per_day)
            .ok_or_else(|| ApiError::validation("Price per day must be non-negative"))?;

        Ok(MarqueeUpdate {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            location: Location {
                address: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                country: self.country.trim().to_string(),
            },
            capacity,
            pricing: Pricing {
                per_hour,
                per_day,
                additional_fees: Vec::new(),
            },
            booking_status: (self.booking_status != BookingStatus::Unknown)
                .then_some(self.booking_status),
        })
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Validate `form` and submit it as a full marquee edit.
///
/// Returns the server's copy of the marquee, which callers should use to
/// replace their local entry.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] before any network call when a field or
/// the id is invalid, [`ApiError::Unauthorized`] without a token, and the
/// mapped backend error otherwise.
pub async fn update_marquee(
    client: &ApiClient,
    form: &MarqueeForm,
    policy: UnauthorizedPolicy,
) -> Result<Marquee, ApiError> {
    let payload = form.validate()?;
    let id = parse_entity_id(&form.id, "update")?;
    if client.session().token().is_none() {
        return Err(ApiError::Unauthorized {
            message: MISSING_TOKEN_MESSAGE.to_string(),
        });
    }

    let context = EndpointContext::Update(EntityKind::Marquee);
    let request = ApiRequest::put(format!("/marquees/{id}"))
        .bearer()
        .json(&payload)
        .map_err(|failure| map_failure(context, failure))?;
    match client.send_json::<DataEnvelope<Marquee>>(request).await {
        Ok(envelope) => {
            info!(%id, "marquee updated");
            Ok(envelope.data)
        }
        Err(failure) => {
            let err = map_failure(context, failure);
            warn!(%id, error = %err, "marquee update failed");
            client.session().handle_failure(policy, &err);
            Err(err)
        }
    }
}

/// Administrator review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    /// Move to [`BookingStatus::Active`].
    Approve,
    /// Move to [`BookingStatus::Rejected`].
    Reject,
}

impl Review {
    /// Status the marquee moves to.
    #[must_use]
    pub const fn target_status(self) -> BookingStatus {
        match self {
            Self::Approve => BookingStatus::Active,
            Self::Reject => BookingStatus::Rejected,
        }
    }

    const fn context(self) -> EndpointContext {
        EndpointContext::StatusChange {
            kind: EntityKind::Marquee,
            approve: matches!(self, Self::Approve),
        }
    }
}

/// Approve or reject a marquee; returns the server's updated copy.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a bad id, [`ApiError::Unauthorized`]
/// without a token, and the mapped backend error otherwise.
pub async fn review_marquee(
    client: &ApiClient,
    raw_id: &str,
    review: Review,
    policy: UnauthorizedPolicy,
) -> Result<Marquee, ApiError> {
    let id = parse_entity_id(raw_id, "update status")?;
    if client.session().token().is_none() {
        return Err(ApiError::Unauthorized {
            message: MISSING_TOKEN_MESSAGE.to_string(),
        });
    }

    let context = review.context();
    let request = ApiRequest::put(format!("/marquees/{id}"))
        .bearer()
        .json(&MarqueeStatusUpdate {
            booking_status: review.target_status(),
        })
        .map_err(|failure| map_failure(context, failure))?;
    match client.send_json::<DataEnvelope<Marquee>>(request).await {
        Ok(envelope) => {
            info!(%id, status = %review.target_status(), "marquee reviewed");
            Ok(envelope.data)
        }
        Err(failure) => {
            let err = map_failure(context, failure);
            warn!(%id, error = %err, "marquee review failed");
            client.session().handle_failure(policy, &err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use httpmock::prelude::*;
    use marquee_test_support::fixtures::{MARQUEE_ID, marquee_json};
    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::session::{LogOnlyBoundary, Session, StoredSession};

    fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
        let session = Session::in_memory_with(
            StoredSession {
                token: token.map(str::to_string),
                user: None,
            },
            Arc::new(LogOnlyBoundary),
        );
        ApiClient::new(
            &ClientConfig::for_base_url(server.base_url().parse().expect("url")),
            session,
        )
        .expect("client")
    }

    fn filled_form() -> MarqueeForm {
        MarqueeForm {
            id: MARQUEE_ID.into(),
            name: "Hall A".into(),
            description: "Garden".into(),
            address: "1 Main St".into(),
            city: "Lahore".into(),
            state: "Punjab".into(),
            country: "PK".into(),
            capacity: "10".into(),
            per_hour: "5.5".into(),
            per_day: "40".into(),
            booking_status: BookingStatus::Pending,
        }
    }

    #[test]
    fn validate_builds_nested_typed_payload() {
        let payload = filled_form().validate().expect("valid form");
        let body = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(body["capacity"], json!(10));
        assert_eq!(body["pricing"]["perHour"], json!(5.5));
        assert_eq!(body["pricing"]["perDay"], json!(40.0));
        assert_eq!(body["location"]["city"], json!("Lahore"));
        assert_eq!(body["bookingStatus"], json!("pending"));
    }

    #[test]
    fn validate_reports_first_failure_in_order() {
        let mut form = filled_form();
        form.name = "  ".into();
        form.city = String::new();
        assert_eq!(form.validate(), Err(ApiError::validation("Name is required")));

        let mut form = filled_form();
        form.capacity = "0".into();
        assert_eq!(
            form.validate(),
            Err(ApiError::validation("Capacity must be a positive number"))
        );
        form.capacity = "2.5".into();
        assert!(form.validate().is_err());

        let mut form = filled_form();
        form.per_day = "-1".into();
        assert_eq!(
            form.validate(),
            Err(ApiError::validation("Price per day must be non-negative"))
        );
    }

    #[test]
    fn form_prefills_from_marquee() {
        let marquee: Marquee =
            serde_json::from_value(marquee_json(MARQUEE_ID, "booked")).expect("fixture");
        let form = MarqueeForm::from_marquee(&marquee);
        assert_eq!(form.id, MARQUEE_ID);
        assert_eq!(form.booking_status, BookingStatus::Booked);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn unrecognised_status_is_left_to_the_server() {
        let marquee: Marquee =
            serde_json::from_value(marquee_json(MARQUEE_ID, "archived")).expect("fixture");
        let form = MarqueeForm::from_marquee(&marquee);
        assert_eq!(form.booking_status, BookingStatus::Unknown);

        let body = serde_json::to_value(form.validate().expect("valid form")).expect("serialize");
        assert!(body.get("bookingStatus").is_none());
        assert_eq!(body["name"], json!("Hall A"));
    }

    #[tokio::test]
    async fn invalid_form_makes_no_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT);
            then.status(200);
        });
        let mut form = filled_form();
        form.name = String::new();

        let err = update_marquee(&client(&server, Some("tok")), &form, UnauthorizedPolicy::Surface)
            .await
            .expect_err("invalid form");
        assert_eq!(err.message(), "Name is required");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn update_sends_payload_and_returns_server_copy() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path(format!("/marquees/{MARQUEE_ID}"))
                .header("authorization", "Bearer tok")
                .json_body(json!({
                    "name": "Hall A",
                    "description": "Garden",
                    "location": {"address": "1 Main St", "city": "Lahore", "state": "Punjab", "country": "PK"},
                    "capacity": 10,
                    "pricing": {"perHour": 5.5, "perDay": 40.0, "additionalFees": []},
                    "bookingStatus": "pending"
                }));
            then.status(200)
                .json_body(json!({"data": marquee_json(MARQUEE_ID, "pending")}));
        });

        let updated = update_marquee(
            &client(&server, Some("tok")),
            &filled_form(),
            UnauthorizedPolicy::Surface,
        )
        .await
        .expect("update succeeds");
        assert_eq!(updated.id.as_str(), MARQUEE_ID);
        mock.assert();
    }

    #[tokio::test]
    async fn update_without_token_fails_locally() {
        let server = MockServer::start_async().await;
        let err = update_marquee(&client(&server, None), &filled_form(), UnauthorizedPolicy::Surface)
            .await
            .expect_err("token required");
        assert_eq!(err.message(), MISSING_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn update_forbidden_maps_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(PUT).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(403).json_body(json!({"message": "not yours"}));
        });
        let err = update_marquee(
            &client(&server, Some("tok")),
            &filled_form(),
            UnauthorizedPolicy::Surface,
        )
        .await
        .expect_err("403");
        assert_eq!(
            err.message(),
            "Unauthorized: You can only update your own marquees"
        );
    }

    #[tokio::test]
    async fn approve_sends_active_status() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path(format!("/marquees/{MARQUEE_ID}"))
                .json_body(json!({"bookingStatus": "active"}));
            then.status(200)
                .json_body(json!({"data": marquee_json(MARQUEE_ID, "active")}));
        });

        let updated = review_marquee(
            &client(&server, Some("tok")),
            MARQUEE_ID,
            Review::Approve,
            UnauthorizedPolicy::Surface,
        )
        .await
        .expect("approve succeeds");
        assert_eq!(updated.effective_status(), Some(BookingStatus::Active));
        mock.assert();
    }

    #[tokio::test]
    async fn reject_failure_names_the_action() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(PUT).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(500);
        });
        let err = review_marquee(
            &client(&server, Some("tok")),
            MARQUEE_ID,
            Review::Reject,
            UnauthorizedPolicy::Surface,
        )
        .await
        .expect_err("500");
        assert_eq!(err.message(), "Failed to reject marquee");
    }
}
