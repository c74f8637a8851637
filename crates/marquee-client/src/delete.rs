//! Delete flow: local id checks, token gate, request, and local removal.

use marquee_api_models::EntityId;
use tracing::{info, warn};

use crate::error::{ApiError, EndpointContext, EntityKind, map_failure, parse_entity_id};
use crate::http::{ApiClient, ApiRequest};
use crate::notice::Notice;
use crate::session::UnauthorizedPolicy;

/// Deletes entities of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAction {
    kind: EntityKind,
    unauthorized: UnauthorizedPolicy,
}

impl DeleteAction {
    /// Delete action for `kind`; a 401 expires the session.
    #[must_use]
    pub const fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            unauthorized: UnauthorizedPolicy::Expire,
        }
    }

    /// Override the 401 policy.
    #[must_use]
    pub const fn on_unauthorized(mut self, policy: UnauthorizedPolicy) -> Self {
        self.unauthorized = policy;
        self
    }

    /// Kind being deleted.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Delete `raw_id`, calling `on_delete` only after the backend confirms.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a missing or malformed id,
    /// [`ApiError::Unauthorized`] when no token is stored, and the mapped
    /// backend error otherwise. No callback runs on error.
    pub async fn run<F>(
        &self,
        client: &ApiClient,
        raw_id: &str,
        on_delete: F,
    ) -> Result<Notice, ApiError>
    where
        F: FnOnce(&EntityId),
    {
        let id = parse_entity_id(raw_id, "delete")?;

        let session = client.session();
        if session.token().is_none() {
            session.redirect_to_login();
            return Err(ApiError::login_required());
        }

        let path = format!("/{}/{id}", self.kind.route());
        if let Err(failure) = client.send(ApiRequest::delete(path).bearer()).await {
            let err = map_failure(EndpointContext::Delete(self.kind), failure);
            warn!(kind = self.kind.singular(), %id, error = %err, "delete failed");
            session.handle_failure(self.unauthorized, &err);
            return Err(err);
        }

        info!(kind = self.kind.singular(), %id, "entity deleted");
        on_delete(&id);
        Ok(Notice::success(format!(
            "Item with ID {id} deleted successfully."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use httpmock::prelude::*;
    use marquee_test_support::fixtures::MARQUEE_ID;
    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::error::UNAUTHORIZED_MESSAGE;
    use crate::http::ApiRequest;
    use crate::session::{LoginBoundary, Session, StoredSession};

    #[derive(Default)]
    struct CountingBoundary(AtomicUsize);

    impl LoginBoundary for CountingBoundary {
        fn redirect_to_login(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn client(server: &MockServer, token: Option<&str>) -> (ApiClient, Arc<CountingBoundary>) {
        let boundary = Arc::new(CountingBoundary::default());
        let session = Session::in_memory_with(
            StoredSession {
                token: token.map(str::to_string),
                user: None,
            },
            boundary.clone(),
        );
        let client = ApiClient::new(
            &ClientConfig::for_base_url(server.base_url().parse().expect("url")),
            session,
        )
        .expect("client");
        (client, boundary)
    }

    #[tokio::test]
    async fn invalid_ids_never_reach_the_network() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });
        let (client, _) = client(&server, Some("tok"));
        let action = DeleteAction::new(EntityKind::Marquee);
        let removed = RefCell::new(Vec::new());

        let err = action
            .run(&client, "", |id| removed.borrow_mut().push(id.clone()))
            .await
            .expect_err("missing id");
        assert_eq!(err, ApiError::validation("Cannot delete: Item ID is missing."));

        let err = action
            .run(&client, "abc", |id| removed.borrow_mut().push(id.clone()))
            .await
            .expect_err("malformed id");
        assert_eq!(
            err,
            ApiError::validation("Cannot delete: Invalid item ID format.")
        );

        assert!(removed.borrow().is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn missing_token_redirects_without_clearing() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });
        let (client, boundary) = client(&server, None);
        client
            .session()
            .establish(None, Some(marquee_api_models::AdminUser::default()))
            .expect("seed user");

        let err = DeleteAction::new(EntityKind::Event)
            .run(&client, MARQUEE_ID, |_| {})
            .await
            .expect_err("login required");
        assert_eq!(err.message(), "Please log in to perform this action.");
        assert_eq!(boundary.0.load(Ordering::SeqCst), 1);
        assert!(client.session().user().is_some());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn successful_delete_invokes_callback_with_notice() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE)
                .path(format!("/marquees/{MARQUEE_ID}"))
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({"message": "deleted"}));
        });
        let (client, _) = client(&server, Some("tok"));
        let removed = RefCell::new(Vec::new());

        let notice = DeleteAction::new(EntityKind::Marquee)
            .run(&client, MARQUEE_ID, |id| removed.borrow_mut().push(id.clone()))
            .await
            .expect("delete succeeds");
        assert_eq!(
            notice.message,
            format!("Item with ID {MARQUEE_ID} deleted successfully.")
        );
        assert_eq!(removed.borrow().len(), 1);
        mock.assert();
    }

    #[tokio::test]
    async fn not_found_keeps_token_and_skips_callback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(404).json_body(json!({"message": "nope"}));
        });
        let (client, boundary) = client(&server, Some("tok"));
        let mut called = false;

        let err = DeleteAction::new(EntityKind::Marquee)
            .run(&client, MARQUEE_ID, |_| called = true)
            .await
            .expect_err("404");
        assert_eq!(
            err,
            ApiError::NotFound {
                message: "Marquee not found".into()
            }
        );
        assert!(!called);
        assert_eq!(client.session().token().as_deref(), Some("tok"));
        assert_eq!(boundary.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unauthorized_expires_session_by_default() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/services/{MARQUEE_ID}"));
            then.status(401);
        });
        let (client, boundary) = client(&server, Some("tok"));

        let err = DeleteAction::new(EntityKind::Service)
            .run(&client, MARQUEE_ID, |_| {})
            .await
            .expect_err("401");
        assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);
        assert!(client.session().token().is_none());
        assert_eq!(boundary.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn requests_after_expiry_carry_no_token() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(401);
        });
        let anonymous = server.mock(|when, then| {
            when.method(GET)
                .path("/marquees")
                .header_missing("authorization");
            then.status(200).json_body(json!({"data": []}));
        });
        let (client, _) = client(&server, Some("tok"));

        DeleteAction::new(EntityKind::Marquee)
            .run(&client, MARQUEE_ID, |_| {})
            .await
            .expect_err("401");
        client
            .send(ApiRequest::get("/marquees").bearer())
            .await
            .expect("request without token is accepted");
        anonymous.assert();
    }

    #[tokio::test]
    async fn surface_policy_keeps_session_on_unauthorized() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/events/{MARQUEE_ID}"));
            then.status(401);
        });
        let (client, _) = client(&server, Some("tok"));

        DeleteAction::new(EntityKind::Event)
            .on_unauthorized(UnauthorizedPolicy::Surface)
            .run(&client, MARQUEE_ID, |_| {})
            .await
            .expect_err("401");
        assert_eq!(client.session().token().as_deref(), Some("tok"));
    }
}
