//! Marquee management board: list, filter, edit, review and delete.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use marquee_api_models::{BookingStatus, EntityId, Marquee};

use crate::collection::{remove_entity, replace_entity};
use crate::delete::DeleteAction;
use crate::error::{ApiError, EntityKind};
use crate::fetch::{FetchConfig, FetchOutcome, FetchSnapshot, Fetcher};
use crate::http::ApiClient;
use crate::notice::Notice;
use crate::session::UnauthorizedPolicy;
use crate::update::{MarqueeForm, Review, review_marquee, update_marquee};

/// Which marquees the board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every marquee.
    #[default]
    All,
    /// Marquees whose effective status matches.
    Only(BookingStatus),
}

impl StatusFilter {
    /// Whether `marquee` passes the filter.
    #[must_use]
    pub fn matches(self, marquee: &Marquee) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => marquee.effective_status() == Some(status),
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => formatter.write_str("all"),
            Self::Only(status) => Display::fmt(status, formatter),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse::<BookingStatus>().map(Self::Only)
    }
}

/// State behind the marquee management screen.
///
/// Failures of board actions are kept as the form error so the screen can
/// render them above the list; they are also returned to the caller.
pub struct MarqueeBoard {
    client: ApiClient,
    fetcher: Fetcher<Vec<Marquee>>,
    filter: StatusFilter,
    editing: Option<MarqueeForm>,
    form_error: Option<String>,
    unauthorized: UnauthorizedPolicy,
}

impl MarqueeBoard {
    /// Board over `GET /marquees`; nothing is fetched until
    /// [`MarqueeBoard::refresh`].
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let fetcher = Fetcher::new(client.clone(), "/marquees", FetchConfig::list());
        Self {
            client,
            fetcher,
            filter: StatusFilter::All,
            editing: None,
            form_error: None,
            unauthorized: UnauthorizedPolicy::Expire,
        }
    }

    /// Reload the list.
    pub async fn refresh(&self) -> FetchOutcome {
        self.fetcher.fetch().await
    }

    /// Drop any outstanding list response.
    pub fn cancel(&self) {
        self.fetcher.cancel();
    }

    /// Raw fetch state.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot<Vec<Marquee>> {
        self.fetcher.snapshot()
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Change the filter; purely local.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Loaded marquees passing the filter, in server order.
    #[must_use]
    pub fn visible(&self) -> Vec<Marquee> {
        self.fetcher
            .data()
            .unwrap_or_default()
            .into_iter()
            .filter(|marquee| self.filter.matches(marquee))
            .collect()
    }

    /// Last action failure.
    #[must_use]
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Form currently being edited.
    #[must_use]
    pub const fn editing(&self) -> Option<&MarqueeForm> {
        self.editing.as_ref()
    }

    /// Open the edit form for a loaded marquee.
    pub fn begin_edit(&mut self, id: &EntityId) -> Option<&mut MarqueeForm> {
        let marquee = self
            .fetcher
            .data()
            .and_then(|rows| rows.into_iter().find(|marquee| &marquee.id == id))?;
        self.form_error = None;
        self.editing = Some(MarqueeForm::from_marquee(&marquee));
        self.editing.as_mut()
    }

    /// Mutable access to the open form.
    pub fn editing_mut(&mut self) -> Option<&mut MarqueeForm> {
        self.editing.as_mut()
    }

    /// Close the edit form without saving.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form_error = None;
    }

    /// Submit the open form and replace the local entry with the server copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when no form is open, or the update
    /// error. The form stays open on failure.
    pub async fn submit_edit(&mut self) -> Result<Marquee, ApiError> {
        self.form_error = None;
        let Some(form) = self.editing.as_ref() else {
            return Err(ApiError::validation("No marquee is being edited"));
        };
        match update_marquee(&self.client, form, self.unauthorized).await {
            Ok(updated) => {
                self.apply_server_copy(updated.clone());
                self.editing = None;
                Ok(updated)
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Approve a marquee.
    ///
    /// # Errors
    ///
    /// Returns the review error.
    pub async fn approve(&mut self, raw_id: &str) -> Result<Marquee, ApiError> {
        self.review(raw_id, Review::Approve).await
    }

    /// Reject a marquee.
    ///
    /// # Errors
    ///
    /// Returns the review error.
    pub async fn reject(&mut self, raw_id: &str) -> Result<Marquee, ApiError> {
        self.review(raw_id, Review::Reject).await
    }

    /// Delete a marquee and drop it from the local list.
    ///
    /// # Errors
    ///
    /// Returns the delete error; the list is untouched on failure.
    pub async fn delete(&mut self, raw_id: &str) -> Result<Notice, ApiError> {
        self.form_error = None;
        let fetcher = &self.fetcher;
        let result = DeleteAction::new(EntityKind::Marquee)
            .on_unauthorized(self.unauthorized)
            .run(&self.client, raw_id, |id| {
                fetcher.update_data(|rows| {
                    remove_entity(rows, id);
                });
            })
            .await;
        result.map_err(|err| self.record(err))
    }

    async fn review(&mut self, raw_id: &str, review: Review) -> Result<Marquee, ApiError> {
        self.form_error = None;
        match review_marquee(&self.client, raw_id, review, self.unauthorized).await {
            Ok(updated) => {
                self.apply_server_copy(updated.clone());
                Ok(updated)
            }
            Err(err) => Err(self.record(err)),
        }
    }

    fn apply_server_copy(&self, updated: Marquee) {
        self.fetcher.update_data(|rows| {
            replace_entity(rows, updated);
        });
    }

    fn record(&mut self, err: ApiError) -> ApiError {
        self.form_error = Some(err.message().to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use httpmock::prelude::*;
    use marquee_test_support::fixtures::{MARQUEE_ID, OTHER_MARQUEE_ID, marquee_json};
    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::session::{LogOnlyBoundary, Session, StoredSession};

    fn client(server: &MockServer) -> ApiClient {
        let session = Session::in_memory_with(
            StoredSession {
                token: Some("tok".into()),
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

    fn list_mock(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/marquees");
            then.status(200).json_body(json!({"data": [
                marquee_json(MARQUEE_ID, "pending"),
                marquee_json(OTHER_MARQUEE_ID, "active"),
            ]}));
        });
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("ALL".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "rejected".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(BookingStatus::Rejected))
        );
        assert!("archived".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Only(BookingStatus::Active).to_string(), "active");
    }

    #[tokio::test]
    async fn filter_narrows_visible_rows() {
        let server = MockServer::start_async().await;
        list_mock(&server);
        let mut board = MarqueeBoard::new(client(&server));
        assert_eq!(board.refresh().await, FetchOutcome::Applied);
        assert_eq!(board.visible().len(), 2);

        board.set_filter(StatusFilter::Only(BookingStatus::Pending));
        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), MARQUEE_ID);
    }

    #[tokio::test]
    async fn approve_replaces_entry_without_duplicates() {
        let server = MockServer::start_async().await;
        list_mock(&server);
        server.mock(|when, then| {
            when.method(PUT)
                .path(format!("/marquees/{MARQUEE_ID}"))
                .json_body(json!({"bookingStatus": "active"}));
            then.status(200)
                .json_body(json!({"data": marquee_json(MARQUEE_ID, "active")}));
        });

        let mut board = MarqueeBoard::new(client(&server));
        board.refresh().await;
        board.approve(MARQUEE_ID).await.expect("approve succeeds");

        let rows = board.visible();
        assert_eq!(rows.len(), 2);
        let approved: Vec<_> = rows
            .iter()
            .filter(|marquee| marquee.id.as_str() == MARQUEE_ID)
            .collect();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].effective_status(), Some(BookingStatus::Active));
        assert!(board.form_error().is_none());
    }

    #[tokio::test]
    async fn delete_removes_row_and_failures_become_form_error() {
        let server = MockServer::start_async().await;
        list_mock(&server);
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(200).json_body(json!({"message": "ok"}));
        });
        server.mock(|when, then| {
            when.method(DELETE).path(format!("/marquees/{OTHER_MARQUEE_ID}"));
            then.status(403);
        });

        let mut board = MarqueeBoard::new(client(&server));
        board.refresh().await;
        board.delete(MARQUEE_ID).await.expect("delete succeeds");
        assert_eq!(board.visible().len(), 1);

        board
            .delete(OTHER_MARQUEE_ID)
            .await
            .expect_err("forbidden");
        assert_eq!(
            board.form_error(),
            Some("Unauthorized: You can only delete your own marquees")
        );
        assert_eq!(board.visible().len(), 1);
    }

    #[tokio::test]
    async fn edit_round_trip_updates_local_copy() {
        let server = MockServer::start_async().await;
        list_mock(&server);
        let mut renamed = marquee_json(MARQUEE_ID, "pending");
        renamed["name"] = json!("Hall Z");
        server.mock(move |when, then| {
            when.method(PUT).path(format!("/marquees/{MARQUEE_ID}"));
            then.status(200).json_body(json!({"data": renamed}));
        });

        let mut board = MarqueeBoard::new(client(&server));
        board.refresh().await;
        let id: EntityId = MARQUEE_ID.parse().expect("id");
        let form = board.begin_edit(&id).expect("marquee is loaded");
        form.name = "Hall Z".into();

        board.submit_edit().await.expect("update succeeds");
        assert!(board.editing().is_none());
        assert_eq!(
            board
                .visible()
                .iter()
                .find(|marquee| marquee.id == id)
                .map(|marquee| marquee.name.clone()),
            Some("Hall Z".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_edit_keeps_form_open() {
        let server = MockServer::start_async().await;
        list_mock(&server);
        let mut board = MarqueeBoard::new(client(&server));
        board.refresh().await;
        let id: EntityId = MARQUEE_ID.parse().expect("id");
        board.begin_edit(&id).expect("loaded").capacity = "0".into();

        board.submit_edit().await.expect_err("invalid");
        assert_eq!(board.form_error(), Some("Capacity must be a positive number"));
        assert!(board.editing().is_some());
    }
}
