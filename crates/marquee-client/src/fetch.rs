//! Resource fetcher shared by the single-entity and list screens.
//!
//! # Design
//! - One implementation; behaviour differences live in [`FetchConfig`].
//! - Every trigger takes a ticket from a generation counter. A response is
//!   applied only if its ticket is still current, so [`Fetcher::cancel`] and
//!   newer triggers both discard late completions.
//! - Snapshot, generation and in-flight ticket share one mutex, which is
//!   never held across an await.

use std::sync::{Mutex, PoisonError};

use marquee_api_models::DataEnvelope;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, EndpointContext, map_failure};
use crate::http::{ApiClient, ApiRequest};
use crate::session::UnauthorizedPolicy;

/// Shape of a successful body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The body is the resource.
    Raw,
    /// The resource sits under `data`.
    Data,
}

/// Whether a stored token is needed before calling the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Send the bearer when present.
    Optional,
    /// Fail locally without a token.
    Required,
}

/// What happens when a trigger arrives while a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Ignore the new trigger.
    SkipWhileLoading,
    /// Start a new request; the older response is dropped on arrival.
    LatestWins,
}

/// Behaviour switches for a [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Body shape.
    pub envelope: Envelope,
    /// Token requirement.
    pub token: TokenPolicy,
    /// Overlapping trigger handling.
    pub concurrency: Concurrency,
    /// Session handling on 401.
    pub unauthorized: UnauthorizedPolicy,
    /// Message table used for failures.
    pub context: EndpointContext,
}

impl FetchConfig {
    /// Single resource: raw body, optional token, overlapping triggers skipped.
    #[must_use]
    pub const fn entity() -> Self {
        Self {
            envelope: Envelope::Raw,
            token: TokenPolicy::Optional,
            concurrency: Concurrency::SkipWhileLoading,
            unauthorized: UnauthorizedPolicy::Surface,
            context: EndpointContext::FetchEntity,
        }
    }

    /// Collection: `data` envelope, token required, latest trigger wins.
    #[must_use]
    pub const fn list() -> Self {
        Self {
            envelope: Envelope::Data,
            token: TokenPolicy::Required,
            concurrency: Concurrency::LatestWins,
            unauthorized: UnauthorizedPolicy::Surface,
            context: EndpointContext::FetchList,
        }
    }

    /// Same configuration with a different 401 policy.
    #[must_use]
    pub const fn with_unauthorized(mut self, policy: UnauthorizedPolicy) -> Self {
        self.unauthorized = policy;
        self
    }
}

/// Lifecycle of the latest fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Nothing requested yet, or cancelled.
    #[default]
    Idle,
    /// Request outstanding.
    Loading,
    /// Last applied request succeeded.
    Success,
    /// Last applied request failed.
    Failure,
}

/// Observable fetcher state.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSnapshot<T> {
    /// Current phase.
    pub phase: FetchPhase,
    /// Last successfully fetched resource, possibly patched locally.
    pub data: Option<T>,
    /// Error from the last applied failure.
    pub error: Option<ApiError>,
}

impl<T> Default for FetchSnapshot<T> {
    fn default() -> Self {
        Self {
            phase: FetchPhase::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> FetchSnapshot<T> {
    /// Whether a request is outstanding.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }
}

/// Result of a single [`Fetcher::fetch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied as data.
    Applied,
    /// The failure was applied as the error.
    Failed,
    /// Another request was outstanding and the trigger was ignored.
    Skipped,
    /// The response arrived after a newer trigger or a cancel.
    Stale,
}

struct Inner<T> {
    snapshot: FetchSnapshot<T>,
    generation: u64,
    in_flight: Option<u64>,
}

/// Releases the in-flight slot unless a cancel already reclaimed it.
struct InFlight<'a, T> {
    inner: &'a Mutex<Inner<T>>,
    ticket: u64,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.in_flight == Some(self.ticket) {
            inner.in_flight = None;
        }
    }
}

/// Fetches one resource path and tracks loading, data and error.
pub struct Fetcher<T> {
    client: ApiClient,
    path: Mutex<String>,
    config: FetchConfig,
    inner: Mutex<Inner<T>>,
}

impl<T> Fetcher<T>
where
    T: DeserializeOwned + Clone,
{
    /// Fetcher for `path` with `config`; nothing is requested until
    /// [`Fetcher::fetch`].
    pub fn new(client: ApiClient, path: impl Into<String>, config: FetchConfig) -> Self {
        Self {
            client,
            path: Mutex::new(path.into()),
            config,
            inner: Mutex::new(Inner {
                snapshot: FetchSnapshot::default(),
                generation: 0,
                in_flight: None,
            }),
        }
    }

    /// Path currently targeted.
    #[must_use]
    pub fn path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> FetchConfig {
        self.config
    }

    /// Point the fetcher at `path` and fetch it. Outstanding responses for
    /// the old path become stale. Returns `None` when the path is unchanged.
    pub async fn retarget(&self, path: impl Into<String>) -> Option<FetchOutcome> {
        let path = path.into();
        {
            let mut current = self.path.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == path {
                return None;
            }
            *current = path;
        }
        self.cancel();
        Some(self.fetch().await)
    }

    /// Discard any outstanding response. Data already applied is kept.
    pub fn cancel(&self) {
        self.with_inner(|inner| {
            inner.generation += 1;
            inner.in_flight = None;
            if inner.snapshot.phase == FetchPhase::Loading {
                inner.snapshot.phase = if inner.snapshot.data.is_some() {
                    FetchPhase::Success
                } else {
                    FetchPhase::Idle
                };
            }
        });
    }

    /// Request the resource and apply the result if it is still current.
    pub async fn fetch(&self) -> FetchOutcome {
        let path = self.path();
        let token_missing = self.config.token == TokenPolicy::Required
            && self.client.session().token().is_none();

        let ticket = self.with_inner(|inner| {
            if self.config.concurrency == Concurrency::SkipWhileLoading
                && inner.in_flight.is_some()
            {
                return None;
            }
            inner.generation += 1;
            if token_missing {
                inner.snapshot.phase = FetchPhase::Failure;
                inner.snapshot.error = Some(ApiError::login_required());
            } else {
                inner.in_flight = Some(inner.generation);
                inner.snapshot.phase = FetchPhase::Loading;
                inner.snapshot.error = None;
            }
            Some(inner.generation)
        });
        let Some(ticket) = ticket else {
            debug!(%path, "fetch skipped; request already outstanding");
            return FetchOutcome::Skipped;
        };
        if token_missing {
            return FetchOutcome::Failed;
        }
        let _guard = InFlight {
            inner: &self.inner,
            ticket,
        };

        let result = self.load(path.clone()).await;
        if let Err(err) = &result {
            self.client
                .session()
                .handle_failure(self.config.unauthorized, err);
        }

        self.with_inner(|inner| {
            if inner.generation != ticket {
                debug!(%path, "discarding stale response");
                return FetchOutcome::Stale;
            }
            match result {
                Ok(data) => {
                    inner.snapshot.phase = FetchPhase::Success;
                    inner.snapshot.data = Some(data);
                    inner.snapshot.error = None;
                    FetchOutcome::Applied
                }
                Err(err) => {
                    warn!(%path, error = %err, "fetch failed");
                    inner.snapshot.phase = FetchPhase::Failure;
                    inner.snapshot.error = Some(err);
                    FetchOutcome::Failed
                }
            }
        })
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot<T> {
        self.with_inner(|inner| inner.snapshot.clone())
    }

    /// Copy of the current data.
    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.with_inner(|inner| inner.snapshot.data.clone())
    }

    /// Current error, if the last applied request failed.
    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        self.with_inner(|inner| inner.snapshot.error.clone())
    }

    /// Patch local data in place; does nothing when no data is loaded.
    pub fn update_data<F>(&self, patch: F)
    where
        F: FnOnce(&mut T),
    {
        self.with_inner(|inner| {
            if let Some(data) = inner.snapshot.data.as_mut() {
                patch(data);
            }
        });
    }

    async fn load(&self, path: String) -> Result<T, ApiError> {
        let request = ApiRequest::get(path).bearer();
        let context = self.config.context;
        match self.config.envelope {
            Envelope::Raw => self
                .client
                .send_json::<T>(request)
                .await
                .map_err(|failure| map_failure(context, failure)),
            Envelope::Data => self
                .client
                .send_json::<DataEnvelope<T>>(request)
                .await
                .map(|envelope| envelope.data)
                .map_err(|failure| map_failure(context, failure)),
        }
    }

    fn with_inner<R>(&self, apply: impl FnOnce(&mut Inner<T>) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard)
    }
}
