//! Login, registration, admin lookup and logout.

use std::fmt;

use marquee_api_models::{
    AdminUser, HasAdminResponse, LoginRequest, RegisterRequest, RegisterResponse,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{ApiError, EndpointContext, map_failure};
use crate::http::{ApiClient, ApiRequest};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

/// Per-field validation messages in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Iterate over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(|(_, message)| message.as_str()).collect();
        formatter.write_str(&joined.join("; "))
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.push("email", "Email is invalid");
    }
}

/// Admin login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
}

impl LoginForm {
    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();
        check_email(&mut errors, email);
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest {
            email: email.to_string(),
            password: self.password.clone(),
            admin: true,
        })
    }
}

/// Registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    /// Display name as typed.
    pub name: String,
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
    /// Request the administrator role.
    pub as_admin: bool,
}

impl RegisterForm {
    /// Validate and build the request body; the email is lowercased.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", "Name is required");
        } else if name.chars().count() < MIN_NAME_LEN {
            errors.push("name", "Name must be at least 2 characters");
        }
        let email = self.email.trim().to_lowercase();
        check_email(&mut errors, &email);
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push("password", "Password must be at least 6 characters");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegisterRequest {
            name: name.to_string(),
            email,
            password: self.password.clone(),
            is_admin: self.as_admin,
        })
    }
}

/// Log in as an administrator and establish the session.
///
/// The token may arrive in a cookie (kept by the client's jar) or in the
/// body's `token` field; it is stored only in the latter case.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for invalid input and the mapped login
/// error otherwise.
pub async fn login(client: &ApiClient, form: &LoginForm) -> Result<AdminUser, ApiError> {
    let body = form.validate()?;
    let context = EndpointContext::Login;
    let request = ApiRequest::post("/users/login?admin=true")
        .json(&body)
        .map_err(|failure| map_failure(context, failure))?;
    let user: AdminUser = client.send_json(request).await.map_err(|failure| {
        let err = map_failure(context, failure);
        warn!(error = %err, "login failed");
        err
    })?;

    client
        .session()
        .establish(user.token.clone(), Some(user.clone()))?;
    info!(email = %body.email, "admin session established");
    Ok(user)
}

/// Register a user and establish the session with the issued token.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for invalid input and the mapped
/// registration error otherwise.
pub async fn register(client: &ApiClient, form: &RegisterForm) -> Result<AdminUser, ApiError> {
    let body = form.validate()?;
    let context = EndpointContext::Register;
    let request = ApiRequest::post("/users/register")
        .json(&body)
        .map_err(|failure| map_failure(context, failure))?;
    let response: RegisterResponse = client.send_json(request).await.map_err(|failure| {
        let err = map_failure(context, failure);
        warn!(error = %err, "registration failed");
        err
    })?;

    client
        .session()
        .establish(Some(response.token), Some(response.user.clone()))?;
    info!(email = %body.email, admin = body.is_admin, "user registered");
    Ok(response.user)
}

/// Whether an administrator account exists yet.
///
/// # Errors
///
/// Returns an error carrying "Failed to check admin status".
pub async fn has_admin(client: &ApiClient) -> Result<bool, ApiError> {
    client
        .send_json::<HasAdminResponse>(ApiRequest::get("/users/has-admin"))
        .await
        .map(|response| response.has_admin)
        .map_err(|failure| map_failure(EndpointContext::HasAdmin, failure))
}

/// End the local session. No request is made.
///
/// # Errors
///
/// Returns [`ApiError::Session`] when persisted state cannot be removed.
pub fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.session().clear()?;
    info!("logged out");
    Ok(())
}
