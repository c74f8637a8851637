//! Generic field-list editor for events, services and marquees.

use marquee_api_models::{DataEnvelope, Event, Marquee, Service};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::{info, warn};

use crate::error::{ApiError, EndpointContext, EntityKind, map_failure, parse_entity_id};
use crate::fetch::{FetchConfig, FetchOutcome, Fetcher};
use crate::http::{ApiClient, ApiRequest};
use crate::notice::Notice;
use crate::session::UnauthorizedPolicy;

/// How a field's text is checked and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Sent as a JSON string.
    #[default]
    Text,
    /// Whole number greater than zero, sent as a JSON number.
    PositiveInteger,
    /// Finite number `>= 0` such as a price, sent as a JSON number.
    NonNegativeNumber,
}

impl FieldKind {
    fn encode(self, label: &str, raw: &str) -> Result<Value, ApiError> {
        match self {
            Self::Text => Ok(Value::String(raw.to_string())),
            Self::PositiveInteger => raw
                .parse::<u64>()
                .ok()
                .filter(|value| *value > 0)
                .map(Value::from)
                .ok_or_else(|| ApiError::validation(format!("{label} must be a positive number"))),
            Self::NonNegativeNumber => raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| ApiError::validation(format!("{label} must be non-negative"))),
        }
    }
}

/// One editable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Wire key.
    pub name: String,
    /// Label used in messages.
    pub label: String,
    /// Whether a blank value is rejected.
    pub required: bool,
    /// Value check and wire encoding.
    pub kind: FieldKind,
    /// Current value as typed.
    pub value: String,
}

impl FormField {
    /// Text field with an empty value.
    pub fn new(name: impl Into<String>, label: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required,
            kind: FieldKind::Text,
            value: String::new(),
        }
    }

    /// Same field with a different kind.
    #[must_use]
    pub const fn of_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Same field pre-filled with `value`.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Field form bound to one entity, submitted as `PATCH /<kind>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateForm {
    kind: EntityKind,
    id: String,
    fields: Vec<FormField>,
    unauthorized: UnauthorizedPolicy,
}

impl UpdateForm {
    /// Form over `fields`; a 401 on submit expires the session.
    pub fn new(kind: EntityKind, id: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            id: id.into(),
            fields,
            unauthorized: UnauthorizedPolicy::Expire,
        }
    }

    /// Override the 401 policy.
    #[must_use]
    pub const fn on_unauthorized(mut self, policy: UnauthorizedPolicy) -> Self {
        self.unauthorized = policy;
        self
    }

    /// Entity kind being edited.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Current value of `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Set a field value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the form has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ApiError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| {
                ApiError::validation(format!(
                    "Unknown field '{name}' for {}",
                    self.kind.singular()
                ))
            })?;
        field.value = value.into();
        Ok(())
    }

    /// Check fields in display order and build the PATCH body. Blank optional
    /// fields are sent as `null`; numeric kinds are sent as JSON numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for the first blank required field
    /// or malformed numeric value.
    pub fn validate(&self) -> Result<Map<String, Value>, ApiError> {
        let mut body = Map::new();
        for field in &self.fields {
            let value = field.value.trim();
            if value.is_empty() {
                if field.required {
                    return Err(ApiError::validation(format!("{} is required", field.label)));
                }
                body.insert(field.name.clone(), Value::Null);
            } else {
                body.insert(field.name.clone(), field.kind.encode(&field.label, value)?);
            }
        }
        Ok(body)
    }

    /// Validate and submit, returning the server's copy of the entity so the
    /// caller can replace its local one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] before any network call, and the
    /// mapped backend error otherwise.
    pub async fn submit<T: DeserializeOwned>(
        &self,
        client: &ApiClient,
    ) -> Result<(T, Notice), ApiError> {
        let body = self.validate()?;
        let id = parse_entity_id(&self.id, "update")?;
        let context = EndpointContext::FormUpdate;
        let request = ApiRequest::patch(format!("/{}/{id}", self.kind.route()))
            .bearer()
            .json(&body)
            .map_err(|failure| map_failure(context, failure))?;

        match client.send_json::<DataEnvelope<T>>(request).await {
            Ok(envelope) => {
                info!(kind = self.kind.singular(), %id, "entity updated");
                let notice =
                    Notice::success(format!("{} updated successfully", self.kind.title()));
                Ok((envelope.data, notice))
            }
            Err(failure) => {
                let err = map_failure(context, failure);
                warn!(kind = self.kind.singular(), %id, error = %err, "entity update failed");
                client.session().handle_failure(self.unauthorized, &err);
                Err(err)
            }
        }
    }
}

/// Entity that can be loaded by id and edited through an [`UpdateForm`].
pub trait Editable: DeserializeOwned + Clone {
    /// Backend resource.
    const KIND: EntityKind;

    /// Form pre-filled from this entity.
    fn update_form(&self) -> UpdateForm;
}

fn optional_text<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

impl Editable for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn update_form(&self) -> UpdateForm {
        UpdateForm::new(
            Self::KIND,
            self.id.as_str(),
            vec![
                FormField::new("title", "Title", true).with_value(&self.title),
                FormField::new("description", "Description", false)
                    .with_value(&self.description),
                FormField::new("location", "Location", true).with_value(&self.location),
                FormField::new("startDate", "Start date", false)
                    .with_value(optional_text(self.start_date.map(|date| date.to_rfc3339()))),
                FormField::new("endDate", "End date", false)
                    .with_value(optional_text(self.end_date.map(|date| date.to_rfc3339()))),
                FormField::new("price", "Price", false)
                    .of_kind(FieldKind::NonNegativeNumber)
                    .with_value(optional_text(self.price)),
            ],
        )
    }
}

impl Editable for Service {
    const KIND: EntityKind = EntityKind::Service;

    fn update_form(&self) -> UpdateForm {
        UpdateForm::new(
            Self::KIND,
            self.id.as_str(),
            vec![
                FormField::new("name", "Name", true).with_value(&self.name),
                FormField::new("description", "Description", false)
                    .with_value(&self.description),
                FormField::new("location", "Location", false)
                    .with_value(self.location.clone().unwrap_or_default()),
                FormField::new("price", "Price", false)
                    .of_kind(FieldKind::NonNegativeNumber)
                    .with_value(optional_text(self.price)),
            ],
        )
    }
}

impl Editable for Marquee {
    const KIND: EntityKind = EntityKind::Marquee;

    fn update_form(&self) -> UpdateForm {
        UpdateForm::new(
            Self::KIND,
            self.id.as_str(),
            vec![
                FormField::new("name", "Name", true).with_value(&self.name),
                FormField::new("description", "Description", true)
                    .with_value(&self.description),
                FormField::new("capacity", "Capacity", true)
                    .of_kind(FieldKind::PositiveInteger)
                    .with_value(self.capacity.max(1).to_string()),
            ],
        )
    }
}

/// Load one entity for editing; a 401 expires the session.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a bad id and the mapped fetch error
/// otherwise.
pub async fn load_entity<T: Editable>(client: &ApiClient, raw_id: &str) -> Result<T, ApiError> {
    let id = parse_entity_id(raw_id, "load")?;
    let fetcher: Fetcher<T> = Fetcher::new(
        client.clone(),
        format!("/{}/{id}", T::KIND.route()),
        FetchConfig::entity().with_unauthorized(UnauthorizedPolicy::Expire),
    );
    match fetcher.fetch().await {
        FetchOutcome::Applied => fetcher.data().ok_or_else(|| ApiError::Decode {
            message: format!("{} response carried no data", T::KIND.singular()),
        }),
        _ => Err(fetcher.error().unwrap_or_else(|| ApiError::Network {
            message: "Failed to fetch data".to_string(),
        })),
    }
}
