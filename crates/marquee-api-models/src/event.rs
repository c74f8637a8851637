//! Event and service DTOs.
//!
//! Both resources are edited through the generic field form, so only the
//! fields the admin screens display are typed; everything else is kept in
//! `extra` and survives a decode/encode cycle untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::EntityId;

/// Event as returned by `GET /events/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    /// Backend identifier.
    pub id: EntityId,
    /// Event title.
    pub title: String,
    #[serde(default)]
    /// Free-form description.
    pub description: String,
    #[serde(default)]
    /// Venue or address, as free text.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Start of the event.
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// End of the event.
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Ticket or booking price.
    pub price: Option<f64>,
    #[serde(flatten)]
    /// Fields this client does not model.
    pub extra: Map<String, Value>,
}

/// Service as returned by `GET /services/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    #[serde(rename = "_id")]
    /// Backend identifier.
    pub id: EntityId,
    /// Service name.
    pub name: String,
    #[serde(default)]
    /// Free-form description.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where the service is offered.
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Price of the service.
    pub price: Option<f64>,
    #[serde(flatten)]
    /// Fields this client does not model.
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_decodes_optional_dates_and_keeps_extra_fields() {
        let event: Event = serde_json::from_value(json!({
            "_id": "64b7f0c2a1b2c3d4e5f60718",
            "title": "Wedding expo",
            "location": "Hall A",
            "startDate": "2024-06-01T18:00:00.000Z",
            "organizer": "Acme"
        }))
        .expect("event should decode");
        assert!(event.start_date.is_some());
        assert!(event.end_date.is_none());
        assert_eq!(event.extra.get("organizer"), Some(&json!("Acme")));
    }

    #[test]
    fn service_decodes_minimal_document() {
        let service: Service = serde_json::from_value(json!({
            "_id": "64b7f0c2a1b2c3d4e5f60719",
            "name": "Catering",
            "price": 12.5
        }))
        .expect("service should decode");
        assert_eq!(service.price, Some(12.5));
        assert!(service.location.is_none());
    }
}
