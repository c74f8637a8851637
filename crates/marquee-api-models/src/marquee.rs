//! Marquee (rentable venue) DTOs.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Booking lifecycle reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting administrator review.
    #[default]
    Pending,
    /// Reserved by a customer.
    Booked,
    /// Approved and listed.
    Active,
    /// Booking finished.
    Completed,
    /// Refused by an administrator.
    Rejected,
    /// Hidden from listings.
    Inactive,
    /// Value this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Every status an administrator can filter on.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Booked,
        Self::Active,
        Self::Completed,
        Self::Rejected,
        Self::Inactive,
    ];

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Booked => "booked",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown booking status '{value}'"))
    }
}

/// Postal location of a marquee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    #[serde(default)]
    /// Street address.
    pub address: String,
    #[serde(default)]
    /// City name.
    pub city: String,
    #[serde(default)]
    /// State or region.
    pub state: String,
    #[serde(default)]
    /// Country name.
    pub country: String,
}

/// Extra fee charged on top of the base price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdditionalFee {
    /// Label shown to customers.
    pub name: String,
    /// Fee amount.
    pub amount: f64,
}

/// Pricing sub-document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    /// Price per hour.
    pub per_hour: f64,
    #[serde(default)]
    /// Price per day.
    pub per_day: f64,
    #[serde(default)]
    /// Optional surcharges.
    pub additional_fees: Vec<AdditionalFee>,
}

/// Promotional deal attached to a marquee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Deal headline.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Discounted price, when the deal sets one.
    pub discount_price: Option<f64>,
}

/// Populated provider document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    /// Provider identifier.
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Provider display name.
    pub name: Option<String>,
}

/// Provider reference: either a bare identifier or a populated document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProviderRef {
    /// Unpopulated reference.
    Id(String),
    /// Populated provider.
    Populated(ProviderSummary),
}

impl ProviderRef {
    /// Provider display name when the reference was populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(summary) => summary.name.as_deref(),
        }
    }
}

/// Marquee as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marquee {
    #[serde(rename = "_id")]
    /// Backend identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    #[serde(default)]
    /// Free-form description.
    pub description: String,
    #[serde(default)]
    /// Postal location.
    pub location: Location,
    #[serde(default)]
    /// Guest capacity.
    pub capacity: u32,
    #[serde(default)]
    /// Pricing sub-document.
    pub pricing: Pricing,
    #[serde(default)]
    /// Amenities offered.
    pub amenities: Vec<String>,
    #[serde(default)]
    /// Active deals.
    pub deals: Vec<Deal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Booking lifecycle status.
    pub booking_status: Option<BookingStatus>,
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    /// Status key used by older records instead of `bookingStatus`.
    pub legacy_status: Option<BookingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Availability flag as reported by the backend (`active`, `inactive`, ...).
    pub availability_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Owning provider.
    pub provider: Option<ProviderRef>,
}

impl Marquee {
    /// Status used for filtering and display; `bookingStatus` wins over the
    /// legacy `status` key.
    #[must_use]
    pub fn effective_status(&self) -> Option<BookingStatus> {
        self.booking_status.or(self.legacy_status)
    }
}

/// Body of `PUT /marquees/:id` for a full edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeUpdate {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Postal location.
    pub location: Location,
    /// Guest capacity.
    pub capacity: u32,
    /// Pricing sub-document.
    pub pricing: Pricing,
    /// Booking status to set; omitted to leave the stored value untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<BookingStatus>,
}

/// Body of `PUT /marquees/:id` for an approve/reject action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeStatusUpdate {
    /// Target booking status.
    pub booking_status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marquee_decodes_backend_document() {
        let marquee: Marquee = serde_json::from_value(json!({
            "_id": "507f1f77bcf86cd799439011",
            "name": "Hall A",
            "description": "Garden marquee",
            "location": {"address": "1 Main St", "city": "Lahore", "state": "Punjab", "country": "PK"},
            "capacity": 250,
            "pricing": {"perHour": 50, "perDay": 400.5, "additionalFees": [{"name": "Cleaning", "amount": 25}]},
            "amenities": ["parking"],
            "deals": [{"title": "Weekday", "discountPrice": 300}, {"title": "Launch"}],
            "bookingStatus": "pending",
            "availabilityStatus": "active",
            "provider": {"_id": "p1", "name": "Acme Events"},
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .expect("marquee should decode");

        assert_eq!(marquee.capacity, 250);
        assert!((marquee.pricing.per_day - 400.5).abs() < f64::EPSILON);
        assert_eq!(marquee.pricing.additional_fees.len(), 1);
        assert_eq!(marquee.deals[1].discount_price, None);
        assert_eq!(marquee.effective_status(), Some(BookingStatus::Pending));
        assert_eq!(
            marquee.provider.as_ref().and_then(ProviderRef::name),
            Some("Acme Events")
        );
    }

    #[test]
    fn marquee_falls_back_to_legacy_status_and_bare_provider() {
        let marquee: Marquee = serde_json::from_value(json!({
            "_id": "507f1f77bcf86cd799439011",
            "name": "Hall B",
            "status": "active",
            "provider": "64b7f0c2a1b2c3d4e5f60718"
        }))
        .expect("marquee should decode");
        assert_eq!(marquee.effective_status(), Some(BookingStatus::Active));
        assert_eq!(marquee.provider.as_ref().and_then(ProviderRef::name), None);
    }

    #[test]
    fn unknown_booking_status_is_tolerated() {
        let status: BookingStatus = serde_json::from_str("\"archived\"").expect("status");
        assert_eq!(status, BookingStatus::Unknown);
        assert!("archived".parse::<BookingStatus>().is_err());
        assert_eq!(" Rejected ".parse::<BookingStatus>(), Ok(BookingStatus::Rejected));
    }

    #[test]
    fn update_without_status_omits_the_key() {
        let body = serde_json::to_value(MarqueeUpdate {
            name: "Hall A".into(),
            description: "Garden".into(),
            location: Location::default(),
            capacity: 10,
            pricing: Pricing::default(),
            booking_status: None,
        })
        .expect("serialize");
        assert!(body.get("bookingStatus").is_none());
        assert_eq!(body["capacity"], json!(10));
    }

    #[test]
    fn status_update_serializes_camel_case() {
        let body = serde_json::to_value(MarqueeStatusUpdate {
            booking_status: BookingStatus::Active,
        })
        .expect("serialize");
        assert_eq!(body, json!({"bookingStatus": "active"}));
    }
}
