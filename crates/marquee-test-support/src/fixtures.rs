//! Backend documents shaped like real API responses.

use serde_json::{Value, json};

/// Well-formed marquee identifier.
pub const MARQUEE_ID: &str = "507f1f77bcf86cd799439011";
/// Second well-formed marquee identifier.
pub const OTHER_MARQUEE_ID: &str = "507f191e810c19729de860ea";
/// Well-formed event/service identifier.
pub const EVENT_ID: &str = "64b7f0c2a1b2c3d4e5f60718";

/// Marquee document with every field the admin screens read.
#[must_use]
pub fn marquee_json(id: &str, booking_status: &str) -> Value {
    json!({
        "_id": id,
        "name": "Hall A",
        "description": "Garden marquee",
        "location": {
            "address": "1 Main St",
            "city": "Lahore",
            "state": "Punjab",
            "country": "PK"
        },
        "capacity": 250,
        "pricing": {"perHour": 50, "perDay": 400, "additionalFees": []},
        "amenities": ["parking"],
        "deals": [],
        "bookingStatus": booking_status,
        "availabilityStatus": "active",
        "provider": {"_id": "64b7f0c2a1b2c3d4e5f60799", "name": "Acme Events"}
    })
}

/// `{data: [...]}` list body over `marquees`.
#[must_use]
pub fn marquee_list_json(marquees: &[Value]) -> Value {
    json!({ "data": marquees })
}

/// Event document with a start date and no end date.
#[must_use]
pub fn event_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": "Wedding expo",
        "description": "Vendors and venues",
        "location": "Hall A",
        "startDate": "2024-06-01T18:00:00.000Z",
        "price": 20
    })
}

/// Service document.
#[must_use]
pub fn service_json(id: &str) -> Value {
    json!({
        "_id": id,
        "name": "Catering",
        "description": "Buffet for 100",
        "price": 12.5
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_24_hex_digits() {
        for id in [MARQUEE_ID, OTHER_MARQUEE_ID, EVENT_ID] {
            assert_eq!(id.len(), 24);
            assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn list_body_wraps_under_data() {
        let body = marquee_list_json(&[marquee_json(MARQUEE_ID, "pending")]);
        assert_eq!(body["data"][0]["_id"], json!(MARQUEE_ID));
    }
}
