//! Domain records exchanged with the trip backend.
//!
//! # Design
//! Field names are snake_case both in memory and on the wire, so the serde
//! mapping is the identity except where the backend uses a different name
//! (`trip_description`). Optional fields are omitted when serializing, which
//! is how unsaved records travel without an `id` or timestamps.
//!
//! Prices stay opaque display strings (`"$1,200"`); nothing here parses them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// A record stored under one collection endpoint of the backend.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular resource name used in log lines.
    const NAME: &'static str;

    /// Server-assigned id; `None` until the record has been persisted.
    fn id(&self) -> Option<&str>;

    fn collection() -> Endpoint<'static>;

    fn item(id: &str) -> Endpoint<'_>;
}

/// A planned trip and its itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    #[serde(
        rename = "trip_description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flights: Option<Vec<Flight>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotels: Option<Vec<Hotel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
}

impl Trip {
    /// An unsaved trip; the server assigns `id` and timestamps on create.
    pub fn new(
        destination: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            destination: destination.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            title: None,
            travel_style: None,
            description: None,
            image_url: None,
            created_at: None,
            updated_at: None,
            flights: None,
            hotels: None,
            activities: None,
        }
    }

    /// Number of days covered by the trip: whole 24-hour periods between
    /// the two timestamps, plus one for the starting day.
    ///
    /// `None` when either date is not ISO-8601 or the trip ends before it
    /// starts.
    #[must_use]
    pub fn duration(&self) -> Option<i64> {
        duration_days(&self.start_date, &self.end_date)
    }

    /// Start date as shown on trip cards, e.g. `21st April 2024`. Falls back
    /// to the raw string when it does not parse.
    #[must_use]
    pub fn formatted_start_date(&self) -> String {
        match parse_timestamp(&self.start_date) {
            Some(start) => format_long_date(start.date()),
            None => self.start_date.clone(),
        }
    }

    /// Flights, hotels and activities attached to this trip.
    #[must_use]
    pub fn itinerary_len(&self) -> usize {
        self.flights.as_ref().map_or(0, Vec::len)
            + self.hotels.as_ref().map_or(0, Vec::len)
            + self.activities.as_ref().map_or(0, Vec::len)
    }
}

impl Record for Trip {
    const NAME: &'static str = "trip";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn collection() -> Endpoint<'static> {
        Endpoint::Trips
    }

    fn item(id: &str) -> Endpoint<'_> {
        Endpoint::Trip(id)
    }
}

/// Whole days elapsed from `start` to `end`, plus one. A partial final day
/// is not counted. See `Trip::duration`.
pub fn duration_days(start: &str, end: &str) -> Option<i64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    if end < start {
        return None;
    }
    Some((end - start).num_days() + 1)
}

/// Parse an ISO-8601 timestamp as sent by the backend.
///
/// Accepts RFC 3339 (with offset), naive `YYYY-MM-DDTHH:MM:SS[.fff]` and a
/// bare `YYYY-MM-DD`. Offset timestamps keep their local wall-clock time.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix} {}", date.format("%B %Y"))
}

/// One flight leg of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure_time: String,
    pub departure_date: String,
    pub departure_airport: String,
    pub arrival_time: String,
    pub arrival_date: String,
    pub arrival_airport: String,
    pub duration: String,
    pub is_direct: bool,
    pub price: String,
}

/// A hotel stay. `rating` is on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u32,
    pub room_type: String,
    pub check_in_date: String,
    pub check_out_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub price: String,
}

/// A scheduled activity. `day_number` and `activity_number` start at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rating: f64,
    pub review_count: u32,
    pub duration: String,
    pub scheduled_time: String,
    pub scheduled_date: String,
    pub day_number: u32,
    pub activity_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub price: String,
}

/// Who a trip is planned for. Kept separate from `Trip::travel_style`, which
/// stays a free string so unknown server values round-trip untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelStyle {
    Solo,
    Couple,
    Family,
    Group,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 4] = [
        TravelStyle::Solo,
        TravelStyle::Couple,
        TravelStyle::Family,
        TravelStyle::Group,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelStyle::Solo => "Solo",
            TravelStyle::Couple => "Couple",
            TravelStyle::Family => "Family",
            TravelStyle::Group => "Group",
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown travel style: {s}"))
    }
}

/// An entry of the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    /// An unsaved user; the server assigns `id` on create.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Record for User {
    const NAME: &'static str = "user";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn collection() -> Endpoint<'static> {
        Endpoint::Users
    }

    fn item(id: &str) -> Endpoint<'_> {
        Endpoint::User(id)
    }
}

/// Partial update for `PATCH /users/{id}`. Only the fields that are set end
/// up in the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// Static reference entry used by the destination picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub flag: String,
    pub code: String,
    pub dial_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(start: &str, end: &str) -> Trip {
        Trip::new("Lagos", start, end)
    }

    #[test]
    fn duration_counts_both_endpoints() {
        assert_eq!(trip("2024-01-01T00:00:00", "2024-01-03T00:00:00").duration(), Some(3));
    }

    #[test]
    fn duration_of_single_day_trip() {
        assert_eq!(trip("2024-05-10T08:00:00", "2024-05-10T22:00:00").duration(), Some(1));
    }

    #[test]
    fn duration_accepts_rfc3339_offsets() {
        assert_eq!(trip("2024-02-27T00:00:00Z", "2024-03-01T00:00:00+01:00").duration(), Some(4));
    }

    #[test]
    fn duration_absent_when_a_date_is_invalid() {
        assert_eq!(trip("next tuesday", "2024-01-03T00:00:00").duration(), None);
        assert_eq!(trip("2024-01-01T00:00:00", "2024-13-40T00:00:00").duration(), None);
    }

    #[test]
    fn duration_ignores_partial_final_day() {
        assert_eq!(trip("2024-01-01T10:00:00", "2024-01-03T09:00:00").duration(), Some(2));
        assert_eq!(trip("2024-01-01T10:00:00", "2024-01-03T10:00:00").duration(), Some(3));
    }

    #[test]
    fn overnight_trip_is_one_day() {
        assert_eq!(trip("2024-06-14T23:00:00", "2024-06-15T01:00:00").duration(), Some(1));
    }

    #[test]
    fn duration_absent_when_end_precedes_start() {
        assert_eq!(trip("2024-01-05T00:00:00", "2024-01-03T00:00:00").duration(), None);
    }

    #[test]
    fn formatted_start_date_uses_ordinals() {
        let formatted = |start: &str| trip(start, "2024-12-31").formatted_start_date();
        assert_eq!(formatted("2024-04-21T00:00:00Z"), "21st April 2024");
        assert_eq!(formatted("2024-04-12T00:00:00"), "12th April 2024");
        assert_eq!(formatted("2024-03-03"), "3rd March 2024");
        assert_eq!(formatted("soon"), "soon");
    }

    #[test]
    fn trip_wire_names() {
        let mut t = trip("2024-01-01T00:00:00", "2024-01-03T00:00:00");
        t.description = Some("Beach week".into());
        t.travel_style = Some(TravelStyle::Family.to_string());
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["start_date"], "2024-01-01T00:00:00");
        assert_eq!(json["trip_description"], "Beach week");
        assert_eq!(json["travel_style"], "Family");
        assert!(json.get("id").is_none());
        assert!(json.get("description").is_none());
        assert!(json.get("flights").is_none());
    }

    #[test]
    fn flight_wire_names() {
        let json = r#"{
            "id": "f1", "airline": "Air Peace", "flight_number": "P47120",
            "departure_time": "08:35", "departure_date": "Sun, 20 Aug",
            "departure_airport": "LOS", "arrival_time": "09:55",
            "arrival_date": "Sun, 20 Aug", "arrival_airport": "SIN",
            "duration": "1h 45m", "is_direct": true, "price": "₦123,450.00"
        }"#;
        let flight: Flight = serde_json::from_str(json).unwrap();
        assert_eq!(flight.flight_number, "P47120");
        assert!(flight.is_direct);
        assert_eq!(flight.price, "₦123,450.00");
    }

    #[test]
    fn hotel_without_image_url() {
        let json = r#"{
            "id": "h1", "name": "Riviera Resort", "address": "18 Kenneth Agbakuru Street",
            "rating": 8.5, "review_count": 436, "room_type": "King size room",
            "check_in_date": "20-04-2024", "check_out_date": "29-04-2024", "price": "₦123,450.00"
        }"#;
        let hotel: Hotel = serde_json::from_str(json).unwrap();
        assert_eq!(hotel.review_count, 436);
        assert!(hotel.image_url.is_none());
    }

    #[test]
    fn user_patch_omits_unset_fields() {
        let patch = UserPatch {
            phone: Some("+2348000000000".into()),
            ..UserPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"phone": "+2348000000000"}));
        assert!(!patch.is_empty());
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn travel_style_parses_case_insensitively() {
        assert_eq!("couple".parse::<TravelStyle>(), Ok(TravelStyle::Couple));
        assert_eq!(" GROUP ".parse::<TravelStyle>(), Ok(TravelStyle::Group));
        assert!("backpacker".parse::<TravelStyle>().is_err());
    }

    #[test]
    fn record_ids() {
        let mut user = User::new("Ada", "ada@example.com");
        assert_eq!(Record::id(&user), None);
        user.id = Some("7".into());
        assert_eq!(Record::id(&user), Some("7"));
        assert_eq!(User::item("7"), Endpoint::User("7"));
    }
}
