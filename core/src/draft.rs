//! Validation of the "plan a trip" form before it becomes a `Trip`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{TravelStyle, Trip};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("choose a destination")]
    MissingDestination,
    #[error("choose a start date")]
    MissingStartDate,
    #[error("choose an end date")]
    MissingEndDate,
    #[error("the trip cannot end before it starts")]
    EndBeforeStart,
}

/// Form state of the trip planner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripDraft {
    pub destination: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub title: String,
    pub travel_style: Option<TravelStyle>,
    pub description: String,
}

impl TripDraft {
    /// Check the form and build the unsaved trip. Dates are sent as
    /// midnight UTC in RFC 3339; blank title and description are omitted.
    pub fn build(&self) -> Result<Trip, DraftError> {
        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(DraftError::MissingDestination);
        }
        let start = self.start.ok_or(DraftError::MissingStartDate)?;
        let end = self.end.ok_or(DraftError::MissingEndDate)?;
        if end < start {
            return Err(DraftError::EndBeforeStart);
        }

        let mut trip = Trip::new(destination, rfc3339_midnight(start), rfc3339_midnight(end));
        trip.title = non_blank(&self.title);
        trip.travel_style = self.travel_style.map(|style| style.to_string());
        trip.description = non_blank(&self.description);
        Ok(trip)
    }
}

fn rfc3339_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
