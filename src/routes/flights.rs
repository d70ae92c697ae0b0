//! Flight search and catalogue handlers.

use axum::extract::State;
use chrono::{DateTime, Duration, Utc};

use crate::datetime::Payload;
use crate::error::ApiError;
use crate::http::{ApiResponse, AppState, DateTimePath, DateTimeQuery};
use crate::routes::input::parse_id;

/// Flights matching the optional airport and day filters, earliest first.
///
/// `date` selects departures in `[date, date + 1 day)`. It is read after
/// query normalization, so only a well-formed ISO-8601 value is accepted.
pub async fn search(
    State(state): State<AppState>,
    query: DateTimeQuery,
) -> Result<ApiResponse, ApiError> {
    let departure = text_param(&query, "departure")?;
    let arrival = text_param(&query, "arrival")?;
    let window = match query.get("date") {
        None => None,
        Some(Payload::DateTime(date)) => {
            let start = date.with_timezone(&Utc);
            Some((start, start + Duration::days(1)))
        }
        Some(other) => {
            tracing::debug!(kind = other.kind(), "Rejected flight search date");
            return Err(ApiError::bad_request("date must be an ISO-8601 date"));
        }
    };

    let mut flights = state.store.flights.find(|flight| {
        departure
            .as_deref()
            .is_none_or(|code| flight.departure.airport == code)
            && arrival
                .as_deref()
                .is_none_or(|code| flight.arrival.airport == code)
            && window.is_none_or(|(from, until): (DateTime<Utc>, DateTime<Utc>)| {
                flight.departure.timestamp >= from && flight.departure.timestamp < until
            })
    });
    flights.sort_by_key(|flight| flight.data.departure.timestamp);

    let total = flights.len();
    Ok(ApiResponse::ok([
        ("flights", Payload::from(flights)),
        ("total", Payload::from(total)),
    ]))
}

/// A single string query parameter; empty means unset.
fn text_param(query: &DateTimeQuery, key: &str) -> Result<Option<String>, ApiError> {
    match query.get(key) {
        None => Ok(None),
        Some(Payload::String(value)) if value.is_empty() => Ok(None),
        Some(Payload::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ApiError::bad_request(format!("{key} must be a single value"))),
    }
}

pub async fn get_flight(
    State(state): State<AppState>,
    path: DateTimePath,
) -> Result<ApiResponse, ApiError> {
    let id = parse_id(path.get("id"), "Flight not found")?;
    let flight = state
        .store
        .flights
        .get(&id)
        .ok_or_else(|| ApiError::not_found("Flight not found"))?;
    Ok(ApiResponse::ok([("flight", Payload::from(flight))]))
}

pub async fn list_airports(State(state): State<AppState>) -> ApiResponse {
    let mut airports = state.store.airports.find(|_| true);
    airports.sort_by(|a, b| a.data.city.cmp(&b.data.city));
    ApiResponse::ok([("airports", Payload::from(airports))])
}

pub async fn list_airlines(State(state): State<AppState>) -> ApiResponse {
    let mut airlines = state.store.airlines.find(|_| true);
    airlines.sort_by(|a, b| a.data.name.cmp(&b.data.name));
    ApiResponse::ok([("airlines", Payload::from(airlines))])
}
