//! Booking handlers. All routes require an authenticated caller and only
//! ever see that caller's bookings.

use axum::extract::State;

use crate::datetime::{Payload, PlainData};
use crate::error::ApiError;
use crate::http::{ApiResponse, AppState, AuthUser, DateTimeJson, DateTimePath};
use crate::routes::input::{opt_str, parse_id, require_datetime, require_str};
use crate::store::models::{Booking, ContactInfo, Gender, Passenger};
use crate::store::{Document, DocumentStore};

pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    DateTimeJson(body): DateTimeJson,
) -> Result<ApiResponse, ApiError> {
    let flight_id = parse_id(body.get("flightId"), "Flight not found")?;
    let flight = state
        .store
        .flights
        .get(&flight_id)
        .ok_or_else(|| ApiError::not_found("Flight not found"))?;

    let passengers = parse_passengers(body.get("passengers"))?;
    let contact_info = parse_contact(body.get("contactInfo"))?;

    let total_amount = match body.get("totalAmount") {
        None | Some(Payload::Null) => flight.data.price * passengers.len() as u64,
        Some(value) => value
            .as_u64()
            .ok_or_else(|| ApiError::bad_request("totalAmount must be a non-negative integer"))?,
    };

    let booking = state.store.bookings.insert(Booking::pending(
        auth.user_id,
        flight_id,
        passengers,
        contact_info,
        total_amount,
    ));

    tracing::info!(
        booking_id = %booking.id,
        user_id = %auth.user_id,
        flight_id = %flight_id,
        passengers = booking.data.passengers.len(),
        "Booking created"
    );
    Ok(ApiResponse::created([("booking", Payload::from(booking))]))
}

fn parse_passengers(value: Option<&Payload>) -> Result<Vec<Passenger>, ApiError> {
    let items = value
        .and_then(Payload::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::bad_request("At least one passenger is required"))?;

    items
        .iter()
        .map(|item| {
            let gender = opt_str(item, "gender")
                .and_then(|g| Gender::parse(&g))
                .ok_or_else(|| ApiError::bad_request("gender must be male or female"))?;
            Ok(Passenger {
                first_name: require_str(item, "firstName")?,
                last_name: require_str(item, "lastName")?,
                gender,
                date_of_birth: require_datetime(item, "dateOfBirth")?,
                seat_number: opt_str(item, "seatNumber"),
            })
        })
        .collect()
}

fn parse_contact(value: Option<&Payload>) -> Result<ContactInfo, ApiError> {
    let contact = value
        .filter(|v| v.as_object().is_some())
        .ok_or_else(|| ApiError::bad_request("contactInfo is required"))?;
    Ok(ContactInfo {
        email: require_str(contact, "email")?,
        phone: require_str(contact, "phone")?,
    })
}

/// The caller's bookings, newest first.
pub async fn list_user_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResponse {
    let mut bookings = state.store.bookings.find(|b| b.user_id == auth.user_id);
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let bookings: Vec<Payload> = bookings
        .into_iter()
        .map(|booking| with_flight(&state.store, booking))
        .collect();
    ApiResponse::ok([("bookings", Payload::from(bookings))])
}

pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    path: DateTimePath,
) -> Result<ApiResponse, ApiError> {
    let booking = owned_booking(&state.store, &auth, &path)?;
    Ok(ApiResponse::ok([("booking", with_flight(&state.store, booking))]))
}

fn owned_booking(
    store: &DocumentStore,
    auth: &AuthUser,
    path: &DateTimePath,
) -> Result<Document<Booking>, ApiError> {
    let id = parse_id(path.get("id"), "Booking not found")?;
    store
        .bookings
        .get(&id)
        .filter(|booking| booking.data.user_id == auth.user_id)
        .ok_or_else(|| ApiError::not_found("Booking not found"))
}

/// A booking with `flightId` replaced by the flight record, when it exists.
fn with_flight(store: &DocumentStore, booking: Document<Booking>) -> Payload {
    let flight = store.flights.get(&booking.data.flight_id);
    let mut plain = booking.to_plain();
    if let (Payload::Object(fields), Some(flight)) = (&mut plain, flight) {
        fields.insert("flightId".to_string(), Payload::from(flight));
    }
    plain
}
