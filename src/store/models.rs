//! Stored models: users, airports, airlines, flights and bookings.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::datetime::{Map, Payload};
use crate::store::document::Model;

fn put(fields: &mut Map, key: &str, value: impl Into<Payload>) {
    fields.insert(key.to_string(), value.into());
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub role: Role,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.password_hash == hash_password(&self.email, password)
    }
}

impl Model for User {
    fn write_fields(&self, fields: &mut Map) {
        put(fields, "firstName", self.first_name.clone());
        put(fields, "lastName", self.last_name.clone());
        put(fields, "name", self.full_name());
        put(fields, "email", self.email.clone());
        put(fields, "phone", self.phone.clone());
        // Unset birth dates are an explicit null in profiles.
        put(fields, "dateOfBirth", self.date_of_birth.map_or(Payload::Null, Payload::from));
        put(fields, "role", self.role.as_str());
    }
}

/// Salted SHA-256 of a password; the email is the salt.
pub fn hash_password(email: &str, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{email}:{password}").as_bytes()))
}

#[derive(Debug, Clone)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
}

impl Model for Airport {
    fn write_fields(&self, fields: &mut Map) {
        put(fields, "code", self.code.clone());
        put(fields, "name", self.name.clone());
        put(fields, "city", self.city.clone());
    }
}

#[derive(Debug, Clone)]
pub struct Airline {
    pub code: String,
    pub name: String,
    pub logo: String,
}

impl Model for Airline {
    fn write_fields(&self, fields: &mut Map) {
        put(fields, "code", self.code.clone());
        put(fields, "name", self.name.clone());
        put(fields, "logo", self.logo.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightType {
    Direct,
    Connecting,
}

impl FlightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightType::Direct => "direct",
            FlightType::Connecting => "connecting",
        }
    }
}

/// One end of a flight.
#[derive(Debug, Clone)]
pub struct FlightEndpoint {
    pub airport: String,
    pub city: String,
    pub timestamp: DateTime<Utc>,
}

impl FlightEndpoint {
    fn to_payload(&self) -> Payload {
        Payload::object([
            ("airport", Payload::from(self.airport.clone())),
            ("city", Payload::from(self.city.clone())),
            ("timestamp", Payload::from(self.timestamp)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct Flight {
    pub airline: String,
    pub flight_number: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration: String,
    /// Fare per passenger in VND.
    pub price: u64,
    pub flight_type: FlightType,
    pub available_seats: u32,
    pub total_seats: u32,
}

impl Model for Flight {
    fn write_fields(&self, fields: &mut Map) {
        put(fields, "airline", self.airline.clone());
        put(fields, "flightNumber", self.flight_number.clone());
        put(fields, "departure", self.departure.to_payload());
        put(fields, "arrival", self.arrival.to_payload());
        put(fields, "duration", self.duration.clone());
        put(fields, "price", self.price);
        put(fields, "type", self.flight_type.as_str());
        put(fields, "availableSeats", self.available_seats);
        put(fields, "totalSeats", self.total_seats);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: DateTime<Utc>,
    pub seat_number: Option<String>,
}

impl Passenger {
    fn to_payload(&self) -> Payload {
        Payload::object([
            ("firstName", Payload::from(self.first_name.clone())),
            ("lastName", Payload::from(self.last_name.clone())),
            ("gender", Payload::from(self.gender.as_str())),
            ("dateOfBirth", Payload::from(self.date_of_birth)),
            ("seatNumber", Payload::from(self.seat_number.clone())),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub passengers: Vec<Passenger>,
    pub contact_info: ContactInfo,
    /// Total in VND.
    pub total_amount: u64,
    pub status: BookingStatus,
}

impl Booking {
    /// A fresh booking awaiting confirmation.
    pub fn pending(
        user_id: Uuid,
        flight_id: Uuid,
        passengers: Vec<Passenger>,
        contact_info: ContactInfo,
        total_amount: u64,
    ) -> Self {
        Self {
            user_id,
            flight_id,
            passengers,
            contact_info,
            total_amount,
            status: BookingStatus::Pending,
        }
    }
}

impl Model for Booking {
    fn write_fields(&self, fields: &mut Map) {
        put(fields, "userId", self.user_id.to_string());
        put(fields, "flightId", self.flight_id.to_string());
        put(
            fields,
            "passengers",
            self.passengers
                .iter()
                .map(Passenger::to_payload)
                .collect::<Vec<_>>(),
        );
        put(
            fields,
            "contactInfo",
            Payload::object([
                ("email", Payload::from(self.contact_info.email.clone())),
                ("phone", Payload::from(self.contact_info.phone.clone())),
            ]),
        );
        put(fields, "totalAmount", self.total_amount);
        put(fields, "status", self.status.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        User {
            first_name: "An".into(),
            last_name: "Nguyen".into(),
            email: "an@example.com".into(),
            phone: "0901234567".into(),
            password_hash: hash_password("an@example.com", "secret1"),
            date_of_birth: None,
            role: Role::User,
        }
    }

    #[test]
    fn test_password_hash_is_salted_by_email() {
        let u = user();
        assert!(u.password_matches("secret1"));
        assert!(!u.password_matches("secret2"));
        assert_ne!(
            hash_password("a@example.com", "same"),
            hash_password("b@example.com", "same")
        );
        assert_eq!(u.password_hash.len(), 64);
    }

    #[test]
    fn test_user_fields_hide_password_and_null_birth_date() {
        let mut fields = Map::new();
        user().write_fields(&mut fields);

        assert!(!fields.contains_key("passwordHash"));
        assert!(!fields.values().any(|v| v.as_str() == Some(&user().password_hash)));
        assert_eq!(fields["dateOfBirth"], Payload::Null);
        assert_eq!(fields["name"], Payload::from("An Nguyen"));
    }

    #[test]
    fn test_passenger_without_seat_has_undefined_seat() {
        let passenger = Passenger {
            first_name: "Binh".into(),
            last_name: "Tran".into(),
            gender: Gender::Female,
            date_of_birth: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
            seat_number: None,
        };
        let payload = passenger.to_payload();
        assert_eq!(payload.get("seatNumber"), Some(&Payload::Undefined));
        assert!(payload.get("dateOfBirth").unwrap().as_datetime().is_some());
    }

    #[test]
    fn test_pending_booking_fields() {
        let booking = Booking::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Vec::new(),
            ContactInfo {
                email: "an@example.com".into(),
                phone: "0901234567".into(),
            },
            0,
        );
        let mut fields = Map::new();
        booking.write_fields(&mut fields);
        assert_eq!(fields["status"], Payload::from("pending"));
        assert_eq!(fields["totalAmount"], Payload::from(0u64));
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("Male"), None);
    }
}
