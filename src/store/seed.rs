//! Demo data: airports, airlines and a week of domestic flights.
//!
//! Departure times are written as Vietnam local time (`+07:00`) and go
//! through the same ISO-8601 parser as request data, so the store only ever
//! holds UTC instants.

use chrono::{Duration, NaiveDate, Utc};

use crate::datetime::parse_date_time;
use crate::store::models::{
    hash_password, Airline, Airport, Flight, FlightEndpoint, FlightType, Role, User,
};
use crate::store::DocumentStore;

/// Demo administrator credentials.
pub const ADMIN_EMAIL: &str = "admin@keypicksvivu.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Number of days of flights generated, starting at the seed date.
pub const SEED_DAYS: i64 = 7;

const AIRPORTS: &[(&str, &str, &str)] = &[
    ("SGN", "TP. Hồ Chí Minh (SGN)", "TP. Hồ Chí Minh"),
    ("HAN", "Hà Nội (HAN)", "Hà Nội"),
    ("DAD", "Đà Nẵng (DAD)", "Đà Nẵng"),
    ("CXR", "Nha Trang (CXR)", "Nha Trang"),
    ("PQC", "Phú Quốc (PQC)", "Phú Quốc"),
];

const AIRLINES: &[(&str, &str, &str)] = &[
    ("VN", "Vietnam Airlines", "/images/airlines/vn.png"),
    ("VJ", "VietJet Air", "/images/airlines/vj.png"),
    ("QH", "Bamboo Airways", "/images/airlines/qh.png"),
];

/// Daily schedule: airline, flight number, from, to, local departure,
/// duration in minutes, fare in VND, seats.
const SCHEDULE: &[(&str, &str, &str, &str, &str, i64, u64, u32)] = &[
    ("VN", "VN210", "SGN", "HAN", "06:00", 130, 1_850_000, 180),
    ("VJ", "VJ120", "SGN", "HAN", "09:30", 125, 1_290_000, 186),
    ("QH", "QH204", "HAN", "SGN", "14:15", 130, 1_550_000, 160),
    ("VN", "VN131", "SGN", "DAD", "07:45", 80, 1_150_000, 180),
    ("VJ", "VJ522", "DAD", "HAN", "18:40", 75, 890_000, 186),
    ("VN", "VN1347", "HAN", "CXR", "11:05", 115, 1_650_000, 160),
    ("QH", "QH1121", "SGN", "PQC", "16:30", 60, 990_000, 120),
];

/// Populate an empty store with demo data for `SEED_DAYS` days from `start`.
pub fn seed_demo_data(store: &DocumentStore, start: NaiveDate) {
    store.insert_user(User {
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: ADMIN_EMAIL.to_string(),
        phone: "0123456789".to_string(),
        password_hash: hash_password(ADMIN_EMAIL, ADMIN_PASSWORD),
        date_of_birth: None,
        role: Role::Admin,
    });

    for &(code, name, city) in AIRPORTS {
        store.airports.insert(Airport {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
        });
    }

    for &(code, name, logo) in AIRLINES {
        store.airlines.insert(Airline {
            code: code.to_string(),
            name: name.to_string(),
            logo: logo.to_string(),
        });
    }

    let mut flights = 0;
    for day in 0..SEED_DAYS {
        let date = start + Duration::days(day);
        for &(airline, number, from, to, time, minutes, price, seats) in SCHEDULE {
            let local = format!("{date}T{time}:00+07:00");
            let Some(departs) = parse_date_time(&local) else {
                tracing::warn!(flight = number, timestamp = %local, "Skipping unparseable seed time");
                continue;
            };
            let departs = departs.with_timezone(&Utc);

            store.flights.insert(Flight {
                airline: airline.to_string(),
                flight_number: number.to_string(),
                departure: FlightEndpoint {
                    airport: from.to_string(),
                    city: city_of(from),
                    timestamp: departs,
                },
                arrival: FlightEndpoint {
                    airport: to.to_string(),
                    city: city_of(to),
                    timestamp: departs + Duration::minutes(minutes),
                },
                duration: format!("{}h {:02}m", minutes / 60, minutes % 60),
                price,
                flight_type: FlightType::Direct,
                available_seats: seats,
                total_seats: seats,
            });
            flights += 1;
        }
    }

    tracing::info!(
        airports = store.airports.len(),
        airlines = store.airlines.len(),
        flights,
        start = %start,
        "Seeded demo data"
    );
}

fn city_of(code: &str) -> String {
    AIRPORTS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, city)| city.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::to_canonical;

    #[test]
    fn test_seed_counts() {
        let store = DocumentStore::new();
        let start = NaiveDate::from_ymd_opt(2025, 10, 27).unwrap();
        seed_demo_data(&store, start);

        assert_eq!(store.airports.len(), AIRPORTS.len());
        assert_eq!(store.airlines.len(), AIRLINES.len());
        assert_eq!(store.flights.len(), SCHEDULE.len() * SEED_DAYS as usize);

        let admin = store.find_user_by_email(ADMIN_EMAIL).unwrap();
        assert_eq!(admin.data.role, Role::Admin);
        assert!(admin.data.password_matches(ADMIN_PASSWORD));
    }

    #[test]
    fn test_local_times_stored_as_utc() {
        let store = DocumentStore::new();
        let start = NaiveDate::from_ymd_opt(2025, 10, 27).unwrap();
        seed_demo_data(&store, start);

        let first_day = store
            .flights
            .find(|f| f.flight_number == "VN210" && f.departure.timestamp.date_naive() == NaiveDate::from_ymd_opt(2025, 10, 26).unwrap());
        assert_eq!(first_day.len(), 1);
        let flight = &first_day[0].data;
        assert_eq!(to_canonical(&flight.departure.timestamp), "2025-10-26T23:00:00.000Z");
        assert_eq!(to_canonical(&flight.arrival.timestamp), "2025-10-27T01:10:00.000Z");
        assert_eq!(flight.duration, "2h 10m");
        assert_eq!(flight.departure.city, "TP. Hồ Chí Minh");
    }
}
