//! In-memory document store.
//!
//! # Responsibilities
//! - Hold users, airports, airlines, flights and bookings
//! - Issue and resolve mocked session tokens
//! - Present records to the response layer through `PlainData`
//!
//! # Design Decisions
//! - One `DashMap` per collection; handlers share the store via `Arc`
//! - Users are keyed by case-folded email in a separate index, claimed
//!   through `entry()` so two registrations cannot share an address
//! - Documents are cloned out, so no map guard outlives a call

pub mod document;
pub mod models;
pub mod seed;

pub use document::{Collection, Document, Model};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::models::{Airline, Airport, Booking, Flight, User};

/// All collections of the booking system.
#[derive(Debug, Default)]
pub struct DocumentStore {
    pub users: Collection<User>,
    pub airports: Collection<Airport>,
    pub airlines: Collection<Airline>,
    pub flights: Collection<Flight>,
    pub bookings: Collection<Booking>,
    emails: DashMap<String, Uuid>,
    tokens: DashMap<String, Uuid>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `user` unless its email is already taken.
    pub fn insert_user(&self, user: User) -> Option<Document<User>> {
        match self.emails.entry(user.email.to_ascii_lowercase()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let document = self.users.insert(user);
                slot.insert(document.id);
                Some(document)
            }
        }
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<Document<User>> {
        let id = *self.emails.get(&email.to_ascii_lowercase())?;
        self.users.get(&id)
    }

    /// Issue an opaque bearer token for `user_id`.
    pub fn issue_token(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }

    pub fn resolve_token(&self, token: &str) -> Option<Uuid> {
        self.tokens.get(token).map(|entry| *entry.value())
    }

    pub fn revoke_token(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }
}
