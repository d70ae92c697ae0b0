//! Stored documents and typed collections.

use std::fmt;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::datetime::{self, Map, Payload, PlainData};

/// A type that can be stored in a [`Collection`].
pub trait Model: fmt::Debug + Clone + Send + Sync + 'static {
    /// Write this model's public fields into a plain mapping.
    fn write_fields(&self, fields: &mut Map);
}

/// A stored record: model data plus identity and timestamps.
#[derive(Debug, Clone)]
pub struct Document<T> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: T,
}

impl<T: Model> PlainData for Document<T> {
    fn to_plain(&self) -> Payload {
        let mut fields = Map::new();
        fields.insert("_id".to_string(), self.id.to_string().into());
        self.data.write_fields(&mut fields);
        fields.insert("createdAt".to_string(), self.created_at.into());
        fields.insert("updatedAt".to_string(), self.updated_at.into());
        Payload::Object(fields)
    }
}

impl<T: Model> From<Document<T>> for Payload {
    fn from(document: Document<T>) -> Self {
        Payload::record(document)
    }
}

/// Concurrent collection of documents keyed by id.
#[derive(Debug)]
pub struct Collection<T> {
    docs: DashMap<Uuid, Document<T>>,
}

impl<T: Model> Collection<T> {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
        }
    }

    /// Store `data` under a fresh id and return the stored document.
    pub fn insert(&self, data: T) -> Document<T> {
        let now = datetime::now();
        let document = Document {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            data,
        };
        self.docs.insert(document.id, document.clone());
        document
    }

    pub fn get(&self, id: &Uuid) -> Option<Document<T>> {
        self.docs.get(id).map(|entry| entry.value().clone())
    }

    /// Apply `change` to the document's data and bump `updated_at`.
    pub fn update(&self, id: &Uuid, change: impl FnOnce(&mut T)) -> Option<Document<T>> {
        let mut entry = self.docs.get_mut(id)?;
        change(&mut entry.data);
        entry.updated_at = datetime::now();
        Some(entry.value().clone())
    }

    /// Like [`update`](Self::update), but `change` may refuse. A refusing
    /// closure must leave the data untouched; `updated_at` is only bumped on
    /// success.
    pub fn try_update<E>(
        &self,
        id: &Uuid,
        change: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Option<Result<Document<T>, E>> {
        let mut entry = self.docs.get_mut(id)?;
        if let Err(e) = change(&mut entry.data) {
            return Some(Err(e));
        }
        entry.updated_at = datetime::now();
        Some(Ok(entry.value().clone()))
    }

    /// All documents whose data satisfies `predicate`, in no particular order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<Document<T>> {
        self.docs
            .iter()
            .filter(|entry| predicate(&entry.data))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_one(&self, predicate: impl Fn(&T) -> bool) -> Option<Document<T>> {
        self.docs
            .iter()
            .find(|entry| predicate(&entry.data))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<T: Model> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
