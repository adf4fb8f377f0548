//! CRUD over the phone, account and bill collections.
//!
//! Every mutation is one load-mutate-persist cycle through the
//! [`DocumentCoordinator`]. Lookups that miss return `not_found` before
//! anything is written.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::info;

use super::auth_gate::{AuthGate, Identity};
use super::coordinator::DocumentCoordinator;
use super::record::{
    CREATED_AT_FIELD, CREATED_BY_FIELD, ID_FIELD, UPDATED_AT_FIELD, UPDATED_BY_FIELD,
};
use super::{CollectionKind, Error, Record, Settings, UserSummary, format_timestamp};

/// Message returned when an id matches no record.
pub const RECORD_NOT_FOUND_MESSAGE: &str = "record not found";

const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Application service behind the record endpoints.
#[derive(Clone)]
pub struct CollectionService {
    documents: Arc<DocumentCoordinator>,
    clock: Arc<dyn Clock>,
}

impl CollectionService {
    /// Create a service over `documents`.
    #[must_use]
    pub fn new(documents: Arc<DocumentCoordinator>, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    /// Every record in the collection, in insertion order.
    pub async fn list(&self, kind: CollectionKind) -> Vec<Record> {
        self.documents
            .read(|document| document.collection(kind).to_vec())
            .await
    }

    /// Append a record and return its id.
    ///
    /// A missing, blank or non-string `id` is replaced by a generated one;
    /// a supplied id that already exists in the collection is rejected.
    pub async fn add(
        &self,
        kind: CollectionKind,
        attributes: Map<String, Value>,
        identity: &Identity,
    ) -> Result<String, Error> {
        let now = self.clock.utc();
        let mut record = Record::from_attributes(attributes);
        let id = self
            .documents
            .mutate(|document| {
                let records = document.collection_mut(kind);
                let id = match record.id() {
                    Some(id) if records.iter().any(|existing| existing.id() == Some(id)) => {
                        return Err(Error::invalid_request("record id already exists")
                            .with_details(serde_json::json!({ "field": ID_FIELD, "id": id })));
                    }
                    Some(id) => id.to_owned(),
                    None => generate_id(kind, records, now),
                };
                record.set(ID_FIELD, id.clone());
                record.set(CREATED_AT_FIELD, format_timestamp(now));
                record.set(CREATED_BY_FIELD, identity.user_id().to_string());
                records.push(record);
                Ok(id)
            })
            .await?;
        info!(collection = %kind, record_id = %id, user_id = %identity.user_id(), "record added");
        Ok(id)
    }

    /// Replace the record with `id` by `attributes`, forcing the id and
    /// update stamps.
    pub async fn update(
        &self,
        kind: CollectionKind,
        id: &str,
        attributes: Map<String, Value>,
        identity: &Identity,
    ) -> Result<(), Error> {
        let now = self.clock.utc();
        let mut replacement = Record::from_attributes(attributes);
        replacement.set(ID_FIELD, id);
        replacement.set(UPDATED_AT_FIELD, format_timestamp(now));
        replacement.set(UPDATED_BY_FIELD, identity.user_id().to_string());

        self.documents
            .mutate(|document| {
                let records = document.collection_mut(kind);
                let slot = records
                    .iter_mut()
                    .find(|record| record.id() == Some(id))
                    .ok_or_else(|| Error::not_found(RECORD_NOT_FOUND_MESSAGE))?;
                *slot = replacement;
                Ok(())
            })
            .await?;
        info!(collection = %kind, record_id = %id, user_id = %identity.user_id(), "record updated");
        Ok(())
    }

    /// Remove the record with `id`.
    pub async fn delete(&self, kind: CollectionKind, id: &str) -> Result<(), Error> {
        self.documents
            .mutate(|document| {
                let records = document.collection_mut(kind);
                let index = records
                    .iter()
                    .position(|record| record.id() == Some(id))
                    .ok_or_else(|| Error::not_found(RECORD_NOT_FOUND_MESSAGE))?;
                records.remove(index);
                Ok(())
            })
            .await?;
        info!(collection = %kind, record_id = %id, "record deleted");
        Ok(())
    }

    /// Empty the collection and return how many records it held. Admin only.
    pub async fn clear(&self, kind: CollectionKind, identity: &Identity) -> Result<usize, Error> {
        AuthGate::require_admin(identity)?;
        let removed = self
            .documents
            .mutate(|document| {
                let records = document.collection_mut(kind);
                let removed = records.len();
                records.clear();
                Ok(removed)
            })
            .await?;
        info!(collection = %kind, removed, user_id = %identity.user_id(), "collection cleared");
        Ok(removed)
    }

    /// Stored application settings.
    pub async fn settings(&self) -> Settings {
        self.documents
            .read(|document| document.settings().clone())
            .await
    }

    /// Every user without its password digest. Admin only.
    pub async fn users(&self, identity: &Identity) -> Result<Vec<UserSummary>, Error> {
        AuthGate::require_admin(identity)?;
        Ok(self
            .documents
            .read(|document| document.users().iter().map(|user| user.summary()).collect())
            .await)
    }
}

/// `{prefix}_{ordinal}_{timestamp}` with `ordinal = len + 1`, bumped past any
/// id already present so deletes within the same second cannot collide.
fn generate_id(kind: CollectionKind, records: &[Record], now: DateTime<Utc>) -> String {
    let stamp = now.format(ID_TIMESTAMP_FORMAT);
    let mut ordinal = records.len() + 1;
    loop {
        let candidate = format!("{}_{ordinal}_{stamp}", kind.id_prefix());
        if !records
            .iter()
            .any(|record| record.id() == Some(candidate.as_str()))
        {
            return candidate;
        }
        ordinal += 1;
    }
}
