//! The single JSON document holding every collection, user and setting.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CollectionKind, PasswordDigest, Record, Role, User, UserId};

/// Identifier and username of the seeded administrator.
pub const DEFAULT_ADMIN: &str = "admin";
/// Password of the seeded administrator.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Render a timestamp the way the document stores them.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use recordkeeper::domain::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
/// assert_eq!(format_timestamp(at), "2024-03-05T14:30:00+00:00");
/// ```
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Application settings stored alongside the collections.
///
/// Unknown keys are preserved so hand-edited settings survive a rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Display name of the operating company.
    pub company_name: String,
    /// Data format version.
    pub version: String,
    /// Informational flag; snapshots are taken on every save regardless.
    pub auto_backup: bool,
    /// Informational interval in hours.
    pub backup_interval: u32,
    /// Any additional keys found in the data file.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: "Phone Number Management System".to_owned(),
            version: "v3.5".to_owned(),
            auto_backup: true,
            backup_interval: 24,
            extra: Map::new(),
        }
    }
}

/// The whole persisted state.
///
/// Missing collections deserialise as empty so partially written or older
/// files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    phones: Vec<Record>,
    #[serde(default)]
    accounts: Vec<Record>,
    #[serde(default)]
    bills: Vec<Record>,
    #[serde(default)]
    settings: Settings,
}

impl Document {
    /// The document used when no data file exists or it cannot be read:
    /// one administrator, empty collections and default settings.
    #[must_use]
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let admin = UserId::new(DEFAULT_ADMIN).ok().and_then(|id| {
            User::new(
                id,
                DEFAULT_ADMIN,
                PasswordDigest::of(DEFAULT_ADMIN_PASSWORD),
                Role::Admin,
                format_timestamp(now),
            )
            .ok()
        });
        Self {
            users: admin.into_iter().collect(),
            phones: Vec::new(),
            accounts: Vec::new(),
            bills: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Every stored user.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Add a user unless its id or username is already taken.
    pub fn insert_user(&mut self, user: User) -> bool {
        let taken = self
            .users
            .iter()
            .any(|existing| existing.id() == user.id() || existing.username() == user.username());
        if !taken {
            self.users.push(user);
        }
        !taken
    }

    /// Find a user by identifier.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id() == id)
    }

    /// Find a user by identifier for modification.
    pub fn user_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id() == id)
    }

    /// Find a user by exact username.
    #[must_use]
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username() == username)
    }

    /// Records held by one collection, in insertion order.
    #[must_use]
    pub fn collection(&self, kind: CollectionKind) -> &[Record] {
        match kind {
            CollectionKind::Phones => &self.phones,
            CollectionKind::Accounts => &self.accounts,
            CollectionKind::Bills => &self.bills,
        }
    }

    /// Mutable access to one collection.
    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut Vec<Record> {
        match kind {
            CollectionKind::Phones => &mut self.phones,
            CollectionKind::Accounts => &mut self.accounts,
            CollectionKind::Bills => &mut self.bills,
        }
    }

    /// Application settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn seeded_document_has_single_admin(now: DateTime<Utc>) {
        let document = Document::seeded(now);
        let [admin] = document.users() else {
            panic!("expected exactly one user");
        };
        assert_eq!(admin.id().as_ref(), DEFAULT_ADMIN);
        assert_eq!(admin.role(), Role::Admin);
        assert!(admin.password_digest().matches(DEFAULT_ADMIN_PASSWORD));
        assert_eq!(admin.last_login(), None);
        for kind in CollectionKind::ALL {
            assert!(document.collection(kind).is_empty());
        }
        assert_eq!(document.settings(), &Settings::default());
    }

    #[rstest]
    fn seeded_document_serialises_expected_shape(now: DateTime<Utc>) {
        let value = serde_json::to_value(Document::seeded(now)).expect("serialise");
        assert_eq!(value["phones"], json!([]));
        assert_eq!(value["accounts"], json!([]));
        assert_eq!(value["bills"], json!([]));
        assert_eq!(
            value["settings"],
            json!({
                "companyName": "Phone Number Management System",
                "version": "v3.5",
                "autoBackup": true,
                "backupInterval": 24
            })
        );
        assert_eq!(value["users"][0]["createdAt"], json!("2024-01-01T00:00:00+00:00"));
    }

    #[rstest]
    fn round_trips_through_json(now: DateTime<Utc>) {
        let mut document = Document::seeded(now);
        let record: Record =
            serde_json::from_value(json!({ "id": "phone_1_x", "number": "555-0100" }))
                .expect("record");
        document.collection_mut(CollectionKind::Phones).push(record);
        let raw = serde_json::to_string_pretty(&document).expect("serialise");
        let restored: Document = serde_json::from_str(&raw).expect("deserialise");
        assert_eq!(restored, document);
    }

    #[rstest]
    fn missing_sections_default_and_unknown_settings_survive() {
        let document: Document = serde_json::from_value(json!({
            "settings": { "companyName": "Acme", "theme": "dark" }
        }))
        .expect("partial document");
        assert!(document.users().is_empty());
        assert_eq!(document.settings().company_name, "Acme");
        assert_eq!(document.settings().version, "v3.5");
        assert_eq!(document.settings().extra.get("theme"), Some(&json!("dark")));
    }
}
