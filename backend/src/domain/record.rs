//! Schemaless records and the collections that hold them.
//!
//! Phones, accounts and bills share one shape: an open JSON object with a
//! handful of server-maintained fields. Everything else is stored verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the record identifier.
pub const ID_FIELD: &str = "id";
/// Key holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Key holding the id of the user that created the record.
pub const CREATED_BY_FIELD: &str = "createdBy";
/// Key holding the last update timestamp.
pub const UPDATED_AT_FIELD: &str = "updatedAt";
/// Key holding the id of the user that last replaced the record.
pub const UPDATED_BY_FIELD: &str = "updatedBy";

/// The three record collections held by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Phone numbers.
    Phones,
    /// Customer accounts.
    Accounts,
    /// Bills.
    Bills,
}

impl CollectionKind {
    /// Every collection in document order.
    pub const ALL: [Self; 3] = [Self::Phones, Self::Accounts, Self::Bills];

    /// Collection name as it appears in URLs and the data file.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Phones => "phones",
            Self::Accounts => "accounts",
            Self::Bills => "bills",
        }
    }

    /// Prefix used when generating record identifiers.
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Phones => "phone",
            Self::Accounts => "account",
            Self::Bills => "bill",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a URL names a collection that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported collection: {0}")]
pub struct UnknownCollection(pub String);

impl FromStr for CollectionKind {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownCollection(s.to_owned()))
    }
}

/// A stored record: an open JSON object.
///
/// Stored records always carry a non-empty string `id`; client-supplied
/// objects may not until the collection service assigns one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap client-supplied attributes.
    #[must_use]
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Non-empty string identifier, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
    }

    /// Set one attribute, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_owned(), value.into());
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Object(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("phones", CollectionKind::Phones, "phone")]
    #[case("accounts", CollectionKind::Accounts, "account")]
    #[case("bills", CollectionKind::Bills, "bill")]
    fn collection_names_round_trip(
        #[case] name: &str,
        #[case] kind: CollectionKind,
        #[case] prefix: &str,
    ) {
        assert_eq!(name.parse::<CollectionKind>(), Ok(kind));
        assert_eq!(kind.to_string(), name);
        assert_eq!(kind.id_prefix(), prefix);
    }

    #[rstest]
    #[case("users")]
    #[case("Phones")]
    #[case("")]
    fn unknown_collections_are_rejected(#[case] name: &str) {
        assert_eq!(
            name.parse::<CollectionKind>(),
            Err(UnknownCollection(name.to_owned()))
        );
    }

    #[rstest]
    #[case(json!({ "id": "phone_1" }), Some("phone_1"))]
    #[case(json!({ "id": "" }), None)]
    #[case(json!({ "id": 7 }), None)]
    #[case(json!({ "number": "555" }), None)]
    fn id_requires_non_empty_string(#[case] raw: Value, #[case] expected: Option<&str>) {
        let record: Record = serde_json::from_value(raw).expect("object");
        assert_eq!(record.id(), expected);
    }
}
