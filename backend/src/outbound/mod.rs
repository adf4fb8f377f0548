//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the JSON data file and its rolling backups
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
