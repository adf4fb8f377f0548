//! Domain ports and supporting types for the hexagonal boundary.

mod document_store;

pub use document_store::{DocumentPersistenceError, DocumentStore, FixtureDocumentStore};
