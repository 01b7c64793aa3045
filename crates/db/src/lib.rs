//! Caption history persistence on Cloud Firestore.
//!
//! - [`value`] -- typed REST wire values and documents.
//! - [`credentials`] -- service-account key decoding and access tokens.
//! - [`history`] -- the [`HistoryStore`] trait and its Firestore implementation.

pub mod credentials;
pub mod error;
pub mod history;
pub mod value;

pub use credentials::ServiceAccountCredentials;
pub use error::HistoryError;
pub use history::{FirestoreConfig, FirestoreHistoryStore, HistoryStore};
