/// Opaque user identifier issued by the identity provider (the token `sub`).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
