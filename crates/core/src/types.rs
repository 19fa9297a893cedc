/// Catalog record ids are opaque server-assigned strings (`entry_<hex>`).
pub type EntryId = String;

/// All timestamps are UTC and server-assigned.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
