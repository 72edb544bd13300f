/// All server-side timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Device identifier used when a payload carries none.
pub const UNKNOWN_DEVICE_ID: &str = "unknown";

/// Textual format of server-generated timestamps (second precision, literal `Z`).
pub const PROCESSED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
