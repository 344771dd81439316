use serde_json::Value;
use uuid::Uuid;

/// Length of a resource identifier in hex characters
pub const ID_LEN: usize = 24;

/// True only for a string of exactly 24 ASCII hex characters
pub fn is_valid_id(value: &Value) -> bool {
    value.as_str().map(is_valid_id_str).unwrap_or(false)
}

pub fn is_valid_id_str(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Generate a new identifier: 8 hex chars of unix seconds followed by 16 random hex chars.
/// Ids created later sort after ids created earlier (at second resolution).
pub fn new_id() -> String {
    let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
    let random = Uuid::new_v4().simple().to_string();
    format!("{:08x}{}", secs, &random[..ID_LEN - 8])
}
