use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Blob handles issued by this service: `uploads/` followed by a UUID
    /// - Valid: "uploads/0190a5f2-7c1e-7d3a-9a4b-2f6c1d8e9b10"
    /// - Invalid: "uploads/../secret", "avatars/0190a5f2-...", "uploads/"
    pub static ref BLOB_HANDLE_REGEX: Regex = Regex::new(
        r"^uploads/[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Rejects strings that are empty or whitespace only
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}
