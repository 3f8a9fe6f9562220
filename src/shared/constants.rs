/// Key prefix for every blob handle issued by this service
pub const BLOB_HANDLE_PREFIX: &str = "uploads/";

/// Maximum file name length accepted on create
pub const MAX_FILE_NAME_LENGTH: u64 = 255;

/// Maximum size of a direct multipart upload (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted by the direct upload endpoint, besides `image/*`
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &["application/pdf", "text/csv"];
