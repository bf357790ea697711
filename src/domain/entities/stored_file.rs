use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use serde::Serialize;

/// Multipart body carrying a single `file` part, used for photo and standalone uploads.
#[derive(Debug, MultipartForm)]
pub struct FileUpload {
    pub file: TempFile,
}

impl FileUpload {
    /// Name the client gave the uploaded file, if any.
    pub fn suggested_name(&self) -> &str {
        self.file.file_name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct FileUploadResponse {
    pub message: String,
    pub filename: String,
}
