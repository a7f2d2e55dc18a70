// Upload gateway — accepts raw media bytes plus a declared media type and
// returns a stable reference to the stored file.
//
// The gateway is the engine's only collaborator for file handling. The
// bundled implementation encodes accepted files as self-contained data URLs,
// which keeps references retrievable without any further negotiation.
// Deployments with real object storage implement the trait themselves.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Media types accepted by default.
pub const ALLOWED_MEDIA_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/mov",
    "video/avi",
];

/// Default upload ceiling: 50 MiB.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Errors from upload operations. Both variants are rejections of the
/// submitted file; nothing is stored when they are returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file type: {media_type}")]
    UnsupportedType { media_type: String },

    #[error("File of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
}

/// One file submitted for upload: raw bytes plus the declared media type.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl MediaUpload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }
}

/// A file upload backend.
///
/// `upload` validates the declared media type and the size ceiling before
/// storing anything, and returns a reference that stays valid for the life
/// of the stored file.
#[async_trait]
pub trait UploadGateway: Send + Sync + std::fmt::Debug {
    /// Validate and store one file, returning its reference.
    async fn upload(&self, bytes: &[u8], media_type: &str) -> Result<String, UploadError>;

    /// Upload a batch of files, returning references in submission order.
    /// Stops at the first rejected file.
    async fn upload_many(&self, files: &[MediaUpload]) -> Result<Vec<String>, UploadError> {
        let mut references = Vec::with_capacity(files.len());
        for file in files {
            references.push(self.upload(&file.bytes, &file.media_type).await?);
        }
        Ok(references)
    }
}

/// Upload gateway that stores accepted files as base64 data URLs.
///
/// References have the form `data:<media type>;base64,<payload>`, so they
/// are self-describing and need no storage round trip to read back.
#[derive(Debug, Clone)]
pub struct DataUrlGateway {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl DataUrlGateway {
    /// Gateway with the default allow-list and size ceiling.
    pub fn new() -> Self {
        Self {
            max_bytes: MAX_FILE_BYTES,
            allowed_types: ALLOWED_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Gateway with custom limits.
    pub fn with_limits(max_bytes: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_types,
        }
    }
}

impl Default for DataUrlGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UploadGateway for DataUrlGateway {
    async fn upload(&self, bytes: &[u8], media_type: &str) -> Result<String, UploadError> {
        if !self.allowed_types.iter().any(|t| t == media_type) {
            return Err(UploadError::UnsupportedType {
                media_type: media_type.to_string(),
            });
        }
        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(format!("data:{media_type};base64,{}", BASE64.encode(bytes)))
    }
}
