// Error taxonomy for marketplace operations.
//
// Every user-visible rejection carries a stable `ErrorCode` so callers can
// map failures to messages without parsing strings. The `MarketError` enum
// distinguishes the failure classes; operations that fail leave no partial
// state behind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::upload::UploadError;

/// Stable reason codes attached to user-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NameRequired,
    EmailRequired,
    TitleRequired,
    DescriptionRequired,
    ThumbnailRequired,
    MediaFilesRequired,
    NotAModel,
    UserNotFound,
    ModelNotFound,
    ContentNotFound,
    PurchaseNotFound,
    EmailAlreadyRegistered,
    PendingPurchaseExists,
    AccessAlreadyActive,
    PurchaseAlreadyResolved,
    AccessDenied,
    UnsupportedFileType,
    FileTooLarge,
    StorageFailure,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NameRequired => "Name is required",
            Self::EmailRequired => "Email is required",
            Self::TitleRequired => "Title is required",
            Self::DescriptionRequired => "Description is required",
            Self::ThumbnailRequired => "Thumbnail is required",
            Self::MediaFilesRequired => "At least one media file is required",
            Self::NotAModel => "User is not a model",
            Self::UserNotFound => "User not found",
            Self::ModelNotFound => "Model not found",
            Self::ContentNotFound => "Content not found",
            Self::PurchaseNotFound => "Purchase not found",
            Self::EmailAlreadyRegistered => "Email already registered",
            Self::PendingPurchaseExists => "A pending purchase for this model already exists",
            Self::AccessAlreadyActive => "Access to this model is still active",
            Self::PurchaseAlreadyResolved => "Purchase has already been resolved",
            Self::AccessDenied => "Access denied",
            Self::UnsupportedFileType => "Unsupported file type",
            Self::FileTooLarge => "File exceeds the maximum allowed size",
            Self::StorageFailure => "Storage operation failed",
            Self::InternalError => "Internal error",
        };
        write!(f, "{msg}")
    }
}

/// Unified error type for marketplace operations.
///
/// The first five variants are the recoverable rejections an operation can
/// return to its caller; the remaining ones surface infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Input was rejected before any state changed.
    #[error("Validation failed: {0}")]
    Validation(ErrorCode),

    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(ErrorCode),

    /// The operation conflicts with existing records.
    #[error("Conflict: {0}")]
    Conflict(ErrorCode),

    /// The record exists but its current state forbids the transition.
    #[error("Invalid state: {0}")]
    InvalidState(ErrorCode),

    /// The caller does not hold access to the requested resource.
    #[error("Access denied: {0}")]
    AccessDenied(ErrorCode),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl MarketError {
    /// The reason code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(code)
            | Self::NotFound(code)
            | Self::Conflict(code)
            | Self::InvalidState(code)
            | Self::AccessDenied(code) => *code,
            Self::Upload(UploadError::UnsupportedType { .. }) => ErrorCode::UnsupportedFileType,
            Self::Upload(UploadError::TooLarge { .. }) => ErrorCode::FileTooLarge,
            Self::Storage(_) => ErrorCode::StorageFailure,
            Self::Serialization(_) | Self::Anyhow(_) => ErrorCode::InternalError,
        }
    }

    /// Build a JSON body describing the failure.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

/// Unified result type for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;
