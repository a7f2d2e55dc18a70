#![doc = include_str!("../README.md")]

pub mod db;
pub mod env;
pub mod error;
pub mod logger;
pub mod options;
pub mod upload;
pub mod utils;

// Re-exports for convenience
pub use db::backend::{Filter, Operator, Query, SortBy, SortDirection, StorageBackend};
pub use db::models::{
    AccessStatus, Content, MediaKind, PaymentInstructions, Purchase, PurchaseStatus, Role, User,
};
pub use error::{ErrorCode, MarketError, Result};
pub use logger::{LogHandler, LogLevel, LoggerConfig, MarketLogger};
pub use options::MarketOptions;
pub use upload::{DataUrlGateway, MediaUpload, UploadError, UploadGateway};
