#![doc = include_str!("../README.md")]

pub mod access;
pub mod catalog;
pub mod context;
pub mod init;
pub mod ledger;
pub mod overview;
pub mod profiles;

// Re-exports for convenience
pub use access::AccessEngine;
pub use catalog::{CatalogStore, ContentUpdate, NewContent};
pub use context::MarketContext;
pub use init::{market, Market, MarketBuilder};
pub use ledger::PurchaseLedger;
pub use overview::{BuyerOverview, ModelOverview};
pub use profiles::{NewUser, ProfileStore, ProfileUpdate};

pub use fangate_core::{
    AccessStatus, Content, DataUrlGateway, ErrorCode, MarketError, MarketOptions, MediaKind,
    MediaUpload, PaymentInstructions, Purchase, PurchaseStatus, Result, Role, UploadError,
    UploadGateway, User,
};
