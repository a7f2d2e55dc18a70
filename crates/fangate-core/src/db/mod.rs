pub mod backend;
pub mod models;
pub mod schema;

pub use backend::{Filter, Query, SortBy, SortDirection, StorageBackend};
pub use models::{
    AccessStatus, Content, MediaKind, PaymentInstructions, Purchase, PurchaseStatus, Role, User,
};
