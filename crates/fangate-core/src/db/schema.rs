// Collection names shared by the engine and storage backends.

/// Registered accounts, both models and subscribers.
pub const USER_COLLECTION: &str = "user";

/// Published portfolio content.
pub const CONTENT_COLLECTION: &str = "content";

/// Purchase ledger records.
pub const PURCHASE_COLLECTION: &str = "purchase";
