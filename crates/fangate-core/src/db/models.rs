// Record models for the marketplace collections.
//
// All records serialize with camelCase field names, which is also the wire
// shape `StorageBackend` implementations store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Closed set: every account is exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creator account: publishes content, reviews payments.
    Model,
    /// Subscriber account: purchases access to creators' portfolios.
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Model => "model",
            Role::User => "user",
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Role::Model)
    }
}

/// A registered account, either a creator ("model") or a subscriber.
///
/// The payment contact fields and `monthly_price` are meaningful for model
/// accounts; they ride along as `None`/default for subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// PIX key shown to buyers when quoting a purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mercado_pago_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    /// Subscription price in whole currency units for one access window.
    pub monthly_price: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh account registered at `now`.
    pub fn new(
        id: String,
        name: String,
        email: String,
        role: Role,
        monthly_price: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email: email.to_lowercase(),
            role,
            phone: None,
            profile_image: None,
            description: None,
            pix_key: None,
            mercado_pago_email: None,
            contact_number: None,
            monthly_price,
            created_at: now,
        }
    }
}

/// Kind of media a content item carries, derived from its references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Both,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Both => "both",
        }
    }

    /// Derive the media kind from a set of media references.
    ///
    /// References produced by the upload gateway are self-describing data
    /// URLs, so the scheme prefix tells the media class. A mixed set is
    /// `Both`, a video-only set is `Video`, everything else is `Image`.
    pub fn from_references<S: AsRef<str>>(references: &[S]) -> Self {
        let has_images = references
            .iter()
            .any(|r| r.as_ref().starts_with("data:image/"));
        let has_videos = references
            .iter()
            .any(|r| r.as_ref().starts_with("data:video/"));

        if has_images && has_videos {
            MediaKind::Both
        } else if has_videos {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// A published content item in a model's portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,
    /// Owning model account.
    pub model_id: String,
    pub title: String,
    pub description: String,
    /// Preview reference shown before purchase.
    pub thumbnail: String,
    /// Ordered media references; order is preserved as uploaded.
    pub media_files: Vec<String>,
    pub media_kind: MediaKind,
    /// Inactive content stays stored but is hidden from listings.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a purchase.
///
/// `Pending` can move to `Approved` or `Rejected`; both of those are
/// terminal. A new purchase attempt always creates a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Approved,
    Rejected,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Approved => "approved",
            PurchaseStatus::Rejected => "rejected",
        }
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PurchaseStatus::Pending)
    }
}

/// One purchase of time-boxed access from a user to a model's portfolio.
///
/// `amount` snapshots the model's price at creation and is never recomputed.
/// `expires_at` is set exactly when the purchase is approved; for every
/// record, `expires_at.is_some()` is equivalent to `status == Approved`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub model_id: String,
    pub amount: i64,
    pub status: PurchaseStatus,
    /// Reference to the uploaded payment proof, if submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// A fresh pending purchase created at `now`.
    pub fn new(
        id: String,
        user_id: String,
        model_id: String,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            model_id,
            amount,
            status: PurchaseStatus::Pending,
            payment_proof: None,
            expires_at: None,
            created_at: now,
        }
    }
}

/// Answer to an access query. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
    pub granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessStatus {
    pub fn denied() -> Self {
        Self {
            granted: false,
            expires_at: None,
        }
    }
}

/// What a buyer needs to complete an out-of-band payment: the quoted amount
/// plus the model's payment contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructions {
    pub model_id: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mercado_pago_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}
