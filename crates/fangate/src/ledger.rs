// Purchase ledger — the state machine governing every purchase.
//
// States: Pending → Approved | Rejected, both terminal. A new attempt to
// buy access always appends a new record; resolved records are never
// reopened. Time enters every operation as an explicit parameter.
//
// All mutations run under one write lock so the duplicate-pending check
// and the state transitions are race-free; each transition lands in the
// backend as a single atomic update.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use fangate_core::db::backend::{from_record, to_record, Filter, Query};
use fangate_core::db::schema::PURCHASE_COLLECTION;
use fangate_core::utils::generate_id;
use fangate_core::{ErrorCode, MarketError, Purchase, PurchaseStatus, Result, StorageBackend};

use crate::access;

/// Store for purchase records and their lifecycle.
#[derive(Debug)]
pub struct PurchaseLedger {
    backend: Arc<dyn StorageBackend>,
    window: Duration,
    write_lock: Mutex<()>,
}

impl PurchaseLedger {
    pub fn new(backend: Arc<dyn StorageBackend>, window: Duration) -> Self {
        Self {
            backend,
            window,
            write_lock: Mutex::new(()),
        }
    }

    /// Open a new pending purchase at `now`, snapshotting `amount`.
    ///
    /// Refused while the pair already has a pending purchase, or while the
    /// user still holds valid access to the model at `now`.
    pub async fn create_purchase(
        &self,
        user_id: &str,
        model_id: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Purchase> {
        let _guard = self.write_lock.lock().await;

        // Rejected rows can never block a new purchase, so one query for
        // the open-or-approved subset covers both preconditions.
        let records = self
            .backend
            .find_many(
                PURCHASE_COLLECTION,
                Query::filtered(vec![
                    Filter::eq("userId", user_id),
                    Filter::eq("modelId", model_id),
                    Filter::is_in(
                        "status",
                        [
                            PurchaseStatus::Pending.as_str(),
                            PurchaseStatus::Approved.as_str(),
                        ],
                    ),
                ]),
            )
            .await?;
        let existing: Vec<Purchase> = records
            .into_iter()
            .map(from_record)
            .collect::<Result<_>>()?;

        if existing.iter().any(|p| p.status == PurchaseStatus::Pending) {
            return Err(MarketError::Conflict(ErrorCode::PendingPurchaseExists));
        }
        if access::evaluate(&existing, self.window, now).granted {
            return Err(MarketError::Conflict(ErrorCode::AccessAlreadyActive));
        }

        let purchase = Purchase::new(
            generate_id(),
            user_id.to_string(),
            model_id.to_string(),
            amount,
            now,
        );
        let created = self
            .backend
            .create(PURCHASE_COLLECTION, to_record(&purchase)?)
            .await?;
        from_record(created)
    }

    /// Attach (or replace) the payment proof reference on a pending
    /// purchase. Resolved purchases no longer accept proofs.
    pub async fn attach_proof(&self, purchase_id: &str, proof_ref: &str) -> Result<Purchase> {
        let _guard = self.write_lock.lock().await;

        let purchase = self.fetch(purchase_id).await?;
        if purchase.status != PurchaseStatus::Pending {
            return Err(MarketError::InvalidState(ErrorCode::PurchaseAlreadyResolved));
        }

        self.apply(purchase_id, serde_json::json!({ "paymentProof": proof_ref }))
            .await
    }

    /// Approve a pending purchase at `now`, granting access until
    /// `now + window`.
    ///
    /// Only valid from `Pending`; approving an already-resolved purchase
    /// fails and never moves the expiry.
    pub async fn approve(&self, purchase_id: &str, now: DateTime<Utc>) -> Result<Purchase> {
        let _guard = self.write_lock.lock().await;

        let purchase = self.fetch(purchase_id).await?;
        if purchase.status != PurchaseStatus::Pending {
            return Err(MarketError::InvalidState(ErrorCode::PurchaseAlreadyResolved));
        }

        let expires_at = now + self.window;
        self.apply(
            purchase_id,
            serde_json::json!({
                "status": PurchaseStatus::Approved,
                "expiresAt": expires_at,
            }),
        )
        .await
    }

    /// Reject a pending purchase. Terminal; no expiry is ever set.
    pub async fn reject(&self, purchase_id: &str) -> Result<Purchase> {
        let _guard = self.write_lock.lock().await;

        let purchase = self.fetch(purchase_id).await?;
        if purchase.status != PurchaseStatus::Pending {
            return Err(MarketError::InvalidState(ErrorCode::PurchaseAlreadyResolved));
        }

        self.apply(
            purchase_id,
            serde_json::json!({ "status": PurchaseStatus::Rejected }),
        )
        .await
    }

    /// Look up a purchase by id.
    pub async fn find(&self, purchase_id: &str) -> Result<Option<Purchase>> {
        let record = self
            .backend
            .find_one(PURCHASE_COLLECTION, &[Filter::eq("id", purchase_id)])
            .await?;
        record.map(from_record).transpose()
    }

    /// A user's full purchase history, all statuses, oldest first.
    pub async fn purchases_by_user(&self, user_id: &str) -> Result<Vec<Purchase>> {
        self.query(vec![Filter::eq("userId", user_id)]).await
    }

    /// Every purchase made against a model, oldest first.
    pub async fn purchases_by_model(&self, model_id: &str) -> Result<Vec<Purchase>> {
        self.query(vec![Filter::eq("modelId", model_id)]).await
    }

    /// The model's review queue: pending purchases awaiting a decision.
    pub async fn pending_for_model(&self, model_id: &str) -> Result<Vec<Purchase>> {
        self.query(vec![
            Filter::eq("modelId", model_id),
            Filter::eq("status", PurchaseStatus::Pending.as_str()),
        ])
        .await
    }

    async fn fetch(&self, purchase_id: &str) -> Result<Purchase> {
        self.find(purchase_id)
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::PurchaseNotFound))
    }

    async fn apply(&self, purchase_id: &str, patch: serde_json::Value) -> Result<Purchase> {
        let updated = self
            .backend
            .update(PURCHASE_COLLECTION, &[Filter::eq("id", purchase_id)], patch)
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::PurchaseNotFound))?;
        from_record(updated)
    }

    async fn query(&self, filters: Vec<Filter>) -> Result<Vec<Purchase>> {
        let records = self
            .backend
            .find_many(PURCHASE_COLLECTION, Query::filtered(filters))
            .await?;
        records.into_iter().map(from_record).collect()
    }
}
