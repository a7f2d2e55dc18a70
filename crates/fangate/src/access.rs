// Access evaluation — decides whether a user currently holds access to a
// model's portfolio.
//
// Access is derived from the purchase ledger on every query and never
// cached or stored: the newest approved purchase for the (user, model)
// pair governs, and access holds strictly before its effective expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use fangate_core::db::backend::{from_record, Filter, Query};
use fangate_core::db::schema::PURCHASE_COLLECTION;
use fangate_core::{AccessStatus, Purchase, PurchaseStatus, Result, StorageBackend};

/// The expiry that actually governs a purchase: the stamped `expires_at`,
/// falling back to `created_at + window` for approved rows that predate
/// expiry stamping.
fn effective_expiry(purchase: &Purchase, window: Duration) -> DateTime<Utc> {
    purchase
        .expires_at
        .unwrap_or(purchase.created_at + window)
}

/// Evaluate access from a set of purchases at an explicit instant.
///
/// Only `Approved` purchases count. Among them the one with the latest
/// `created_at` governs; rows created at the same instant tie-break by
/// position, the later row winning. Access is granted iff `now` lies
/// strictly before the governing row's effective expiry, and `expires_at`
/// is populated only on a granted status.
pub fn evaluate(purchases: &[Purchase], window: Duration, now: DateTime<Utc>) -> AccessStatus {
    let governing = purchases
        .iter()
        .filter(|p| p.status == PurchaseStatus::Approved)
        .max_by_key(|p| p.created_at);

    match governing {
        Some(purchase) => {
            let expiry = effective_expiry(purchase, window);
            if now < expiry {
                AccessStatus {
                    granted: true,
                    expires_at: Some(expiry),
                }
            } else {
                AccessStatus::denied()
            }
        }
        None => AccessStatus::denied(),
    }
}

/// Answers access queries by scanning the purchase ledger.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    backend: Arc<dyn StorageBackend>,
    window: Duration,
}

impl AccessEngine {
    pub fn new(backend: Arc<dyn StorageBackend>, window: Duration) -> Self {
        Self { backend, window }
    }

    /// The full access answer for a (user, model) pair at `now`.
    pub async fn access_status(
        &self,
        user_id: &str,
        model_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessStatus> {
        let purchases = self.approved_purchases(user_id, model_id).await?;

        let live = purchases
            .iter()
            .filter(|p| now < effective_expiry(p, self.window))
            .count();
        if live > 1 {
            tracing::warn!(
                "user {user_id} holds {live} overlapping approved purchases for model {model_id}"
            );
        }

        Ok(evaluate(&purchases, self.window, now))
    }

    /// Whether the user holds access to the model's portfolio at `now`.
    pub async fn has_access(
        &self,
        user_id: &str,
        model_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.access_status(user_id, model_id, now).await?.granted)
    }

    async fn approved_purchases(&self, user_id: &str, model_id: &str) -> Result<Vec<Purchase>> {
        let records = self
            .backend
            .find_many(
                PURCHASE_COLLECTION,
                Query::filtered(vec![
                    Filter::eq("userId", user_id),
                    Filter::eq("modelId", model_id),
                    Filter::eq("status", PurchaseStatus::Approved.as_str()),
                ]),
            )
            .await?;
        records.into_iter().map(from_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangate_core::db::backend::to_record;
    use fangate_memory::MemoryBackend;

    fn window() -> Duration {
        Duration::days(30)
    }

    fn approved(id: &str, created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Purchase {
        Purchase {
            id: id.into(),
            user_id: "u1".into(),
            model_id: "m1".into(),
            amount: 30,
            status: PurchaseStatus::Approved,
            payment_proof: None,
            expires_at,
            created_at,
        }
    }

    #[test]
    fn test_no_purchases_is_denied() {
        let status = evaluate(&[], window(), Utc::now());
        assert!(!status.granted);
        assert!(status.expires_at.is_none());
    }

    #[test]
    fn test_pending_and_rejected_never_grant() {
        let now = Utc::now();
        let mut pending = approved("p1", now, None);
        pending.status = PurchaseStatus::Pending;
        let mut rejected = approved("p2", now, None);
        rejected.status = PurchaseStatus::Rejected;

        let status = evaluate(&[pending, rejected], window(), now);
        assert!(!status.granted);
    }

    #[test]
    fn test_approved_grants_until_expiry() {
        let now = Utc::now();
        let expiry = now + Duration::days(30);
        let purchases = vec![approved("p1", now, Some(expiry))];

        let status = evaluate(&purchases, window(), now);
        assert!(status.granted);
        assert_eq!(status.expires_at, Some(expiry));

        assert!(evaluate(&purchases, window(), expiry - Duration::seconds(1)).granted);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let expiry = now + Duration::days(30);
        let purchases = vec![approved("p1", now, Some(expiry))];

        assert!(!evaluate(&purchases, window(), expiry).granted);
        assert!(!evaluate(&purchases, window(), expiry + Duration::seconds(1)).granted);
    }

    #[test]
    fn test_missing_expiry_falls_back_to_window() {
        let created = Utc::now() - Duration::days(10);
        let purchases = vec![approved("p1", created, None)];

        let status = evaluate(&purchases, window(), Utc::now());
        assert!(status.granted);
        assert_eq!(status.expires_at, Some(created + Duration::days(30)));

        assert!(!evaluate(&purchases, window(), created + Duration::days(30)).granted);
    }

    #[test]
    fn test_newest_approval_governs() {
        let now = Utc::now();
        // The older purchase is still unexpired, but the newer one has
        // already run out. The newer row governs, so access is denied.
        let older = approved("p1", now - Duration::days(40), Some(now + Duration::days(5)));
        let newer = approved("p2", now - Duration::days(35), Some(now - Duration::days(5)));

        assert!(!evaluate(&[older, newer], window(), now).granted);
    }

    #[test]
    fn test_created_at_tie_uses_later_row() {
        let created = Utc::now() - Duration::days(1);
        let now = Utc::now();
        let first = approved("p1", created, Some(now - Duration::days(1)));
        let second = approved("p2", created, Some(now + Duration::days(1)));

        // Same creation instant: the later row wins, so access holds.
        let status = evaluate(&[first.clone(), second.clone()], window(), now);
        assert!(status.granted);

        // Reversed order flips the outcome.
        let status = evaluate(&[second, first], window(), now);
        assert!(!status.granted);
    }

    #[tokio::test]
    async fn test_engine_reads_ledger() {
        let backend = Arc::new(MemoryBackend::new());
        let engine = AccessEngine::new(backend.clone(), window());
        let now = Utc::now();

        assert!(!engine.has_access("u1", "m1", now).await.unwrap());

        let purchase = approved("p1", now, Some(now + Duration::days(30)));
        backend
            .create(PURCHASE_COLLECTION, to_record(&purchase).unwrap())
            .await
            .unwrap();

        assert!(engine.has_access("u1", "m1", now).await.unwrap());
        let status = engine.access_status("u1", "m1", now).await.unwrap();
        assert_eq!(status.expires_at, Some(now + Duration::days(30)));

        // A different pair sees nothing.
        assert!(!engine.has_access("u2", "m1", now).await.unwrap());
        assert!(!engine.has_access("u1", "m2", now).await.unwrap());
    }
}
