// Dashboard overviews — read models derived on demand from the catalog
// and the ledger, never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use fangate_core::{Purchase, PurchaseStatus};

use crate::access;

/// What a model sees on their dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOverview {
    /// Active content items in the portfolio.
    pub total_content: i64,
    /// Purchases awaiting review.
    pub pending_payments: i64,
    /// Sum of approved purchase amounts.
    pub total_earnings: i64,
}

/// What a buyer sees on their dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerOverview {
    /// All purchases ever made, any status.
    pub total_purchases: i64,
    /// Purchases still awaiting the model's decision.
    pub awaiting_approval: i64,
    /// Distinct models the buyer can currently access.
    pub active_access: i64,
}

/// Assemble a model's overview from their content count and purchase
/// history.
pub fn model_overview(total_content: i64, purchases: &[Purchase]) -> ModelOverview {
    let pending_payments = purchases
        .iter()
        .filter(|p| p.status == PurchaseStatus::Pending)
        .count() as i64;
    let total_earnings = purchases
        .iter()
        .filter(|p| p.status == PurchaseStatus::Approved)
        .map(|p| p.amount)
        .sum();

    ModelOverview {
        total_content,
        pending_payments,
        total_earnings,
    }
}

/// Assemble a buyer's overview from their purchase history at `now`.
pub fn buyer_overview(purchases: &[Purchase], window: Duration, now: DateTime<Utc>) -> BuyerOverview {
    let total_purchases = purchases.len() as i64;
    let awaiting_approval = purchases
        .iter()
        .filter(|p| p.status == PurchaseStatus::Pending)
        .count() as i64;

    let mut by_model: BTreeMap<&str, Vec<Purchase>> = BTreeMap::new();
    for purchase in purchases {
        by_model
            .entry(purchase.model_id.as_str())
            .or_default()
            .push(purchase.clone());
    }
    let active_access = by_model
        .values()
        .filter(|group| access::evaluate(group, window, now).granted)
        .count() as i64;

    BuyerOverview {
        total_purchases,
        awaiting_approval,
        active_access,
    }
}
