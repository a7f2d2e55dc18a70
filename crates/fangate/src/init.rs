// Market initialization.
//
// Builds the shared context from options plus the injected backend and
// gateway, wires the component set, and exposes the high-level flows:
// registration, publishing, quoting, the purchase lifecycle, access
// checks, and dashboard overviews.
//
// This facade is the only layer that reads the system clock; every
// component below it takes time as an explicit parameter.

use std::sync::Arc;

use chrono::Utc;

use fangate_core::options::MarketOptions;
use fangate_core::{
    AccessStatus, Content, DataUrlGateway, ErrorCode, MarketError, PaymentInstructions, Purchase,
    Result, StorageBackend, UploadGateway, User,
};

use crate::access::AccessEngine;
use crate::catalog::{CatalogStore, NewContent};
use crate::context::MarketContext;
use crate::ledger::PurchaseLedger;
use crate::overview::{self, BuyerOverview, ModelOverview};
use crate::profiles::{NewUser, ProfileStore, ProfileUpdate};

/// The marketplace engine handle.
///
/// Owns the shared context and the component set. Clones of the backend
/// handle are distributed to the components at build time, so a `Market`
/// is self-contained once constructed.
pub struct Market {
    /// The fully-initialized market context (shared).
    pub context: Arc<MarketContext>,
    profiles: ProfileStore,
    catalog: CatalogStore,
    ledger: PurchaseLedger,
    access: AccessEngine,
}

impl std::fmt::Debug for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Market")
            .field("context", &self.context)
            .finish()
    }
}

/// Create a market with the bundled data-URL upload gateway.
pub fn market(options: MarketOptions, backend: Arc<dyn StorageBackend>) -> Result<Market> {
    MarketBuilder::new(options).backend(backend).build()
}

// ─── Builder ──────────────────────────────────────────────────────

/// Builder for constructing a [`Market`].
///
/// The storage backend is required; the upload gateway defaults to a
/// [`DataUrlGateway`] configured from the upload options.
pub struct MarketBuilder {
    options: MarketOptions,
    backend: Option<Arc<dyn StorageBackend>>,
    gateway: Option<Arc<dyn UploadGateway>>,
}

impl MarketBuilder {
    pub fn new(options: MarketOptions) -> Self {
        Self {
            options,
            backend: None,
            gateway: None,
        }
    }

    /// Set the storage backend.
    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set a custom upload gateway.
    pub fn gateway(mut self, gateway: Arc<dyn UploadGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build the market.
    pub fn build(self) -> Result<Market> {
        let backend = self.backend.ok_or_else(|| {
            MarketError::Anyhow(anyhow::anyhow!(
                "a storage backend is required; call .backend() on the builder"
            ))
        })?;

        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(DataUrlGateway::with_limits(
                self.options.upload.max_file_bytes,
                self.options.upload.allowed_types.clone(),
            )),
        };

        let context = MarketContext::new(self.options, backend, gateway);
        let profiles = ProfileStore::new(
            context.backend.clone(),
            context.pricing.default_monthly_price,
        );
        let catalog = CatalogStore::new(context.backend.clone());
        let ledger = PurchaseLedger::new(context.backend.clone(), context.access_window());
        let access = AccessEngine::new(context.backend.clone(), context.access_window());

        Ok(Market {
            context,
            profiles,
            catalog,
            ledger,
            access,
        })
    }
}

// ─── Facade ───────────────────────────────────────────────────────

impl Market {
    pub fn builder(options: MarketOptions) -> MarketBuilder {
        MarketBuilder::new(options)
    }

    /// The shared context.
    pub fn context(&self) -> &MarketContext {
        &self.context
    }

    /// The original options.
    pub fn options(&self) -> &MarketOptions {
        &self.context.options
    }

    /// The profile registry.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// The content catalog.
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// The purchase ledger.
    pub fn ledger(&self) -> &PurchaseLedger {
        &self.ledger
    }

    /// The access engine.
    pub fn access(&self) -> &AccessEngine {
        &self.access
    }

    // ─── Accounts ─────────────────────────────────────────────────

    /// Register a new account.
    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        let user = self.profiles.register(new_user, Utc::now()).await?;
        self.context.logger.info(&format!(
            "Registered {} account {}",
            user.role.as_str(),
            user.email
        ));
        Ok(user)
    }

    /// Apply a partial profile update.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        self.profiles.update_profile(user_id, update).await
    }

    /// All model accounts, sorted by name.
    pub async fn models(&self) -> Result<Vec<User>> {
        self.profiles.list_models().await
    }

    // ─── Publishing ───────────────────────────────────────────────

    /// Publish a content item into a model's portfolio.
    pub async fn publish_content(&self, model_id: &str, new: NewContent) -> Result<Content> {
        self.require_model(model_id).await?;
        self.catalog.add_content(model_id, new, Utc::now()).await
    }

    // ─── Purchases ────────────────────────────────────────────────

    /// Quote a purchase: the model's current price plus the payment
    /// contact details the buyer needs to pay out of band.
    pub async fn quote(&self, user_id: &str, model_id: &str) -> Result<PaymentInstructions> {
        self.require_user(user_id).await?;
        let model = self.require_model(model_id).await?;
        Ok(PaymentInstructions {
            model_id: model.id,
            amount: model.monthly_price,
            pix_key: model.pix_key,
            mercado_pago_email: model.mercado_pago_email,
            contact_number: model.contact_number,
        })
    }

    /// Open a purchase for the model's portfolio at the current price.
    pub async fn purchase_access(&self, user_id: &str, model_id: &str) -> Result<Purchase> {
        self.require_user(user_id).await?;
        let model = self.require_model(model_id).await?;
        let purchase = self
            .ledger
            .create_purchase(user_id, model_id, model.monthly_price, Utc::now())
            .await?;
        self.context.logger.info(&format!(
            "Purchase {} opened for model {}",
            purchase.id, model.id
        ));
        Ok(purchase)
    }

    /// Upload a payment proof and attach it to a pending purchase.
    pub async fn submit_proof(
        &self,
        purchase_id: &str,
        bytes: &[u8],
        media_type: &str,
    ) -> Result<Purchase> {
        let reference = self.context.gateway.upload(bytes, media_type).await?;
        self.ledger.attach_proof(purchase_id, &reference).await
    }

    /// Approve a pending purchase, granting one access window from now.
    pub async fn approve_payment(&self, purchase_id: &str) -> Result<Purchase> {
        let purchase = self.ledger.approve(purchase_id, Utc::now()).await?;
        self.context
            .logger
            .success(&format!("Payment approved for purchase {purchase_id}"));
        Ok(purchase)
    }

    /// Reject a pending purchase.
    pub async fn reject_payment(&self, purchase_id: &str) -> Result<Purchase> {
        let purchase = self.ledger.reject(purchase_id).await?;
        self.context
            .logger
            .info(&format!("Payment rejected for purchase {purchase_id}"));
        Ok(purchase)
    }

    /// A model's review queue: pending purchases awaiting a decision.
    pub async fn review_queue(&self, model_id: &str) -> Result<Vec<Purchase>> {
        self.require_model(model_id).await?;
        self.ledger.pending_for_model(model_id).await
    }

    // ─── Access ───────────────────────────────────────────────────

    /// Whether the user currently holds access to the model's portfolio.
    pub async fn has_access(&self, user_id: &str, model_id: &str) -> Result<bool> {
        self.access.has_access(user_id, model_id, Utc::now()).await
    }

    /// The full access answer, including the governing expiry.
    pub async fn access_status(&self, user_id: &str, model_id: &str) -> Result<AccessStatus> {
        self.access
            .access_status(user_id, model_id, Utc::now())
            .await
    }

    /// A model's active content, gated on the viewer holding access.
    pub async fn portfolio(&self, viewer_id: &str, model_id: &str) -> Result<Vec<Content>> {
        let granted = self
            .access
            .has_access(viewer_id, model_id, Utc::now())
            .await?;
        if !granted {
            return Err(MarketError::AccessDenied(ErrorCode::AccessDenied));
        }
        self.catalog.list_by_model(model_id).await
    }

    // ─── Overviews ────────────────────────────────────────────────

    /// A model's dashboard numbers.
    pub async fn model_overview(&self, model_id: &str) -> Result<ModelOverview> {
        self.require_model(model_id).await?;
        let total_content = self.catalog.count_for_model(model_id).await?;
        let purchases = self.ledger.purchases_by_model(model_id).await?;
        Ok(overview::model_overview(total_content, &purchases))
    }

    /// A buyer's dashboard numbers.
    pub async fn buyer_overview(&self, user_id: &str) -> Result<BuyerOverview> {
        self.require_user(user_id).await?;
        let purchases = self.ledger.purchases_by_user(user_id).await?;
        Ok(overview::buyer_overview(
            &purchases,
            self.context.access_window(),
            Utc::now(),
        ))
    }

    // ─── Helpers ──────────────────────────────────────────────────

    async fn require_user(&self, user_id: &str) -> Result<User> {
        self.profiles
            .find(user_id)
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::UserNotFound))
    }

    async fn require_model(&self, model_id: &str) -> Result<User> {
        let user = self
            .profiles
            .find(model_id)
            .await?
            .ok_or(MarketError::NotFound(ErrorCode::ModelNotFound))?;
        if !user.role.is_model() {
            return Err(MarketError::Validation(ErrorCode::NotAModel));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangate_memory::MemoryBackend;

    fn test_market() -> Market {
        market(MarketOptions::new(), Arc::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn test_builder_builds_market() {
        let built = Market::builder(MarketOptions::new().app_name("demo"))
            .backend(Arc::new(MemoryBackend::new()))
            .build()
            .unwrap();
        assert_eq!(built.context.app_name, "demo");
        assert_eq!(built.options().pricing.default_monthly_price, 30);
    }

    #[test]
    fn test_builder_fails_without_backend() {
        let result = Market::builder(MarketOptions::new()).build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_default_gateway_respects_upload_options() {
        let built = market(
            MarketOptions::new().max_file_bytes(4),
            Arc::new(MemoryBackend::new()),
        )
        .unwrap();

        let err = built
            .context
            .gateway
            .upload(b"12345", "image/png")
            .await
            .unwrap_err();
        assert_eq!(MarketError::from(err).code(), ErrorCode::FileTooLarge);
    }

    #[tokio::test]
    async fn test_publish_requires_model_role() {
        let market = test_market();
        let buyer = market
            .register(NewUser::subscriber("Zeca", "zeca@example.com"))
            .await
            .unwrap();

        let post = NewContent::new(
            "Set",
            "Description",
            "data:image/jpeg;base64,t",
            vec!["data:image/jpeg;base64,p".into()],
        );

        let err = market
            .publish_content(&buyer.id, post.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(ErrorCode::NotAModel)));

        let err = market.publish_content("missing", post).await.unwrap_err();
        assert!(matches!(err, MarketError::NotFound(ErrorCode::ModelNotFound)));
    }

    #[tokio::test]
    async fn test_portfolio_denied_without_access() {
        let market = test_market();
        let model = market
            .register(NewUser::model("Ana", "ana@example.com"))
            .await
            .unwrap();
        let buyer = market
            .register(NewUser::subscriber("Zeca", "zeca@example.com"))
            .await
            .unwrap();

        let err = market.portfolio(&buyer.id, &model.id).await.unwrap_err();
        assert!(matches!(err, MarketError::AccessDenied(_)));
        assert_eq!(err.code(), ErrorCode::AccessDenied);
    }

    #[tokio::test]
    async fn test_quote_snapshots_payment_details() {
        let market = test_market();
        let model = market
            .register(NewUser::model("Ana", "ana@example.com").monthly_price(55))
            .await
            .unwrap();
        market
            .update_profile(
                &model.id,
                ProfileUpdate {
                    pix_key: Some("ana-pix".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let buyer = market
            .register(NewUser::subscriber("Zeca", "zeca@example.com"))
            .await
            .unwrap();

        let instructions = market.quote(&buyer.id, &model.id).await.unwrap();
        assert_eq!(instructions.amount, 55);
        assert_eq!(instructions.pix_key.as_deref(), Some("ana-pix"));
        assert_eq!(instructions.model_id, model.id);
    }
}
