// Market context — the fully-resolved engine configuration.
//
// Built once at startup from `MarketOptions` plus the injected storage
// backend and upload gateway, then shared across all components as
// `Arc<MarketContext>`.

use std::sync::Arc;

use fangate_core::logger::{LoggerConfig, MarketLogger};
use fangate_core::options::MarketOptions;
use fangate_core::{StorageBackend, UploadGateway};

/// The shared engine context.
///
/// Holds the original options alongside the resolved configuration the
/// components read at runtime. Created via [`MarketContext::new`] or, more
/// commonly, through [`crate::init::MarketBuilder`].
pub struct MarketContext {
    /// The original configuration options.
    pub options: MarketOptions,

    /// Application name used in log output (default: "Fangate").
    pub app_name: String,

    /// Resolved pricing configuration.
    pub pricing: PricingConfig,

    /// The storage backend all collections live in.
    pub backend: Arc<dyn StorageBackend>,

    /// The upload gateway for payment proofs and media files.
    pub gateway: Arc<dyn UploadGateway>,

    /// Structured logger with level filtering and ANSI formatting.
    pub logger: MarketLogger,
}

// Manual Debug impl so the backend and gateway print as single fields
// instead of dumping their internals.
impl std::fmt::Debug for MarketContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketContext")
            .field("app_name", &self.app_name)
            .field("pricing", &self.pricing)
            .field("backend", &"[StorageBackend]")
            .field("gateway", &"[UploadGateway]")
            .field("logger", &self.logger)
            .finish()
    }
}

/// Pricing configuration resolved from options.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Price stamped onto model accounts registered without one.
    pub default_monthly_price: i64,
    /// Length of the access window granted on approval.
    pub access_window: chrono::Duration,
}

impl MarketContext {
    /// Resolve options into a shared context.
    pub fn new(
        options: MarketOptions,
        backend: Arc<dyn StorageBackend>,
        gateway: Arc<dyn UploadGateway>,
    ) -> Arc<Self> {
        let app_name = options
            .app_name
            .clone()
            .unwrap_or_else(|| "Fangate".to_string());

        let pricing = PricingConfig {
            default_monthly_price: options.pricing.default_monthly_price,
            access_window: options.pricing.access_window(),
        };

        let logger = MarketLogger::new(LoggerConfig::from(&options.logger_config));

        Arc::new(Self {
            options,
            app_name,
            pricing,
            backend,
            gateway,
            logger,
        })
    }

    /// The access window granted when a purchase is approved.
    pub fn access_window(&self) -> chrono::Duration {
        self.pricing.access_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangate_core::DataUrlGateway;
    use fangate_memory::MemoryBackend;

    fn context_with(options: MarketOptions) -> Arc<MarketContext> {
        MarketContext::new(
            options,
            Arc::new(MemoryBackend::new()),
            Arc::new(DataUrlGateway::new()),
        )
    }

    #[test]
    fn test_default_app_name() {
        let ctx = context_with(MarketOptions::new());
        assert_eq!(ctx.app_name, "Fangate");
    }

    #[test]
    fn test_custom_app_name() {
        let ctx = context_with(MarketOptions::new().app_name("My Marketplace"));
        assert_eq!(ctx.app_name, "My Marketplace");
    }

    #[test]
    fn test_pricing_resolution() {
        let ctx = context_with(MarketOptions::new().default_monthly_price(45).access_window_days(7));
        assert_eq!(ctx.pricing.default_monthly_price, 45);
        assert_eq!(ctx.access_window(), chrono::Duration::days(7));
    }

    #[test]
    fn test_debug_elides_backend() {
        let ctx = context_with(MarketOptions::new());
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("[StorageBackend]"));
        assert!(!rendered.contains("RwLock"));
    }
}
