// Environment detection and tracing subscriber setup.

use std::sync::OnceLock;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

fn parse_env_mode(value: &str) -> EnvMode {
    match value.to_lowercase().as_str() {
        "production" | "prod" => EnvMode::Production,
        "test" | "testing" => EnvMode::Test,
        _ => EnvMode::Development,
    }
}

/// Detect the current environment mode from environment variables.
/// Checks `FANGATE_ENV` first, then `RUST_ENV`.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("FANGATE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        parse_env_mode(&env_val)
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

pub fn is_development() -> bool {
    detect_env_mode() == EnvMode::Development
}

pub fn is_test() -> bool {
    detect_env_mode() == EnvMode::Test
}

/// Initialize the `tracing` subscriber with appropriate defaults.
/// `RUST_LOG` wins when set; otherwise production gets info and
/// development gets debug.
pub fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("fangate=info")
        } else {
            EnvFilter::new("fangate=debug")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();
}
