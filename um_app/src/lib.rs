use figment::{Figment, providers::Env};
use serde::de::DeserializeOwned;

/// Prefix shared by every environment variable a host binary reads.
pub const ENV_PREFIX: &str = "UMVERTEILER_";

pub trait ContextProvider<Config> {
    fn new(config: Config) -> impl Future<Output = Self>;
}

/// Install the global tracing subscriber used by host binaries.
///
/// The log level defaults to `info` and can be overridden with the
/// `RUST_LOG` environment variable. Calling this more than once is a no-op.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // try_init so tests and repeated bootstraps don't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        // remove the name of the module from every log entry
        .with_target(false)
        .compact()
        .try_init();
}

/// The figment every host binary extracts its configuration from.
///
/// Only variables carrying [`ENV_PREFIX`] are considered, with the prefix
/// stripped and the remainder lowercased (`UMVERTEILER_FIXED_COSTS` becomes
/// `fixed_costs`).
#[must_use]
pub fn figment() -> Figment {
    Figment::new().merge(Env::prefixed(ENV_PREFIX))
}

/// Initialize the application context with configuration from environment
/// variables.
///
/// # Returns
/// The application context built by the [`ContextProvider`] implementation.
///
/// # Errors
/// If the configuration cannot be extracted from the environment variables.
pub async fn create_app_context<A, Config>() -> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
    Config: DeserializeOwned,
{
    init_tracing();

    let config: Config = figment().extract()?;

    tracing::debug!("configuration loaded");

    Ok(A::new(config).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Config {
        endpoint_url: String,
        #[serde(default)]
        meters: usize,
    }

    struct Context {
        config: Config,
    }

    impl ContextProvider<Config> for Context {
        async fn new(config: Config) -> Self {
            Self { config }
        }
    }

    #[test]
    fn test_figment_strips_prefix() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("UMVERTEILER_ENDPOINT_URL", "/api/balance");
            jail.set_env("UMVERTEILER_METERS", "3");
            jail.set_env("ENDPOINT_URL", "ignored");

            let config: Config = figment().extract()?;

            assert_eq!(config.endpoint_url, "/api/balance");
            assert_eq!(config.meters, 3);
            Ok(())
        });
    }

    #[test]
    fn test_create_app_context_reports_missing_field() {
        figment::Jail::expect_with(|_jail| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| e.to_string())?;

            let result = runtime
                .block_on(create_app_context::<Context, Config>());

            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_create_app_context_builds_context() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("UMVERTEILER_ENDPOINT_URL", "http://localhost/b");

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| e.to_string())?;

            let context = runtime
                .block_on(create_app_context::<Context, Config>())?;

            assert_eq!(context.config.endpoint_url, "http://localhost/b");
            assert_eq!(context.config.meters, 0);
            Ok(())
        });
    }
}
