use reqwest::Url;
use thiserror::Error;
use types::Balance;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid balance endpoint {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("balance request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Where a meter gets its balance from.
pub trait BalanceSource {
    fn fetch_balance(
        &self,
        endpoint_url: &str,
    ) -> impl Future<Output = Result<f64, FetchError>>;
}

/// Fetches the balance with a single `GET`, expecting `{"balance": <number>}`.
///
/// Relative endpoint URLs (`/api/balance`) are resolved against `base_url`.
#[derive(Debug, Clone)]
pub struct HttpBalanceSource {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl Default for HttpBalanceSource {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), None)
    }
}

impl HttpBalanceSource {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Option<Url>) -> Self {
        Self { client, base_url }
    }

    /// A source resolving relative endpoints against `base_url`.
    ///
    /// # Errors
    ///
    /// If `base_url` is not an absolute URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(reqwest::Client::new(), Some(base)))
    }

    /// Absolute URL for `endpoint_url`.
    ///
    /// # Errors
    ///
    /// If the endpoint is relative and there is no base to resolve it
    /// against, or it is not a URL at all.
    pub fn resolve(&self, endpoint_url: &str) -> Result<Url, FetchError> {
        let resolved = match &self.base_url {
            Some(base) => base.join(endpoint_url),
            None => Url::parse(endpoint_url),
        };

        resolved.map_err(|e| FetchError::InvalidUrl {
            url: endpoint_url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl BalanceSource for HttpBalanceSource {
    async fn fetch_balance(&self, endpoint_url: &str) -> Result<f64, FetchError> {
        let url = self.resolve(endpoint_url)?;

        tracing::debug!("fetching balance from {}", url);

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Balance>()
            .await?;

        Ok(body.balance)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_against_base() {
        let source =
            HttpBalanceSource::with_base_url("http://127.0.0.1:8080/").unwrap();

        assert_eq!(
            source.resolve("/api/balance").unwrap().as_str(),
            "http://127.0.0.1:8080/api/balance"
        );
        assert_eq!(
            source.resolve("https://example.org/balance").unwrap().as_str(),
            "https://example.org/balance"
        );
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let source = HttpBalanceSource::default();

        assert!(matches!(
            source.resolve("/api/balance"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(source.resolve("http://localhost/api/balance").is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBalanceSource::with_base_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_with_unresolvable_url_fails_without_request() {
        let source = HttpBalanceSource::default();

        let result = source.fetch_balance("relative/path").await;

        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
