use std::future::Future;
use std::pin::Pin;

use url::Url;

use crate::core::QfError;
use crate::core::client::RetryConfig;

/// A boxed, `Send` future, as returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The network collaborator: fetch a URL and hand back the raw body.
///
/// The crate never builds authentication, redirects or timeouts itself; all of that is the
/// transport's business; response caching sits above it, in the client. Errors returned
/// here are treated as transport failures and turn into "no data" results at the parser
/// boundary.
///
/// [`QfClient`](crate::QfClient) uses a `reqwest`-backed implementation unless one is
/// supplied through [`QfClientBuilder::transport`](crate::QfClientBuilder::transport).
pub trait Transport: Send + Sync {
    /// Fetch `url`, resolving to the full response body.
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, QfError>>;

    /// Fetch `url` under a per-call retry policy. Transports without retries ignore it.
    fn fetch_with_retry<'a>(
        &'a self,
        url: &'a Url,
        retry: Option<&'a RetryConfig>,
    ) -> BoxFuture<'a, Result<Vec<u8>, QfError>> {
        let _ = retry;
        self.fetch(url)
    }
}

/// Maps a caller-facing name (company name, alias, ticker) to the provider symbol.
///
/// Called once per symbol per request and expected to be pure.
pub trait SymbolResolver: Send + Sync {
    fn guess_name(&self, input: &str) -> String;
}

/// Resolver that treats every input as already being a provider symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl SymbolResolver for IdentityResolver {
    fn guess_name(&self, input: &str) -> String {
        input.to_string()
    }
}

impl<F> SymbolResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn guess_name(&self, input: &str) -> String {
        self(input)
    }
}
