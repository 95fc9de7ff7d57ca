//! HTTP-backed resolution against raw GitHub file access.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::config::{JSON_LD_CONTENT_TYPE, RESOLUTION_BASE_URL};
use crate::identity::{Did, DidDocument};

use super::{ResolveError, Resolver};

/// The standard [`Resolver`]: derives the document URL from the DID and
/// fetches it with a plain GET.
///
/// One fetch per resolution, no cache, no retry. The client is cheap to
/// clone and safe to share; hold one `HttpResolver` and pass it around.
///
/// # Examples
///
/// ```no_run
/// use ghdid_protocol::resolver::{HttpResolver, Resolver};
///
/// # async fn run() -> Result<(), ghdid_protocol::resolver::ResolveError> {
/// let resolver = HttpResolver::new();
/// let document = resolver.resolve("did:ghdid:alice~repo1~key1").await?;
/// assert_eq!(document.id, "did:ghdid:alice~repo1~key1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResolver {
    /// A resolver against the canonical base URL.
    pub fn new() -> Self {
        Self::with_base_url(RESOLUTION_BASE_URL)
    }

    /// A resolver against a different base — a mirror, or a local server
    /// in tests. The base must end with `/`; URL building is plain
    /// concatenation.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// The base URL documents are fetched under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for HttpResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolveError> {
        let parsed = Did::parse(did)?;
        let url = parsed.document_url_with_base(&self.base_url);

        debug!(%did, %url, "fetching DID document");

        let body = self
            .client
            .get(&url)
            .header(ACCEPT, JSON_LD_CONTENT_TYPE)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(DidDocument::from_json(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_is_canonical() {
        let resolver = HttpResolver::new();
        assert_eq!(resolver.base_url(), RESOLUTION_BASE_URL);
    }

    #[test]
    fn custom_base_is_kept_verbatim() {
        let resolver = HttpResolver::with_base_url("http://localhost:8000/");
        assert_eq!(resolver.base_url(), "http://localhost:8000/");
    }

    #[tokio::test]
    async fn unparseable_did_fails_before_any_fetch() {
        let resolver = HttpResolver::new();
        let result = resolver.resolve("did:other:a~b~c").await;
        assert!(matches!(result, Err(ResolveError::Did(_))));
    }
}
