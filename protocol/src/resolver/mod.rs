//! # DID Resolution
//!
//! Turning a DID string into the document it names. The interesting part
//! is what this module does *not* do: no caching, no retries, no backoff.
//! A document is fetched fresh for every resolution and a single failure
//! aborts whatever operation needed it — verification and messaging both
//! treat resolution as all-or-nothing.
//!
//! Resolution is a capability, not a singleton. Everything downstream
//! (proof verification, the capability chain walk, message decryption)
//! takes a [`Resolver`] explicitly, so tests and embedders swap in their
//! own document sources; [`HttpResolver`] is the standard one backed by
//! raw GitHub file access.

mod http;

pub use http::HttpResolver;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::identity::{DidDocument, DidError, KeyId, PublicKeyEntry};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while resolving DIDs and looking up keys.
///
/// None of these are retried. A transport hiccup and a missing key both
/// kill the enclosing operation — the caller decides whether to try again.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The DID itself doesn't parse.
    #[error(transparent)]
    Did(#[from] DidError),

    /// The fetch failed: DNS, TLS, connection, or a non-success status.
    #[error("failed to fetch DID document: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not a DID document.
    #[error("failed to parse DID document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The resolver has no document for this DID. Emitted by non-HTTP
    /// resolvers; the HTTP path surfaces missing documents as transport
    /// errors, since raw file access answers 404 like any other miss.
    #[error("no DID document found for '{did}'")]
    NotFound { did: String },

    /// The owning document resolved, but no key entry matches the Key ID.
    #[error("no public key matching '{key_id}' in its DID document")]
    KeyNotFound { key_id: String },
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// The resolution capability: DID in, document out.
///
/// Implementations must not mutate or cache documents — every call is a
/// fresh snapshot of the published artifact.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a DID to its document.
    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolveError>;
}

// ---------------------------------------------------------------------------
// Key lookup
// ---------------------------------------------------------------------------

/// Fetch the public key entry a Key ID points at.
///
/// Splits the Key ID at its `#kid=` marker, resolves the owning DID's
/// document, and scans its `publicKey` member (treated as a list) for an
/// entry whose id equals the full Key ID.
///
/// # Errors
///
/// [`ResolveError::KeyNotFound`] when the document has no matching entry;
/// resolution failures propagate unchanged.
pub async fn get_public_key_by_key_id<R>(
    resolver: &R,
    key_id: &str,
) -> Result<PublicKeyEntry, ResolveError>
where
    R: Resolver + ?Sized,
{
    let parsed = KeyId::parse(key_id)?;
    let document = resolver.resolve(&parsed.did().to_string()).await?;

    debug!(%key_id, document = %document.id, "scanning document for key entry");

    document
        .find_key(key_id)
        .cloned()
        .ok_or_else(|| ResolveError::KeyNotFound {
            key_id: key_id.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
