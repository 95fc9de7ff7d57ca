//! # Linked-Data Proofs
//!
//! Signing and verifying documents against DID-resolved keys. The
//! cryptography itself lives behind [`SignatureSuite`] — an external
//! capability implementing some concrete suite (OpenPGP, typically).
//! This module owns everything around it: the fixed domain tag, the
//! fixed `proof` attribute, and the resolution of a proof's `creator`
//! Key ID to actual key material.
//!
//! [`verify`] is deliberately two-faced about failure: a signature that
//! doesn't check out is `Ok(false)`, while a creator key that can't be
//! resolved is an `Err`. The first is an answer, the second is the
//! absence of one.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{PROOF_ATTRIBUTE, PROOF_DOMAIN};
use crate::identity::{DidDocument, LinkedDataProof, PublicKeyEntry};
use crate::resolver::{get_public_key_by_key_id, ResolveError, Resolver};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while signing or verifying. A *failed* signature is not
/// among them — that's the `false` in [`verify`]'s `Ok(bool)`.
#[derive(Debug, Error)]
pub enum ProofError {
    /// The document has no embedded proof to verify.
    #[error("document carries no '{PROOF_ATTRIBUTE}' attribute")]
    MissingProof,

    /// Proofs attach to JSON objects; this data is something else.
    #[error("only JSON objects can carry a proof")]
    UnsignableData,

    /// Resolving the proof's creator key failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The external signature suite errored (as opposed to answering
    /// "invalid"). Propagated unwrapped.
    #[error("signature suite failed: {0}")]
    Suite(#[source] anyhow::Error),

    /// Re-serializing the document for the suite failed.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// SignatureSuite
// ---------------------------------------------------------------------------

/// Inputs the suite needs to produce a proof.
#[derive(Debug, Clone, Copy)]
pub struct ProofOptions<'a> {
    /// Key ID recorded as the proof's `creator`.
    pub creator: &'a str,
    /// Trust-domain tag bound into the signature.
    pub domain: &'a str,
    /// Attribute the proof will be embedded under, so the suite knows
    /// what to exclude from canonicalization.
    pub signature_attribute: &'a str,
    /// Armored private key material. Opaque to the core.
    pub private_key: &'a str,
}

/// The linked-data signature capability. Implementations bring the
/// actual cryptography; the core never looks inside key material or
/// signature payloads.
#[async_trait]
pub trait SignatureSuite: Send + Sync {
    /// Produce a proof over `data` (which does not yet carry one).
    async fn sign(
        &self,
        data: &Value,
        options: &ProofOptions<'_>,
    ) -> anyhow::Result<LinkedDataProof>;

    /// Check the proof embedded in `data` under `signature_attribute`
    /// against the given public key. `Ok(false)` means "signature
    /// invalid"; `Err` means the suite couldn't answer.
    async fn verify(
        &self,
        data: &Value,
        public_key: &PublicKeyEntry,
        signature_attribute: &str,
    ) -> anyhow::Result<bool>;
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Sign `data` and return it with the proof attached under the fixed
/// `proof` attribute, stamped with the fixed trust domain.
pub async fn sign<S>(
    data: &Value,
    creator: &str,
    private_key: &str,
    suite: &S,
) -> Result<Value, ProofError>
where
    S: SignatureSuite + ?Sized,
{
    let options = ProofOptions {
        creator,
        domain: PROOF_DOMAIN,
        signature_attribute: PROOF_ATTRIBUTE,
        private_key,
    };

    let proof = suite.sign(data, &options).await.map_err(ProofError::Suite)?;

    let mut signed = data.clone();
    let Some(object) = signed.as_object_mut() else {
        return Err(ProofError::UnsignableData);
    };
    object.insert(PROOF_ATTRIBUTE.to_string(), serde_json::to_value(&proof)?);

    Ok(signed)
}

/// Verify a document's embedded proof against its creator's published key.
///
/// The creator Key ID is taken from the proof and resolved through the
/// injected resolver, then the cryptographic check is delegated to the
/// suite. Returns `Ok(false)` for a bad signature; resolution and
/// key-lookup failures propagate as errors, unretried.
pub async fn verify<R, S>(
    document: &DidDocument,
    resolver: &R,
    suite: &S,
) -> Result<bool, ProofError>
where
    R: Resolver + ?Sized,
    S: SignatureSuite + ?Sized,
{
    let proof = document.proof.as_ref().ok_or(ProofError::MissingProof)?;

    let public_key = get_public_key_by_key_id(resolver, &proof.creator).await?;

    let data = serde_json::to_value(document)?;
    let verified = suite
        .verify(&data, &public_key, PROOF_ATTRIBUTE)
        .await
        .map_err(ProofError::Suite)?;

    debug!(document = %document.id, creator = %proof.creator, verified, "checked document proof");

    Ok(verified)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
