//! # Encrypted Channel
//!
//! Signed-and-encrypted envelopes between two DID-keyed parties. The
//! sender addresses an envelope by Key IDs — their own and the
//! recipient's — and the payload is any JSON-serializable value.
//!
//! The asymmetric cryptography is an external capability
//! ([`AsymmetricCrypto`]); its `encrypt` both encrypts for the recipient
//! and signs with the sender key, so an envelope authenticates its
//! sender as a side effect of opening it. What this module owns is the
//! addressing: on decryption the sender's *public* key is not taken from
//! the envelope but resolved fresh from their published DID document via
//! the recipient's resolver.
//!
//! Key material is never inspected here. A malformed key surfaces as
//! whatever error the crypto capability raises, unwrapped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::resolver::{get_public_key_by_key_id, ResolveError, Resolver};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building or opening envelopes.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Resolving the sender's public key failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The sender's key entry carries no key material to verify against.
    #[error("key entry '{key_id}' has no public key material")]
    MissingKeyMaterial { key_id: String },

    /// The external crypto capability failed. Wrong key, corrupted
    /// ciphertext, malformed key material — its error, passed through.
    #[error("asymmetric crypto failed: {0}")]
    Crypto(#[source] anyhow::Error),

    /// The decrypted plaintext is not valid JSON.
    #[error("decrypted payload is not valid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// An encrypted envelope: who it's from, who it's for, and an opaque
/// armored blob. This is the wire shape — field names are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Key ID of the sender's signing key.
    pub from_key_id: String,
    /// Key ID of the recipient key the payload is encrypted for.
    pub to_key_id: String,
    /// The encrypted-and-signed payload, as produced by the crypto
    /// capability.
    pub cipher_text: String,
}

// ---------------------------------------------------------------------------
// AsymmetricCrypto
// ---------------------------------------------------------------------------

/// The external asymmetric-crypto capability. `encrypt` encrypts for the
/// recipient *and* signs with the sender key; `decrypt` inverts both.
/// Key material and blobs are opaque armored strings.
#[async_trait]
pub trait AsymmetricCrypto: Send + Sync {
    /// Encrypt `plaintext` for the recipient, signing with the sender's
    /// private key.
    async fn encrypt(
        &self,
        plaintext: &str,
        recipient_public_key: &str,
        sender_private_key: &str,
    ) -> anyhow::Result<String>;

    /// Decrypt a blob with the recipient's private key, verifying the
    /// sender's signature against their public key.
    async fn decrypt(
        &self,
        cipher_text: &str,
        recipient_private_key: &str,
        sender_public_key: &str,
    ) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Everything needed to build an envelope. The recipient's public key is
/// supplied by the caller — encryption does not resolve anything.
#[derive(Debug, Clone, Copy)]
pub struct OutboundMessage<'a> {
    /// Key ID of the sender's signing key.
    pub from_key_id: &'a str,
    /// Key ID of the recipient key.
    pub to_key_id: &'a str,
    /// The recipient's armored public key material.
    pub public_key: &'a str,
    /// The sender's armored private key material.
    pub private_key: &'a str,
    /// The payload; any JSON value.
    pub data: &'a Value,
}

/// Serialize the payload and seal it into an [`Envelope`].
///
/// No validation of key material happens here — a malformed key is the
/// crypto capability's error to raise.
pub async fn encrypt_for<C>(
    message: OutboundMessage<'_>,
    crypto: &C,
) -> Result<Envelope, ChannelError>
where
    C: AsymmetricCrypto + ?Sized,
{
    let plaintext = message.data.to_string();

    let cipher_text = crypto
        .encrypt(&plaintext, message.public_key, message.private_key)
        .await
        .map_err(ChannelError::Crypto)?;

    debug!(
        from = %message.from_key_id,
        to = %message.to_key_id,
        "sealed envelope"
    );

    Ok(Envelope {
        from_key_id: message.from_key_id.to_string(),
        to_key_id: message.to_key_id.to_string(),
        cipher_text,
    })
}

/// Open an envelope and parse its payload back into a JSON value.
///
/// The sender's public key is resolved from `fromKeyId` through the
/// injected resolver — decryption trusts the published document, not the
/// envelope. Resolution failure aborts the operation; a payload that
/// decrypts but isn't JSON is [`ChannelError::JsonParse`].
pub async fn decrypt_for<R, C>(
    envelope: &Envelope,
    private_key: &str,
    resolver: &R,
    crypto: &C,
) -> Result<Value, ChannelError>
where
    R: Resolver + ?Sized,
    C: AsymmetricCrypto + ?Sized,
{
    let sender_key = get_public_key_by_key_id(resolver, &envelope.from_key_id).await?;
    let sender_public_key =
        sender_key
            .material()
            .ok_or_else(|| ChannelError::MissingKeyMaterial {
                key_id: envelope.from_key_id.clone(),
            })?;

    let plaintext = crypto
        .decrypt(&envelope.cipher_text, private_key, sender_public_key)
        .await
        .map_err(ChannelError::Crypto)?;

    debug!(from = %envelope.from_key_id, "opened envelope");

    Ok(serde_json::from_str(&plaintext)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
