//! # Wallet At Rest
//!
//! A wallet is the JSON blob holding a user's key material. Between
//! sessions it lives encrypted under a password; this module converts
//! between the plaintext and ciphertext renditions by delegating to an
//! external [`WalletCodec`] capability. The wallet's internal schema and
//! the password-based envelope encryption are both the codec's business —
//! the core treats wallet JSON as opaque in either state and performs no
//! validation of its own.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the wallet codec. Wrong password and corrupted blob are
/// indistinguishable here — the codec's error, passed through.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet codec failed: {0}")]
    Codec(#[source] anyhow::Error),
}

// ---------------------------------------------------------------------------
// WalletCodec
// ---------------------------------------------------------------------------

/// The external wallet-at-rest capability: password-based envelope
/// encryption of a wallet blob, both directions.
#[async_trait]
pub trait WalletCodec: Send + Sync {
    /// Encrypt a plaintext wallet under a password.
    async fn encrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value>;

    /// Decrypt a ciphertext wallet with its password.
    async fn decrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value>;
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Convert a plaintext wallet JSON to its encrypted-at-rest form.
pub async fn encrypt_wallet<W>(
    wallet: &Value,
    password: &str,
    codec: &W,
) -> Result<Value, WalletError>
where
    W: WalletCodec + ?Sized,
{
    codec
        .encrypt(wallet, password)
        .await
        .map_err(WalletError::Codec)
}

/// Convert an encrypted wallet JSON back to plaintext.
pub async fn decrypt_wallet<W>(
    wallet: &Value,
    password: &str,
    codec: &W,
) -> Result<Value, WalletError>
where
    W: WalletCodec + ?Sized,
{
    codec
        .decrypt(wallet, password)
        .await
        .map_err(WalletError::Codec)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;

    /// Codec that wraps/unwraps the wallet instead of encrypting it.
    struct EnvelopeCodec;

    #[async_trait]
    impl WalletCodec for EnvelopeCodec {
        async fn encrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value> {
            Ok(json!({ "locked": true, "password": password, "payload": wallet }))
        }

        async fn decrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value> {
            if wallet["password"] != json!(password) {
                bail!("bad password");
            }
            Ok(wallet["payload"].clone())
        }
    }

    #[tokio::test]
    async fn wallet_roundtrips_through_the_codec() {
        let wallet = json!({ "keystore": { "key1": { "publicKey": "pem" } } });

        let cipher = encrypt_wallet(&wallet, "hunter2", &EnvelopeCodec).await.unwrap();
        assert_ne!(cipher, wallet);

        let plain = decrypt_wallet(&cipher, "hunter2", &EnvelopeCodec).await.unwrap();
        assert_eq!(plain, wallet);
    }

    #[tokio::test]
    async fn codec_failure_propagates() {
        let wallet = json!({ "keystore": {} });
        let cipher = encrypt_wallet(&wallet, "hunter2", &EnvelopeCodec).await.unwrap();

        let result = decrypt_wallet(&cipher, "wrong", &EnvelopeCodec).await;
        assert!(matches!(result, Err(WalletError::Codec(_))));
    }
}
