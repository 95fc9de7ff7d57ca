//! In-memory capability implementations shared by the unit tests.
//!
//! The resolver is a map, the signature suite hashes instead of signing,
//! and the crypto wraps plaintext in a parseable blob. Key material is
//! modeled as `pub:<name>` / `sec:<name>` pairs so the doubles can check
//! that the right key was used without any real cryptography.

use std::collections::HashMap;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::channel::AsymmetricCrypto;
use crate::identity::{DidDocument, LinkedDataProof, PublicKeyEntry};
use crate::proof::{self, ProofOptions, SignatureSuite};
use crate::resolver::{ResolveError, Resolver};

pub fn pem_for(name: &str) -> String {
    format!("pub:{name}")
}

pub fn secret_for(name: &str) -> String {
    format!("sec:{name}")
}

/// Extracts the key-pair name out of stub key material.
fn key_name(material: &str) -> anyhow::Result<&str> {
    material
        .strip_prefix("pub:")
        .or_else(|| material.strip_prefix("sec:"))
        .ok_or_else(|| anyhow!("unintelligible key material '{material}'"))
}

/// FNV-1a, rendered as fixed-width hex. Plenty for a test double.
fn digest(input: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{hash:016x}")
}

/// The document minus its signature attribute, as canonical text.
fn canonical_without(data: &Value, attribute: &str) -> String {
    let mut stripped = data.clone();
    if let Some(object) = stripped.as_object_mut() {
        object.remove(attribute);
    }
    stripped.to_string()
}

// ---------------------------------------------------------------------------
// MapResolver
// ---------------------------------------------------------------------------

/// A resolver backed by a map, standing in for the network.
pub struct MapResolver {
    documents: HashMap<String, DidDocument>,
}

impl MapResolver {
    pub fn empty() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    pub fn with_documents<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let mut resolver = Self::empty();
        for (did, document) in entries {
            resolver.insert(did, document);
        }
        resolver
    }

    pub fn insert(&mut self, did: &str, document: Value) {
        self.documents.insert(
            did.to_string(),
            serde_json::from_value(document).expect("test document must deserialize"),
        );
    }
}

#[async_trait]
impl Resolver for MapResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolveError> {
        self.documents
            .get(did)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                did: did.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// StubSuite
// ---------------------------------------------------------------------------

/// Signature suite double: the "signature" is a keyed digest of the
/// canonicalized document, so tampering with either the document or the
/// signature flips verification to false.
pub struct StubSuite;

#[async_trait]
impl SignatureSuite for StubSuite {
    async fn sign(
        &self,
        data: &Value,
        options: &ProofOptions<'_>,
    ) -> anyhow::Result<LinkedDataProof> {
        let name = key_name(options.private_key)?;
        let canonical = canonical_without(data, options.signature_attribute);

        Ok(LinkedDataProof {
            proof_type: Some("StubLinkedDataSignature".to_string()),
            creator: options.creator.to_string(),
            created: None,
            domain: Some(options.domain.to_string()),
            nonce: None,
            signature_value: Some(digest(&format!("{canonical}|{name}"))),
            extra: Map::new(),
        })
    }

    async fn verify(
        &self,
        data: &Value,
        public_key: &PublicKeyEntry,
        signature_attribute: &str,
    ) -> anyhow::Result<bool> {
        let proof_value = data
            .get(signature_attribute)
            .ok_or_else(|| anyhow!("document has no '{signature_attribute}' attribute"))?;
        let proof: LinkedDataProof = serde_json::from_value(proof_value.clone())?;

        let material = public_key
            .material()
            .ok_or_else(|| anyhow!("key entry '{}' has no material", public_key.id))?;
        let name = key_name(material)?;

        let canonical = canonical_without(data, signature_attribute);
        let expected = digest(&format!("{canonical}|{name}"));

        Ok(proof.signature_value.as_deref() == Some(expected.as_str()))
    }
}

/// Sign `data` with the stub suite and hand back the typed document.
pub async fn signed_document(data: Value, creator: &str, signer: &str) -> DidDocument {
    let signed = proof::sign(&data, creator, &secret_for(signer), &StubSuite)
        .await
        .expect("stub signing cannot fail on object data");
    serde_json::from_value(signed).expect("signed test document must deserialize")
}

// ---------------------------------------------------------------------------
// StubCrypto
// ---------------------------------------------------------------------------

/// Asymmetric-crypto double. The "blob" records recipient, sender, and
/// plaintext; decryption checks both key pairings the way a real
/// implementation would fail on a wrong key.
pub struct StubCrypto;

#[async_trait]
impl AsymmetricCrypto for StubCrypto {
    async fn encrypt(
        &self,
        plaintext: &str,
        recipient_public_key: &str,
        sender_private_key: &str,
    ) -> anyhow::Result<String> {
        let recipient = key_name(recipient_public_key)?;
        let sender = key_name(sender_private_key)?;
        Ok(format!("armored:{recipient}:{sender}:{plaintext}"))
    }

    async fn decrypt(
        &self,
        cipher_text: &str,
        recipient_private_key: &str,
        sender_public_key: &str,
    ) -> anyhow::Result<String> {
        let mut parts = cipher_text.splitn(4, ':');
        let (Some("armored"), Some(recipient), Some(sender), Some(plaintext)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("not an armored blob");
        };

        if recipient != key_name(recipient_private_key)? {
            bail!("decryption failed: blob is not addressed to this key");
        }
        if sender != key_name(sender_public_key)? {
            bail!("signature check failed: blob was not signed by this key");
        }

        Ok(plaintext.to_string())
    }
}
