//! # DID Documents & Linked-Data Proofs
//!
//! The JSON-LD shapes this library consumes. A DID document is a
//! published, immutable artifact: we fetch it, read it, and never write
//! it back, so every struct here keeps unknown members in a flattened
//! map — signature suites canonicalize whole documents, and dropping a
//! field we don't model would silently break every signature.
//!
//! The `publicKey` member is the one shape-sensitive field: documents in
//! the wild carry either a single key object or an ordered list of them,
//! and the capability chain walk cares about the difference (a root
//! document must be list-shaped). [`PublicKeys`] models both without
//! normalizing away which one was published.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// DidDocument
// ---------------------------------------------------------------------------

/// A DID document: keys, an embedded proof, and optional delegation links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD context. Left as raw JSON — contexts are strings, lists,
    /// or objects depending on who published the document.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// The DID this document describes.
    pub id: String,

    /// One key entry or an ordered list of them.
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeys>,

    /// Embedded linked-data signature over the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<LinkedDataProof>,

    /// DID of a document delegating authority to this one. Checked first
    /// during the chain walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,

    /// Alternate delegation field, checked only when `capability` is
    /// absent.
    #[serde(rename = "parentCapability", skip_serializing_if = "Option::is_none")]
    pub parent_capability: Option<String>,

    /// Everything else in the document, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DidDocument {
    /// Parse a document from its JSON-LD text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the document back to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The next link of the delegation chain, if any: `capability` first,
    /// then `parentCapability`.
    pub fn delegation_link(&self) -> Option<&str> {
        self.capability
            .as_deref()
            .or(self.parent_capability.as_deref())
    }

    /// Scan `publicKey` (treated as a list) for the entry whose id equals
    /// `key_id`.
    pub fn find_key(&self, key_id: &str) -> Option<&PublicKeyEntry> {
        self.public_key
            .iter()
            .flat_map(|keys| keys.iter())
            .find(|entry| entry.id == key_id)
    }
}

// ---------------------------------------------------------------------------
// PublicKeys
// ---------------------------------------------------------------------------

/// The `publicKey` member of a document: a single entry or a list.
///
/// Which shape was published matters — see the module docs — so this is
/// an untagged enum rather than a normalized `Vec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicKeys {
    /// An ordered list of key entries.
    Many(Vec<PublicKeyEntry>),
    /// A single bare key object.
    One(Box<PublicKeyEntry>),
}

impl PublicKeys {
    /// Whether the member was published as a list. The capability chain
    /// walk requires this shape at the root.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Iterate entries regardless of shape.
    pub fn iter(&self) -> impl Iterator<Item = &PublicKeyEntry> {
        match self {
            Self::Many(entries) => entries.iter(),
            Self::One(entry) => std::slice::from_ref(entry.as_ref()).iter(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Many(entries) => entries.len(),
            Self::One(_) => 1,
        }
    }

    /// True when a list-shaped member is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// PublicKeyEntry
// ---------------------------------------------------------------------------

/// One key entry inside a document's `publicKey` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKeyEntry {
    /// Full Key ID of this entry (`<did>#kid=<fragment>`).
    pub id: String,

    /// Key type, e.g. `publicKeyPem`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    /// DID controlling this key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Armored public key material. Opaque to the core — only the
    /// external crypto capabilities look inside.
    #[serde(rename = "publicKeyPem", skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,

    /// Unmodeled members, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PublicKeyEntry {
    /// The armored key material, if the entry carries any.
    pub fn material(&self) -> Option<&str> {
        self.public_key_pem.as_deref()
    }
}

// ---------------------------------------------------------------------------
// LinkedDataProof
// ---------------------------------------------------------------------------

/// A linked-data signature embedded under a document's `proof` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDataProof {
    /// Signature suite name, e.g. `OpenPgpSignature2019`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<String>,

    /// Key ID of the signing key.
    pub creator: String,

    /// When the proof was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Trust-domain tag the signature is bound to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Anti-replay nonce, when the suite emits one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// The signature payload itself, in whatever encoding the suite uses.
    #[serde(rename = "signatureValue", skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<String>,

    /// Unmodeled members, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
