//! # DID Parsing & Document URLs
//!
//! The `did:ghdid` method identifies a key by where it lives: a GitHub
//! user, a repository, and a key id, packed into the method-specific
//! identifier as a tilde-delimited triple:
//!
//! ```text
//! did:ghdid:<user>~<repo>~<kid>
//! ```
//!
//! A DID is a pure function of its textual form — parsing allocates the
//! three parts and nothing else, and the document URL is derived
//! deterministically from them. No registry lookup, no network.
//!
//! Individual keys inside a document are addressed by a Key ID, which is
//! the DID plus a `#kid=` fragment:
//!
//! ```text
//! did:ghdid:<user>~<repo>~<kid>#kid=<fragment>
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    DID_DOCUMENT_DIR, DID_DOCUMENT_EXTENSION, DID_METHOD, DID_SCHEME, IDENTIFIER_DELIMITER,
    KEY_ID_MARKER, RESOLUTION_BASE_URL,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing DIDs and Key IDs.
#[derive(Debug, Error)]
pub enum DidError {
    /// The string does not have the `did:<method>:<user>~<repo>~<kid>`
    /// shape, or a Key ID is missing its `#kid=` marker.
    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    /// The method segment is not `ghdid`. We resolve exactly one method;
    /// everything else is somebody else's problem.
    #[error("unsupported DID method: expected '{DID_METHOD}', got '{0}'")]
    UnsupportedMethod(String),
}

// ---------------------------------------------------------------------------
// Did
// ---------------------------------------------------------------------------

/// A parsed `did:ghdid` identifier.
///
/// # Examples
///
/// ```
/// use ghdid_protocol::identity::Did;
///
/// let did: Did = "did:ghdid:alice~repo1~key1".parse().unwrap();
/// assert_eq!(did.user(), "alice");
/// assert_eq!(did.repo(), "repo1");
/// assert_eq!(did.kid(), "key1");
/// assert_eq!(
///     did.document_url(),
///     "https://raw.githubusercontent.com/alice/repo1/master/dids/key1.jsonld"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did {
    user: String,
    repo: String,
    kid: String,
}

impl Did {
    /// Build a DID from its parts. No validation of the parts themselves —
    /// path-unsafe characters in a username or repo name produce a DID
    /// whose document URL is broken, exactly as published.
    pub fn new(
        user: impl Into<String>,
        repo: impl Into<String>,
        kid: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            repo: repo.into(),
            kid: kid.into(),
        }
    }

    /// Parse a DID string.
    ///
    /// Fails with [`DidError::InvalidFormat`] if the scheme token is not
    /// `did` or the identifier is not a tilde-delimited triple, and with
    /// [`DidError::UnsupportedMethod`] for any method other than `ghdid`.
    pub fn parse(did: &str) -> Result<Self, DidError> {
        let mut segments = did.splitn(3, ':');
        let scheme = segments.next().unwrap_or_default();
        let method = segments.next();
        let identifier = segments.next();

        if scheme != DID_SCHEME {
            return Err(DidError::InvalidFormat(format!(
                "expected '{DID_SCHEME}' scheme, got '{scheme}'"
            )));
        }

        let method = method
            .ok_or_else(|| DidError::InvalidFormat("missing method segment".into()))?;
        if method != DID_METHOD {
            return Err(DidError::UnsupportedMethod(method.to_string()));
        }

        let identifier = identifier
            .ok_or_else(|| DidError::InvalidFormat("missing identifier segment".into()))?;
        let parts: Vec<&str> = identifier.split(IDENTIFIER_DELIMITER).collect();
        let [user, repo, kid] = parts.as_slice() else {
            return Err(DidError::InvalidFormat(format!(
                "identifier must be '<user>{IDENTIFIER_DELIMITER}<repo>{IDENTIFIER_DELIMITER}<kid>', got '{identifier}'"
            )));
        };

        Ok(Self::new(*user, *repo, *kid))
    }

    /// The GitHub user owning the DID repository.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The repository the document is published in.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The key id naming the document file.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The URL the DID document is fetched from.
    ///
    /// Path segments are concatenated as-is — no percent-escaping. A user
    /// or repo name containing path-unsafe characters yields a URL that
    /// won't resolve, matching how the documents are published.
    pub fn document_url(&self) -> String {
        self.document_url_with_base(RESOLUTION_BASE_URL)
    }

    /// Same as [`Did::document_url`], against a different base. Used for
    /// mirrors and for tests that serve documents locally.
    pub fn document_url_with_base(&self, base: &str) -> String {
        format!(
            "{base}{user}/{repo}{dir}/{kid}{ext}",
            user = self.user,
            repo = self.repo,
            dir = DID_DOCUMENT_DIR,
            kid = self.kid,
            ext = DID_DOCUMENT_EXTENSION,
        )
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DID_SCHEME}:{DID_METHOD}:{user}{delim}{repo}{delim}{kid}",
            user = self.user,
            repo = self.repo,
            kid = self.kid,
            delim = IDENTIFIER_DELIMITER,
        )
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.to_string()
    }
}

/// Format a DID string for an arbitrary method.
///
/// Formatting only — the result is not validated and methods other than
/// `ghdid` cannot be parsed back or resolved by this library.
pub fn create_did(method: &str, user: &str, repo: &str, kid: &str) -> String {
    format!(
        "{DID_SCHEME}:{method}:{user}{delim}{repo}{delim}{kid}",
        delim = IDENTIFIER_DELIMITER
    )
}

// ---------------------------------------------------------------------------
// KeyId
// ---------------------------------------------------------------------------

/// Identifies one key entry inside a DID document: `<did>#kid=<fragment>`.
///
/// The DID names the document; the fragment names the entry. By
/// convention the fragment repeats the DID's kid, but nothing enforces
/// that — key lookup matches entry ids against the full Key ID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyId {
    did: Did,
    fragment: String,
}

impl KeyId {
    /// Construct a Key ID from a DID and a key fragment.
    pub fn new(did: Did, fragment: impl Into<String>) -> Self {
        Self {
            did,
            fragment: fragment.into(),
        }
    }

    /// Parse a Key ID, splitting at the `#kid=` marker.
    pub fn parse(key_id: &str) -> Result<Self, DidError> {
        let (did, fragment) = key_id.split_once(KEY_ID_MARKER).ok_or_else(|| {
            DidError::InvalidFormat(format!("key id '{key_id}' has no '{KEY_ID_MARKER}' marker"))
        })?;
        Ok(Self {
            did: Did::parse(did)?,
            fragment: fragment.to_string(),
        })
    }

    /// The DID owning the document this key lives in.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// The fragment naming the key entry.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_ID_MARKER}{}", self.did, self.fragment)
    }
}

impl FromStr for KeyId {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
