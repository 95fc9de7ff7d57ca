//! # Protocol Configuration & Constants
//!
//! Every magic string in GHDID lives here. The DID method token, the
//! resolution base URL, the proof domain tag — all of it. If you're
//! hardcoding one of these somewhere else, stop.
//!
//! These values are part of the wire contract: a document published under
//! one set of constants is unreachable and unverifiable under another.
//! Changing them orphans every DID already committed to a git repository.

// ---------------------------------------------------------------------------
// DID Syntax
// ---------------------------------------------------------------------------

/// The URI scheme token every DID starts with. Fixed by the W3C DID spec.
pub const DID_SCHEME: &str = "did";

/// The one method this library resolves: `ghdid`, DIDs hosted as static
/// files in a GitHub repository. Other methods are rejected at parse time.
pub const DID_METHOD: &str = "ghdid";

/// Delimiter between the `user`, `repo`, and `kid` parts of the
/// method-specific identifier. Tilde, because `/` and `:` are already
/// spoken for in URIs.
pub const IDENTIFIER_DELIMITER: char = '~';

/// Marker separating a DID from its key fragment in a Key ID:
/// `did:ghdid:alice~repo~key1#kid=key1`.
pub const KEY_ID_MARKER: &str = "#kid=";

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Where DID documents are fetched from. Raw file access, no API tokens,
/// no rate-limit negotiation — the repository itself is the registry.
pub const RESOLUTION_BASE_URL: &str = "https://raw.githubusercontent.com/";

/// Path between the repository and the document: documents live on the
/// `master` branch under a `dids/` directory.
pub const DID_DOCUMENT_DIR: &str = "/master/dids";

/// DID documents are JSON-LD files with this extension.
pub const DID_DOCUMENT_EXTENSION: &str = ".jsonld";

/// Content type requested when fetching a DID document.
pub const JSON_LD_CONTENT_TYPE: &str = "application/ld+json";

// ---------------------------------------------------------------------------
// Proofs
// ---------------------------------------------------------------------------

/// Domain tag stamped into every linked-data proof. Binds a signature to
/// this trust domain so it can't be replayed into another deployment.
pub const PROOF_DOMAIN: &str = "github-did";

/// Attribute under which the linked-data signature is embedded in a
/// document.
pub const PROOF_ATTRIBUTE: &str = "proof";

// ---------------------------------------------------------------------------
// Capability Chains
// ---------------------------------------------------------------------------

/// Upper bound on delegation chain length. Real chains are two or three
/// links; anything approaching this limit is misconfigured or hostile,
/// and the walk fails with an explicit depth error rather than looping.
pub const MAX_DELEGATION_DEPTH: usize = 16;
