//! # Identity Module
//!
//! DID syntax and the documents it resolves to. A `did:ghdid` identity is
//! nothing more than a location: a GitHub user, a repository, and a key
//! id, from which the document URL follows deterministically. The
//! identity stack is layered:
//!
//! 1. **Did / KeyId** — textual identifiers. Pure parsing, no I/O.
//! 2. **DidDocument** — the published JSON-LD artifact: keys, an embedded
//!    linked-data proof, and optional `capability` / `parentCapability`
//!    delegation links.
//!
//! Fetching documents lives in [`crate::resolver`]; walking delegation
//! links lives in [`crate::capability`].

pub mod did;
pub mod document;

pub use did::{create_did, Did, DidError, KeyId};
pub use document::{DidDocument, LinkedDataProof, PublicKeyEntry, PublicKeys};
