// Copyright (c) 2026 GHDID Protocol Contributors. MIT License.
// See LICENSE for details.

//! # GHDID Protocol — Core Library
//!
//! Decentralized identity with a git repository as the registry. A
//! `did:ghdid` identifier names a document committed to a GitHub repo;
//! resolution is a deterministic URL derivation plus one GET. No chain,
//! no consensus, no tokens — the trust anchor is the same one you
//! already use to trust code: who controls the repository.
//!
//! ## Architecture
//!
//! The library is split into modules that mirror the actual concerns:
//!
//! - **config** — The method token, URLs, domain tags. Every magic
//!   string, one place.
//! - **identity** — DID and Key ID syntax, and the JSON-LD documents
//!   they resolve to.
//! - **resolver** — DID document fetch. A capability trait plus the
//!   standard HTTP implementation.
//! - **proof** — Linked-data signature handling: sign and verify against
//!   DID-resolved keys.
//! - **capability** — Delegation-chain verification; walks
//!   `capability`/`parentCapability` links to a root.
//! - **channel** — DID-addressed encrypted messaging envelopes.
//! - **wallet** — At-rest encryption of key wallets, behind a codec
//!   capability.
//!
//! ## What this library does NOT do
//!
//! Cryptography. Signature suites, asymmetric encryption, and wallet
//! envelope encryption are capability traits implemented elsewhere —
//! this crate decides *what* gets signed, verified, and resolved, and
//! external implementations decide *how*. Nothing here parses a key or
//! touches a curve.

pub mod capability;
pub mod channel;
pub mod config;
pub mod identity;
pub mod proof;
pub mod resolver;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testkit;
