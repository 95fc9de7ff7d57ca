//! # Capability Delegation Chains
//!
//! A document may name another DID under `capability` (or, failing that,
//! `parentCapability`) as the authority it was delegated from. Following
//! those links from a starting DID yields a chain that ends at a root
//! document with no link at all. [`verify_capability`] walks that chain:
//! every document along the way must verify its own embedded proof, and
//! the root must expose a list-shaped `publicKey`.
//!
//! The walk is an explicit loop over `Verifying(did)` states rather than
//! recursion, carrying the set of DIDs already visited and a depth
//! bound. Published documents are under their owners' control, so a
//! cycle or a bottomless chain is an input this library must answer with
//! an error, not a stack overflow.
//!
//! Each step needs the previous step's document before it knows the next
//! DID, so a single walk is inherently sequential. Walks for different
//! starting DIDs share nothing and can run concurrently.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::config::MAX_DELEGATION_DEPTH;
use crate::proof::{self, ProofError, SignatureSuite};
use crate::resolver::{ResolveError, Resolver};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of the chain walk itself. A chain whose proofs simply don't
/// verify is not a failure — that's `Ok(false)`.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// A link's DID document could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A link's proof could not be checked (missing proof, unresolvable
    /// creator key, suite error).
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// The walk reached a DID it had already verified. Delegation links
    /// form a loop; no root exists.
    #[error("capability chain contains a cycle at '{did}'")]
    CycleDetected { did: String },

    /// The chain is longer than any legitimate delegation setup.
    #[error("capability chain exceeds the maximum depth of {limit} links")]
    DepthExceeded { limit: usize },

    /// The root document's `publicKey` is missing or not list-shaped.
    /// Structurally broken, as opposed to failing verification.
    #[error("root document '{did}' has a missing or non-list 'publicKey'")]
    MalformedDocument { did: String },
}

// ---------------------------------------------------------------------------
// Chain walk
// ---------------------------------------------------------------------------

/// Verify the delegation chain starting at `did`.
///
/// Returns `Ok(true)` iff every document from the start to the root
/// verifies its own proof *and* the root exposes a list-shaped
/// `publicKey`. The first failing proof short-circuits to `Ok(false)`.
/// Everything else — resolution failures, a rootless (cyclic) chain, an
/// over-deep chain, a structurally malformed root — is an error.
///
/// The root check is shape, not content: an empty list still passes, a
/// single bare key object does not. Documents that fail it were
/// published wrong, which is worth distinguishing from a forged
/// signature.
pub async fn verify_capability<R, S>(
    did: &str,
    resolver: &R,
    suite: &S,
) -> Result<bool, CapabilityError>
where
    R: Resolver + ?Sized,
    S: SignatureSuite + ?Sized,
{
    let mut current = did.to_string();
    let mut visited: HashSet<String> = HashSet::new();

    for depth in 0..MAX_DELEGATION_DEPTH {
        if !visited.insert(current.clone()) {
            return Err(CapabilityError::CycleDetected { did: current });
        }

        debug!(did = %current, depth, "verifying delegation link");

        let document = resolver.resolve(&current).await?;

        if !proof::verify(&document, resolver, suite).await? {
            debug!(did = %current, depth, "delegation link failed proof verification");
            return Ok(false);
        }

        match document.delegation_link() {
            Some(next) => current = next.to_string(),
            None => {
                // The root. Its publicKey must have been published as a
                // list; anything else is a broken document, not a failed
                // verification.
                let list_shaped = document
                    .public_key
                    .as_ref()
                    .is_some_and(|keys| keys.is_list());
                if !list_shaped {
                    return Err(CapabilityError::MalformedDocument { did: current });
                }

                debug!(root = %current, depth, "capability chain verified");
                return Ok(true);
            }
        }
    }

    Err(CapabilityError::DepthExceeded {
        limit: MAX_DELEGATION_DEPTH,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{pem_for, MapResolver, StubSuite};
    use serde_json::{json, Value};

    const ALICE: &str = "did:ghdid:alice~repo~key1";
    const BOB: &str = "did:ghdid:bob~repo~key1";
    const ROOT: &str = "did:ghdid:root~repo~key1";

    fn key_id(did: &str) -> String {
        format!("{did}#kid=key1")
    }

    /// Unsigned document body: self-contained key plus optional link.
    fn body(did: &str, owner: &str, link: Option<(&str, &str)>) -> Value {
        let mut doc = json!({
            "id": did,
            "publicKey": [{ "id": key_id(did), "publicKeyPem": pem_for(owner) }]
        });
        if let Some((field, target)) = link {
            doc[field] = json!(target);
        }
        doc
    }

    /// Builds a resolver holding each document, signed by its own key.
    async fn chain_resolver(docs: Vec<(&str, &str, Value)>) -> MapResolver {
        let mut resolver = MapResolver::empty();
        for (did, owner, data) in docs {
            let signed = crate::proof::sign(&data, &key_id(did), &format!("sec:{owner}"), &StubSuite)
                .await
                .unwrap();
            resolver.insert(did, signed);
        }
        resolver
    }

    #[tokio::test]
    async fn three_link_chain_verifies() {
        // leaf --capability--> middle --parentCapability--> root
        let resolver = chain_resolver(vec![
            (ALICE, "alice", body(ALICE, "alice", Some(("capability", BOB)))),
            (BOB, "bob", body(BOB, "bob", Some(("parentCapability", ROOT)))),
            (ROOT, "root", body(ROOT, "root", None)),
        ])
        .await;

        let verified = verify_capability(ALICE, &resolver, &StubSuite).await.unwrap();
        assert!(verified);
    }

    #[tokio::test]
    async fn single_failing_proof_yields_false() {
        let mut resolver = chain_resolver(vec![
            (ALICE, "alice", body(ALICE, "alice", Some(("capability", BOB)))),
            (ROOT, "root", body(ROOT, "root", None)),
        ])
        .await;
        // Bob's document is signed by mallory's key but publishes bob's,
        // so its proof does not verify.
        let forged = crate::proof::sign(
            &body(BOB, "bob", Some(("capability", ROOT))),
            &key_id(BOB),
            "sec:mallory",
            &StubSuite,
        )
        .await
        .unwrap();
        resolver.insert(BOB, forged);

        let verified = verify_capability(ALICE, &resolver, &StubSuite).await.unwrap();
        assert!(!verified);
    }

    #[tokio::test]
    async fn root_with_single_key_object_is_malformed() {
        let mut root_body = body(ROOT, "root", None);
        // Republish the root's key as a bare object instead of a list.
        root_body["publicKey"] = json!({ "id": key_id(ROOT), "publicKeyPem": pem_for("root") });
        let resolver = chain_resolver(vec![
            (ALICE, "alice", body(ALICE, "alice", Some(("capability", ROOT)))),
            (ROOT, "root", root_body),
        ])
        .await;

        let result = verify_capability(ALICE, &resolver, &StubSuite).await;
        assert!(matches!(
            result,
            Err(CapabilityError::MalformedDocument { did }) if did == ROOT
        ));
    }

    #[tokio::test]
    async fn root_without_public_key_is_malformed() {
        // The root still needs a resolvable key for its own proof, so it
        // points its creator at alice's document.
        let root_body = json!({ "id": ROOT });
        let resolver = {
            let mut r = chain_resolver(vec![(
                ALICE,
                "alice",
                body(ALICE, "alice", Some(("capability", ROOT))),
            )])
            .await;
            let signed = crate::proof::sign(&root_body, &key_id(ALICE), "sec:alice", &StubSuite)
                .await
                .unwrap();
            r.insert(ROOT, signed);
            r
        };

        let result = verify_capability(ALICE, &resolver, &StubSuite).await;
        assert!(matches!(
            result,
            Err(CapabilityError::MalformedDocument { .. })
        ));
    }

    #[tokio::test]
    async fn cycle_is_detected_not_looped() {
        let resolver = chain_resolver(vec![
            (ALICE, "alice", body(ALICE, "alice", Some(("capability", BOB)))),
            (BOB, "bob", body(BOB, "bob", Some(("capability", ALICE)))),
        ])
        .await;

        let result = verify_capability(ALICE, &resolver, &StubSuite).await;
        assert!(matches!(
            result,
            Err(CapabilityError::CycleDetected { did }) if did == ALICE
        ));
    }

    #[tokio::test]
    async fn self_referential_document_is_a_cycle() {
        let resolver = chain_resolver(vec![(
            ALICE,
            "alice",
            body(ALICE, "alice", Some(("capability", ALICE))),
        )])
        .await;

        let result = verify_capability(ALICE, &resolver, &StubSuite).await;
        assert!(matches!(result, Err(CapabilityError::CycleDetected { .. })));
    }

    #[tokio::test]
    async fn over_deep_chain_is_rejected() {
        // A straight-line chain longer than the depth bound, no cycle.
        let mut docs = Vec::new();
        let dids: Vec<String> = (0..=MAX_DELEGATION_DEPTH)
            .map(|i| format!("did:ghdid:user{i}~repo~key1"))
            .collect();
        for i in 0..=MAX_DELEGATION_DEPTH {
            let link = dids.get(i + 1).map(|next| ("capability", next.as_str()));
            docs.push((dids[i].as_str(), "alice", body(&dids[i], "alice", link)));
        }
        let resolver = chain_resolver(docs).await;

        let result = verify_capability(&dids[0], &resolver, &StubSuite).await;
        assert!(matches!(
            result,
            Err(CapabilityError::DepthExceeded { limit }) if limit == MAX_DELEGATION_DEPTH
        ));
    }

    #[tokio::test]
    async fn unresolvable_link_propagates_the_error() {
        let resolver = chain_resolver(vec![(
            ALICE,
            "alice",
            body(ALICE, "alice", Some(("capability", "did:ghdid:ghost~repo~key1"))),
        )])
        .await;

        let result = verify_capability(ALICE, &resolver, &StubSuite).await;
        assert!(matches!(result, Err(CapabilityError::Resolve(_))));
    }

    #[tokio::test]
    async fn bare_root_with_listed_keys_verifies() {
        let resolver = chain_resolver(vec![(ROOT, "root", body(ROOT, "root", None))]).await;
        let verified = verify_capability(ROOT, &resolver, &StubSuite).await.unwrap();
        assert!(verified);
    }
}
