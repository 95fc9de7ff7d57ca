//! Interactive CLI demo of the full GHDID lifecycle.
//!
//! Walks through DID creation and URL derivation, publishing signed DID
//! documents into an in-memory directory, delegation-chain verification
//! (including a cycle that fails fast), and an encrypted message exchange
//! between two identities. The output uses ANSI escape codes for colored,
//! storytelling-style terminal rendering.
//!
//! The external capabilities (signature suite, asymmetric crypto, wallet
//! codec) are in-memory doubles here — the demo shows the protocol flow,
//! not real cryptography. Run with:
//!   cargo run --example demo

use std::collections::HashMap;
use std::time::Instant;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde_json::{json, Value};

use ghdid_protocol::capability::{verify_capability, CapabilityError};
use ghdid_protocol::channel::{decrypt_for, encrypt_for, AsymmetricCrypto, OutboundMessage};
use ghdid_protocol::identity::{Did, DidDocument, KeyId, LinkedDataProof, PublicKeyEntry};
use ghdid_protocol::proof::{self, ProofOptions, SignatureSuite};
use ghdid_protocol::resolver::{get_public_key_by_key_id, ResolveError, Resolver};
use ghdid_protocol::wallet::{decrypt_wallet, encrypt_wallet, WalletCodec};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const RED: &str = "\x1b[31m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    GHDID PROTOCOL  --  Decentralized Identity Lifecycle Demo       {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    did:ghdid  |  git as the registry  |  capability delegation     {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn failure(text: &str) {
    println!("{RED}  [!!] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn identity_row(name: &str, did: &str, color: &str) {
    println!("  {color}{BOLD}{name:<8}{RESET}  {DIM}{did}{RESET}");
}

// ---------------------------------------------------------------------------
// In-memory capabilities
// ---------------------------------------------------------------------------

fn key_name(material: &str) -> anyhow::Result<&str> {
    material
        .strip_prefix("pub:")
        .or_else(|| material.strip_prefix("sec:"))
        .ok_or_else(|| anyhow!("unintelligible key material '{material}'"))
}

fn digest(input: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{hash:016x}")
}

fn canonical_without(data: &Value, attribute: &str) -> String {
    let mut stripped = data.clone();
    if let Some(object) = stripped.as_object_mut() {
        object.remove(attribute);
    }
    stripped.to_string()
}

/// The "git repository" the demo resolves against.
#[derive(Default)]
struct Directory {
    documents: HashMap<String, DidDocument>,
}

impl Directory {
    fn publish(&mut self, did: &str, document: Value) {
        self.documents.insert(
            did.to_string(),
            serde_json::from_value(document).expect("published document must deserialize"),
        );
    }
}

#[async_trait]
impl Resolver for Directory {
    async fn resolve(&self, did: &str) -> Result<DidDocument, ResolveError> {
        self.documents
            .get(did)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                did: did.to_string(),
            })
    }
}

struct DigestSuite;

#[async_trait]
impl SignatureSuite for DigestSuite {
    async fn sign(
        &self,
        data: &Value,
        options: &ProofOptions<'_>,
    ) -> anyhow::Result<LinkedDataProof> {
        let name = key_name(options.private_key)?;
        let canonical = canonical_without(data, options.signature_attribute);
        let mut proof: LinkedDataProof = serde_json::from_value(json!({
            "type": "DigestSignature2026",
            "creator": options.creator,
            "domain": options.domain,
        }))?;
        proof.signature_value = Some(digest(&format!("{canonical}|{name}")));
        Ok(proof)
    }

    async fn verify(
        &self,
        data: &Value,
        public_key: &PublicKeyEntry,
        signature_attribute: &str,
    ) -> anyhow::Result<bool> {
        let Some(proof_value) = data.get(signature_attribute) else {
            bail!("document has no '{signature_attribute}' attribute");
        };
        let proof: LinkedDataProof = serde_json::from_value(proof_value.clone())?;
        let material = public_key
            .material()
            .ok_or_else(|| anyhow!("key entry '{}' has no material", public_key.id))?;
        let canonical = canonical_without(data, signature_attribute);
        let expected = digest(&format!("{canonical}|{}", key_name(material)?));
        Ok(proof.signature_value.as_deref() == Some(expected.as_str()))
    }
}

struct ArmorCrypto;

#[async_trait]
impl AsymmetricCrypto for ArmorCrypto {
    async fn encrypt(
        &self,
        plaintext: &str,
        recipient_public_key: &str,
        sender_private_key: &str,
    ) -> anyhow::Result<String> {
        Ok(format!(
            "armored:{}:{}:{plaintext}",
            key_name(recipient_public_key)?,
            key_name(sender_private_key)?
        ))
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
            bail!("decryption failed: wrong recipient key");
        }
        if sender != key_name(sender_public_key)? {
            bail!("signature check failed: wrong sender key");
        }
        Ok(plaintext.to_string())
    }
}

struct PasswordCodec;

#[async_trait]
impl WalletCodec for PasswordCodec {
    async fn encrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value> {
        Ok(json!({ "cipher": wallet.to_string(), "check": digest(password) }))
    }

    async fn decrypt(&self, wallet: &Value, password: &str) -> anyhow::Result<Value> {
        if wallet["check"] != json!(digest(password)) {
            bail!("wrong wallet password");
        }
        let cipher = wallet["cipher"]
            .as_str()
            .ok_or_else(|| anyhow!("no cipher payload"))?;
        Ok(serde_json::from_str(cipher)?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn document_body(did: &Did, key_id: &KeyId, link: Option<(&str, &str)>) -> Value {
    let mut doc = json!({
        "@context": "https://w3id.org/did/v1",
        "id": did.to_string(),
        "publicKey": [{
            "id": key_id.to_string(),
            "type": "publicKeyPem",
            "owner": did.to_string(),
            "publicKeyPem": format!("pub:{}", did.user())
        }]
    });
    if let Some((field, target)) = link {
        doc[field] = json!(target);
    }
    doc
}

async fn publish_signed(directory: &mut Directory, did: &Did, body: Value) {
    let key_id = KeyId::new(did.clone(), did.kid());
    let signed = proof::sign(
        &body,
        &key_id.to_string(),
        &format!("sec:{}", did.user()),
        &DigestSuite,
    )
    .await
    .expect("signing an object cannot fail");
    directory.publish(&did.to_string(), signed);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let demo_start = Instant::now();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: DIDs and document URLs
    // -----------------------------------------------------------------------

    section(1, "DID Syntax & Deterministic Resolution URLs");
    subsection("Parsing did:ghdid identifiers and deriving document URLs...");

    let alice: Did = "did:ghdid:alice~identity~key1".parse().unwrap();
    let bob: Did = "did:ghdid:bob~identity~key1".parse().unwrap();
    let org: Did = "did:ghdid:acme~identity~key1".parse().unwrap();
    let root: Did = "did:ghdid:acme-root~identity~key1".parse().unwrap();

    println!();
    identity_row("Alice", &alice.to_string(), BLUE);
    identity_row("Bob", &bob.to_string(), GREEN);
    identity_row("Acme", &org.to_string(), MAGENTA);
    identity_row("Root", &root.to_string(), YELLOW);
    println!();

    info("Alice's document URL", &alice.document_url());
    success("URL derivation is a pure function of the DID — no registry lookup");

    let rejected = "did:web:alice.example".parse::<Did>();
    assert!(rejected.is_err());
    success("Foreign DID methods are rejected at parse time");

    // -----------------------------------------------------------------------
    // Step 2: Publish signed documents
    // -----------------------------------------------------------------------

    section(2, "Publishing Signed DID Documents");
    subsection("Signing each document with its owner's key and committing it...");

    let alice_key = KeyId::new(alice.clone(), "key1");
    let bob_key = KeyId::new(bob.clone(), "key1");

    let mut directory = Directory::default();
    let t = Instant::now();
    // Delegation: alice <- acme <- acme-root.
    publish_signed(
        &mut directory,
        &alice,
        document_body(&alice, &alice_key, Some(("capability", &org.to_string()))),
    )
    .await;
    publish_signed(
        &mut directory,
        &org,
        document_body(
            &org,
            &KeyId::new(org.clone(), "key1"),
            Some(("parentCapability", &root.to_string())),
        ),
    )
    .await;
    publish_signed(
        &mut directory,
        &root,
        document_body(&root, &KeyId::new(root.clone(), "key1"), None),
    )
    .await;
    publish_signed(
        &mut directory,
        &bob,
        document_body(&bob, &bob_key, None),
    )
    .await;
    timing("sign + publish x4", t.elapsed());

    let entry = get_public_key_by_key_id(&directory, &alice_key.to_string())
        .await
        .unwrap();
    info("Alice's published key", entry.material().unwrap());
    success("Key lookup resolves the owning document and scans its publicKey list");

    // -----------------------------------------------------------------------
    // Step 3: Proof verification
    // -----------------------------------------------------------------------

    section(3, "Linked-Data Proof Verification");
    subsection("Verifying Alice's document against her published key...");

    let t = Instant::now();
    let document = directory.resolve(&alice.to_string()).await.unwrap();
    let verified = proof::verify(&document, &directory, &DigestSuite)
        .await
        .unwrap();
    timing("resolve + verify", t.elapsed());
    assert!(verified);
    success("Embedded proof verifies against the resolved creator key");

    let mut tampered = document.clone();
    tampered.capability = Some(bob.to_string());
    let verified = proof::verify(&tampered, &directory, &DigestSuite)
        .await
        .unwrap();
    assert!(!verified);
    success("Tampering with a signed document flips verification to false");

    // -----------------------------------------------------------------------
    // Step 4: Capability chain walk
    // -----------------------------------------------------------------------

    section(4, "Capability Delegation Chain");
    subsection("Walking alice -> acme -> acme-root and checking every proof...");

    let t = Instant::now();
    let verified = verify_capability(&alice.to_string(), &directory, &DigestSuite)
        .await
        .unwrap();
    timing("3-link chain walk", t.elapsed());
    assert!(verified);
    success("Every link verified its own proof; the root publishes a key list");

    subsection("Publishing a malicious cycle (eve <-> trudy) and retrying...");
    let eve: Did = "did:ghdid:eve~identity~key1".parse().unwrap();
    let trudy: Did = "did:ghdid:trudy~identity~key1".parse().unwrap();
    publish_signed(
        &mut directory,
        &eve,
        document_body(
            &eve,
            &KeyId::new(eve.clone(), "key1"),
            Some(("capability", &trudy.to_string())),
        ),
    )
    .await;
    publish_signed(
        &mut directory,
        &trudy,
        document_body(
            &trudy,
            &KeyId::new(trudy.clone(), "key1"),
            Some(("capability", &eve.to_string())),
        ),
    )
    .await;

    match verify_capability(&eve.to_string(), &directory, &DigestSuite).await {
        Err(CapabilityError::CycleDetected { did }) => {
            failure(&format!("cycle detected at '{did}' — walk aborted, no hang"));
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }

    // -----------------------------------------------------------------------
    // Step 5: Encrypted channel
    // -----------------------------------------------------------------------

    section(5, "DID-Addressed Encrypted Messaging");
    subsection("Alice seals an envelope for Bob; Bob opens it via resolution...");

    // Bob's wallet sits encrypted at rest until he needs his private key.
    let wallet = json!({
        "keystore": { "key1": { "publicKey": "pub:bob", "privateKey": "sec:bob" } }
    });
    let at_rest = encrypt_wallet(&wallet, "correct horse", &PasswordCodec)
        .await
        .unwrap();
    let unlocked = decrypt_wallet(&at_rest, "correct horse", &PasswordCodec)
        .await
        .unwrap();
    let bob_private = unlocked["keystore"]["key1"]["privateKey"].as_str().unwrap();
    success("Bob's wallet unlocked from its encrypted at-rest form");

    let payload = json!({
        "subject": "capability granted",
        "chain": [alice.to_string(), org.to_string(), root.to_string()],
        "verified": true
    });

    let bob_entry = get_public_key_by_key_id(&directory, &bob_key.to_string())
        .await
        .unwrap();
    let t = Instant::now();
    let envelope = encrypt_for(
        OutboundMessage {
            from_key_id: &alice_key.to_string(),
            to_key_id: &bob_key.to_string(),
            public_key: bob_entry.material().unwrap(),
            private_key: "sec:alice",
            data: &payload,
        },
        &ArmorCrypto,
    )
    .await
    .unwrap();
    timing("encrypt_for", t.elapsed());

    info("Envelope from", &envelope.from_key_id);
    info("Envelope to", &envelope.to_key_id);
    info(
        "Cipher blob",
        &format!("{} bytes (opaque armored)", envelope.cipher_text.len()),
    );

    let t = Instant::now();
    let opened = decrypt_for(&envelope, bob_private, &directory, &ArmorCrypto)
        .await
        .unwrap();
    timing("decrypt_for", t.elapsed());
    assert_eq!(opened, payload);
    success("Payload round-tripped exactly; sender key resolved from her DID");

    let eavesdropped = decrypt_for(&envelope, "sec:mallory", &directory, &ArmorCrypto).await;
    assert!(eavesdropped.is_err());
    failure("Mallory's key cannot open the envelope (crypto error, as expected)");

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------

    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    DEMO COMPLETE                                                   {RESET}"
    );
    println!();
    println!("  {BOLD}{WHITE}Protocol Statistics:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    info("Identities published", "6 (Alice, Bob, Acme, Root, Eve, Trudy)");
    info("Delegation chain", "3 links, every proof checked");
    info("Cycles detected", "1 (eve <-> trudy, failed explicitly)");
    info("Envelopes exchanged", "1 (plus 1 rejected eavesdropper)");
    info("DID method", "ghdid (documents as files in a git repo)");
    info("Resolution", "deterministic URL, one GET, no cache, no retry");
    println!();
    println!(
        "  {BOLD}{GREEN}Total demo time: {:.2}s{RESET}",
        demo_start.elapsed().as_secs_f64()
    );
    println!();
}
