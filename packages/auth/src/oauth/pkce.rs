// ABOUTME: PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
// ABOUTME: Generates code verifiers and SHA256 challenges for secure OAuth flows

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bytes of entropy behind each code verifier. Encodes to 43 characters,
/// the RFC 7636 minimum length.
const CODE_VERIFIER_BYTES: usize = 32;

/// Generate a random code verifier.
///
/// 32 bytes from a cryptographically secure source, URL-safe base64 encoded
/// without padding per RFC 7636.
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; CODE_VERIFIER_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate the S256 code challenge for a verifier.
///
/// Pure function of its input so the provider can independently re-derive
/// and verify it at token-exchange time.
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Verify that a code verifier matches a code challenge.
///
/// This is normally the authorization server's job, but is useful for tests.
pub fn verify_code_challenge(verifier: &str, challenge: &str) -> bool {
    generate_code_challenge(verifier) == challenge
}
