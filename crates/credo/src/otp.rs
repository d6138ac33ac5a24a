// One-time code generation and sealing.
//
// Codes are 6 decimal digits, uniform over 000000..=999999 (leading zeros
// kept). At rest a code lives as an XChaCha20-Poly1305 sealed blob with a
// fresh 24-byte nonce per call; the sealing key is SHA-256 of the configured
// secret. Blob format: "hex(nonce):hex(ciphertext)".

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305, XNonce,
};
use sha2::{Digest, Sha256};

use credo_core::error::{AuthError, Result};

/// XChaCha20 nonce length in bytes.
const NONCE_LEN: usize = 24;

/// Generate a fresh 6-digit code from the OS CSPRNG.
pub fn generate_code() -> String {
    use rand::Rng;
    let n: u32 = rand::rngs::OsRng.gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Derive the 32-byte sealing key from the configured secret.
fn derive_key(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Seal a plaintext code under the secret.
pub fn seal(secret: &str, code: &str) -> Result<String> {
    let cipher = XChaCha20Poly1305::new_from_slice(&derive_key(secret))
        .map_err(|e| AuthError::Crypto(format!("cipher init failed: {e}")))?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, code.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("encryption failed: {e}")))?;

    Ok(format!("{}:{}", hex::encode(nonce), hex::encode(ciphertext)))
}

/// Open a sealed blob produced by [`seal`].
///
/// Any malformed blob (missing separator, non-hex segment, wrong nonce
/// length) or authentication failure comes back as `AuthError::Decode`;
/// operations map that to `ExpiredOrMissingOtp` before it reaches a caller.
pub fn open(secret: &str, blob: &str) -> Result<String> {
    let (nonce_hex, ct_hex) = blob
        .split_once(':')
        .ok_or_else(|| AuthError::Decode("missing separator".into()))?;

    let nonce_bytes =
        hex::decode(nonce_hex).map_err(|e| AuthError::Decode(format!("nonce is not hex: {e}")))?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(AuthError::Decode(format!(
            "nonce is {} bytes, expected {NONCE_LEN}",
            nonce_bytes.len()
        )));
    }

    let ciphertext =
        hex::decode(ct_hex).map_err(|e| AuthError::Decode(format!("ciphertext is not hex: {e}")))?;

    let cipher = XChaCha20Poly1305::new_from_slice(&derive_key(secret))
        .map_err(|e| AuthError::Crypto(format!("cipher init failed: {e}")))?;

    let plaintext = cipher
        .decrypt(XNonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| AuthError::Decode("authentication failed".into()))?;

    String::from_utf8(plaintext).map_err(|e| AuthError::Decode(format!("invalid utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_six_digits() {
        for _ in 0..64 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn seal_open_round_trip() {
        let blob = seal("secret", "042317").unwrap();
        assert_eq!(open("secret", &blob).unwrap(), "042317");
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let a = seal("secret", "123456").unwrap();
        let b = seal("secret", "123456").unwrap();
        assert_ne!(a, b);
        let (nonce_a, _) = a.split_once(':').unwrap();
        let (nonce_b, _) = b.split_once(':').unwrap();
        assert_ne!(nonce_a, nonce_b);
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let blob = seal("secret", "123456").unwrap();
        assert!(matches!(open("other", &blob), Err(AuthError::Decode(_))));
    }

    #[test]
    fn malformed_blobs_are_decode_errors() {
        assert!(matches!(
            open("secret", "deadbeef"),
            Err(AuthError::Decode(_))
        )); // no separator
        assert!(matches!(
            open("secret", "zz:deadbeef"),
            Err(AuthError::Decode(_))
        )); // non-hex nonce
        assert!(matches!(
            open("secret", "dead:beef"),
            Err(AuthError::Decode(_))
        )); // short nonce
        let blob = seal("secret", "123456").unwrap();
        let (nonce, _) = blob.split_once(':').unwrap();
        assert!(matches!(
            open("secret", &format!("{nonce}:not-hex")),
            Err(AuthError::Decode(_))
        ));
    }
}
