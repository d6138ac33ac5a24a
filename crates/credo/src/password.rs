// Password hashing with scrypt (N=16384, r=16, p=1, dkLen=64).
//
// Stored format: "hex(salt):hex(key)" with a random 16-byte salt per hash.
// Comparison of derived keys is constant time.

use std::sync::OnceLock;

use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;

use credo_core::error::{AuthError, Result};

fn params() -> Result<Params> {
    // N=16384 -> log2(N)=14
    Params::new(14, 16, 1, 64).map_err(|e| AuthError::Crypto(format!("invalid scrypt params: {e}")))
}

fn derive(password: &str, salt: &str) -> Result<Vec<u8>> {
    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params()?, &mut output)
        .map_err(|e| AuthError::Crypto(format!("scrypt failed: {e}")))?;
    Ok(output)
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = derive(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by [`hash_password`].
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let (salt, key_hex) = hash
        .split_once(':')
        .ok_or_else(|| AuthError::Crypto("invalid password hash format".into()))?;

    let expected = hex::decode(key_hex)
        .map_err(|e| AuthError::Crypto(format!("invalid hex in password hash: {e}")))?;

    let derived = derive(password, salt)?;
    Ok(constant_time_equal(&derived, &expected))
}

/// Burn a hash verification against a throwaway hash. Login calls this on
/// its miss paths so unknown-email and wrong-password take comparable time.
pub fn burn_verification(password: &str) {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    let dummy = DUMMY.get_or_init(|| hash_password("timing-filler").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(hash, password);
    }
}

/// Compare two byte slices in constant time.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
