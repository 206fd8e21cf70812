//! Numeric One-Time Codes
//!
//! Decimal codes drawn from the OS cryptographic random source.
//! Bytes >= 250 are rejected so every digit stays uniform over 0-9.

use rand::TryRngCore;
use rand::rngs::OsRng;
use thiserror::Error;

/// Largest byte value accepted; 250 is the biggest multiple of 10 <= 256
const REJECTION_BOUND: u8 = 250;

#[derive(Debug, Error)]
pub enum OtpError {
    /// The random source failed; never retried silently
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}

/// Generate a code of `len` decimal digits from the OS random source
pub fn generate_numeric_code(len: usize) -> Result<String, OtpError> {
    generate_numeric_code_with(&mut OsRng, len)
}

/// Generate a code of `len` decimal digits from the given source
pub fn generate_numeric_code_with<R>(rng: &mut R, len: usize) -> Result<String, OtpError>
where
    R: TryRngCore + ?Sized,
{
    let mut code = String::with_capacity(len);
    let mut buf = [0u8; 16];

    while code.len() < len {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| OtpError::EntropyUnavailable(e.to_string()))?;

        for &byte in buf.iter().filter(|&&b| b < REJECTION_BOUND) {
            code.push(char::from(b'0' + byte % 10));
            if code.len() == len {
                break;
            }
        }
    }

    Ok(code)
}
