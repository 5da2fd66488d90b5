//! One-time activation codes.
//!
//! A freshly created token is pending until its owner proves out-of-band
//! receipt of a short code delivered to their registered email address.
//! Codes are 6 uppercase hex characters with a 30-minute expiry, compare
//! case-insensitively, and are cleared from the catalog row on successful
//! activation.

use chrono::Duration;
use rand::RngCore;

use lattice_core::types::Timestamp;

/// Number of random bytes behind a code; each byte becomes two hex chars.
const CODE_BYTES: usize = 3;

/// How long a code stays valid after issue.
const CODE_TTL_MINUTES: i64 = 30;

/// Generate a random activation code: 6 uppercase hex characters.
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Compute the expiry timestamp for a code issued at `now`.
pub fn expiry_after(now: Timestamp) -> Timestamp {
    now + Duration::minutes(CODE_TTL_MINUTES)
}

/// Whether a presented code matches the stored one. Codes are hex, so the
/// comparison is case-insensitive.
pub fn code_matches(stored: &str, presented: &str) -> bool {
    !stored.is_empty() && stored.eq_ignore_ascii_case(presented.trim())
}

/// Whether a code's stored expiry has passed.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}
