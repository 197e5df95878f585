//! Human-readable unique identifiers.

use chrono::Utc;
use uuid::Uuid;

const RANDOM_SUFFIX_MODULUS: u128 = 1_000_000_000;

/// Returns a new 32-digit identifier.
///
/// Layout: UTC `YYYYMMDDHHMMSS`, 9 digits of nanoseconds, then 9 random
/// digits. Identifiers created later sort after earlier ones within the
/// same process clock.
pub fn new_human_uid() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%f");
    let random = Uuid::new_v4().as_u128() % RANDOM_SUFFIX_MODULUS;
    format!("{timestamp}{random:09}")
}
