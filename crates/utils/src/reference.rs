//! Human-facing reference numbers such as `FIR123456042`.

use chrono::Utc;
use rand::Rng;

pub const FIR_PREFIX: &str = "FIR";
pub const COMPLAINT_PREFIX: &str = "CMP";

/// `prefix` + last six digits of the epoch milliseconds + three random digits.
pub fn generate(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis().rem_euclid(1_000_000);
    let random: u16 = rand::rng().random_range(0..1000);
    format!("{prefix}{millis:06}{random:03}")
}
