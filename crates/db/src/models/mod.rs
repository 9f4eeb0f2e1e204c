pub mod complaint;
pub mod emergency_alert;
pub mod fir;
pub mod notification;
pub mod stats;
pub mod user;

/// Page bounds for staff listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 500;

    /// Clamp caller-supplied bounds: limit to `1..=MAX_LIMIT`, offset to `>= 0`.
    pub fn new(limit: Option<i64>, offset: Option<i64>, default_limit: i64) -> Self {
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Whether a write failed because a UNIQUE constraint rejected it.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
