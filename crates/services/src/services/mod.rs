pub mod auth;
pub mod complaint;
pub mod config;
pub mod database_validator;
pub mod emergency;
pub mod fir;
pub mod notification;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

/// `Some` only for a present, non-blank value.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
