//! Errors that abort an integrity transform.
//!
//! Unresolvable references are not errors: they are reported as warnings and
//! the element is left untouched.

use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum SriError {
    #[error("failed to parse HTML: {0}")]
    Parse(String),

    #[error("failed to fetch remote resource")]
    Fetch(#[from] FetchError),
}
