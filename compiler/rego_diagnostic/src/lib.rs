//! Diagnostics for the Rego front end.
//!
//! Parse errors are accumulated, never thrown: the parser records a
//! [`ParseError`] and backs out of the current production. Each error
//! carries:
//! - an [`ErrorCode`] (always `parse-error` today)
//! - a message, with any pending hints appended
//! - the location of the offending token
//! - an optional [`ErrorDetails`] source snippet for caret rendering
//!
//! [`ParseErrors`] is the collection type returned by the convenience
//! entry points and printed by the CLI.

mod error;
mod error_code;

pub use error::{ErrorDetails, ParseError, ParseErrors};
pub use error_code::ErrorCode;
