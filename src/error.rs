//! # Error Handling
//!
//! Provides the unified `GeneratorError` enum used across the crate.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum GeneratorError {
    /// Two operations in the same tag group compiled to the same method name.
    #[from(ignore)]
    #[display("Duplicate method '{method}' in client '{class}'")]
    DuplicateMethod {
        /// Client class the collision occurred in.
        class: String,
        /// The colliding method name (post-sanitization).
        method: String,
    },

    /// Two parameters of one operation sanitized to the same identifier.
    #[from(ignore)]
    #[display("Duplicate parameter '{parameter}' in method '{method}'")]
    DuplicateParameter {
        /// Method the collision occurred in.
        method: String,
        /// The colliding parameter name (post-sanitization).
        parameter: String,
    },

    /// A `"ClassName.MethodName"` settings entry could not be parsed.
    #[from(ignore)]
    #[display("Invalid method key '{_0}': expected 'ClassName.MethodName'")]
    InvalidMethodKey(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for GeneratorError {}

/// Helper type alias for Result using GeneratorError.
pub type GenResult<T> = Result<T, GeneratorError>;
