//! Unified error interface for TESSEL.
//!
//! Every TESSEL error type implements [`ErrorCode`] so that the host
//! execution engine can report failures uniformly and decide whether the
//! enclosing scope can keep going.
//!
//! # Example
//!
//! ```
//! use tessel_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum ScopeError {
//!     Misconfigured,
//!     CallbackFailed,
//! }
//!
//! impl ErrorCode for ScopeError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Misconfigured => "SCOPE_MISCONFIGURED",
//!             Self::CallbackFailed => "SCOPE_CALLBACK_FAILED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::CallbackFailed)
//!     }
//! }
//!
//! let err = ScopeError::Misconfigured;
//! assert_eq!(err.code(), "SCOPE_MISCONFIGURED");
//! assert!(!err.is_recoverable());
//! ```

/// Machine-readable error classification.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, e.g. `"EXT_POSITION_CONFLICT"`
/// - **Prefixed by crate domain**: `EXT_` for the extension layer,
///   `CONFIG_` for configuration loading
/// - **Stable**: codes are part of the public contract
///
/// # Recoverability
///
/// A configuration problem (wrong position, conflicting registrations,
/// a type that cannot be constructed) is never recoverable: the same
/// registry build will fail the same way every time. A failure raised by
/// a callback while it runs is scoped to that invocation and is
/// reported as recoverable so the host can move on to sibling scopes.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether the error is recoverable.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows TESSEL conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks `expected_prefix`, or is not
/// UPPER_SNAKE_CASE.
///
/// # Example
///
/// ```
/// use tessel_types::{assert_error_code, ErrorCode};
///
/// struct Boom;
///
/// impl ErrorCode for Boom {
///     fn code(&self) -> &'static str { "EXT_BOOM" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Boom, "EXT_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts [`assert_error_code`] for every error in `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl ErrorCode for TestError {
        fn code(&self) -> &'static str {
            match self {
                Self::Transient => "TEST_TRANSIENT",
                Self::Permanent => "TEST_PERMANENT",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn error_code_trait() {
        assert_eq!(TestError::Transient.code(), "TEST_TRANSIENT");
        assert!(TestError::Transient.is_recoverable());
        assert!(!TestError::Permanent.is_recoverable());
    }

    #[test]
    fn assert_error_codes_all_variants() {
        assert_error_codes(&[TestError::Transient, TestError::Permanent], "TEST_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn assert_error_code_wrong_prefix() {
        assert_error_code(&TestError::Transient, "EXT_");
    }

    #[test]
    fn upper_snake_case() {
        assert!(is_upper_snake_case("EXT_POSITION_CONFLICT"));
        assert!(is_upper_snake_case("CONFIG_2"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("ext_conflict"));
        assert!(!is_upper_snake_case("_EXT"));
        assert!(!is_upper_snake_case("EXT_"));
        assert!(!is_upper_snake_case("EXT__CONFLICT"));
    }
}
