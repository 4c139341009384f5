//! Core types for TESSEL.
//!
//! TESSEL (Tiered Execution Scope Extension Layer) is the extension
//! registration and ordering engine of a hierarchical execution
//! framework. This crate holds the small vocabulary every other crate
//! shares.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  tessel-types     : ExtensionTypeId, ScopeId, ErrorCode ◄── │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  tessel-extension : positions, phases, registry, dispatch   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  host execution engine (tree walk, reporting)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tessel_types::{ExtensionTypeId, ScopeId};
//!
//! let ty = ExtensionTypeId::builtin("disabled_condition");
//! assert_eq!(ty.fqn(), "builtin::disabled_condition");
//!
//! let scope = ScopeId::new();
//! println!("entering {scope}");
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ExtensionTypeId, ScopeId, BUILTIN_NAMESPACE};
