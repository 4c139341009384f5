//! Identifier types for TESSEL.
//!
//! Extension types are identified by a namespaced name with a
//! deterministic UUID, so the same type always compares equal no matter
//! which scope or process resolved it. Scopes get a random UUID per
//! registry node.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::{uuid, Uuid};

/// Namespace UUID for deterministic UUID v5 generation of extension types.
const TESSEL_NAMESPACE: Uuid = uuid!("3f6d2a0e-8c41-4b7e-9a52-c1e07d94b3a8");

/// Namespace used for extensions that ship with TESSEL.
pub const BUILTIN_NAMESPACE: &str = "builtin";

/// Identifier for an extension *type*.
///
/// A type is what the discovery layer hands to a registry: "register
/// whatever `builtin::disabled_condition` is". The registry asks its
/// factory to turn the type into a live extension instance and uses
/// the type for idempotency checks.
///
/// # UUID Strategy
///
/// The UUID is always v5, derived from `namespace::name`. Two ids with
/// the same fully qualified name are equal, which is exactly the
/// membership test the registry needs.
///
/// Serializes as the fully qualified name; deserializing goes through
/// [`parse`](Self::parse).
///
/// # Example
///
/// ```
/// use tessel_types::ExtensionTypeId;
///
/// let a = ExtensionTypeId::new("acme", "timing");
/// let b = ExtensionTypeId::new("acme", "timing");
/// assert_eq!(a, b);
/// assert_eq!(a.fqn(), "acme::timing");
///
/// let builtin = ExtensionTypeId::builtin("disabled_condition");
/// assert!(builtin.is_builtin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionTypeId {
    uuid: Uuid,
    namespace: String,
    name: String,
}

impl ExtensionTypeId {
    /// Creates an extension type id in the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let fqn = format!("{namespace}::{name}");
        Self {
            uuid: Uuid::new_v5(&TESSEL_NAMESPACE, fqn.as_bytes()),
            namespace,
            name,
        }
    }

    /// Creates an id in the [`BUILTIN_NAMESPACE`].
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(BUILTIN_NAMESPACE, name)
    }

    /// Parses a `namespace::name` string.
    ///
    /// Returns `None` when the separator is missing or either side is
    /// empty or contains whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use tessel_types::ExtensionTypeId;
    ///
    /// let id = ExtensionTypeId::parse("acme::timing").expect("valid id");
    /// assert_eq!(id.namespace(), "acme");
    /// assert_eq!(id.name(), "timing");
    ///
    /// assert!(ExtensionTypeId::parse("timing").is_none());
    /// assert!(ExtensionTypeId::parse("::timing").is_none());
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (namespace, name) = s.split_once("::")?;
        let valid = |part: &str| {
            !part.is_empty() && !part.contains("::") && !part.chars().any(char::is_whitespace)
        };
        if !valid(namespace) || !valid(name) {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    /// Deterministic identifier derived from the fully qualified name.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Namespace (e.g., "builtin", "acme").
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Type name within the namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fully qualified name in `namespace::name` format.
    #[must_use]
    pub fn fqn(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Returns `true` if this type ships with TESSEL.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.namespace == BUILTIN_NAMESPACE
    }
}

impl std::fmt::Display for ExtensionTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

impl Serialize for ExtensionTypeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExtensionTypeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            de::Error::custom(format!(
                "invalid extension type '{s}': expected 'namespace::name'"
            ))
        })
    }
}

/// Identifier for one execution scope (one registry node).
///
/// Scopes are containers or leaves of the execution tree. Each registry
/// node gets a fresh id so log lines and diagnostics can tell sibling
/// scopes apart.
///
/// # Example
///
/// ```
/// use tessel_types::ScopeId;
///
/// let a = ScopeId::new();
/// let b = ScopeId::new();
/// assert_ne!(a, b);
/// assert!(a.to_string().starts_with("scope:"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub Uuid);

impl ScopeId {
    /// Creates a new [`ScopeId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_is_deterministic() {
        let a = ExtensionTypeId::new("acme", "timing");
        let b = ExtensionTypeId::new("acme", "timing");
        assert_eq!(a.uuid(), b.uuid());
        assert_eq!(a, b);
    }

    #[test]
    fn type_id_differs_by_namespace() {
        let a = ExtensionTypeId::new("acme", "timing");
        let b = ExtensionTypeId::new("other", "timing");
        assert_ne!(a.uuid(), b.uuid());
        assert_ne!(a, b);
    }

    #[test]
    fn builtin_namespace() {
        let id = ExtensionTypeId::builtin("test_info_resolver");
        assert_eq!(id.namespace(), "builtin");
        assert_eq!(id.name(), "test_info_resolver");
        assert!(id.is_builtin());
        assert!(!ExtensionTypeId::new("acme", "x").is_builtin());
    }

    #[test]
    fn display_is_fqn() {
        let id = ExtensionTypeId::new("acme", "timing");
        assert_eq!(id.to_string(), "acme::timing");
        assert_eq!(id.fqn(), "acme::timing");
    }

    #[test]
    fn parse_valid() {
        let id = ExtensionTypeId::parse("builtin::disabled_condition").expect("valid");
        assert_eq!(id, ExtensionTypeId::builtin("disabled_condition"));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "acme", "acme::", "::x", "a::b::c", "a b::c", "a:: c"] {
            assert!(ExtensionTypeId::parse(bad).is_none(), "{bad:?} should fail");
        }
    }

    #[test]
    fn scope_id_uniqueness_and_display() {
        let a = ScopeId::new();
        let b = ScopeId::new();
        assert_ne!(a, b);
        assert_eq!(a.uuid(), a.0);
        assert_eq!(a.to_string(), format!("scope:{}", a.0));
        assert_ne!(ScopeId::default(), ScopeId::default());
    }

    #[test]
    fn serializes_as_fqn() {
        let id = ExtensionTypeId::new("acme", "timing");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, r#""acme::timing""#);
        let restored: ExtensionTypeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, id);
        assert_eq!(restored.uuid(), id.uuid());
    }

    #[test]
    fn deserialize_rejects_malformed_and_foreign_uuid() {
        let err = serde_json::from_str::<ExtensionTypeId>(r#""timing""#)
            .expect_err("missing namespace");
        assert!(err.to_string().contains("expected 'namespace::name'"));

        let forged = r#"{"uuid":"00000000-0000-0000-0000-000000000000","namespace":"acme","name":"timing"}"#;
        assert!(serde_json::from_str::<ExtensionTypeId>(forged).is_err());
    }
}
