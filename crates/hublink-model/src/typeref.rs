//! Parsing of component type names.
//!
//! Type names are dotted paths with an optional version suffix:
//! `org.activehome.energy.Meter/1.2.0`. The version is stripped before
//! the path is split, since versions may themselves contain dots.

/// A component type name split into its package path and simple name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef<'a> {
    package: &'a str,
    simple: &'a str,
}

impl<'a> TypeRef<'a> {
    /// Splits a type name. Never fails: a name without dots has an empty
    /// package path.
    #[must_use]
    pub fn parse(type_name: &'a str) -> Self {
        let path = type_name.split_once('/').map_or(type_name, |(path, _)| path);
        let (package, simple) = path.rsplit_once('.').unwrap_or(("", path));
        Self { package, simple }
    }

    /// Dotted package path, empty when the name is unqualified.
    #[must_use]
    pub const fn package(&self) -> &'a str {
        self.package
    }

    /// Last path segment without version.
    #[must_use]
    pub const fn simple_name(&self) -> &'a str {
        self.simple
    }

    /// Whether two type names denote the same simple type.
    ///
    /// Package qualifiers and versions are ignored; the comparison is
    /// case-sensitive.
    #[must_use]
    pub fn same_simple_name(&self, other: &TypeRef<'_>) -> bool {
        self.simple == other.simple
    }
}
