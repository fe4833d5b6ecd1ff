// crates/epsg-core/src/core/properties.rs
// ============================================================================
// Module: Identification Properties
// Description: Property bag shared by every identified object.
// Purpose: Carry name, identifier, aliases, remarks, area, and scope.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`Properties`] is the identification bag handed to every object
//! constructor. Blank remarks, scope, and extra values are omitted rather than
//! stored as empty strings. [`Properties::entries`] exposes the same content as
//! a flat key/value map using the `*_KEY` constants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::extent::Extent;
use crate::core::identifiers::AuthorityCode;

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Key of the primary name.
pub const NAME_KEY: &str = "name";
/// Key of the authority identifier.
pub const IDENTIFIERS_KEY: &str = "identifiers";
/// Key of the alias list.
pub const ALIAS_KEY: &str = "alias";
/// Key of the remarks.
pub const REMARKS_KEY: &str = "remarks";
/// Key of the valid area description.
pub const VALID_AREA_KEY: &str = "valid_area";
/// Key of the scope.
pub const SCOPE_KEY: &str = "scope";

// ============================================================================
// SECTION: Scoped Names
// ============================================================================

/// Alias name, optionally scoped by the naming system that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScopedName {
    /// Naming system (scope), absent for generic aliases.
    pub scope: Option<String>,
    /// Alias text.
    pub name: String,
}

impl ScopedName {
    /// Creates an alias scoped by a naming system.
    #[must_use]
    pub fn scoped(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            name: name.into(),
        }
    }

    /// Creates a generic (unscoped) alias.
    #[must_use]
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            scope: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{scope}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Identification properties of a georeferencing object.
///
/// # Invariants
/// - `remarks`, `scope`, and `extras` values are trimmed and never blank.
/// - `aliases` keep the insertion order of the alias query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Properties {
    /// Primary name.
    pub name: String,
    /// Authority identifier, absent for objects assembled at runtime.
    pub identifier: Option<AuthorityCode>,
    /// Alternative names.
    pub aliases: Vec<ScopedName>,
    /// Free-text remarks.
    pub remarks: Option<String>,
    /// Area of use.
    pub valid_area: Option<Arc<Extent>>,
    /// Scope of use.
    pub scope: Option<String>,
    /// Additional prefixed entries merged from a related object.
    pub extras: BTreeMap<String, String>,
}

impl Properties {
    /// Creates properties holding only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            aliases: Vec::new(),
            remarks: None,
            valid_area: None,
            scope: None,
            extras: BTreeMap::new(),
        }
    }

    /// Creates properties holding a name and an authority identifier.
    #[must_use]
    pub fn identified(name: impl Into<String>, identifier: AuthorityCode) -> Self {
        let mut properties = Self::named(name);
        properties.identifier = Some(identifier);
        properties
    }

    /// Sets the remarks, omitting blank text.
    #[must_use]
    pub fn with_remarks(mut self, remarks: Option<&str>) -> Self {
        self.remarks = non_blank(remarks);
        self
    }

    /// Sets the scope, omitting blank text.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<&str>) -> Self {
        self.scope = non_blank(scope);
        self
    }

    /// Sets the area of use.
    #[must_use]
    pub fn with_valid_area(mut self, area: Option<Arc<Extent>>) -> Self {
        self.valid_area = area;
        self
    }

    /// Sets the aliases.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<ScopedName>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Returns the authority code text, if identified.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.identifier.as_ref().map(AuthorityCode::code)
    }

    /// Inserts an extra entry, omitting blank values.
    pub fn insert_extra(&mut self, key: impl Into<String>, value: &str) {
        if let Some(value) = non_blank(Some(value)) {
            self.extras.insert(key.into(), value);
        }
    }

    /// Merges the flat entries of `other` under `prefix`.
    ///
    /// Keys are written as `{prefix}.{key}` so that they never collide with
    /// this bag's own keys.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Self) {
        for (key, value) in other.entries() {
            self.extras.insert(format!("{prefix}.{key}"), value);
        }
    }

    /// Returns the flat key/value view of the bag.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(NAME_KEY.to_string(), self.name.clone());
        if let Some(identifier) = &self.identifier {
            map.insert(IDENTIFIERS_KEY.to_string(), identifier.to_string());
        }
        if !self.aliases.is_empty() {
            let joined = self.aliases.iter().map(ToString::to_string).collect::<Vec<_>>();
            map.insert(ALIAS_KEY.to_string(), joined.join(", "));
        }
        if let Some(remarks) = &self.remarks {
            map.insert(REMARKS_KEY.to_string(), remarks.clone());
        }
        if let Some(description) = self.valid_area.as_ref().and_then(|area| area.description.clone())
        {
            map.insert(VALID_AREA_KEY.to_string(), description);
        }
        if let Some(scope) = &self.scope {
            map.insert(SCOPE_KEY.to_string(), scope.clone());
        }
        for (key, value) in &self.extras {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// Trims `value` and returns it unless it is absent or blank.
fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|text| !text.is_empty()).map(str::to_string)
}
