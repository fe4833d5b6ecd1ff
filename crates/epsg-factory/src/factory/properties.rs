// crates/epsg-factory/src/factory/properties.rs
// ============================================================================
// Module: Properties Builder
// Description: Identification properties of objects read from the dataset.
// Purpose: Assemble name, identifier, aliases, remarks, area, and scope.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! Aliases keep the order of the alias query and are scoped by their naming
//! system. Naming system names are memoized per factory since the dataset
//! only defines a handful of them. Blank remarks, areas, and scopes are
//! omitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use epsg_core::AuthorityCode;
use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Properties;
use epsg_core::ScopedName;
use epsg_core::SqlValue;

use super::Session;
use super::bind;
use crate::decoder::RowDecoder;
use crate::queries;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Identification columns decoded from one row.
#[derive(Debug, Clone, Default)]
pub(super) struct Identity {
    /// Primary name.
    pub name: String,
    /// Remarks text.
    pub remarks: Option<String>,
    /// Area of use code.
    pub area_code: Option<String>,
    /// Scope text.
    pub scope: Option<String>,
}

impl Identity {
    /// Creates an identity holding only a name.
    pub(super) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the remarks.
    pub(super) fn with_remarks(mut self, remarks: Option<String>) -> Self {
        self.remarks = remarks;
        self
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

impl Session<'_> {
    /// Builds the properties of `code` stored in `table`.
    pub(super) fn properties(
        &mut self,
        table: &str,
        code: &str,
        identity: Identity,
    ) -> Result<Properties, FactoryError> {
        let aliases = self.aliases(table, code)?;
        let valid_area = match identity.area_code.as_deref() {
            Some(area) => Some(self.extent_by_key(area)?),
            None => None,
        };
        Ok(Properties::identified(identity.name, AuthorityCode::new(self.authority, code))
            .with_aliases(aliases)
            .with_remarks(identity.remarks.as_deref())
            .with_valid_area(valid_area)
            .with_scope(identity.scope.as_deref()))
    }

    /// Returns the aliases of `code` in `table`, in query order.
    fn aliases(&mut self, table: &str, code: &str) -> Result<Vec<ScopedName>, FactoryError> {
        let owner = self.state.dialect.object_table_name(table);
        let spec = &queries::ALIASES;
        let rows = self.fetch(
            spec,
            &[SqlValue::from(owner.as_str()), bind(code)],
            ObjectType::IdentifiedObject,
            code,
        )?;
        let mut aliases = Vec::with_capacity(rows.len());
        for row in &rows {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::IdentifiedObject, code);
            let Some(alias) = decoder.optional_string("ALIAS")? else {
                continue;
            };
            let scope = match decoder.optional_i64("NAMING_SYSTEM_CODE")? {
                Some(system) => self.naming_system(system)?,
                None => None,
            };
            aliases.push(match scope {
                Some(scope) => ScopedName::scoped(scope, alias),
                None => ScopedName::generic(alias),
            });
        }
        Ok(aliases)
    }

    /// Returns the name of naming system `code`, memoized.
    fn naming_system(&mut self, code: i64) -> Result<Option<String>, FactoryError> {
        if let Some(name) = self.state.naming_systems.get(&code) {
            return Ok(name.clone());
        }
        let key = code.to_string();
        let spec = &queries::NAMING_SYSTEM;
        let rows =
            self.fetch(spec, &[SqlValue::Integer(code)], ObjectType::IdentifiedObject, &key)?;
        let name = match rows.first() {
            Some(row) => RowDecoder::new(row, spec.columns, ObjectType::IdentifiedObject, &key)
                .optional_string("NAMING_SYSTEM_NAME")?,
            None => None,
        };
        self.state.naming_systems.insert(code, name.clone());
        Ok(name)
    }
}
