// crates/epsg-factory/src/codes.rs
// ============================================================================
// Module: Authority Code Sets
// Description: Lazily queried sets of the codes of one object type.
// Purpose: Count, probe, and page through codes without materializing them.
// Dependencies: epsg-core, tracing
// ============================================================================

//! ## Overview
//! An [`AuthorityCodeSet`] answers every question with a targeted query on
//! the owning factory. Subtypes (for example projected CRSs) filter on the
//! table's discriminator column. Iteration pages through codes in ascending
//! order, one batch at a time, keyed on the last code seen, so no cursor is
//! held between batches. Codes recorded on several rows are reported once.
//!
//! The simple predicates never fail: a backend failure is logged and reported
//! as an empty answer. Only [`AuthorityCodeSet::iter`] surfaces errors, when
//! fetching its first batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::OnceLock;

use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Row;
use epsg_core::SqlValue;
use epsg_core::is_primary_key;
use epsg_core::trim_authority;
use tracing::warn;

use crate::factory::EpsgFactory;
use crate::tables::TableDescriptor;

// ============================================================================
// SECTION: Code Set
// ============================================================================

/// Set of the codes of one object type.
///
/// # Invariants
/// - `size` is cached after the first successful count.
#[derive(Debug)]
pub struct AuthorityCodeSet {
    /// Factory answering the queries.
    factory: Arc<EpsgFactory>,
    /// Object type enumerated.
    object_type: ObjectType,
    /// Table holding the codes.
    descriptor: &'static TableDescriptor,
    /// Cached number of codes.
    size: OnceLock<usize>,
}

impl AuthorityCodeSet {
    /// Creates the set of `object_type` codes stored in `descriptor`'s table.
    pub(crate) const fn new(
        factory: Arc<EpsgFactory>,
        object_type: ObjectType,
        descriptor: &'static TableDescriptor,
    ) -> Self {
        Self {
            factory,
            object_type,
            descriptor,
            size: OnceLock::new(),
        }
    }

    /// Returns the object type enumerated.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Returns the subtype condition and its parameter, if filtered.
    fn subtype_filter(&self) -> Option<(String, SqlValue)> {
        let pattern = self.descriptor.subtype_pattern(self.object_type)?;
        let column = self.descriptor.type_column?;
        Some((format!("{column} LIKE ?"), SqlValue::from(pattern)))
    }

    /// Runs `SELECT {select} FROM table WHERE {conditions}` plus `tail`.
    fn query(
        &self,
        purpose: &str,
        select: &str,
        conditions: &[&str],
        mut params: Vec<SqlValue>,
        tail: &str,
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, FactoryError> {
        let mut clauses: Vec<String> = conditions.iter().map(|clause| (*clause).to_string()).collect();
        if let Some((clause, pattern)) = self.subtype_filter() {
            clauses.push(clause);
            params.push(pattern);
        }
        let key = format!("codes:{purpose}:{}", self.object_type);
        let table = self.descriptor.table;
        let sql = || {
            let filter = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };
            format!("SELECT {select} FROM [{table}]{filter}{tail}")
        };
        self.factory.code_query(self.object_type, &key, sql, &params, max_rows)
    }

    /// Returns the number of codes, or zero when counting fails.
    #[must_use]
    pub fn size(&self) -> usize {
        if let Some(size) = self.size.get() {
            return *size;
        }
        let select = format!("COUNT(DISTINCT {})", self.descriptor.code_column);
        let counted = self
            .query("size", &select, &[], Vec::new(), "", Some(1))
            .map(|rows| {
                rows.first()
                    .and_then(|row| row.get(0))
                    .and_then(SqlValue::as_i64)
                    .and_then(|count| usize::try_from(count).ok())
                    .unwrap_or(0)
            });
        match counted {
            Ok(size) => *self.size.get_or_init(|| size),
            Err(err) => {
                warn!(object_type = %self.object_type, error = %err, "failed to count codes");
                0
            }
        }
    }

    /// Returns `true` when the set holds no code, or when probing fails.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let code = self.descriptor.code_column;
        match self.query("any", code, &[], Vec::new(), "", Some(1)) {
            Ok(rows) => rows.is_empty(),
            Err(err) => {
                warn!(object_type = %self.object_type, error = %err, "failed to probe codes");
                true
            }
        }
    }

    /// Returns `true` when `code` belongs to the set.
    ///
    /// Names are not resolved; only primary keys can be members.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        let trimmed = trim_authority(code, self.factory.authority());
        let Ok(key) = trimmed.parse::<i64>() else {
            return false;
        };
        if !is_primary_key(trimmed) {
            return false;
        }
        let column = self.descriptor.code_column;
        let condition = format!("{column} = ?");
        match self.query(
            "contains",
            column,
            &[condition.as_str()],
            vec![SqlValue::Integer(key)],
            "",
            Some(1),
        ) {
            Ok(rows) => !rows.is_empty(),
            Err(err) => {
                warn!(object_type = %self.object_type, code, error = %err, "failed to probe code");
                false
            }
        }
    }

    /// Fetches up to one batch of codes greater than `after`.
    fn batch(&self, after: i64) -> Result<Vec<Row>, FactoryError> {
        let column = self.descriptor.code_column;
        let select = format!("DISTINCT {column}");
        let condition = format!("{column} > ?");
        let tail = format!(" ORDER BY {column}");
        self.query(
            "page",
            &select,
            &[condition.as_str()],
            vec![SqlValue::Integer(after)],
            &tail,
            Some(self.factory.options().batch_size()),
        )
    }

    /// Returns an iterator over the codes in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the first batch cannot be fetched.
    pub fn iter(&self) -> Result<CodeIter<'_>, FactoryError> {
        let mut iter = CodeIter {
            set: self,
            buffer: VecDeque::new(),
            last: None,
            exhausted: false,
        };
        let rows = self.batch(i64::MIN)?;
        iter.absorb(&rows);
        Ok(iter)
    }

    /// Returns a code-to-name view of the set.
    #[must_use]
    pub const fn names(&self) -> NameMap<'_> {
        NameMap {
            set: self,
        }
    }
}

// ============================================================================
// SECTION: Iteration
// ============================================================================

/// Ascending iterator over the codes of a set.
#[derive(Debug)]
pub struct CodeIter<'a> {
    /// Set being iterated.
    set: &'a AuthorityCodeSet,
    /// Codes fetched but not yet yielded.
    buffer: VecDeque<String>,
    /// Last code fetched.
    last: Option<i64>,
    /// Set once a short batch was fetched.
    exhausted: bool,
}

impl CodeIter<'_> {
    /// Appends the codes of a fetched batch.
    fn absorb(&mut self, rows: &[Row]) {
        if rows.len() < self.set.factory.options().batch_size() {
            self.exhausted = true;
        }
        for value in rows.iter().filter_map(|row| row.get(0)) {
            if let Some(code) = value.as_i64() {
                self.last = Some(code);
            }
            if let Some(text) = value.as_text() {
                self.buffer.push_back(text);
            }
        }
        if self.last.is_none() {
            self.exhausted = true;
        }
    }
}

impl Iterator for CodeIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            let after = self.last.unwrap_or(i64::MIN);
            match self.set.batch(after) {
                Ok(rows) => self.absorb(&rows),
                Err(err) => {
                    warn!(
                        object_type = %self.set.object_type,
                        error = %err,
                        "failed to fetch codes; ending iteration"
                    );
                    self.exhausted = true;
                }
            }
        }
        self.buffer.pop_front()
    }
}

// ============================================================================
// SECTION: Name Map
// ============================================================================

/// Code-to-name view of an [`AuthorityCodeSet`].
#[derive(Debug, Clone, Copy)]
pub struct NameMap<'a> {
    /// Underlying set.
    set: &'a AuthorityCodeSet,
}

impl NameMap<'_> {
    /// Returns the name of `code`, or `None` when it is not in the set.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<String> {
        if !self.set.contains(code) {
            return None;
        }
        let Some(name_column) = self.set.descriptor.name_column else {
            return self.set.factory.description_in(self.set.descriptor, code).ok();
        };
        let trimmed = trim_authority(code, self.set.factory.authority());
        let key = trimmed.parse::<i64>().ok()?;
        let condition = format!("{} = ?", self.set.descriptor.code_column);
        match self.set.query(
            "name",
            name_column,
            &[condition.as_str()],
            vec![SqlValue::Integer(key)],
            "",
            Some(1),
        ) {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.get(0))
                .and_then(SqlValue::as_text)
                .map(|name| name.trim().to_string()),
            Err(err) => {
                warn!(object_type = %self.set.object_type, code, error = %err, "failed to read name");
                None
            }
        }
    }
}
