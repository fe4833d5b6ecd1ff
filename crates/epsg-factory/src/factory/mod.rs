// crates/epsg-factory/src/factory/mod.rs
// ============================================================================
// Module: EPSG Object Factory
// Description: Resolves authority codes to immutable referencing objects.
// Purpose: Query, decode, and recursively assemble objects from EPSG rows.
// Dependencies: epsg-core, parking_lot, tracing
// ============================================================================

//! ## Overview
//! [`EpsgFactory`] owns one backend connection and serializes every request
//! on it behind a single lock. The lock is taken once per public call; the
//! guarded state is then threaded through the recursive construction of
//! sub-objects (CRS to datum to ellipsoid to unit) as a session, so a
//! nested lookup never re-acquires it.
//!
//! Queries materialize all of their rows before any value is decoded, so no
//! cursor is ever open across a recursive call.
//!
//! Codes are classified first: text made only of digits is a primary key,
//! anything else is looked up in the table's name column. A name matching no
//! row is retried as a literal key (and fails as not found); a name matching
//! several rows is ambiguous.
//!
//! Objects are pooled weakly by code, so repeated requests return the same
//! instance while a caller holds it. Datums built while a datum-shift guard is
//! active are not pooled because their back-references were cut short; they
//! are kept for the rest of the call instead, so each shift target is built
//! once per request however densely the datums link to each other.

// ============================================================================
// SECTION: Submodules
// ============================================================================

mod crs;
mod cs;
mod datum;
mod operations;
mod properties;
mod referencing;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Weak;

use epsg_core::BackendError;
use epsg_core::CoordinateOperation;
use epsg_core::CoordinateReferenceSystem;
use epsg_core::CoordinateSystem;
use epsg_core::CoordinateSystemAxis;
use epsg_core::Datum;
use epsg_core::Ellipsoid;
use epsg_core::EpsgConnection;
use epsg_core::Extent;
use epsg_core::FactoryError;
use epsg_core::IdentifiedObject;
use epsg_core::ObjectType;
use epsg_core::OperationAssembler;
use epsg_core::OperationMethod;
use epsg_core::ParameterDescriptor;
use epsg_core::PrimeMeridian;
use epsg_core::Row;
use epsg_core::SqlValue;
use epsg_core::Unit;
use epsg_core::WeakValueMap;
use epsg_core::is_primary_key;
use epsg_core::trim_authority;
use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use crate::codes::AuthorityCodeSet;
use crate::dialect::SqlDialect;
use crate::options::FactoryOptions;
use crate::queries::QuerySpec;
use crate::statements::StatementPool;
use crate::tables;
use crate::tables::TABLES;
use crate::tables::TableDescriptor;

// ============================================================================
// SECTION: Ownership
// ============================================================================

/// Who closes the backend connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionOwnership {
    /// The factory closes the connection on [`EpsgFactory::dispose`].
    #[default]
    Owned,
    /// The connection is a long-lived service; disposal releases statements
    /// and caches, and the connection closes when the factory is dropped.
    Service,
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Weak per-type object pools keyed by primary key.
#[derive(Debug, Default)]
struct ObjectPools {
    /// Units of measure.
    units: WeakValueMap<String, Unit>,
    /// Ellipsoids.
    ellipsoids: WeakValueMap<String, Ellipsoid>,
    /// Prime meridians.
    prime_meridians: WeakValueMap<String, PrimeMeridian>,
    /// Areas of use.
    extents: WeakValueMap<String, Extent>,
    /// Datums.
    datums: WeakValueMap<String, Datum>,
    /// Coordinate system axes.
    axes: WeakValueMap<String, CoordinateSystemAxis>,
    /// Coordinate systems.
    coordinate_systems: WeakValueMap<String, CoordinateSystem>,
    /// Coordinate reference systems.
    crs: WeakValueMap<String, CoordinateReferenceSystem>,
    /// Operation methods.
    methods: WeakValueMap<String, OperationMethod>,
    /// Parameter descriptors.
    parameters: WeakValueMap<String, ParameterDescriptor>,
    /// Coordinate operations.
    operations: WeakValueMap<String, CoordinateOperation>,
}

impl ObjectPools {
    /// Drops every entry.
    fn clear(&mut self) {
        self.units.clear();
        self.ellipsoids.clear();
        self.prime_meridians.clear();
        self.extents.clear();
        self.datums.clear();
        self.axes.clear();
        self.coordinate_systems.clear();
        self.crs.clear();
        self.methods.clear();
        self.parameters.clear();
        self.operations.clear();
    }
}

/// Types held in one of the weak object pools.
trait Pooled: Sized {
    /// Whether values built under a datum-shift guard lack back-references.
    const CUT_BY_SHIFT_GUARD: bool = false;

    /// Selects the pool holding values of this type.
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self>;
}

impl Pooled for Unit {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.units
    }
}

impl Pooled for Ellipsoid {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.ellipsoids
    }
}

impl Pooled for PrimeMeridian {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.prime_meridians
    }
}

impl Pooled for Extent {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.extents
    }
}

impl Pooled for Datum {
    const CUT_BY_SHIFT_GUARD: bool = true;

    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.datums
    }
}

impl Pooled for CoordinateSystemAxis {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.axes
    }
}

impl Pooled for CoordinateSystem {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.coordinate_systems
    }
}

impl Pooled for CoordinateReferenceSystem {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.crs
    }
}

impl Pooled for OperationMethod {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.methods
    }
}

impl Pooled for ParameterDescriptor {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.parameters
    }
}

impl Pooled for CoordinateOperation {
    fn pool(pools: &mut ObjectPools) -> &mut WeakValueMap<String, Self> {
        &mut pools.operations
    }
}

/// Mutable per-factory state, only touched under the factory lock.
struct FactoryState {
    /// Backend connection; `None` once closed.
    connection: Option<Box<dyn EpsgConnection>>,
    /// Prepared statements.
    statements: StatementPool,
    /// Query text dialect.
    dialect: SqlDialect,
    /// Datums whose shift targets are being resolved.
    shift_guard: BTreeSet<String>,
    /// Shift targets built during the current call, keyed by datum code.
    shift_targets: HashMap<String, Arc<Datum>>,
    /// Concatenated operations whose steps are being resolved.
    operation_guard: BTreeSet<String>,
    /// Table index of the previous successful generic lookup.
    last_table: Option<usize>,
    /// Naming system names by code.
    naming_systems: HashMap<i64, Option<String>>,
    /// Weak object pools.
    pools: ObjectPools,
    /// Set once disposed.
    disposed: bool,
}

impl FactoryState {
    /// Runs a pooled statement and materializes its rows.
    fn query(
        &mut self,
        key: &str,
        sql: impl FnOnce() -> String,
        params: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, BackendError> {
        let dialect = self.dialect;
        let connection = self.connection.as_deref_mut().ok_or(BackendError::Closed)?;
        let handle = self.statements.handle(connection, key, || dialect.rewrite(&sql()))?;
        connection.query(handle, params, max_rows)
    }

    /// Releases statements and, when `close` is set, the connection.
    fn release(&mut self, close: bool) {
        if let Some(connection) = self.connection.as_deref_mut() {
            if !self.statements.is_empty() {
                for err in self.statements.close_all(connection) {
                    warn!(error = %err, "failed to release prepared statement");
                }
            }
            if close {
                if let Err(err) = connection.close() {
                    warn!(error = %err, "failed to close epsg connection");
                }
                self.connection = None;
            }
        } else {
            self.statements.clear();
        }
    }
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// EPSG-backed object factory.
///
/// # Invariants
/// - Every query on the connection runs while the state lock is held.
/// - After [`EpsgFactory::dispose`] every request fails with
///   [`FactoryError::Disposed`].
pub struct EpsgFactory {
    /// Factory tunables.
    options: FactoryOptions,
    /// Operation assembler shared with other factories.
    assembler: Arc<OperationAssembler>,
    /// Connection ownership.
    ownership: ConnectionOwnership,
    /// Description of the data source.
    source: String,
    /// Guarded state.
    state: Mutex<FactoryState>,
    /// Code sets handed out, held weakly.
    code_sets: Mutex<HashMap<ObjectType, Weak<AuthorityCodeSet>>>,
}

impl std::fmt::Debug for EpsgFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpsgFactory")
            .field("authority", &self.options.authority)
            .field("source", &self.source)
            .field("ownership", &self.ownership)
            .finish_non_exhaustive()
    }
}

impl EpsgFactory {
    /// Creates a factory owning `connection`.
    #[must_use]
    pub fn new(
        connection: Box<dyn EpsgConnection>,
        assembler: Arc<OperationAssembler>,
        options: FactoryOptions,
    ) -> Self {
        Self::with_ownership(connection, assembler, options, ConnectionOwnership::Owned)
    }

    /// Creates a factory with explicit connection ownership.
    #[must_use]
    pub fn with_ownership(
        connection: Box<dyn EpsgConnection>,
        assembler: Arc<OperationAssembler>,
        options: FactoryOptions,
        ownership: ConnectionOwnership,
    ) -> Self {
        let source = connection.describe();
        let state = FactoryState {
            connection: Some(connection),
            statements: StatementPool::new(),
            dialect: options.dialect,
            shift_guard: BTreeSet::new(),
            shift_targets: HashMap::new(),
            operation_guard: BTreeSet::new(),
            last_table: None,
            naming_systems: HashMap::new(),
            pools: ObjectPools::default(),
            disposed: false,
        };
        Self {
            options,
            assembler,
            ownership,
            source,
            state: Mutex::new(state),
            code_sets: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the naming authority.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.options.authority
    }

    /// Returns the factory options.
    #[must_use]
    pub const fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// Returns the operation assembler.
    #[must_use]
    pub const fn assembler(&self) -> &Arc<OperationAssembler> {
        &self.assembler
    }

    /// Returns the description of the backing data source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the number of prepared statements currently pooled.
    #[must_use]
    pub fn prepared_statements(&self) -> usize {
        self.state.lock().statements.len()
    }

    /// Runs `build` with the guarded state.
    fn with_session<T>(
        &self,
        build: impl FnOnce(&mut Session<'_>) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        let mut state = self.state.lock();
        if state.disposed {
            return Err(FactoryError::Disposed);
        }
        let mut session = Session {
            authority: &self.options.authority,
            assembler: &self.assembler,
            state: &mut *state,
        };
        let result = build(&mut session);
        state.shift_targets.clear();
        result
    }

    // ------------------------------------------------------------------------
    // Generic lookups
    // ------------------------------------------------------------------------

    /// Creates the object identified by `code`, whatever table holds it.
    ///
    /// The table that answered the previous lookup is tried first. A primary
    /// key stops at the first table holding it; a name is matched against
    /// every table.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::NotFound`] when no table holds the code,
    /// [`FactoryError::Ambiguous`] when a name matches in several places, and
    /// any construction error of the owning type.
    pub fn create_object(&self, code: &str) -> Result<IdentifiedObject, FactoryError> {
        self.with_session(|session| {
            let (index, key) = session.locate(code)?;
            session.dispatch(index, &key)
        })
    }

    /// Returns the name of the object identified by `code`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`EpsgFactory::create_object`].
    pub fn description_text(&self, code: &str) -> Result<String, FactoryError> {
        self.with_session(|session| {
            let (index, key) = session.locate(code)?;
            session.description(index, &key)
        })
    }

    /// Returns the name of `code` within the table of `descriptor`.
    pub(crate) fn description_in(
        &self,
        descriptor: &'static TableDescriptor,
        code: &str,
    ) -> Result<String, FactoryError> {
        self.with_session(|session| {
            let index = TABLES
                .iter()
                .position(|candidate| std::ptr::eq(candidate, descriptor))
                .ok_or_else(|| FactoryError::not_found(descriptor.object_type, code))?;
            let key = session.resolve(descriptor, code)?;
            session.description(index, &key)
        })
    }

    // ------------------------------------------------------------------------
    // Typed lookups
    // ------------------------------------------------------------------------

    /// Creates a unit of measure.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_unit(&self, code: &str) -> Result<Arc<Unit>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::UNIT_TABLE, code)?;
            session.unit_by_key(&key)
        })
    }

    /// Creates an ellipsoid.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_ellipsoid(&self, code: &str) -> Result<Arc<Ellipsoid>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::ELLIPSOID_TABLE, code)?;
            session.ellipsoid_by_key(&key)
        })
    }

    /// Creates a prime meridian.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_prime_meridian(&self, code: &str) -> Result<Arc<PrimeMeridian>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::PRIME_MERIDIAN_TABLE, code)?;
            session.prime_meridian_by_key(&key)
        })
    }

    /// Creates an area of use.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_extent(&self, code: &str) -> Result<Arc<Extent>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::AREA_TABLE, code)?;
            session.extent_by_key(&key)
        })
    }

    /// Creates a datum, including its datum shifts when geodetic.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_datum(&self, code: &str) -> Result<Arc<Datum>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::DATUM_TABLE, code)?;
            session.datum_by_key(&key)
        })
    }

    /// Creates a coordinate system axis.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_coordinate_system_axis(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateSystemAxis>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::AXIS_TABLE, code)?;
            session.axis_by_key(&key)
        })
    }

    /// Creates a coordinate system with its axes.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_coordinate_system(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateSystem>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::CS_TABLE, code)?;
            session.coordinate_system_by_key(&key)
        })
    }

    /// Creates a coordinate reference system.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_coordinate_reference_system(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateReferenceSystem>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::CRS_TABLE, code)?;
            session.crs_by_key(&key)
        })
    }

    /// Creates an operation method with its parameter descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_operation_method(&self, code: &str) -> Result<Arc<OperationMethod>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::METHOD_TABLE, code)?;
            session.method_by_key(&key)
        })
    }

    /// Creates an operation parameter descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_parameter_descriptor(
        &self,
        code: &str,
    ) -> Result<Arc<ParameterDescriptor>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::PARAMETER_TABLE, code)?;
            session.parameter_by_key(&key)
        })
    }

    /// Creates a coordinate operation.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the code cannot be resolved or built.
    pub fn create_coordinate_operation(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        self.with_session(|session| {
            let key = session.resolve(tables::OPERATION_TABLE, code)?;
            session.operation_by_key(&key)
        })
    }

    /// Creates every recorded operation from `source` to `target`.
    ///
    /// Operations are ordered non-deprecated first, then by accuracy.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when either CRS code cannot be resolved or an
    /// operation cannot be built.
    pub fn create_from_coordinate_reference_system_codes(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<Arc<CoordinateOperation>>, FactoryError> {
        self.with_session(|session| session.operations_between(source, target))
    }

    // ------------------------------------------------------------------------
    // Code sets
    // ------------------------------------------------------------------------

    /// Returns the set of codes of `object_type`.
    ///
    /// Sets are cached weakly per type: while a caller holds a set, a second
    /// request returns the same instance.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Disposed`] after disposal and
    /// [`FactoryError::Unsupported`] for types no table holds.
    pub fn authority_codes(
        self: &Arc<Self>,
        object_type: ObjectType,
    ) -> Result<Arc<AuthorityCodeSet>, FactoryError> {
        if self.is_disposed() {
            return Err(FactoryError::Disposed);
        }
        let descriptor = tables::descriptor(object_type).ok_or_else(|| {
            FactoryError::Unsupported(format!("no table enumerates {object_type} codes"))
        })?;
        let mut sets = self.code_sets.lock();
        if let Some(set) = sets.get(&object_type).and_then(Weak::upgrade) {
            return Ok(set);
        }
        let set = Arc::new(AuthorityCodeSet::new(Arc::clone(self), object_type, descriptor));
        sets.insert(object_type, Arc::downgrade(&set));
        Ok(set)
    }

    /// Runs an enumeration query for a code set.
    pub(crate) fn code_query(
        &self,
        object_type: ObjectType,
        key: &str,
        sql: impl FnOnce() -> String,
        params: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, FactoryError> {
        let mut state = self.state.lock();
        if state.disposed {
            return Err(FactoryError::Disposed);
        }
        state
            .query(key, sql, params, max_rows)
            .map_err(|err| backing_store(object_type, key, &err))
    }

    // ------------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------------

    /// Returns `true` unless a caller still holds a code set.
    #[must_use]
    pub fn can_dispose(&self) -> bool {
        self.code_sets.lock().values().all(|set| set.strong_count() == 0)
    }

    /// Returns `true` once disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Releases statements, caches, and (when owned) the connection.
    ///
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.release(self.ownership == ConnectionOwnership::Owned);
        state.pools.clear();
        state.naming_systems.clear();
        state.last_table = None;
        self.code_sets.lock().clear();
        debug!(source = %self.source, "disposed epsg factory");
    }
}

impl Drop for EpsgFactory {
    fn drop(&mut self) {
        self.state.get_mut().release(true);
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Guarded state plus the read-only context of one public call.
struct Session<'a> {
    /// Naming authority.
    authority: &'a str,
    /// Operation assembler.
    assembler: &'a OperationAssembler,
    /// Guarded state.
    state: &'a mut FactoryState,
}

impl Session<'_> {
    /// Runs `spec` with `params`, wrapping failures for `object_type` `code`.
    fn fetch(
        &mut self,
        spec: &QuerySpec,
        params: &[SqlValue],
        object_type: ObjectType,
        code: &str,
    ) -> Result<Vec<Row>, FactoryError> {
        self.state
            .query(spec.key, || spec.sql(), params, None)
            .map_err(|err| backing_store(object_type, code, &err))
    }

    /// Runs ad-hoc text under `key`, wrapping failures for `object_type` `code`.
    fn fetch_sql(
        &mut self,
        key: &str,
        sql: impl FnOnce() -> String,
        params: &[SqlValue],
        max_rows: Option<usize>,
        object_type: ObjectType,
        code: &str,
    ) -> Result<Vec<Row>, FactoryError> {
        self.state
            .query(key, sql, params, max_rows)
            .map_err(|err| backing_store(object_type, code, &err))
    }

    /// Builds one value per row and requires every row to agree.
    fn singleton<T: PartialEq>(
        &mut self,
        object_type: ObjectType,
        code: &str,
        rows: &[Row],
        mut build: impl FnMut(&mut Self, &Row) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        let mut result: Option<T> = None;
        for row in rows {
            let candidate = build(self, row)?;
            match &result {
                Some(previous) if *previous != candidate => {
                    return Err(FactoryError::malformed(
                        object_type,
                        code,
                        format!("duplicated values for {object_type}"),
                    ));
                }
                Some(_) => {}
                None => result = Some(candidate),
            }
        }
        result.ok_or_else(|| FactoryError::not_found(object_type, code))
    }

    /// Registers `value` in its pool unless it may have been cut short by an
    /// active datum-shift guard.
    fn remember<T: Pooled>(&mut self, key: &str, value: Arc<T>) -> Arc<T> {
        if !T::CUT_BY_SHIFT_GUARD || self.state.shift_guard.is_empty() {
            T::pool(&mut self.state.pools).insert(key.to_string(), &value);
        }
        value
    }

    /// Returns the pooled value registered under `key`.
    fn pooled<T: Pooled>(&mut self, key: &str) -> Option<Arc<T>> {
        T::pool(&mut self.state.pools).get(&key.to_string())
    }

    /// Returns the pooled value at `key`, or builds it from the rows of `spec`.
    fn pooled_or_build<T: Pooled + PartialEq>(
        &mut self,
        spec: &QuerySpec,
        object_type: ObjectType,
        key: &str,
        build: impl FnMut(&mut Self, &Row) -> Result<T, FactoryError>,
    ) -> Result<Arc<T>, FactoryError> {
        if let Some(value) = self.pooled::<T>(key) {
            return Ok(value);
        }
        let rows = self.fetch(spec, &[bind(key)], object_type, key)?;
        let value = self.singleton(object_type, key, &rows, build)?;
        Ok(self.remember(key, Arc::new(value)))
    }

    /// Returns the distinct codes whose name column equals `name`.
    fn codes_named(
        &mut self,
        descriptor: &TableDescriptor,
        name_column: &str,
        name: &str,
    ) -> Result<Vec<String>, FactoryError> {
        let key = format!("named:{}", descriptor.table);
        let sql = || {
            format!(
                "SELECT {} FROM [{}] WHERE {} = ?",
                descriptor.code_column, descriptor.table, name_column
            )
        };
        let rows = self.fetch_sql(
            &key,
            sql,
            &[SqlValue::from(name)],
            None,
            descriptor.object_type,
            name,
        )?;
        let mut codes: Vec<String> = Vec::new();
        for code in rows.iter().filter_map(|row| row.get(0).and_then(SqlValue::as_text)) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Ok(codes)
    }

    /// Resolves `code` to a primary key of `descriptor`'s table.
    fn resolve(&mut self, descriptor: &TableDescriptor, code: &str) -> Result<String, FactoryError> {
        let trimmed = trim_authority(code, self.authority);
        if is_primary_key(trimmed) {
            return Ok(trimmed.to_string());
        }
        let Some(name_column) = descriptor.name_column else {
            return Ok(trimmed.to_string());
        };
        let mut codes = self.codes_named(descriptor, name_column, trimmed)?;
        match codes.len() {
            0 => Ok(trimmed.to_string()),
            1 => Ok(codes.remove(0)),
            count => Err(FactoryError::Ambiguous {
                code: code.to_string(),
                detail: format!("{count} records named in table {}", descriptor.table),
            }),
        }
    }

    /// Finds the table holding `code`, returning its index and primary key.
    fn locate(&mut self, code: &str) -> Result<(usize, String), FactoryError> {
        let trimmed = trim_authority(code, self.authority);
        let previous = self.state.last_table;
        let order = previous
            .into_iter()
            .chain((0 .. TABLES.len()).filter(|index| Some(*index) != previous))
            .collect::<Vec<_>>();
        if is_primary_key(trimmed) {
            let key = trimmed.to_string();
            for index in order {
                let Some(descriptor) = TABLES.get(index) else {
                    continue;
                };
                if self.exists(descriptor, &key)? {
                    self.state.last_table = Some(index);
                    return Ok((index, key));
                }
            }
            return Err(FactoryError::not_found(ObjectType::IdentifiedObject, code));
        }
        let mut found: Vec<(usize, String)> = Vec::new();
        for index in order {
            let Some(descriptor) = TABLES.get(index) else {
                continue;
            };
            let Some(name_column) = descriptor.name_column else {
                continue;
            };
            let mut codes = self.codes_named(descriptor, name_column, trimmed)?;
            if codes.len() > 1 {
                return Err(FactoryError::Ambiguous {
                    code: code.to_string(),
                    detail: format!("{} records named in table {}", codes.len(), descriptor.table),
                });
            }
            if let Some(key) = codes.pop() {
                found.push((index, key));
            }
        }
        match found.len() {
            0 => Err(FactoryError::not_found(ObjectType::IdentifiedObject, code)),
            1 => {
                let (index, key) = found.remove(0);
                self.state.last_table = Some(index);
                Ok((index, key))
            }
            _ => {
                let owners = found
                    .iter()
                    .filter_map(|(index, _)| TABLES.get(*index).map(|descriptor| descriptor.table))
                    .collect::<Vec<_>>();
                Err(FactoryError::Ambiguous {
                    code: code.to_string(),
                    detail: format!("name found in tables {}", owners.join(", ")),
                })
            }
        }
    }

    /// Returns `true` when `descriptor`'s table holds primary key `key`.
    fn exists(&mut self, descriptor: &TableDescriptor, key: &str) -> Result<bool, FactoryError> {
        let statement_key = format!("exists:{}", descriptor.table);
        let sql = || {
            format!(
                "SELECT {} FROM [{}] WHERE {} = ?",
                descriptor.code_column, descriptor.table, descriptor.code_column
            )
        };
        let rows = self.fetch_sql(
            &statement_key,
            sql,
            &[bind(key)],
            Some(1),
            ObjectType::IdentifiedObject,
            key,
        )?;
        Ok(!rows.is_empty())
    }

    /// Builds the object at `key` in table `index`.
    fn dispatch(&mut self, index: usize, key: &str) -> Result<IdentifiedObject, FactoryError> {
        let object_type = TABLES
            .get(index)
            .map_or(ObjectType::IdentifiedObject, |descriptor| descriptor.object_type);
        let object = match object_type {
            ObjectType::CoordinateReferenceSystem => IdentifiedObject::Crs(self.crs_by_key(key)?),
            ObjectType::CoordinateSystem => {
                IdentifiedObject::CoordinateSystem(self.coordinate_system_by_key(key)?)
            }
            ObjectType::CoordinateSystemAxis => IdentifiedObject::Axis(self.axis_by_key(key)?),
            ObjectType::Datum => IdentifiedObject::Datum(self.datum_by_key(key)?),
            ObjectType::Ellipsoid => IdentifiedObject::Ellipsoid(self.ellipsoid_by_key(key)?),
            ObjectType::PrimeMeridian => {
                IdentifiedObject::PrimeMeridian(self.prime_meridian_by_key(key)?)
            }
            ObjectType::CoordinateOperation => {
                IdentifiedObject::CoordinateOperation(self.operation_by_key(key)?)
            }
            ObjectType::OperationMethod => {
                IdentifiedObject::OperationMethod(self.method_by_key(key)?)
            }
            ObjectType::ParameterDescriptor => {
                IdentifiedObject::ParameterDescriptor(self.parameter_by_key(key)?)
            }
            ObjectType::Unit => IdentifiedObject::Unit(self.unit_by_key(key)?),
            ObjectType::Extent => IdentifiedObject::Extent(self.extent_by_key(key)?),
            other => {
                return Err(FactoryError::Unsupported(format!("generic lookup of {other}")));
            }
        };
        Ok(object)
    }

    /// Returns the name of the object at `key` in table `index`.
    fn description(&mut self, index: usize, key: &str) -> Result<String, FactoryError> {
        let Some(descriptor) = TABLES.get(index) else {
            return Err(FactoryError::not_found(ObjectType::IdentifiedObject, key));
        };
        let Some(name_column) = descriptor.name_column else {
            return Ok(self.dispatch(index, key)?.name().to_string());
        };
        let statement_key = format!("description:{}", descriptor.table);
        let sql = || {
            format!(
                "SELECT {} FROM [{}] WHERE {} = ?",
                name_column, descriptor.table, descriptor.code_column
            )
        };
        let rows =
            self.fetch_sql(&statement_key, sql, &[bind(key)], Some(1), descriptor.object_type, key)?;
        rows.first()
            .and_then(|row| row.get(0))
            .and_then(SqlValue::as_text)
            .map(|name| name.trim().to_string())
            .ok_or_else(|| FactoryError::not_found(descriptor.object_type, key))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Binds a primary key, as an integer when it parses as one.
fn bind(key: &str) -> SqlValue {
    key.trim().parse::<i64>().map_or_else(|_| SqlValue::from(key), SqlValue::Integer)
}

/// Wraps a backend failure with the object being built.
fn backing_store(object_type: ObjectType, code: &str, err: &BackendError) -> FactoryError {
    FactoryError::BackingStore {
        object_type,
        code: code.to_string(),
        cause: err.to_string(),
    }
}
