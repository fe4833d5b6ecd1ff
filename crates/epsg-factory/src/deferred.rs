// crates/epsg-factory/src/deferred.rs
// ============================================================================
// Module: Deferred Caching Facade
// Description: Lazily connected factory released after a period of inactivity.
// Purpose: Hold the backing factory only while it is in use.
// Dependencies: epsg-core, parking_lot, tracing
// ============================================================================

//! ## Overview
//! [`DeferredEpsgFactory`] opens its backing [`EpsgFactory`] on the first
//! request and a background sweeper disposes of it once idle for longer than
//! the configured timeout. Teardown is skipped while a request is in flight
//! (the request holds a clone of the backing factory) or while a caller still
//! holds one of the factory's code sets.
//!
//! The most recently created objects stay strongly referenced in a bounded
//! buffer so that they survive a teardown; older ones fall back to the
//! weak pools of whichever backing factory is current.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use epsg_core::CoordinateOperation;
use epsg_core::CoordinateReferenceSystem;
use epsg_core::CoordinateSystem;
use epsg_core::CoordinateSystemAxis;
use epsg_core::Datum;
use epsg_core::DefaultMathTransformFactory;
use epsg_core::Ellipsoid;
use epsg_core::EpsgConnector;
use epsg_core::Extent;
use epsg_core::FactoryError;
use epsg_core::IdentifiedObject;
use epsg_core::ObjectType;
use epsg_core::OperationAssembler;
use epsg_core::OperationMethod;
use epsg_core::ParameterDescriptor;
use epsg_core::PrimeMeridian;
use epsg_core::Unit;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::codes::AuthorityCodeSet;
use crate::factory::EpsgFactory;
use crate::options::FactoryOptions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the idle sweeper thread.
const SWEEPER_THREAD_NAME: &str = "epsg-factory-sweeper";

/// Shortest period between idle checks.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// Backing factory and the time it was last used.
struct BackingStore {
    /// Current factory.
    factory: Arc<EpsgFactory>,
    /// Last time a request started on the factory.
    last_used: Instant,
}

/// State shared between the facade and its sweeper.
struct Shared {
    /// Opens backend connections.
    connector: Arc<dyn EpsgConnector>,
    /// Options handed to every backing factory.
    options: FactoryOptions,
    /// Assembler shared by every backing factory.
    assembler: Arc<OperationAssembler>,
    /// Backing factory, absent until first use and after teardown.
    backing: Mutex<Option<BackingStore>>,
    /// Recently created objects kept strongly referenced.
    strong: Mutex<VecDeque<IdentifiedObject>>,
}

impl Shared {
    /// Returns the backing factory, opening one when absent.
    fn factory(&self, object_type: ObjectType, code: &str) -> Result<Arc<EpsgFactory>, FactoryError> {
        let mut backing = self.backing.lock();
        if let Some(store) = backing.as_mut()
            && !store.factory.is_disposed()
        {
            store.last_used = Instant::now();
            return Ok(Arc::clone(&store.factory));
        }
        let connection = self.connector.connect().map_err(|err| FactoryError::BackingStore {
            object_type,
            code: code.to_string(),
            cause: err.to_string(),
        })?;
        let factory =
            Arc::new(EpsgFactory::new(connection, Arc::clone(&self.assembler), self.options.clone()));
        debug!(source = %factory.source(), "opened epsg backing store");
        *backing = Some(BackingStore {
            factory: Arc::clone(&factory),
            last_used: Instant::now(),
        });
        Ok(factory)
    }

    /// Runs `request` on the backing factory, reopening it once if disposed.
    fn request<T>(
        &self,
        object_type: ObjectType,
        code: &str,
        request: impl Fn(&Arc<EpsgFactory>) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        match request(&self.factory(object_type, code)?) {
            Err(FactoryError::Disposed) => request(&self.factory(object_type, code)?),
            other => other,
        }
    }

    /// Keeps `object` strongly referenced, evicting the oldest entry.
    fn keep(&self, object: IdentifiedObject) {
        let capacity = self.options.max_strong_references;
        if capacity == 0 {
            return;
        }
        let mut strong = self.strong.lock();
        while strong.len() >= capacity {
            strong.pop_front();
        }
        strong.push_back(object);
    }

    /// Disposes of the backing factory when it has been idle long enough.
    ///
    /// Returns `true` when the backing factory was released.
    fn sweep_idle(&self) -> bool {
        if !self.options.idle_teardown_enabled() {
            return false;
        }
        let mut backing = self.backing.lock();
        let Some(store) = backing.as_ref() else {
            return false;
        };
        let idle = store.last_used.elapsed();
        if idle < self.options.idle_timeout
            || Arc::strong_count(&store.factory) > 1
            || !store.factory.can_dispose()
        {
            return false;
        }
        if let Some(store) = backing.take() {
            store.factory.dispose();
            info!(idle_ms = idle.as_millis(), "released idle epsg backing store");
        }
        true
    }
}

// ============================================================================
// SECTION: Sweeper
// ============================================================================

/// Background thread releasing the idle backing store.
struct Sweeper {
    /// Dropping or signalling stops the thread.
    stop: mpsc::Sender<()>,
    /// Thread handle, joined on drop.
    handle: Option<JoinHandle<()>>,
}

/// Starts the sweeper, or returns `None` when idle teardown is disabled or
/// the thread cannot be spawned.
fn spawn_sweeper(shared: &Arc<Shared>) -> Option<Sweeper> {
    if !shared.options.idle_teardown_enabled() {
        return None;
    }
    let interval = shared.options.sweep_interval.max(MIN_SWEEP_INTERVAL);
    let weak = Arc::downgrade(shared);
    let (stop, signal) = mpsc::channel::<()>();
    let spawned = thread::Builder::new()
        .name(SWEEPER_THREAD_NAME.to_string())
        .spawn(move || sweeper_loop(&weak, &signal, interval));
    match spawned {
        Ok(handle) => Some(Sweeper {
            stop,
            handle: Some(handle),
        }),
        Err(err) => {
            warn!(error = %err, "failed to spawn idle sweeper; idle teardown disabled");
            None
        }
    }
}

/// Checks for idleness every `interval` until signalled to stop.
fn sweeper_loop(shared: &Weak<Shared>, signal: &mpsc::Receiver<()>, interval: Duration) {
    loop {
        match signal.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.sweep_idle();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("idle sweeper thread panicked");
        }
    }
}

// ============================================================================
// SECTION: Facade
// ============================================================================

/// Factory facade that connects on demand and disconnects when idle.
pub struct DeferredEpsgFactory {
    /// State shared with the sweeper.
    shared: Arc<Shared>,
    /// Idle sweeper, absent when teardown is disabled.
    sweeper: Option<Sweeper>,
}

impl std::fmt::Debug for DeferredEpsgFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredEpsgFactory")
            .field("authority", &self.shared.options.authority)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl DeferredEpsgFactory {
    /// Creates a facade using the default math transform factory.
    #[must_use]
    pub fn new(connector: Arc<dyn EpsgConnector>, options: FactoryOptions) -> Self {
        let assembler = OperationAssembler::new(Arc::new(DefaultMathTransformFactory::new()));
        Self::with_assembler(connector, Arc::new(assembler), options)
    }

    /// Creates a facade sharing `assembler` with its backing factories.
    #[must_use]
    pub fn with_assembler(
        connector: Arc<dyn EpsgConnector>,
        assembler: Arc<OperationAssembler>,
        options: FactoryOptions,
    ) -> Self {
        let shared = Arc::new(Shared {
            connector,
            options,
            assembler,
            backing: Mutex::new(None),
            strong: Mutex::new(VecDeque::new()),
        });
        let sweeper = spawn_sweeper(&shared);
        Self {
            shared,
            sweeper,
        }
    }

    /// Returns the facade options.
    #[must_use]
    pub fn options(&self) -> &FactoryOptions {
        &self.shared.options
    }

    /// Returns `true` while a backing factory is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.backing.lock().as_ref().is_some_and(|store| !store.factory.is_disposed())
    }

    /// Returns `true` when the idle sweeper is running.
    #[must_use]
    pub const fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Returns the number of objects currently held strongly.
    #[must_use]
    pub fn strong_references(&self) -> usize {
        self.shared.strong.lock().len()
    }

    /// Releases the backing factory now if it is idle past the timeout.
    ///
    /// Returns `true` when the backing factory was released.
    #[must_use]
    pub fn sweep_idle(&self) -> bool {
        self.shared.sweep_idle()
    }

    /// Disposes of the backing factory; the next request reopens one.
    ///
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        if let Some(store) = self.shared.backing.lock().take() {
            store.factory.dispose();
        }
    }

    /// Creates the object identified by `code`, whatever table holds it.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_object`].
    pub fn create_object(&self, code: &str) -> Result<IdentifiedObject, FactoryError> {
        let object =
            self.shared.request(ObjectType::IdentifiedObject, code, |f| f.create_object(code))?;
        self.shared.keep(object.clone());
        Ok(object)
    }

    /// Returns the name of the object identified by `code`.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::description_text`].
    pub fn description_text(&self, code: &str) -> Result<String, FactoryError> {
        self.shared.request(ObjectType::IdentifiedObject, code, |f| f.description_text(code))
    }

    /// Creates a unit of measure.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_unit`].
    pub fn create_unit(&self, code: &str) -> Result<Arc<Unit>, FactoryError> {
        let unit = self.shared.request(ObjectType::Unit, code, |f| f.create_unit(code))?;
        self.shared.keep(IdentifiedObject::Unit(Arc::clone(&unit)));
        Ok(unit)
    }

    /// Creates an ellipsoid.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_ellipsoid`].
    pub fn create_ellipsoid(&self, code: &str) -> Result<Arc<Ellipsoid>, FactoryError> {
        let ellipsoid =
            self.shared.request(ObjectType::Ellipsoid, code, |f| f.create_ellipsoid(code))?;
        self.shared.keep(IdentifiedObject::Ellipsoid(Arc::clone(&ellipsoid)));
        Ok(ellipsoid)
    }

    /// Creates a prime meridian.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_prime_meridian`].
    pub fn create_prime_meridian(&self, code: &str) -> Result<Arc<PrimeMeridian>, FactoryError> {
        let meridian = self
            .shared
            .request(ObjectType::PrimeMeridian, code, |f| f.create_prime_meridian(code))?;
        self.shared.keep(IdentifiedObject::PrimeMeridian(Arc::clone(&meridian)));
        Ok(meridian)
    }

    /// Creates an area of use.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_extent`].
    pub fn create_extent(&self, code: &str) -> Result<Arc<Extent>, FactoryError> {
        let extent = self.shared.request(ObjectType::Extent, code, |f| f.create_extent(code))?;
        self.shared.keep(IdentifiedObject::Extent(Arc::clone(&extent)));
        Ok(extent)
    }

    /// Creates a datum.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_datum`].
    pub fn create_datum(&self, code: &str) -> Result<Arc<Datum>, FactoryError> {
        let datum = self.shared.request(ObjectType::Datum, code, |f| f.create_datum(code))?;
        self.shared.keep(IdentifiedObject::Datum(Arc::clone(&datum)));
        Ok(datum)
    }

    /// Creates a coordinate system axis.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_coordinate_system_axis`].
    pub fn create_coordinate_system_axis(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateSystemAxis>, FactoryError> {
        let axis = self.shared.request(ObjectType::CoordinateSystemAxis, code, |f| {
            f.create_coordinate_system_axis(code)
        })?;
        self.shared.keep(IdentifiedObject::Axis(Arc::clone(&axis)));
        Ok(axis)
    }

    /// Creates a coordinate system.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_coordinate_system`].
    pub fn create_coordinate_system(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateSystem>, FactoryError> {
        let cs = self
            .shared
            .request(ObjectType::CoordinateSystem, code, |f| f.create_coordinate_system(code))?;
        self.shared.keep(IdentifiedObject::CoordinateSystem(Arc::clone(&cs)));
        Ok(cs)
    }

    /// Creates a coordinate reference system.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_coordinate_reference_system`].
    pub fn create_coordinate_reference_system(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateReferenceSystem>, FactoryError> {
        let crs = self.shared.request(ObjectType::CoordinateReferenceSystem, code, |f| {
            f.create_coordinate_reference_system(code)
        })?;
        self.shared.keep(IdentifiedObject::Crs(Arc::clone(&crs)));
        Ok(crs)
    }

    /// Creates an operation method.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_operation_method`].
    pub fn create_operation_method(
        &self,
        code: &str,
    ) -> Result<Arc<OperationMethod>, FactoryError> {
        let method = self
            .shared
            .request(ObjectType::OperationMethod, code, |f| f.create_operation_method(code))?;
        self.shared.keep(IdentifiedObject::OperationMethod(Arc::clone(&method)));
        Ok(method)
    }

    /// Creates an operation parameter descriptor.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_parameter_descriptor`].
    pub fn create_parameter_descriptor(
        &self,
        code: &str,
    ) -> Result<Arc<ParameterDescriptor>, FactoryError> {
        let parameter = self.shared.request(ObjectType::ParameterDescriptor, code, |f| {
            f.create_parameter_descriptor(code)
        })?;
        self.shared.keep(IdentifiedObject::ParameterDescriptor(Arc::clone(&parameter)));
        Ok(parameter)
    }

    /// Creates a coordinate operation.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_coordinate_operation`].
    pub fn create_coordinate_operation(
        &self,
        code: &str,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        let operation = self.shared.request(ObjectType::CoordinateOperation, code, |f| {
            f.create_coordinate_operation(code)
        })?;
        self.shared.keep(IdentifiedObject::CoordinateOperation(Arc::clone(&operation)));
        Ok(operation)
    }

    /// Creates every recorded operation from `source` to `target`.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::create_from_coordinate_reference_system_codes`].
    pub fn create_from_coordinate_reference_system_codes(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<Arc<CoordinateOperation>>, FactoryError> {
        let operations = self.shared.request(ObjectType::CoordinateOperation, source, |f| {
            f.create_from_coordinate_reference_system_codes(source, target)
        })?;
        for operation in &operations {
            self.shared.keep(IdentifiedObject::CoordinateOperation(Arc::clone(operation)));
        }
        Ok(operations)
    }

    /// Returns the set of codes of `object_type`.
    ///
    /// While the caller holds the set, the backing factory is not released.
    ///
    /// # Errors
    ///
    /// See [`EpsgFactory::authority_codes`].
    pub fn authority_codes(
        &self,
        object_type: ObjectType,
    ) -> Result<Arc<AuthorityCodeSet>, FactoryError> {
        self.shared.request(object_type, "", |f| f.authority_codes(object_type))
    }
}

impl Drop for DeferredEpsgFactory {
    fn drop(&mut self) {
        self.sweeper = None;
        self.dispose();
    }
}
