// crates/epsg-factory/tests/object_factory.rs
// ============================================================================
// Module: EPSG Object Factory Tests
// Description: End-to-end construction of referencing objects from SQLite rows.
// Purpose: Validate code resolution, decoding, recursion, pooling, and errors.
// ============================================================================

//! ## Overview
//! Integration tests for [`epsg_factory::EpsgFactory`]:
//! - Code forms (authority prefix, whitespace, names) and generic lookup
//! - Unit, ellipsoid, datum, coordinate system, and CRS decoding
//! - Datum shifts, including cyclic shift graphs
//! - Operations, parameter values, and concatenated paths
//! - Malformed, duplicated, and ambiguous records
//! - Weak pooling and disposal

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use common::Dataset;
use common::assert_close;
use epsg_core::AxisDirection;
use epsg_core::BackendError;
use epsg_core::CrsKind;
use epsg_core::CsKind;
use epsg_core::Datum;
use epsg_core::DatumKind;
use epsg_core::EpsgConnection;
use epsg_core::FactoryError;
use epsg_core::IdentifiedObject;
use epsg_core::ObjectType;
use epsg_core::OperationKind;
use epsg_core::ParameterValueKind;
use epsg_core::Row;
use epsg_core::SqlValue;
use epsg_core::StatementHandle;
use epsg_core::UnitKind;
use epsg_factory::ConnectionOwnership;
use epsg_factory::EpsgFactory;
use epsg_factory::FactoryOptions;
use epsg_store_sqlite::SqliteEpsgConnection;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Connection counting the queries it runs.
struct CountingConnection {
    /// Connection doing the work.
    inner: SqliteEpsgConnection,
    /// Queries run so far.
    queries: Arc<AtomicUsize>,
}

impl EpsgConnection for CountingConnection {
    fn prepare(&mut self, sql: &str) -> Result<StatementHandle, BackendError> {
        self.inner.prepare(sql)
    }

    fn query(
        &mut self,
        handle: StatementHandle,
        params: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, BackendError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.inner.query(handle, params, max_rows)
    }

    fn close_statement(&mut self, handle: StatementHandle) -> Result<(), BackendError> {
        self.inner.close_statement(handle)
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.inner.close()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// Rows of `count` geodetic datums with a translation between every pair.
fn linked_datums(count: usize) -> String {
    let mut rows = String::from(
        "INSERT INTO [Unit of Measure] VALUES
            (9001, 'metre', 'length', 9001, 1.0, 1.0, NULL),
            (9102, 'degree', 'angle', 9101, 3.14159265358979, 180.0, NULL);
        INSERT INTO [Ellipsoid] VALUES (7030, 'WGS 84', 6378137.0, 298.257223563, NULL, 9001, NULL);
        INSERT INTO [Prime Meridian] VALUES (8901, 'Greenwich', 0.0, 9102, NULL);\n",
    );
    for i in 0 .. count {
        rows.push_str(&format!(
            "INSERT INTO [Datum] VALUES ({}, 'Datum {i}', 'geodetic', NULL, NULL, NULL, NULL, \
             NULL, 7030, 8901);\n",
            6000 + i
        ));
        rows.push_str(&format!(
            "INSERT INTO [Coordinate Reference System] VALUES ({}, 'CRS {i}', NULL, NULL, NULL, \
             'geographic 2D', 6422, {}, NULL, NULL, NULL, NULL);\n",
            4000 + i,
            6000 + i
        ));
        for j in (0 .. count).filter(|j| *j != i) {
            let code = 10_000 + i * 100 + j;
            rows.push_str(&format!(
                "INSERT INTO [Coordinate_Operation] VALUES ({code}, 'Shift {i} to {j}', \
                 'transformation', {}, {}, 9603, NULL, 1, 1.0, NULL, NULL, NULL, 0);\n",
                4000 + i,
                4000 + j
            ));
            for parameter in [8605, 8606, 8607] {
                rows.push_str(&format!(
                    "INSERT INTO [Coordinate_Operation Parameter Value] VALUES \
                     ({code}, 9603, {parameter}, {j}.0, NULL, 9001);\n"
                ));
            }
        }
    }
    rows
}

/// Returns the target of the shift from `datum` to datum `code`.
fn shift_target<'a>(datum: &'a Datum, code: &str) -> &'a Arc<Datum> {
    &datum
        .bursa_wolf()
        .iter()
        .find(|shift| shift.target_datum.properties.code() == Some(code))
        .unwrap()
        .target_datum
}

fn malformed_column(err: &FactoryError) -> Option<&str> {
    match err {
        FactoryError::MalformedData {
            column, ..
        } => column.as_deref(),
        _ => None,
    }
}

// ============================================================================
// SECTION: Code Resolution
// ============================================================================

#[test]
fn code_forms_resolve_to_the_same_pooled_instance() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let plain = factory.create_coordinate_reference_system("4326").unwrap();
    let prefixed = factory.create_coordinate_reference_system("EPSG:4326").unwrap();
    let spaced = factory.create_coordinate_reference_system(" epsg : 4326 ").unwrap();
    let named = factory.create_coordinate_reference_system("WGS 84").unwrap();

    assert!(Arc::ptr_eq(&plain, &prefixed));
    assert!(Arc::ptr_eq(&plain, &spaced));
    assert!(Arc::ptr_eq(&plain, &named));
}

#[test]
fn unknown_codes_and_names_are_not_found() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let by_code = factory.create_coordinate_reference_system("99999").unwrap_err();
    let by_name = factory.create_ellipsoid("Bessel 1841").unwrap_err();

    assert!(by_code.is_not_found());
    assert!(by_name.is_not_found());
    assert!(factory.create_object("EPSG:123456").unwrap_err().is_not_found());
}

#[test]
fn names_shared_by_several_records_are_ambiguous() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let within_table = factory.create_coordinate_reference_system("Duplicated name").unwrap_err();
    let across_tables = factory.create_object("WGS 84").unwrap_err();

    assert!(matches!(within_table, FactoryError::Ambiguous { .. }));
    assert!(matches!(across_tables, FactoryError::Ambiguous { .. }));
}

#[test]
fn generic_lookup_dispatches_on_the_owning_table() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let crs = factory.create_object("4326").unwrap();
    let ellipsoid = factory.create_object("EPSG:7030").unwrap();
    let unit = factory.create_object("9093").unwrap();
    let operation = factory.create_object("ETRS89 to WGS 84 (1)").unwrap();

    assert_eq!(crs.object_type(), ObjectType::CoordinateReferenceSystem);
    assert_eq!(crs.name(), "WGS 84");
    assert!(matches!(ellipsoid, IdentifiedObject::Ellipsoid(_)));
    assert!(matches!(unit, IdentifiedObject::Unit(_)));
    assert_eq!(operation.code(), Some("1149"));
}

#[test]
fn description_text_reads_names_without_building_objects() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    assert_eq!(factory.description_text("EPSG:32631").unwrap(), "WGS 84 / UTM zone 31N");
    assert_eq!(factory.description_text("8901").unwrap(), "Greenwich");
    assert_eq!(factory.description_text("106").unwrap(), "Geodetic latitude");
}

// ============================================================================
// SECTION: Referencing Objects
// ============================================================================

#[test]
fn derived_units_scale_their_base_unit() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let mile = factory.create_unit("9093").unwrap();
    let degree = factory.create_unit("9102").unwrap();

    assert_eq!(mile.kind, UnitKind::Linear);
    assert_close(mile.factor, 1609.344, 1e-9);
    assert_eq!(mile.properties.remarks.as_deref(), Some("Mile of 5280 feet."));
    assert_eq!(degree.kind, UnitKind::Angular);
    assert_close(degree.factor, std::f64::consts::PI / 180.0, 1e-15);
}

#[test]
fn zero_conversion_divisor_is_malformed() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let err = factory.create_unit("9998").unwrap_err();

    assert_eq!(malformed_column(&err), Some("FACTOR_C"));
}

#[test]
fn ellipsoids_prefer_inverse_flattening_and_accept_spheres() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let wgs84 = factory.create_ellipsoid("7030").unwrap();
    let sphere = factory.create_ellipsoid("Sphere").unwrap();

    assert!(wgs84.ivf_definitive);
    assert_close(wgs84.inverse_flattening, 298.257_223_563, 1e-9);
    assert_close(wgs84.semi_minor_axis, 6_356_752.314_245, 1e-3);
    assert!(sphere.is_sphere());
    assert!(!sphere.ivf_definitive);
}

#[test]
fn ellipsoid_without_shape_parameter_is_malformed() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let err = factory.create_ellipsoid("7999").unwrap_err();

    assert_eq!(malformed_column(&err), Some("SEMI_MINOR_AXIS"));
}

#[test]
fn duplicated_rows_must_agree() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let paris = factory.create_prime_meridian("8903").unwrap();
    let conflicting = factory.create_ellipsoid("7998").unwrap_err();

    assert_close(paris.greenwich_longitude, 2.596_921_3, 1e-12);
    assert_eq!(paris.angular_unit.properties.name, "grad");
    assert_eq!(
        conflicting,
        FactoryError::malformed(ObjectType::Ellipsoid, "7998", "duplicated values for ellipsoid")
    );
}

#[test]
fn extents_keep_bounds_only_when_complete() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let world = factory.create_extent("1262").unwrap();
    let europe = factory.create_extent("2060").unwrap();

    let bounds = world.bounding_box.as_ref().unwrap();
    assert_close(bounds.west, -180.0, 0.0);
    assert_close(bounds.north, 90.0, 0.0);
    assert_eq!(world.description.as_deref(), Some("World."));
    assert!(europe.bounding_box.is_none());
    assert_eq!(europe.description.as_deref(), Some("Europe - ETRS89"));
}

#[test]
fn properties_carry_aliases_area_and_scope() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let datum = factory.create_datum("6326").unwrap();

    let aliases: Vec<String> = datum.properties.aliases.iter().map(ToString::to_string).collect();
    assert_eq!(aliases, ["ESRI:WGS84", "World Geodetic System 1984 ensemble"]);
    assert_eq!(datum.properties.identifier.as_ref().unwrap().to_string(), "EPSG:6326");
    assert_eq!(datum.properties.scope.as_deref(), Some("Satellite navigation."));
    assert_eq!(datum.anchor.as_deref(), Some("Defined through the ensemble."));
    assert_eq!(datum.realization_epoch.as_deref(), Some("1984"));
    let area = datum.properties.valid_area.as_ref().unwrap();
    assert_eq!(area.identifier.as_ref().unwrap().code(), "1262");
}

// ============================================================================
// SECTION: Datum Shifts
// ============================================================================

#[test]
fn datum_shift_keeps_best_candidate_per_target() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let etrs89 = factory.create_datum("6258").unwrap();

    let shifts = etrs89.bursa_wolf();
    assert_eq!(shifts.len(), 1);
    let shift = &shifts[0];
    assert_eq!(shift.target_datum.properties.code(), Some("6326"));
    assert_close(shift.dx, 1.5, 1e-12);
    assert_close(shift.dy, -2.0, 1e-12);
    assert_close(shift.dz, 0.5, 1e-12);
}

#[test]
fn cyclic_datum_shifts_terminate() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let etrs89 = factory.create_datum("6258").unwrap();

    let wgs84 = &etrs89.bursa_wolf()[0].target_datum;
    let back = &wgs84.bursa_wolf()[0];
    assert_eq!(back.target_datum.properties.code(), Some("6258"));
    assert!(back.target_datum.bursa_wolf().is_empty());
    assert_close(back.ppm, 0.02, 1e-12);
}

#[test]
fn pooled_datums_are_reused_as_shift_targets() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let etrs89 = factory.create_datum("6258").unwrap();
    let wgs84 = factory.create_datum("6326").unwrap();

    let target = &wgs84.bursa_wolf()[0].target_datum;
    assert!(Arc::ptr_eq(target, &etrs89));
    assert!(!Arc::ptr_eq(&etrs89.bursa_wolf()[0].target_datum, &wgs84));
}

#[test]
fn densely_linked_datums_build_each_target_once() {
    const DATUMS: usize = 8;
    let dataset = Dataset::with_rows(&linked_datums(DATUMS));
    let queries = Arc::new(AtomicUsize::new(0));
    let connection = CountingConnection {
        inner: SqliteEpsgConnection::open(&dataset.config()).unwrap(),
        queries: Arc::clone(&queries),
    };
    let factory = EpsgFactory::new(
        Box::new(connection),
        Arc::new(common::assembler()),
        FactoryOptions::default(),
    );

    let datum = factory.create_datum("6000").unwrap();

    assert_eq!(datum.bursa_wolf().len(), DATUMS - 1);
    let first = shift_target(&datum, "6001");
    assert_eq!(first.bursa_wolf().len(), DATUMS - 1);
    assert!(Arc::ptr_eq(shift_target(&datum, "6002"), shift_target(first, "6002")));
    assert!(shift_target(first, "6000").bursa_wolf().is_empty());
    let issued = queries.load(Ordering::Relaxed);
    assert!(issued < 1_000, "{issued} queries for {DATUMS} linked datums");
}

#[test]
fn coordinate_frame_rotations_are_flipped_and_converted() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let ed50 = factory.create_datum("European Datum 1950").unwrap();

    let shifts = ed50.bursa_wolf();
    assert_eq!(shifts.len(), 1, "shifts to the datum itself are skipped");
    let shift = &shifts[0];
    assert_close(shift.dx, -87.0, 1e-12);
    assert_close(shift.ex, -0.3, 1e-12);
    assert_close(shift.ey, 0.0, 1e-12);
    assert_close(shift.ez, -0.206_264_806_247, 1e-9);
    assert_close(shift.ppm, 1.5, 1e-12);
}

#[test]
fn vertical_and_engineering_datums_have_no_ellipsoid() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let msl = factory.create_datum("5100").unwrap();
    let bin_grid = factory.create_datum("9315").unwrap();

    assert!(matches!(msl.kind, DatumKind::Vertical));
    assert!(matches!(bin_grid.kind, DatumKind::Engineering));
    assert!(msl.ellipsoid().is_none());
}

// ============================================================================
// SECTION: Coordinate Systems
// ============================================================================

#[test]
fn axes_follow_their_recorded_order() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let cs = factory.create_coordinate_system("6422").unwrap();

    assert_eq!(cs.kind, CsKind::Ellipsoidal);
    let abbreviations: Vec<&str> = cs.axes.iter().map(|axis| axis.abbreviation.as_str()).collect();
    assert_eq!(abbreviations, ["Lat", "Lon"]);
    assert_eq!(cs.axes[0].direction, AxisDirection::North);
    assert_eq!(cs.axes[0].properties.name, "Geodetic latitude");
    assert_eq!(
        cs.axes[0].properties.remarks.as_deref(),
        Some("Angle from the equatorial plane.")
    );
}

#[test]
fn axis_name_remarks_take_precedence_over_description() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let height = factory.create_coordinate_system_axis("114").unwrap();

    assert_eq!(height.properties.remarks.as_deref(), Some("Height above the geoid."));
    assert_eq!(height.direction, AxisDirection::Up);
}

#[test]
fn malformed_axes_and_dimensions_name_their_column() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let axis = factory.create_coordinate_system_axis("999").unwrap_err();
    let cs = factory.create_coordinate_system("9999").unwrap_err();

    assert_eq!(malformed_column(&axis), Some("COORD_AXIS_ORIENTATION"));
    assert_eq!(malformed_column(&cs), Some("DIMENSION"));
}

// ============================================================================
// SECTION: Coordinate Reference Systems
// ============================================================================

#[test]
fn geographic_crs_is_fully_wired() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let crs = factory.create_coordinate_reference_system("4326").unwrap();

    let CrsKind::Geographic {
        datum,
        cs,
    } = &crs.kind
    else {
        panic!("expected a geographic CRS");
    };
    assert_eq!(cs.dimension(), 2);
    assert_eq!(datum.ellipsoid().unwrap().properties.name, "WGS 84");
    assert_eq!(crs.properties.aliases[0].to_string(), "OGP:WGS 1984");
    assert_eq!(crs.properties.scope.as_deref(), Some("Horizontal component of 3D system."));
}

#[test]
fn projected_crs_embeds_its_defining_conversion() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let utm = factory.create_coordinate_reference_system("32631").unwrap();
    let base = factory.create_coordinate_reference_system("4326").unwrap();

    let CrsKind::Projected {
        base: projected_base,
        conversion,
        cs,
    } = &utm.kind
    else {
        panic!("expected a projected CRS");
    };
    assert!(Arc::ptr_eq(projected_base, &base));
    assert_eq!(cs.kind, CsKind::Cartesian);
    assert!(matches!(conversion.kind, OperationKind::Conversion));
    assert!(Arc::ptr_eq(conversion.source_crs.as_ref().unwrap(), &base));
    let codes: Vec<&str> =
        conversion.parameters.values.iter().filter_map(|value| value.code.as_deref()).collect();
    assert_eq!(codes, ["8801", "8802", "8805", "8806", "8807"]);
    assert_eq!(
        utm.properties.extras.get("conversion.name").map(String::as_str),
        Some("UTM zone 31N")
    );
}

#[test]
fn vertical_compound_and_engineering_crs_are_built() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let vertical = factory.create_coordinate_reference_system("5714").unwrap();
    let compound = factory.create_coordinate_reference_system("9705").unwrap();
    let engineering = factory.create_coordinate_reference_system("5800").unwrap();

    assert!(matches!(vertical.kind, CrsKind::Vertical { .. }));
    let CrsKind::Compound {
        components,
    } = &compound.kind
    else {
        panic!("expected a compound CRS");
    };
    assert!(Arc::ptr_eq(&components[1], &vertical));
    assert_eq!(compound.dimension(), 3);
    assert!(matches!(engineering.kind, CrsKind::Engineering { .. }));
}

#[test]
fn crs_kind_mismatches_are_malformed() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let wrong_cs = factory.create_coordinate_reference_system("3002").unwrap_err();
    let unknown_kind = factory.create_coordinate_reference_system("3003").unwrap_err();

    assert_eq!(malformed_column(&wrong_cs), Some("COORD_SYS_CODE"));
    assert_eq!(malformed_column(&unknown_kind), Some("COORD_REF_SYS_KIND"));
}

// ============================================================================
// SECTION: Operations
// ============================================================================

#[test]
fn methods_list_parameters_in_sort_order() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let method = factory.create_operation_method("9807").unwrap();

    let names: Vec<&str> =
        method.parameters.iter().map(|parameter| parameter.properties.name.as_str()).collect();
    assert_eq!(names[0], "Latitude of natural origin");
    assert_eq!(names[4], "False northing");
    assert_eq!(method.formula.as_deref(), Some("See Guidance Note 7-2."));
}

#[test]
fn transformations_read_crs_version_and_accuracy() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let operation = factory.create_coordinate_operation("1149").unwrap();

    assert!(matches!(operation.kind, OperationKind::Transformation));
    assert_eq!(operation.source_crs.as_ref().unwrap().code(), Some("4258"));
    assert_eq!(operation.target_crs.as_ref().unwrap().code(), Some("4326"));
    assert_eq!(operation.operation_version.as_deref(), Some("EPSG-eur"));
    assert_close(operation.positional_accuracy[0].metres, 1.0, 0.0);
}

#[test]
fn file_parameters_are_kept_as_references() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let operation = factory.create_coordinate_operation("1311").unwrap();

    let value = operation.parameters.by_code("8656").unwrap();
    assert!(matches!(
        &value.value,
        ParameterValueKind::FileRef { path } if path == "ntv2_0.gsb"
    ));
}

#[test]
fn parameter_with_value_and_file_is_malformed() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let err = factory.create_coordinate_operation("1998").unwrap_err();

    assert_eq!(malformed_column(&err), Some("PARAMETER_VALUE"));
}

#[test]
fn concatenated_operations_follow_their_path() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let operation = factory.create_coordinate_operation("8000").unwrap();

    let steps: Vec<Option<&str>> = operation.steps().iter().map(|step| step.code()).collect();
    assert_eq!(steps, [Some("1133"), Some("1150")]);
    assert_eq!(operation.source_crs.as_ref().unwrap().code(), Some("4230"));
    assert_eq!(operation.target_crs.as_ref().unwrap().code(), Some("4258"));
    let accuracy: Vec<f64> =
        operation.positional_accuracy.iter().map(|accuracy| accuracy.metres).collect();
    assert_eq!(accuracy, [5.0, 1.0]);
}

#[test]
fn self_referencing_path_is_rejected() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let err = factory.create_coordinate_operation("8001").unwrap_err();

    assert!(matches!(
        err,
        FactoryError::MalformedData {
            object_type: ObjectType::ConcatenatedOperation,
            ..
        }
    ));
}

#[test]
fn operations_between_crs_prefer_current_records() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let operations = factory.create_from_coordinate_reference_system_codes("4258", "EPSG:4326").unwrap();

    let codes: Vec<Option<&str>> = operations.iter().map(|operation| operation.code()).collect();
    assert_eq!(codes, [Some("1149"), Some("1571")]);
}

#[test]
fn operations_between_require_both_crs() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let err = factory.create_from_coordinate_reference_system_codes("4326", "99999").unwrap_err();

    assert!(err.is_not_found());
}

// ============================================================================
// SECTION: Dialects
// ============================================================================

#[test]
fn ansi_table_names_are_rewritten() {
    let dataset = Dataset::ansi();
    let factory = dataset.factory_with(common::ansi_options());

    let ellipsoid = factory.create_ellipsoid("GRS 1980").unwrap();

    assert_eq!(ellipsoid.properties.code(), Some("7019"));
    assert_eq!(ellipsoid.properties.aliases[0].to_string(), "EPSG abbreviation:GRS80");
}

// ============================================================================
// SECTION: Pooling and Disposal
// ============================================================================

#[test]
fn released_objects_are_rebuilt_equal() {
    let dataset = Dataset::access();
    let factory = dataset.factory();

    let first = factory.create_coordinate_system("4400").unwrap();
    let copy = (*first).clone();
    drop(first);
    let second = factory.create_coordinate_system("4400").unwrap();

    assert_eq!(*second, copy);
}

#[test]
fn disposed_factory_refuses_requests() {
    let dataset = Dataset::access();
    let factory = dataset.factory();
    factory.create_unit("9001").unwrap();
    assert!(factory.prepared_statements() > 0);

    factory.dispose();
    factory.dispose();

    assert!(factory.is_disposed());
    assert_eq!(factory.prepared_statements(), 0);
    assert_eq!(factory.create_unit("9001").unwrap_err(), FactoryError::Disposed);
    assert_eq!(factory.authority_codes(ObjectType::Unit).unwrap_err(), FactoryError::Disposed);
}

#[test]
fn service_connections_survive_disposal_of_caches() {
    let dataset = Dataset::access();
    let connection = SqliteEpsgConnection::open(&dataset.config()).unwrap();
    let factory = EpsgFactory::with_ownership(
        Box::new(connection),
        Arc::new(common::assembler()),
        epsg_factory::FactoryOptions::default(),
        ConnectionOwnership::Service,
    );
    factory.create_unit("9001").unwrap();

    factory.dispose();

    assert!(factory.is_disposed());
    assert_eq!(factory.prepared_statements(), 0);
    assert!(factory.source().starts_with("SQLite"));
}
