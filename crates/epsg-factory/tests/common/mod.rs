// crates/epsg-factory/tests/common/mod.rs
// ============================================================================
// Module: EPSG Factory Test Fixtures
// Description: Miniature EPSG datasets stored in temporary SQLite files.
// Purpose: Give integration tests real rows under the shipped table names.
// ============================================================================

//! Shared fixtures for factory integration tests.
//!
//! The dataset is a hand-picked slice of EPSG: WGS 84 and its UTM zone,
//! ETRS89 and ED50 with datum shifts between them, a vertical and a compound
//! CRS, plus a handful of deliberately broken records.

#![allow(dead_code, reason = "Each test binary uses a subset of the fixtures.")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only helpers are permitted.")]

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use epsg_core::DefaultMathTransformFactory;
use epsg_core::OperationAssembler;
use epsg_factory::EpsgFactory;
use epsg_factory::FactoryOptions;
use epsg_factory::SqlDialect;
use epsg_store_sqlite::SqliteConnector;
use epsg_store_sqlite::SqliteEpsgConnection;
use epsg_store_sqlite::SqliteStoreConfig;
use rusqlite::Connection;
use tempfile::TempDir;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Tables under their shipped names; code columns are integers.
const SCHEMA: &str = "
CREATE TABLE [Unit of Measure] (UOM_CODE INTEGER, UNIT_OF_MEAS_NAME TEXT, UNIT_OF_MEAS_TYPE TEXT,
    TARGET_UOM_CODE INTEGER, FACTOR_B REAL, FACTOR_C REAL, REMARKS TEXT);
CREATE TABLE [Ellipsoid] (ELLIPSOID_CODE INTEGER, ELLIPSOID_NAME TEXT, SEMI_MAJOR_AXIS REAL,
    INV_FLATTENING REAL, SEMI_MINOR_AXIS REAL, UOM_CODE INTEGER, REMARKS TEXT);
CREATE TABLE [Prime Meridian] (PRIME_MERIDIAN_CODE INTEGER, PRIME_MERIDIAN_NAME TEXT,
    GREENWICH_LONGITUDE REAL, UOM_CODE INTEGER, REMARKS TEXT);
CREATE TABLE [Area] (AREA_CODE INTEGER, AREA_NAME TEXT, AREA_OF_USE TEXT,
    AREA_SOUTH_BOUND_LAT REAL, AREA_NORTH_BOUND_LAT REAL, AREA_WEST_BOUND_LON REAL,
    AREA_EAST_BOUND_LON REAL);
CREATE TABLE [Datum] (DATUM_CODE INTEGER, DATUM_NAME TEXT, DATUM_TYPE TEXT,
    ORIGIN_DESCRIPTION TEXT, REALIZATION_EPOCH TEXT, AREA_OF_USE_CODE INTEGER, DATUM_SCOPE TEXT,
    REMARKS TEXT, ELLIPSOID_CODE INTEGER, PRIME_MERIDIAN_CODE INTEGER);
CREATE TABLE [Coordinate System] (COORD_SYS_CODE INTEGER, COORD_SYS_NAME TEXT,
    COORD_SYS_TYPE TEXT, DIMENSION INTEGER, REMARKS TEXT);
CREATE TABLE [Coordinate Axis] (COORD_AXIS_CODE INTEGER, COORD_SYS_CODE INTEGER,
    COORD_AXIS_NAME_CODE INTEGER, COORD_AXIS_ORIENTATION TEXT, COORD_AXIS_ABBREVIATION TEXT,
    UOM_CODE INTEGER, [ORDER] INTEGER);
CREATE TABLE [Coordinate Axis Name] (COORD_AXIS_NAME_CODE INTEGER, COORD_AXIS_NAME TEXT,
    DESCRIPTION TEXT, REMARKS TEXT);
CREATE TABLE [Coordinate Reference System] (COORD_REF_SYS_CODE INTEGER, COORD_REF_SYS_NAME TEXT,
    AREA_OF_USE_CODE INTEGER, CRS_SCOPE TEXT, REMARKS TEXT, COORD_REF_SYS_KIND TEXT,
    COORD_SYS_CODE INTEGER, DATUM_CODE INTEGER, SOURCE_GEOGCRS_CODE INTEGER,
    PROJECTION_CONV_CODE INTEGER, CMPD_HORIZCRS_CODE INTEGER, CMPD_VERTCRS_CODE INTEGER);
CREATE TABLE [Coordinate_Operation Method] (COORD_OP_METHOD_CODE INTEGER,
    COORD_OP_METHOD_NAME TEXT, FORMULA TEXT, REMARKS TEXT);
CREATE TABLE [Coordinate_Operation Parameter Usage] (COORD_OP_METHOD_CODE INTEGER,
    PARAMETER_CODE INTEGER, SORT_ORDER INTEGER);
CREATE TABLE [Coordinate_Operation Parameter] (PARAMETER_CODE INTEGER, PARAMETER_NAME TEXT,
    DESCRIPTION TEXT);
CREATE TABLE [Coordinate_Operation] (COORD_OP_CODE INTEGER, COORD_OP_NAME TEXT,
    COORD_OP_TYPE TEXT, SOURCE_CRS_CODE INTEGER, TARGET_CRS_CODE INTEGER,
    COORD_OP_METHOD_CODE INTEGER, COORD_TFM_VERSION TEXT, COORD_OP_VARIANT INTEGER,
    COORD_OP_ACCURACY REAL, AREA_OF_USE_CODE INTEGER, COORD_OP_SCOPE TEXT, REMARKS TEXT,
    DEPRECATED INTEGER);
CREATE TABLE [Coordinate_Operation Parameter Value] (COORD_OP_CODE INTEGER,
    COORD_OP_METHOD_CODE INTEGER, PARAMETER_CODE INTEGER, PARAMETER_VALUE REAL,
    PARAM_VALUE_FILE_REF TEXT, UOM_CODE INTEGER);
CREATE TABLE [Coordinate_Operation Path] (CONCAT_OPERATION_CODE INTEGER,
    SINGLE_OPERATION_CODE INTEGER, OP_PATH_STEP INTEGER);
CREATE TABLE [Alias] (ALIAS_CODE INTEGER, OBJECT_TABLE_NAME TEXT, OBJECT_CODE INTEGER,
    NAMING_SYSTEM_CODE INTEGER, ALIAS TEXT);
CREATE TABLE [Naming System] (NAMING_SYSTEM_CODE INTEGER, NAMING_SYSTEM_NAME TEXT);
";

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Dataset rows.
const ROWS: &str = "
INSERT INTO [Unit of Measure] VALUES
    (9001, 'metre', 'length', 9001, 1.0, 1.0, NULL),
    (9093, 'statute mile', 'length', 9001, 1609.344, 1.0, 'Mile of 5280 feet.'),
    (9102, 'degree', 'angle', 9101, 3.14159265358979, 180.0, NULL),
    (9104, 'arc-second', 'angle', 9101, 3.14159265358979, 648000.0, NULL),
    (9105, 'grad', 'angle', 9101, 3.14159265358979, 200.0, NULL),
    (9109, 'microradian', 'angle', 9101, 1.0, 1000000.0, NULL),
    (9122, 'degree (supplier to define representation)', 'angle', 9101, 3.14159265358979, 180.0, NULL),
    (9201, 'unity', 'scale', 9201, 1.0, 1.0, NULL),
    (9202, 'parts per million', 'scale', 9201, 1.0, 1000000.0, NULL),
    (9998, 'broken unit', 'length', 9001, 1.0, 0.0, NULL);

INSERT INTO [Ellipsoid] VALUES
    (7030, 'WGS 84', 6378137.0, 298.257223563, NULL, 9001, NULL),
    (7019, 'GRS 1980', 6378137.0, 298.257222101, NULL, 9001, NULL),
    (7022, 'International 1924', 6378388.0, 297.0, NULL, 9001, NULL),
    (7035, 'Sphere', 6371000.0, NULL, 6371000.0, 9001, NULL),
    (7998, 'Conflicting', 6378137.0, 298.0, NULL, 9001, NULL),
    (7998, 'Conflicting', 6378000.0, 298.0, NULL, 9001, NULL),
    (7999, 'Undefined shape', 6378137.0, 0.0, 0.0, 9001, NULL);

INSERT INTO [Prime Meridian] VALUES
    (8901, 'Greenwich', 0.0, 9102, NULL),
    (8903, 'Paris', 2.5969213, 9105, NULL),
    (8903, 'Paris', 2.5969213, 9105, NULL);

INSERT INTO [Area] VALUES
    (1262, 'World', 'World.', -90.0, 90.0, -180.0, 180.0),
    (2060, 'Europe - ETRS89', NULL, 32.88, 84.17, -16.1, NULL);

INSERT INTO [Datum] VALUES
    (6326, 'World Geodetic System 1984', 'geodetic', 'Defined through the ensemble.', '1984',
        1262, 'Satellite navigation.', NULL, 7030, 8901),
    (6258, 'European Terrestrial Reference System 1989', 'geodetic', NULL, '1989', 2060,
        'Geodesy.', NULL, 7019, 8901),
    (6230, 'European Datum 1950', 'geodetic', 'Fundamental point: Potsdam.', NULL, 2060,
        'Topographic mapping.', NULL, 7022, 8901),
    (6807, 'Nouvelle Triangulation Francaise (Paris)', 'geodetic', NULL, NULL, NULL, NULL, NULL,
        7030, 8903),
    (5100, 'Mean Sea Level', 'vertical', NULL, NULL, 1262, NULL, NULL, NULL, NULL),
    (9315, 'Seismic bin grid datum', 'engineering', NULL, NULL, NULL, NULL, NULL, NULL, NULL);

INSERT INTO [Coordinate System] VALUES
    (6422, 'Ellipsoidal 2D CS. Axes: latitude, longitude.', 'ellipsoidal', 2, NULL),
    (4400, 'Cartesian 2D CS. Axes: easting, northing (E,N).', 'Cartesian', 2, NULL),
    (6499, 'Vertical CS. Axis: height (H).', 'vertical', 1, NULL),
    (9999, 'Cartesian 3D CS with two axes', 'Cartesian', 3, NULL);

INSERT INTO [Coordinate Axis] VALUES
    (107, 6422, 9902, 'east', 'Lon', 9122, 2),
    (106, 6422, 9901, 'north', 'Lat', 9122, 1),
    (2, 4400, 9907, 'north', 'N', 9001, 2),
    (1, 4400, 9906, 'east', 'E', 9001, 1),
    (114, 6499, 9904, 'up', 'H', 9001, 1),
    (3, 9999, 9906, 'east', 'X', 9001, 1),
    (4, 9999, 9907, 'north', 'Y', 9001, 2),
    (999, 9997, 9906, 'sideways', 'S', 9001, 1);

INSERT INTO [Coordinate Axis Name] VALUES
    (9901, 'Geodetic latitude', 'Angle from the equatorial plane.', NULL),
    (9902, 'Geodetic longitude', 'Angle from the prime meridian plane.', NULL),
    (9904, 'Gravity-related height', NULL, 'Height above the geoid.'),
    (9906, 'Easting', NULL, NULL),
    (9907, 'Northing', NULL, NULL);

INSERT INTO [Coordinate Reference System] VALUES
    (4326, 'WGS 84', 1262, 'Horizontal component of 3D system.', NULL, 'geographic 2D', 6422,
        6326, NULL, NULL, NULL, NULL),
    (4258, 'ETRS89', 2060, NULL, NULL, 'geographic 2D', 6422, 6258, NULL, NULL, NULL, NULL),
    (4230, 'ED50', 2060, NULL, NULL, 'geographic 2D', 6422, 6230, NULL, NULL, NULL, NULL),
    (32631, 'WGS 84 / UTM zone 31N', 1262, 'Engineering survey.', NULL, 'projected', 4400, NULL,
        4326, 16031, NULL, NULL),
    (5714, 'MSL height', 1262, NULL, NULL, 'vertical', 6499, 5100, NULL, NULL, NULL, NULL),
    (9705, 'WGS 84 + MSL height', 1262, NULL, NULL, 'compound', NULL, NULL, NULL, NULL, 4326, 5714),
    (5800, 'Seismic bin grid', NULL, NULL, NULL, 'engineering', 4400, 9315, NULL, NULL, NULL,
        NULL),
    (3000, 'Duplicated name', NULL, NULL, NULL, 'geographic 2D', 6422, 6326, NULL, NULL, NULL,
        NULL),
    (3001, 'Duplicated name', NULL, NULL, NULL, 'geographic 2D', 6422, 6326, NULL, NULL, NULL,
        NULL),
    (3002, 'Geographic on a Cartesian CS', NULL, NULL, NULL, 'geographic 2D', 4400, 6326, NULL,
        NULL, NULL, NULL),
    (3003, 'Derived thing', NULL, NULL, NULL, 'derived', 6422, 6326, NULL, NULL, NULL, NULL);

INSERT INTO [Coordinate_Operation Method] VALUES
    (9603, 'Geocentric translations (geog2D domain)', NULL, NULL),
    (9606, 'Position Vector transformation (geog2D domain)', NULL, NULL),
    (9607, 'Coordinate Frame rotation (geog2D domain)', NULL, NULL),
    (9615, 'NTv2', NULL, NULL),
    (9807, 'Transverse Mercator', 'See Guidance Note 7-2.', NULL);

INSERT INTO [Coordinate_Operation Parameter Usage] VALUES
    (9603, 8605, 1), (9603, 8606, 2), (9603, 8607, 3),
    (9606, 8605, 1), (9606, 8606, 2), (9606, 8607, 3), (9606, 8608, 4), (9606, 8609, 5),
    (9606, 8610, 6), (9606, 8611, 7),
    (9607, 8605, 1), (9607, 8606, 2), (9607, 8607, 3), (9607, 8608, 4), (9607, 8609, 5),
    (9607, 8610, 6), (9607, 8611, 7),
    (9615, 8656, 1),
    (9807, 8805, 3), (9807, 8801, 1), (9807, 8807, 5), (9807, 8802, 2), (9807, 8806, 4);

INSERT INTO [Coordinate_Operation Parameter] VALUES
    (8605, 'X-axis translation', NULL),
    (8606, 'Y-axis translation', NULL),
    (8607, 'Z-axis translation', NULL),
    (8608, 'X-axis rotation', NULL),
    (8609, 'Y-axis rotation', NULL),
    (8610, 'Z-axis rotation', NULL),
    (8611, 'Scale difference', NULL),
    (8656, 'Latitude and longitude difference file', NULL),
    (8801, 'Latitude of natural origin', NULL),
    (8802, 'Longitude of natural origin', NULL),
    (8805, 'Scale factor at natural origin', NULL),
    (8806, 'False easting', NULL),
    (8807, 'False northing', NULL);

INSERT INTO [Coordinate_Operation] VALUES
    (16031, 'UTM zone 31N', 'conversion', NULL, NULL, 9807, NULL, NULL, NULL, 1262, NULL, NULL, 0),
    (1149, 'ETRS89 to WGS 84 (1)', 'transformation', 4258, 4326, 9603, 'EPSG-eur', 1, 1.0, 2060,
        'Approximation at the 1m level.', NULL, 0),
    (1571, 'ETRS89 to WGS 84 (old)', 'transformation', 4258, 4326, 9603, NULL, 1, 1.0, 2060,
        NULL, NULL, 1),
    (1150, 'WGS 84 to ETRS89 (1)', 'transformation', 4326, 4258, 9606, NULL, 1, 1.0, 2060, NULL,
        NULL, 0),
    (1133, 'ED50 to WGS 84 (1)', 'transformation', 4230, 4326, 9607, NULL, 1, 5.0, 2060, NULL,
        NULL, 0),
    (1999, 'ED50 to ED50 (self)', 'transformation', 4230, 4230, 9603, NULL, 1, NULL, NULL, NULL,
        NULL, 0),
    (1311, 'ETRS89 to ED50 (NTv2)', 'transformation', 4258, 4230, 9615, NULL, 1, 0.5, 2060, NULL,
        NULL, 0),
    (1998, 'WGS 84 to ED50 (broken)', 'transformation', 4326, 4230, 9603, NULL, 2, 9.0, NULL, NULL,
        NULL, 0),
    (8000, 'ED50 to ETRS89 (via WGS 84)', 'concatenated operation', 4230, 4258, NULL, NULL, 1,
        NULL, 2060, NULL, NULL, 0),
    (8001, 'ED50 loop', 'concatenated operation', 4230, 4230, NULL, NULL, 1, NULL, NULL, NULL,
        NULL, 0);

INSERT INTO [Coordinate_Operation Parameter Value] VALUES
    (16031, 9807, 8806, 500000.0, NULL, 9001),
    (16031, 9807, 8802, 3.0, NULL, 9102),
    (16031, 9807, 8807, 0.0, NULL, 9001),
    (16031, 9807, 8801, 0.0, NULL, 9102),
    (16031, 9807, 8805, 0.9996, NULL, 9201),
    (1149, 9603, 8605, 1.5, NULL, 9001),
    (1149, 9603, 8606, -2.0, NULL, 9001),
    (1149, 9603, 8607, 0.5, NULL, 9001),
    (1571, 9603, 8605, 99.0, NULL, 9001),
    (1571, 9603, 8606, 99.0, NULL, 9001),
    (1571, 9603, 8607, 99.0, NULL, 9001),
    (1150, 9606, 8605, -1.5, NULL, 9001),
    (1150, 9606, 8606, 2.0, NULL, 9001),
    (1150, 9606, 8607, -0.5, NULL, 9001),
    (1150, 9606, 8608, 0.1, NULL, 9104),
    (1150, 9606, 8609, 0.2, NULL, 9104),
    (1150, 9606, 8610, 0.3, NULL, 9104),
    (1150, 9606, 8611, 0.02, NULL, 9202),
    (1133, 9607, 8605, -87.0, NULL, 9001),
    (1133, 9607, 8606, -98.0, NULL, 9001),
    (1133, 9607, 8607, -121.0, NULL, 9001),
    (1133, 9607, 8608, 0.3, NULL, 9104),
    (1133, 9607, 8609, 0.0, NULL, 9104),
    (1133, 9607, 8610, 1.0, NULL, 9109),
    (1133, 9607, 8611, 1.5, NULL, 9202),
    (1999, 9603, 8605, 0.0, NULL, 9001),
    (1999, 9603, 8606, 0.0, NULL, 9001),
    (1999, 9603, 8607, 0.0, NULL, 9001),
    (1311, 9615, 8656, NULL, 'ntv2_0.gsb', NULL),
    (1998, 9603, 8605, 1.0, 'translation.gsb', 9001);

INSERT INTO [Coordinate_Operation Path] VALUES
    (8000, 1150, 2),
    (8000, 1133, 1),
    (8001, 1133, 1),
    (8001, 8001, 2);

INSERT INTO [Alias] VALUES
    (1, 'Datum', 6326, 7300, 'WGS84'),
    (2, 'Datum', 6326, NULL, 'World Geodetic System 1984 ensemble'),
    (3, 'Coordinate Reference System', 4326, 7301, 'WGS 1984');

INSERT INTO [Naming System] VALUES
    (7300, 'ESRI'),
    (7301, 'OGP');
";

/// Minimal dataset under the `epsg_*` script names.
const ANSI_DATASET: &str = "
CREATE TABLE epsg_unitofmeasure (UOM_CODE INTEGER, UNIT_OF_MEAS_NAME TEXT,
    UNIT_OF_MEAS_TYPE TEXT, TARGET_UOM_CODE INTEGER, FACTOR_B REAL, FACTOR_C REAL, REMARKS TEXT);
CREATE TABLE epsg_ellipsoid (ELLIPSOID_CODE INTEGER, ELLIPSOID_NAME TEXT, SEMI_MAJOR_AXIS REAL,
    INV_FLATTENING REAL, SEMI_MINOR_AXIS REAL, UOM_CODE INTEGER, REMARKS TEXT);
CREATE TABLE epsg_alias (ALIAS_CODE INTEGER, OBJECT_TABLE_NAME TEXT, OBJECT_CODE INTEGER,
    NAMING_SYSTEM_CODE INTEGER, ALIAS TEXT);
CREATE TABLE epsg_namingsystem (NAMING_SYSTEM_CODE INTEGER, NAMING_SYSTEM_NAME TEXT);
INSERT INTO epsg_unitofmeasure VALUES (9001, 'metre', 'length', 9001, 1.0, 1.0, NULL);
INSERT INTO epsg_ellipsoid VALUES (7019, 'GRS 1980', 6378137.0, 298.257222101, NULL, 9001, NULL);
INSERT INTO epsg_alias VALUES (1, 'epsg_ellipsoid', 7019, 7302, 'GRS80');
INSERT INTO epsg_namingsystem VALUES (7302, 'EPSG abbreviation');
";

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Temporary dataset file, removed when dropped.
pub struct Dataset {
    /// Directory holding the file.
    pub dir: TempDir,
    /// Dataset path.
    pub path: PathBuf,
}

impl Dataset {
    /// Writes the shipped-name dataset.
    pub fn access() -> Self {
        Self::create(&format!("{SCHEMA}{ROWS}"))
    }

    /// Writes the shipped-name schema filled with `rows` only.
    pub fn with_rows(rows: &str) -> Self {
        Self::create(&format!("{SCHEMA}{rows}"))
    }

    /// Writes the `epsg_*`-name dataset.
    pub fn ansi() -> Self {
        Self::create(ANSI_DATASET)
    }

    fn create(sql: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = write_dataset(dir.path(), sql);
        Self {
            dir,
            path,
        }
    }

    /// Returns the store configuration of the dataset.
    pub fn config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig::new(&self.path)
    }

    /// Opens a factory with default options.
    pub fn factory(&self) -> Arc<EpsgFactory> {
        self.factory_with(FactoryOptions::default())
    }

    /// Opens a factory with `options`.
    pub fn factory_with(&self, options: FactoryOptions) -> Arc<EpsgFactory> {
        let connection = SqliteEpsgConnection::open(&self.config()).unwrap();
        Arc::new(EpsgFactory::new(Box::new(connection), Arc::new(assembler()), options))
    }

    /// Returns a connector opening the dataset.
    pub fn connector(&self) -> Arc<SqliteConnector> {
        Arc::new(SqliteConnector::new(self.config()).unwrap())
    }
}

/// Writes `sql` into a fresh dataset file under `dir`.
pub fn write_dataset(dir: &Path, sql: &str) -> PathBuf {
    let path = dir.join("epsg.sqlite");
    let connection = Connection::open(&path).unwrap();
    connection.execute_batch(sql).unwrap();
    path
}

/// Creates an assembler over the default transform factory.
pub fn assembler() -> OperationAssembler {
    OperationAssembler::new(Arc::new(DefaultMathTransformFactory::new()))
}

/// Options for the `epsg_*` dataset.
pub fn ansi_options() -> FactoryOptions {
    FactoryOptions::with_dialect(SqlDialect::Ansi)
}

/// Options with a short idle timeout and sweep interval.
pub fn idle_options(idle: Duration, sweep: Duration) -> FactoryOptions {
    FactoryOptions {
        idle_timeout: idle,
        sweep_interval: sweep,
        ..FactoryOptions::default()
    }
}

/// Asserts two floats agree to `tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
