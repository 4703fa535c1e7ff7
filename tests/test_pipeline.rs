// Pipeline tests
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use property_assessment_pipeline::{
    data::{
        load, load_with_schema, DataSet, Row, SchemaBuilder, Value, DEED_DATE, DEED_YEAR,
        LOCATION, SALE_PRICE, X, Y,
    },
    processing::{
        discover_sentinel, parse_deed_year, transform, transform_and_persist, web_mercator,
        DisplayBounds, NonFinitePolicy, SentinelSource, TransformOptions, Transformer,
        EARTH_RADIUS,
    },
};

const PLACEHOLDER: &str = "1/1/1900 0:00";

fn raw_row(id: &str, location: Option<&str>, lat: f64, lon: f64, deed: &str, price: f64, class: i64) -> Row {
    Row::new(
        id,
        vec![
            location.map_or(Value::Null, |l| Value::String(l.to_string())),
            Value::Float(lat),
            Value::Float(lon),
            Value::String(deed.to_string()),
            Value::Float(price),
            Value::Integer(class),
            Value::String("ONE FAMILY DWELLING".to_string()),
            Value::String(format!("{} MAIN ST", id)),
        ],
    )
}

fn sale(id: &str, deed: &str, price: f64) -> Row {
    raw_row(id, Some("(42.9, -78.8)"), 42.9, -78.8, deed, price, 210)
}

fn raw_dataset(rows: Vec<Row>) -> DataSet {
    let mut dataset = DataSet::new(SchemaBuilder::assessment().build());
    for row in rows {
        dataset.add_row(row).unwrap();
    }
    dataset
}

fn column(dataset: &DataSet, name: &str) -> Vec<Value> {
    dataset.column(name).unwrap().cloned().collect()
}

fn indices(dataset: &DataSet) -> Vec<&str> {
    dataset.data.iter().map(|row| row.index.as_str()).collect()
}

const RAW_CSV: &str = "\
,LOCATION,LATITUDE,LONGITUDE,DEED DATE,SALE PRICE,PROPERTY CLASS,PROP CLASS DESCRIPTION,ADDRESS
0,\"(42.88, -78.87)\",42.88,-78.87,1/1/1900 0:00,50000,210,ONE FAMILY DWELLING,1 MAIN ST
1,\"(42.91, -78.85)\",42.91,-78.85,3/14/2015 0:00,125000,210,ONE FAMILY DWELLING,2 ELM ST
2,,42.93,-78.82,5/2/2016 0:00,90000,220,TWO FAMILY DWELLING,3 OAK ST
3,\"(42.89, -78.86)\",42.89,-78.86,7/30/1985 0:00,40000,210,ONE FAMILY DWELLING,4 PINE ST
4,\"(42.90, -78.81)\",42.90,-78.81,11/9/2018 0:00,9000,311,RESIDENTIAL VACANT LAND,5 ASH ST
5,\"(42.87, -78.88)\",42.87,-78.88,1/1/1900 0:00,70000,210,ONE FAMILY DWELLING,6 BIRCH ST
6,\"(42.92, -78.84)\",42.92,-78.84,2/20/2019 0:00,310000,484,OTHER COMMERCIAL,7 MAPLE ST
7,\"(42.86, -78.83)\",42.86,-78.83,8/8/2012 0:00,45000.5,652,GOVERNMENT BUILDING,8 CEDAR ST
8,\"(42.95, -78.80)\",42.95,-78.80,12/31/1999 0:00,18500,230,THREE FAMILY DWELLING,9 WALNUT ST
";

fn write_fixture(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("assessment.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn assert_same_values(left: &DataSet, right: &DataSet) {
    assert_eq!(left.len(), right.len());
    assert_eq!(left.schema.names(), right.schema.names());
    assert_eq!(indices(left), indices(right));

    for (a, b) in left.data.iter().zip(&right.data) {
        for (va, vb) in a.values.iter().zip(&b.values) {
            match (va.as_f64(), vb.as_f64()) {
                (Some(x), Some(y)) if x.is_finite() => assert!((x - y).abs() < 1e-6, "{} != {}", x, y),
                _ => assert_eq!(va, vb),
            }
        }
    }
}

#[test]
fn test_projection_origin_and_antimeridian() {
    let (x, y) = web_mercator(0.0, 0.0);
    assert!(x.abs() < 1e-6);
    assert!(y.abs() < 1e-6);

    let (x, _) = web_mercator(180.0, 0.0);
    assert!((x - EARTH_RADIUS * std::f64::consts::PI).abs() < 1e-3);
    assert!((x - 2.0037e7).abs() < 1e4);
}

#[test]
fn test_projection_at_the_poles() {
    let (_, y) = web_mercator(0.0, -90.0);
    assert!(y.is_infinite() && y < 0.0);

    // tan(pi/2) is finite in f64, so the north pole lands absurdly far away
    let (_, y) = web_mercator(0.0, 90.0);
    assert!(y > 1.0e8);
}

#[test]
fn test_year_floor_is_strict() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        sale("1", "6/1/1990 0:00", 50_000.0),
        sale("2", "6/1/1991 0:00", 50_000.0),
    ]);

    let cleaned = transform(&raw).unwrap();

    assert_eq!(indices(&cleaned), vec!["2"]);
    assert_eq!(column(&cleaned, DEED_YEAR), vec![Value::Integer(1991)]);
}

#[test]
fn test_price_floor_is_strict() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        sale("1", "6/1/2010 0:00", 10_000.0),
        sale("2", "6/1/2010 0:00", 10_001.0),
    ]);

    let cleaned = transform(&raw).unwrap();

    assert_eq!(indices(&cleaned), vec!["2"]);
    assert_eq!(column(&cleaned, SALE_PRICE), vec![Value::Float(10_001.0)]);
}

#[test]
fn test_placeholder_rows_are_dropped_including_the_first() {
    let rows = (0..10)
        .map(|i| {
            let deed = if i == 0 || i == 4 || i == 7 {
                PLACEHOLDER.to_string()
            } else {
                format!("3/{}/2012 0:00", i + 1)
            };
            sale(&i.to_string(), &deed, 20_000.0)
        })
        .collect();
    let raw = raw_dataset(rows);

    assert_eq!(discover_sentinel(&raw).unwrap(), Some(PLACEHOLDER.to_string()));

    let cleaned = transform(&raw).unwrap();

    assert_eq!(cleaned.len(), 7);
    assert_eq!(indices(&cleaned), vec!["1", "2", "3", "5", "6", "8", "9"]);
    assert!(column(&cleaned, DEED_DATE)
        .iter()
        .all(|v| *v != Value::String(PLACEHOLDER.to_string())));
}

#[test]
fn test_placeholder_is_read_after_location_filter() {
    let raw = raw_dataset(vec![
        raw_row("0", None, 42.9, -78.8, "4/4/2004 0:00", 50_000.0, 210),
        sale("1", PLACEHOLDER, 50_000.0),
        sale("2", "4/4/2004 0:00", 50_000.0),
        sale("3", PLACEHOLDER, 50_000.0),
    ]);

    let cleaned = transform(&raw).unwrap();

    assert_eq!(indices(&cleaned), vec!["2"]);
}

#[test]
fn test_fixed_placeholder_replaces_discovery() {
    let raw = raw_dataset(vec![
        sale("0", "4/4/2004 0:00", 50_000.0),
        sale("1", "0/0/0000 0:00", 50_000.0),
        sale("2", "5/5/2005 0:00", 50_000.0),
    ]);

    let transformer = Transformer::new(TransformOptions {
        sentinel: SentinelSource::Fixed("0/0/0000 0:00".to_string()),
        ..TransformOptions::default()
    });
    let cleaned = transformer.transform(&raw).unwrap();

    assert_eq!(indices(&cleaned), vec!["0", "2"]);
}

#[test]
fn test_projection_columns_are_added() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", Some("(0, 0)"), 0.0, 180.0, "1/2/2003 0:00", 50_000.0, 210),
    ]);

    let cleaned = transform(&raw).unwrap();

    let x = column(&cleaned, X)[0].as_f64().unwrap();
    let y = column(&cleaned, Y)[0].as_f64().unwrap();
    assert!((x - EARTH_RADIUS * std::f64::consts::PI).abs() < 1e-3);
    assert!(y.abs() < 1e-6);
}

fn without_coordinate(mut row: Row, position: usize) -> Row {
    row.values[position] = Value::Null;
    row
}

fn unusable_coordinate_rows() -> Vec<Row> {
    vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", Some("south pole"), -90.0, 0.0, "1/2/2003 0:00", 50_000.0, 210),
        raw_row("2", Some("north pole"), 90.0, 0.0, "1/2/2003 0:00", 50_000.0, 210),
        without_coordinate(sale("3", "1/2/2003 0:00", 50_000.0), 1),
        without_coordinate(sale("4", "1/2/2003 0:00", 50_000.0), 2),
        sale("5", "1/2/2003 0:00", 50_000.0),
    ]
}

#[test]
fn test_unusable_coordinates_pass_through_by_default() {
    let passed = transform(&raw_dataset(unusable_coordinate_rows())).unwrap();

    assert_eq!(indices(&passed), vec!["1", "2", "3", "4", "5"]);

    let y = column(&passed, Y);
    assert!(y[0].as_f64().unwrap().is_infinite());
    assert!(y[1].as_f64().unwrap().is_finite());
    assert!(y[1].as_f64().unwrap() > 1.0e8);

    let x = column(&passed, X);
    assert_eq!((x[2].clone(), y[2].clone()), (Value::Null, Value::Null));
    assert_eq!((x[3].clone(), y[3].clone()), (Value::Null, Value::Null));
}

#[test]
fn test_unusable_coordinates_are_rejected_on_request() {
    let transformer = Transformer::new(TransformOptions {
        non_finite: NonFinitePolicy::Reject,
        ..TransformOptions::default()
    });

    let (rejected, report) = transformer
        .transform_with_report(&raw_dataset(unusable_coordinate_rows()))
        .unwrap();

    assert_eq!(indices(&rejected), vec!["5"]);

    let counts = |name: &str| {
        report
            .stages
            .iter()
            .find(|s| s.stage == name)
            .map(|s| (s.rows_in, s.rows_out))
            .unwrap()
    };
    // Both poles and the null latitude go at the latitude check, before y is looked at
    assert_eq!(counts("projectable_latitude"), (5, 2));
    assert_eq!(counts("finite_x"), (2, 1));
    assert_eq!(counts("finite_y"), (1, 1));
}

#[test]
fn test_north_pole_is_dropped_by_the_latitude_check() {
    let transformer = Transformer::new(TransformOptions {
        non_finite: NonFinitePolicy::Reject,
        ..TransformOptions::default()
    });
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", Some("north pole"), 90.0, 0.0, "1/2/2003 0:00", 50_000.0, 210),
    ]);

    let (rejected, report) = transformer.transform_with_report(&raw).unwrap();

    assert!(rejected.is_empty());
    let latitude = report
        .stages
        .iter()
        .find(|s| s.stage == "projectable_latitude")
        .unwrap();
    assert_eq!((latitude.rows_in, latitude.rows_out), (1, 0));
}

#[test]
fn test_stage_order_with_every_option() {
    let transformer = Transformer::new(TransformOptions {
        strict_residential_classes: true,
        non_finite: NonFinitePolicy::Reject,
        ..TransformOptions::default()
    });

    assert_eq!(
        transformer.pipeline().stages(),
        vec![
            "location",
            "projection",
            "deed_date_placeholder",
            "projectable_latitude",
            "finite_x",
            "finite_y",
            "deed_year",
            "deed_year_floor",
            "sale_price_floor",
            "property_class_ceiling",
            "select",
        ]
    );
}

#[test]
fn test_strict_mode_keeps_map_columns_and_low_classes() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", Some("a"), 42.9, -78.8, "1/2/2003 0:00", 50_000.0, 499),
        raw_row("2", Some("b"), 42.9, -78.8, "1/2/2003 0:00", 50_000.0, 500),
        raw_row("3", Some("c"), 42.9, -78.8, "1/2/2003 0:00", 50_000.0, 210),
    ]);

    let transformer = Transformer::new(TransformOptions {
        strict_residential_classes: true,
        ..TransformOptions::default()
    });
    let cleaned = transformer.transform(&raw).unwrap();

    assert_eq!(indices(&cleaned), vec!["1", "3"]);

    let names: HashSet<&str> = cleaned.schema.names().into_iter().collect();
    let expected: HashSet<&str> = [
        "x",
        "y",
        "DEED YEAR",
        "PROPERTY CLASS",
        "SALE PRICE",
        "PROP CLASS DESCRIPTION",
        "ADDRESS",
    ]
    .into_iter()
    .collect();
    assert_eq!(names, expected);
    for dropped in ["LATITUDE", "LONGITUDE", "LOCATION", "DEED DATE"] {
        assert!(!names.contains(dropped));
    }
}

#[test]
fn test_unparseable_deed_date_fails_the_run() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        sale("1", "1/2/2003 0:00", 50_000.0),
        sale("2", "not-a-date", 50_000.0),
    ]);

    let err = transform(&raw).unwrap_err();

    assert!(err.is_parse());
    assert_eq!(err.stage(), Some("deed_year"));
    assert!(err.to_string().contains("not-a-date"));
}

#[test]
fn test_parse_deed_year_shapes() {
    assert_eq!(parse_deed_year("3/14/2015 0:00"), Ok(2015));
    assert_eq!(parse_deed_year("12/31/1999"), Ok(1999));
    assert!(parse_deed_year("not-a-date").is_err());
    assert!(parse_deed_year("2015").is_err());
    assert!(parse_deed_year("3/14/20x5 0:00").is_err());
    assert!(parse_deed_year("").is_err());
}

#[test]
fn test_missing_required_column_is_a_schema_error() {
    let schema = SchemaBuilder::new()
        .add_string("LOCATION")
        .add_float("LATITUDE")
        .build();
    let raw = DataSet::new(schema);

    let err = transform(&raw).unwrap_err();

    assert!(err.is_schema());
    assert_eq!(err.stage(), Some("validate"));
}

#[test]
fn test_report_counts_rows_per_stage() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", None, 42.9, -78.8, "1/2/2003 0:00", 50_000.0, 210),
        sale("2", "1/2/1980 0:00", 50_000.0),
        sale("3", "1/2/2003 0:00", 5_000.0),
        sale("4", "1/2/2003 0:00", 50_000.0),
    ]);

    let (cleaned, report) = Transformer::default().transform_with_report(&raw).unwrap();

    assert_eq!(cleaned.len(), 1);
    assert_eq!(report.rows_before, 5);
    assert_eq!(report.rows_after, 1);
    assert_eq!(report.columns_before, 8);
    assert_eq!(report.columns_after, 11);

    let stages: Vec<(&str, usize, usize)> = report
        .stages
        .iter()
        .map(|s| (s.stage.as_str(), s.rows_in, s.rows_out))
        .collect();
    assert_eq!(
        stages,
        vec![
            ("location", 5, 4),
            ("projection", 4, 4),
            ("deed_date_placeholder", 4, 3),
            ("deed_year", 3, 3),
            ("deed_year_floor", 3, 2),
            ("sale_price_floor", 2, 1),
        ]
    );
}

#[test]
fn test_persisted_output_reloads_to_the_same_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), RAW_CSV);
    let output = dir.path().join("clean.csv");

    let persisted = transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();
    let in_memory = transform(&load(input.to_str().unwrap()).unwrap()).unwrap();
    let reloaded = load(output.to_str().unwrap()).unwrap();

    assert_eq!(indices(&in_memory), vec!["1", "6", "7", "8"]);
    assert_same_values(&persisted, &in_memory);
    assert_same_values(&reloaded, &in_memory);
    assert_eq!(reloaded.index_name, "");
}

#[test]
fn test_strict_output_reloads_to_the_same_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), RAW_CSV);
    let output = dir.path().join("clean.csv");

    let transformer = Transformer::new(TransformOptions {
        strict_residential_classes: true,
        ..TransformOptions::default()
    });

    let cleaned = transformer
        .transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap())
        .unwrap();
    let reloaded = load(output.to_str().unwrap()).unwrap();

    assert_eq!(indices(&cleaned), vec!["1", "6", "8"]);
    assert_same_values(&reloaded, &cleaned);
}

#[test]
fn test_failed_run_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let broken = RAW_CSV.replace("3/14/2015 0:00", "not-a-date");
    let input = write_fixture(dir.path(), &broken);
    let output = dir.path().join("clean.csv");

    let err = transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).unwrap_err();

    assert!(err.is_parse());
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_failed_run_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let broken = RAW_CSV.replace("3/14/2015 0:00", "not-a-date");
    let input = write_fixture(dir.path(), &broken);
    let output = dir.path().join("clean.csv");
    fs::write(&output, "previous").unwrap();

    assert!(transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn test_display_bounds_of_cleaned_table() {
    let raw = raw_dataset(vec![
        sale("0", PLACEHOLDER, 50_000.0),
        raw_row("1", Some("a"), 0.0, 0.0, "1/2/1995 0:00", 50_000.0, 210),
        raw_row("2", Some("b"), 10.0, 180.0, "1/2/2019 0:00", 50_000.0, 210),
    ]);

    let cleaned = transform(&raw).unwrap();
    let bounds = DisplayBounds::from_dataset(&cleaned).unwrap();

    let years = bounds.deed_year.unwrap();
    assert_eq!((years.min, years.max), (1995.0, 2019.0));

    let x = bounds.x.unwrap();
    assert!(x.min.abs() < 1e-6);
    assert!((x.max - EARTH_RADIUS * std::f64::consts::PI).abs() < 1e-3);

    let y = bounds.y.unwrap();
    assert!(y.min.abs() < 1e-6);
    assert!(y.max > 1.0e6);
}

#[test]
fn test_display_bounds_of_empty_table() {
    let raw = raw_dataset(vec![sale("0", PLACEHOLDER, 50_000.0)]);

    let cleaned = transform(&raw).unwrap();
    let bounds = DisplayBounds::from_dataset(&cleaned).unwrap();

    assert!(cleaned.is_empty());
    assert_eq!(bounds.x, None);
    assert_eq!(bounds.deed_year, None);
}

#[test]
fn test_display_bounds_need_projected_columns() {
    let raw = raw_dataset(vec![sale("0", PLACEHOLDER, 50_000.0)]);

    assert!(DisplayBounds::from_dataset(&raw).is_err());
}

#[test]
fn test_missing_input_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.csv");
    let output = dir.path().join("clean.csv");

    let err = transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.stage(), Some("load"));
    assert!(!output.exists());
}

#[test]
fn test_null_markers_are_treated_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let raw = RAW_CSV
        .replace("2,,42.93", "2,NULL,42.93")
        .replace("42.92,-78.84,2/20/2019 0:00,310000", "42.92,-78.84,2/20/2019 0:00,NA")
        .replace("\"(42.95, -78.80)\"", "None");
    let input = write_fixture(dir.path(), &raw);
    let output = dir.path().join("clean.csv");

    let cleaned = transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();

    assert_eq!(indices(&cleaned), vec!["1", "7"]);
    assert!(column(&cleaned, LOCATION).iter().all(|v| !v.is_null()));
}

#[test]
fn test_reload_with_schema_keeps_numeric_looking_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = String::new();
    for (n, line) in RAW_CSV.lines().enumerate() {
        let parcel = match n {
            0 => "PARCEL",
            1 => "UNKNOWN",
            _ => "01234",
        };
        raw.push_str(&format!("{},{}\n", line, parcel));
    }
    let input = write_fixture(dir.path(), &raw);
    let output = dir.path().join("clean.csv");

    let cleaned = transform_and_persist(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();
    let reloaded = load_with_schema(output.to_str().unwrap(), &cleaned.schema).unwrap();

    let types = |d: &DataSet| d.schema.fields.iter().map(|f| f.data_type).collect::<Vec<_>>();
    assert_eq!(types(&reloaded), types(&cleaned));
    assert_same_values(&reloaded, &cleaned);
    assert_eq!(
        column(&reloaded, "PARCEL")[0],
        Value::String("01234".to_string())
    );
}
