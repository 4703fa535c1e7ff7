// Cleaning a small assessment extract
// Author: Gabriel Demetrios Lafis

use property_assessment_pipeline::{
    data::{DataSet, Row, SchemaBuilder, Value},
    processing::{DisplayBounds, TransformOptions, Transformer},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut raw = DataSet::new(SchemaBuilder::assessment().build());

    let sales = [
        ("0", Some("(42.88, -78.87)"), 42.88, -78.87, "1/1/1900 0:00", 50000.0, 210),
        ("1", Some("(42.91, -78.85)"), 42.91, -78.85, "3/14/2015 0:00", 125000.0, 210),
        ("2", None, 42.93, -78.82, "5/2/2016 0:00", 90000.0, 220),
        ("3", Some("(42.92, -78.84)"), 42.92, -78.84, "2/20/2019 0:00", 310000.0, 484),
        ("4", Some("(42.86, -78.83)"), 42.86, -78.83, "8/8/2012 0:00", 45000.0, 652),
    ];

    for (id, location, lat, lon, deed, price, class) in sales {
        raw.add_row(Row::new(
            id,
            vec![
                location.map_or(Value::Null, |l| Value::String(l.to_string())),
                Value::Float(lat),
                Value::Float(lon),
                Value::String(deed.to_string()),
                Value::Float(price),
                Value::Integer(class),
                Value::String("DWELLING".to_string()),
                Value::String(format!("{} MAIN ST", id)),
            ],
        ))?;
    }

    println!("Raw extract:");
    print_dataset(&raw);

    let transformer = Transformer::new(TransformOptions {
        strict_residential_classes: true,
        ..TransformOptions::default()
    });
    let (cleaned, report) = transformer.transform_with_report(&raw)?;

    println!("\nCleaned table:");
    print_dataset(&cleaned);

    println!("\nStages:");
    for stage in &report.stages {
        println!("  {:<24} {} -> {}", stage.stage, stage.rows_in, stage.rows_out);
    }

    let bounds = DisplayBounds::from_dataset(&cleaned)?;
    println!("\nBounds: {}", serde_json::to_string(&bounds)?);

    Ok(())
}

// Helper function to print a dataset
fn print_dataset(dataset: &DataSet) {
    print!("{}", dataset.index_name);
    for field in &dataset.schema.fields {
        print!(" | {}", field.name);
    }
    println!();

    for row in &dataset.data {
        print!("{}", row.index);
        for value in &row.values {
            match value {
                Value::Float(f) => print!(" | {:.1}", f),
                other => print!(" | {}", other),
            }
        }
        println!();
    }
}
