//! Shapes command implementation.

use anyhow::Result;
use brokerkit_lib::RecordShape;

/// List every shape, or print the field table of one.
pub(crate) fn show_shapes(name: Option<&str>) -> Result<()> {
    let Some(name) = name else {
        println!("{:<20} {:>8} {:>10}", "SHAPE", "FIELDS", "REQUIRED");
        println!("{}", "-".repeat(40));
        for shape in RecordShape::all() {
            let required = shape.fields().iter().filter(|f| f.required).count();
            println!("{:<20} {:>8} {:>10}", shape.name(), shape.fields().len(), required);
        }
        return Ok(());
    };

    let shape: RecordShape = name.parse()?;
    println!("Shape: {shape}");
    println!("{:<26} {:<26} {:<18} {:<8}", "SOURCE", "TARGET", "KIND", "REQUIRED");
    println!("{}", "-".repeat(80));
    for field in shape.fields() {
        println!(
            "{:<26} {:<26} {:<18} {:<8}",
            field.source,
            field.target,
            field.kind.type_name(),
            if field.required { "yes" } else { "no" }
        );
    }
    Ok(())
}
