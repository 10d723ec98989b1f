//! Basic usage example for bloodbank-records.
//!
//! This example demonstrates address normalization on its own:
//! - Structured fields winning over a legacy location string
//! - Sentinel strings from form serializers being dropped
//! - Flattening to storage columns and reading them back
//!
//! Run with: cargo run --example basic_usage

use bloodbank_records::{
    flatten, unflatten, AddressFields, AddressLevel, AddressNormalizer, CoordinateInput,
};

fn main() {
    println!("bloodbank-records Basic Usage Example");
    println!("=====================================\n");

    let normalizer = AddressNormalizer::new();

    // Example 1: Structured input beats legacy text
    println!("1. Structured Address");
    println!("---------------------");

    let fields = AddressFields::new()
        .with_region("Addis Ababa")
        .with_city("Addis Ababa")
        .with_sub_city("Bole")
        .with(AddressLevel::Woreda, "03")
        .with(AddressLevel::HomeNumber, "undefined")
        .with_coordinates("8.99", 38.79);
    let addr = normalizer.normalize(&fields, Some("somewhere near the airport"));

    println!("Display: {}", addr);
    for level in AddressLevel::ALL {
        if let Some(value) = addr.get(level) {
            println!("  {}: {}", level, value);
        }
    }
    if let Some(coords) = addr.coordinates() {
        println!("  Coordinates: {}, {}", coords.latitude, coords.longitude);
    }
    println!();

    // Example 2: Legacy-only input
    println!("2. Legacy Location");
    println!("------------------");

    let legacy = normalizer.normalize_legacy("Near Piassa, Gondar");
    println!("Display: {}", legacy);
    println!("Has structured fields: {}", legacy.has_structured());
    println!();

    // Example 3: Rejected coordinates
    println!("3. Coordinate Validation");
    println!("------------------------");

    let mut fields = AddressFields::new().with_city("Hawassa");
    fields.latitude = Some(CoordinateInput::Text("95".to_string()));
    fields.longitude = Some(CoordinateInput::Number(38.48));
    let addr = normalizer.normalize(&fields, None);
    println!("Latitude 95 accepted: {}", addr.coordinates().is_some());
    println!();

    // Example 4: Storage columns
    println!("4. Storage Columns");
    println!("------------------");

    let row = flatten(&addr);
    println!("{:#?}", row);
    println!("Round trip equal: {}", unflatten(&row) == addr);
}
