//! Registry and search example for bloodbank-records.
//!
//! Registers a few donors in an in-memory registry and runs the kind of
//! combined filter a donor list view applies.
//!
//! Run with: cargo run --example search_records

use bloodbank_records::{
    AddressFields, DonorInput, Error, RecordQuery, Registry, RegistryConfig,
};

fn main() -> Result<(), Error> {
    println!("bloodbank-records Search Example");
    println!("================================\n");

    let registry = Registry::with_config(RegistryConfig::in_memory())?;

    let donors = [
        ("Abebe Kebede", "O+", Some("Addis Ababa"), None),
        ("Sara Tesfaye", "A-", Some("Gondar"), None),
        ("Kebede Alemu", "O+", None, Some("Dire Dawa, near the railway")),
    ];
    for (name, blood_type, city, location) in donors {
        let donor = registry.register_donor(&DonorInput {
            name: Some(name.to_string()),
            blood_type: Some(blood_type.to_string()),
            location: location.map(str::to_string),
            location_details: city.map(|c| AddressFields::new().with_city(c)),
            ..DonorInput::default()
        })?;
        println!("Registered {} ({}) at {}", donor.name, donor.blood_type, donor.address);
    }
    println!();

    let queries = [
        ("O+ donors in Addis", "O+", "addis"),
        ("Anyone near Dire Dawa", "", "dire"),
        ("Everyone", "", ""),
    ];
    for (label, category, location) in queries {
        let query = RecordQuery {
            category: category.to_string(),
            location: location.to_string(),
            ..RecordQuery::default()
        };
        let found = registry.search_donors(&query)?;
        println!("{label}: {} result(s)", found.len());
        for donor in found {
            println!("  - {} ({})", donor.name, donor.address);
        }
    }

    Ok(())
}
