//! Projection between [`AddressRecord`] and flat storage columns.
//!
//! This is the only place that knows how an address is laid out in a row.
//! Structured fields map 1:1 to like-named columns. The legacy `location`
//! column is written only for addresses that have no structured field; it is
//! fallback storage, not a cache of the display string.

use crate::address::{AddressFields, AddressLevel, AddressRecord, CoordinateInput};
use crate::normalizer::AddressNormalizer;

/// Column holding legacy free-text locations.
pub const LOCATION_COLUMN: &str = "location";

/// Column holding latitude.
pub const LATITUDE_COLUMN: &str = "latitude";

/// Column holding longitude.
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Every address column, in storage order.
pub const ADDRESS_COLUMNS: [&str; 10] = [
    "region",
    "city",
    "sub_city",
    "woreda",
    "kebele",
    "street",
    "home_number",
    LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
    LOCATION_COLUMN,
];

/// The address part of a storage row.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlatColumns {
    /// `region`
    pub region: Option<String>,
    /// `city`
    pub city: Option<String>,
    /// `sub_city`
    pub sub_city: Option<String>,
    /// `woreda`
    pub woreda: Option<String>,
    /// `kebele`
    pub kebele: Option<String>,
    /// `street`
    pub street: Option<String>,
    /// `home_number`
    pub home_number: Option<String>,
    /// `latitude`
    pub latitude: Option<f64>,
    /// `longitude`
    pub longitude: Option<f64>,
    /// `location`, legacy free text
    pub location: Option<String>,
}

impl FlatColumns {
    /// Value of a structured column.
    pub fn get(&self, level: AddressLevel) -> Option<&str> {
        match level {
            AddressLevel::Region => self.region.as_deref(),
            AddressLevel::City => self.city.as_deref(),
            AddressLevel::SubCity => self.sub_city.as_deref(),
            AddressLevel::Woreda => self.woreda.as_deref(),
            AddressLevel::Kebele => self.kebele.as_deref(),
            AddressLevel::Street => self.street.as_deref(),
            AddressLevel::HomeNumber => self.home_number.as_deref(),
        }
    }

    /// Mutable slot of a structured column.
    pub fn slot_mut(&mut self, level: AddressLevel) -> &mut Option<String> {
        match level {
            AddressLevel::Region => &mut self.region,
            AddressLevel::City => &mut self.city,
            AddressLevel::SubCity => &mut self.sub_city,
            AddressLevel::Woreda => &mut self.woreda,
            AddressLevel::Kebele => &mut self.kebele,
            AddressLevel::Street => &mut self.street,
            AddressLevel::HomeNumber => &mut self.home_number,
        }
    }
}

/// Project an address into storage columns.
pub fn flatten(addr: &AddressRecord) -> FlatColumns {
    let mut row = FlatColumns {
        latitude: addr.latitude(),
        longitude: addr.longitude(),
        ..FlatColumns::default()
    };
    for level in AddressLevel::ALL {
        *row.slot_mut(level) = addr.get(level).map(str::to_string);
    }
    if !addr.has_structured() {
        row.location = addr.display_string().map(str::to_string);
    }
    row
}

/// Rebuild an address from storage columns using default normalization.
pub fn unflatten(row: &FlatColumns) -> AddressRecord {
    unflatten_with(&AddressNormalizer::new(), row)
}

/// Rebuild an address from storage columns.
///
/// Rows are re-normalized on the way in, so rows written by older code with
/// sentinel strings, stray whitespace or half a coordinate pair still come
/// back as valid records.
pub fn unflatten_with(normalizer: &AddressNormalizer, row: &FlatColumns) -> AddressRecord {
    let fields = AddressFields {
        region: row.region.clone(),
        city: row.city.clone(),
        sub_city: row.sub_city.clone(),
        woreda: row.woreda.clone(),
        kebele: row.kebele.clone(),
        street: row.street.clone(),
        home_number: row.home_number.clone(),
        latitude: row.latitude.map(CoordinateInput::Number),
        longitude: row.longitude.map(CoordinateInput::Number),
    };
    normalizer.normalize(&fields, row.location.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use proptest::prelude::*;

    #[test]
    fn test_flatten_structured_has_no_location() {
        let addr = normalize(
            &AddressFields::new()
                .with_city("Gondar")
                .with_coordinates(12.6, 37.47),
            Some("old text"),
        );
        let row = flatten(&addr);

        assert_eq!(row.city.as_deref(), Some("Gondar"));
        assert_eq!(row.region, None);
        assert_eq!(row.latitude, Some(12.6));
        assert_eq!(row.longitude, Some(37.47));
        assert_eq!(row.location, None);
    }

    #[test]
    fn test_flatten_legacy_only_keeps_location() {
        let addr = normalize(&AddressFields::default(), Some("Near Piassa, Gondar"));
        let row = flatten(&addr);
        assert_eq!(row.location.as_deref(), Some("Near Piassa, Gondar"));
        assert_eq!(row.city, None);
        assert_eq!(unflatten(&row), addr);
    }

    #[test]
    fn test_unflatten_missing_columns() {
        let addr = unflatten(&FlatColumns::default());
        assert!(addr.is_unknown());
        assert_eq!(addr, AddressRecord::unknown());
    }

    #[test]
    fn test_unflatten_dirty_row() {
        let row = FlatColumns {
            region: Some("null".to_string()),
            city: Some(" Dessie ".to_string()),
            latitude: Some(11.13),
            location: Some("stale composite".to_string()),
            ..FlatColumns::default()
        };
        let addr = unflatten(&row);
        assert_eq!(addr.region(), None);
        assert_eq!(addr.city(), Some("Dessie"));
        assert_eq!(addr.display_string(), Some("Dessie"));
        assert_eq!(addr.coordinates(), None);
    }

    #[test]
    fn test_unflatten_with_custom_separator() {
        let normalizer = AddressNormalizer::new().with_separator(" - ");
        let addr = normalizer.normalize(
            &AddressFields::new().with_city("Adama").with_region("Oromia"),
            None,
        );
        assert_eq!(unflatten_with(&normalizer, &flatten(&addr)), addr);
    }

    fn text() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("null".to_string())),
            Just(Some(" ".to_string())),
            "[A-Za-z0-9 ,]{1,16}".prop_map(Some),
        ]
    }

    fn structured() -> impl Strategy<Value = AddressFields> {
        (
            (text(), text(), text(), text()),
            (text(), text(), text()),
            proptest::option::of((-100.0f64..100.0, -200.0f64..200.0)),
        )
            .prop_map(
                |((region, city, sub_city, woreda), (kebele, street, home_number), coords)| {
                    AddressFields {
                        region,
                        city,
                        sub_city,
                        woreda,
                        kebele,
                        street,
                        home_number,
                        latitude: coords.map(|(lat, _)| CoordinateInput::Number(lat)),
                        longitude: coords.map(|(_, lng)| CoordinateInput::Number(lng)),
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_flatten_round_trip(fields in structured(), legacy in text()) {
            let addr = normalize(&fields, legacy.as_deref());
            prop_assert_eq!(unflatten(&flatten(&addr)), addr);
        }

        #[test]
        fn prop_structured_left_inverse(fields in structured()) {
            let addr = normalize(&fields, None);
            prop_assert_eq!(unflatten(&flatten(&addr)), normalize(&fields, None));
        }
    }
}
