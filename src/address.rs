//! Address data model.
//!
//! An [`AddressRecord`] is always produced by the normalizer (or by
//! [`unflatten`](crate::flatten::unflatten), which goes through it), so its
//! display string is never out of step with its structured fields.

use std::fmt;

/// Administrative subdivisions of an address, coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressLevel {
    /// Regional state or chartered city administration
    Region,
    /// City or town
    City,
    /// Sub-city within a city administration
    SubCity,
    /// Woreda (district)
    Woreda,
    /// Kebele (neighbourhood)
    Kebele,
    /// Street name
    Street,
    /// House number
    HomeNumber,
}

impl AddressLevel {
    /// All levels, coarse to fine.
    pub const ALL: [AddressLevel; 7] = [
        AddressLevel::Region,
        AddressLevel::City,
        AddressLevel::SubCity,
        AddressLevel::Woreda,
        AddressLevel::Kebele,
        AddressLevel::Street,
        AddressLevel::HomeNumber,
    ];

    /// Levels indexed by quick location search.
    pub const SEARCHABLE: [AddressLevel; 3] =
        [AddressLevel::Region, AddressLevel::City, AddressLevel::SubCity];

    /// Storage column name.
    pub fn column(&self) -> &'static str {
        match self {
            AddressLevel::Region => "region",
            AddressLevel::City => "city",
            AddressLevel::SubCity => "sub_city",
            AddressLevel::Woreda => "woreda",
            AddressLevel::Kebele => "kebele",
            AddressLevel::Street => "street",
            AddressLevel::HomeNumber => "home_number",
        }
    }
}

impl fmt::Display for AddressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A raw coordinate as received from a form or API payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CoordinateInput {
    /// Numeric value
    Number(f64),
    /// Textual value, parsed during normalization
    Text(String),
}

impl From<f64> for CoordinateInput {
    fn from(value: f64) -> Self {
        CoordinateInput::Number(value)
    }
}

impl From<&str> for CoordinateInput {
    fn from(value: &str) -> Self {
        CoordinateInput::Text(value.to_string())
    }
}

impl From<String> for CoordinateInput {
    fn from(value: String) -> Self {
        CoordinateInput::Text(value)
    }
}

/// Partially known structured address input (the `locationDetails` object).
///
/// Every field is optional and unsanitized; feed it to the normalizer to get
/// an [`AddressRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct AddressFields {
    /// Regional state
    pub region: Option<String>,
    /// City or town
    pub city: Option<String>,
    /// Sub-city
    pub sub_city: Option<String>,
    /// Woreda
    pub woreda: Option<String>,
    /// Kebele
    pub kebele: Option<String>,
    /// Street
    pub street: Option<String>,
    /// House number
    pub home_number: Option<String>,
    /// Latitude in WGS84 degrees
    pub latitude: Option<CoordinateInput>,
    /// Longitude in WGS84 degrees
    pub longitude: Option<CoordinateInput>,
}

impl AddressFields {
    /// Create empty address input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value supplied for a level, if any.
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

    /// Set the value for a level.
    pub fn with(mut self, level: AddressLevel, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match level {
            AddressLevel::Region => self.region = value,
            AddressLevel::City => self.city = value,
            AddressLevel::SubCity => self.sub_city = value,
            AddressLevel::Woreda => self.woreda = value,
            AddressLevel::Kebele => self.kebele = value,
            AddressLevel::Street => self.street = value,
            AddressLevel::HomeNumber => self.home_number = value,
        }
        self
    }

    /// Set region.
    pub fn with_region(self, region: impl Into<String>) -> Self {
        self.with(AddressLevel::Region, region)
    }

    /// Set city.
    pub fn with_city(self, city: impl Into<String>) -> Self {
        self.with(AddressLevel::City, city)
    }

    /// Set sub-city.
    pub fn with_sub_city(self, sub_city: impl Into<String>) -> Self {
        self.with(AddressLevel::SubCity, sub_city)
    }

    /// Set both coordinates.
    pub fn with_coordinates(
        mut self,
        latitude: impl Into<CoordinateInput>,
        longitude: impl Into<CoordinateInput>,
    ) -> Self {
        self.latitude = Some(latitude.into());
        self.longitude = Some(longitude.into());
        self
    }
}

/// A validated geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coordinates {
    /// Latitude in [-90, 90]
    pub latitude: f64,
    /// Longitude in [-180, 180]
    pub longitude: f64,
}

/// Canonical address: sanitized structured fields, optional coordinates and
/// a derived display string.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AddressRecord {
    pub(crate) region: Option<String>,
    pub(crate) city: Option<String>,
    pub(crate) sub_city: Option<String>,
    pub(crate) woreda: Option<String>,
    pub(crate) kebele: Option<String>,
    pub(crate) street: Option<String>,
    pub(crate) home_number: Option<String>,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) display_string: Option<String>,
}

impl AddressRecord {
    /// An address with no data at all.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Structured value at a level.
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

    /// Region.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// City.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Sub-city.
    pub fn sub_city(&self) -> Option<&str> {
        self.sub_city.as_deref()
    }

    /// Woreda.
    pub fn woreda(&self) -> Option<&str> {
        self.woreda.as_deref()
    }

    /// Kebele.
    pub fn kebele(&self) -> Option<&str> {
        self.kebele.as_deref()
    }

    /// Street.
    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    /// House number.
    pub fn home_number(&self) -> Option<&str> {
        self.home_number.as_deref()
    }

    /// Latitude, present only together with longitude.
    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    /// Longitude, present only together with latitude.
    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    /// Both coordinates, if known.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Human-readable composite of the address.
    pub fn display_string(&self) -> Option<&str> {
        self.display_string.as_deref()
    }

    /// Whether any structured field is present.
    pub fn has_structured(&self) -> bool {
        AddressLevel::ALL.iter().any(|level| self.get(*level).is_some())
    }

    /// Whether the record carries no address text at all.
    pub fn is_unknown(&self) -> bool {
        self.display_string.is_none()
    }

    /// Structured fields and coordinates as normalizer input.
    pub fn to_structured(&self) -> AddressFields {
        AddressFields {
            region: self.region.clone(),
            city: self.city.clone(),
            sub_city: self.sub_city.clone(),
            woreda: self.woreda.clone(),
            kebele: self.kebele.clone(),
            street: self.street.clone(),
            home_number: self.home_number.clone(),
            latitude: self.latitude.map(CoordinateInput::Number),
            longitude: self.longitude.map(CoordinateInput::Number),
        }
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_string().unwrap_or("Unknown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_fields_builder() {
        let fields = AddressFields::new()
            .with_region("Amhara")
            .with_city("Gondar")
            .with(AddressLevel::Kebele, "12");

        assert_eq!(fields.get(AddressLevel::Region), Some("Amhara"));
        assert_eq!(fields.get(AddressLevel::City), Some("Gondar"));
        assert_eq!(fields.get(AddressLevel::Kebele), Some("12"));
        assert_eq!(fields.get(AddressLevel::Street), None);
    }

    #[test]
    fn test_unknown_address() {
        let addr = AddressRecord::unknown();
        assert!(addr.is_unknown());
        assert!(!addr.has_structured());
        assert_eq!(addr.coordinates(), None);
        assert_eq!(addr.to_string(), "Unknown");
    }

    #[test]
    fn test_level_columns_are_distinct() {
        let columns: std::collections::HashSet<_> =
            AddressLevel::ALL.iter().map(|l| l.column()).collect();
        assert_eq!(columns.len(), AddressLevel::ALL.len());
        assert_eq!(AddressLevel::SubCity.column(), "sub_city");
    }
}
