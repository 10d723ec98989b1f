//! Address normalization functionality.
//!
//! Merges a structured `locationDetails` input and a legacy free-text
//! `location` string into one [`AddressRecord`]:
//!
//! - every value is sanitized first (see [`sanitize`]);
//! - structured fields are taken only from the structured input, never
//!   backfilled from the legacy string;
//! - the display string is regenerated from the structured fields, and falls
//!   back to the legacy string only when no structured field survives;
//! - coordinates must parse to finite numbers in range, and are kept only as
//!   a pair.

use crate::address::{AddressFields, AddressLevel, AddressRecord, CoordinateInput};

/// Values that upstream form serializers emit for an empty input.
pub const SENTINELS: [&str; 2] = ["null", "undefined"];

/// Sanitize a single input value.
///
/// Surrounding whitespace is trimmed. Empty values and the sentinel strings
/// `"null"` / `"undefined"` (any ASCII case) are absent.
///
/// # Example
///
/// ```rust
/// use bloodbank_records::normalizer::sanitize;
///
/// assert_eq!(sanitize("  Bole "), Some("Bole".to_string()));
/// assert_eq!(sanitize("undefined"), None);
/// assert_eq!(sanitize(""), None);
/// ```
pub fn sanitize(value: &str) -> Option<String> {
    sanitize_with(value, &[])
}

fn sanitize_with(value: &str, extra: &[String]) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || SENTINELS.iter().any(|s| trimmed.eq_ignore_ascii_case(s))
        || extra.iter().any(|s| trimmed.eq_ignore_ascii_case(s))
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Parse a latitude, rejecting anything outside [-90, 90].
pub fn parse_latitude(input: &CoordinateInput) -> Option<f64> {
    parse_coordinate(input, 90.0)
}

/// Parse a longitude, rejecting anything outside [-180, 180].
pub fn parse_longitude(input: &CoordinateInput) -> Option<f64> {
    parse_coordinate(input, 180.0)
}

fn parse_coordinate(input: &CoordinateInput, bound: f64) -> Option<f64> {
    let value = match input {
        CoordinateInput::Number(n) => *n,
        CoordinateInput::Text(text) => sanitize(text)?.parse::<f64>().ok()?,
    };
    if value.is_finite() && (-bound..=bound).contains(&value) {
        Some(value)
    } else {
        tracing::trace!(?input, bound, "rejecting coordinate");
        None
    }
}

/// Options controlling normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Separator placed between parts of the display string
    pub separator: String,
    /// Sentinel strings treated as absent in addition to [`SENTINELS`]
    pub extra_sentinels: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            separator: ", ".to_string(),
            extra_sentinels: Vec::new(),
        }
    }
}

/// Address normalizer with builder-style options.
///
/// Normalization is pure: the same input always yields the same record, and
/// a normalizer can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct AddressNormalizer {
    options: NormalizeOptions,
}

impl AddressNormalizer {
    /// Create a new normalizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer from explicit options.
    pub fn with_options(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Set the display string separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.separator = separator.into();
        self
    }

    /// Treat an additional literal (e.g. `"N/A"`) as an empty input.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.options.extra_sentinels.push(sentinel.into());
        self
    }

    /// Options in use.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Sanitize a value using this normalizer's sentinel list.
    pub fn sanitize(&self, value: &str) -> Option<String> {
        sanitize_with(value, &self.options.extra_sentinels)
    }

    fn clean(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| self.sanitize(v))
    }

    /// Normalize structured fields and an optional legacy location string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bloodbank_records::{AddressFields, AddressNormalizer};
    ///
    /// let normalizer = AddressNormalizer::new();
    /// let fields = AddressFields::new().with_city("Addis Ababa").with_sub_city("Bole");
    /// let addr = normalizer.normalize(&fields, Some("somewhere else"));
    ///
    /// assert_eq!(addr.display_string(), Some("Bole, Addis Ababa"));
    /// ```
    pub fn normalize(&self, structured: &AddressFields, legacy: Option<&str>) -> AddressRecord {
        let mut record = AddressRecord {
            region: self.clean(structured.region.as_deref()),
            city: self.clean(structured.city.as_deref()),
            sub_city: self.clean(structured.sub_city.as_deref()),
            woreda: self.clean(structured.woreda.as_deref()),
            kebele: self.clean(structured.kebele.as_deref()),
            street: self.clean(structured.street.as_deref()),
            home_number: self.clean(structured.home_number.as_deref()),
            ..AddressRecord::default()
        };

        let latitude = structured.latitude.as_ref().and_then(parse_latitude);
        let longitude = structured.longitude.as_ref().and_then(parse_longitude);
        if let (Some(lat), Some(lng)) = (latitude, longitude) {
            record.latitude = Some(lat);
            record.longitude = Some(lng);
        } else if latitude.is_some() || longitude.is_some() {
            tracing::trace!("dropping unpaired coordinate");
        }

        record.display_string = if record.has_structured() {
            Some(self.compose_display(&record))
        } else {
            self.clean(legacy)
        };

        record
    }

    /// Normalize a legacy location string on its own.
    pub fn normalize_legacy(&self, legacy: &str) -> AddressRecord {
        self.normalize(&AddressFields::default(), Some(legacy))
    }

    /// Normalize multiple inputs in batch.
    pub fn normalize_batch(&self, inputs: &[(AddressFields, Option<String>)]) -> Vec<AddressRecord> {
        inputs
            .iter()
            .map(|(fields, legacy)| self.normalize(fields, legacy.as_deref()))
            .collect()
    }

    /// Normalize multiple inputs in parallel, preserving input order.
    #[cfg(feature = "parallel")]
    pub fn normalize_batch_parallel(
        &self,
        inputs: &[(AddressFields, Option<String>)],
    ) -> Vec<AddressRecord> {
        use rayon::prelude::*;

        inputs
            .par_iter()
            .map(|(fields, legacy)| self.normalize(fields, legacy.as_deref()))
            .collect()
    }

    // Fine to coarse, the way addresses are written on envelopes.
    fn compose_display(&self, record: &AddressRecord) -> String {
        AddressLevel::ALL
            .iter()
            .rev()
            .filter_map(|level| record.get(*level))
            .collect::<Vec<_>>()
            .join(&self.options.separator)
    }
}

/// Normalize with default options.
///
/// Shorthand for `AddressNormalizer::new().normalize(structured, legacy)`.
pub fn normalize(structured: &AddressFields, legacy: Option<&str>) -> AddressRecord {
    AddressNormalizer::new().normalize(structured, legacy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_structured_wins_over_legacy() {
        let fields = AddressFields::new().with_city("Addis Ababa");
        let addr = normalize(&fields, Some("Somewhere, Else"));

        let display = addr.display_string().unwrap();
        assert!(display.contains("Addis Ababa"));
        assert_ne!(display, "Somewhere, Else");
    }

    #[test]
    fn test_legacy_fallback_when_structured_empty() {
        let addr = normalize(&AddressFields::default(), Some("Somewhere, Else"));
        assert_eq!(addr.display_string(), Some("Somewhere, Else"));
        assert!(!addr.has_structured());
    }

    #[test]
    fn test_no_field_by_field_fallback() {
        let fields = AddressFields::new().with_region("Oromia");
        let addr = normalize(&fields, Some("Adama"));
        assert_eq!(addr.city(), None);
        assert_eq!(addr.display_string(), Some("Oromia"));
    }

    #[test]
    fn test_sentinel_sanitization() {
        let fields = AddressFields::new().with_region("null").with_city("");
        let addr = normalize(&fields, None);
        assert_eq!(addr.region(), None);
        assert_eq!(addr.city(), None);
        assert!(addr.is_unknown());
    }

    #[test]
    fn test_sentinel_legacy_is_unknown() {
        assert!(normalize(&AddressFields::default(), Some("undefined")).is_unknown());
        assert!(normalize(&AddressFields::default(), Some("   ")).is_unknown());
        assert!(normalize(&AddressFields::default(), None).is_unknown());
    }

    #[test]
    fn test_sentinels_only_structured_falls_back_to_legacy() {
        let fields = AddressFields::new().with_region("undefined").with_city("NULL");
        let addr = normalize(&fields, Some("Bahir Dar"));
        assert_eq!(addr.display_string(), Some("Bahir Dar"));
    }

    #[test]
    fn test_extra_sentinel() {
        let normalizer = AddressNormalizer::new().with_sentinel("N/A");
        let fields = AddressFields::new().with_city("n/a").with_region("Tigray");
        let addr = normalizer.normalize(&fields, None);
        assert_eq!(addr.city(), None);
        assert_eq!(addr.region(), Some("Tigray"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let fields = AddressFields::new().with_city("  Hawassa ");
        let addr = normalize(&fields, None);
        assert_eq!(addr.city(), Some("Hawassa"));
        assert_eq!(addr.display_string(), Some("Hawassa"));
    }

    #[test]
    fn test_display_order_and_separator() {
        let fields = AddressFields::new()
            .with_region("Addis Ababa")
            .with_city("Addis Ababa")
            .with_sub_city("Bole")
            .with(AddressLevel::Woreda, "03")
            .with(AddressLevel::Street, "Africa Avenue")
            .with(AddressLevel::HomeNumber, "221");
        let addr = normalize(&fields, None);
        assert_eq!(
            addr.display_string(),
            Some("221, Africa Avenue, 03, Bole, Addis Ababa, Addis Ababa")
        );

        let addr = AddressNormalizer::new()
            .with_separator(" / ")
            .normalize(&fields, None);
        assert_eq!(
            addr.display_string(),
            Some("221 / Africa Avenue / 03 / Bole / Addis Ababa / Addis Ababa")
        );
    }

    #[test]
    fn test_coordinate_out_of_range_is_absent() {
        let fields = AddressFields::new().with_coordinates("95", "38.7");
        let addr = normalize(&fields, None);
        assert_eq!(addr.latitude(), None);
        assert_eq!(addr.longitude(), None);

        let fields = AddressFields::new().with_coordinates(9.03, 181.0);
        assert_eq!(normalize(&fields, None).coordinates(), None);
    }

    #[test]
    fn test_coordinate_parsing() {
        assert_eq!(parse_latitude(&"95".into()), None);
        assert_eq!(parse_latitude(&" 9.03 ".into()), Some(9.03));
        assert_eq!(parse_latitude(&"abc".into()), None);
        assert_eq!(parse_latitude(&"NaN".into()), None);
        assert_eq!(parse_latitude(&"null".into()), None);
        assert_eq!(parse_latitude(&f64::NAN.into()), None);
        assert_eq!(parse_longitude(&(-180.0).into()), Some(-180.0));
        assert_eq!(parse_longitude(&f64::INFINITY.into()), None);
    }

    #[test]
    fn test_coordinates_kept_as_pair() {
        let fields = AddressFields::new().with_coordinates("9.03", 38.74);
        let addr = normalize(&fields, None);
        let coords = addr.coordinates().unwrap();
        assert_eq!(coords.latitude, 9.03);
        assert_eq!(coords.longitude, 38.74);

        let mut fields = AddressFields::new();
        fields.latitude = Some(9.03.into());
        let addr = normalize(&fields, None);
        assert_eq!(addr.latitude(), None);
        assert_eq!(addr.longitude(), None);
    }

    #[test]
    fn test_coordinates_do_not_make_address_known() {
        let fields = AddressFields::new().with_coordinates(9.03, 38.74);
        let addr = normalize(&fields, None);
        assert!(addr.is_unknown());
        assert!(addr.coordinates().is_some());
    }

    #[test]
    fn test_normalize_batch() {
        let inputs = vec![
            (AddressFields::new().with_city("Gondar"), None),
            (AddressFields::new(), Some("Mekelle".to_string())),
        ];
        let out = AddressNormalizer::new().normalize_batch(&inputs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].display_string(), Some("Gondar"));
        assert_eq!(out[1].display_string(), Some("Mekelle"));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_normalize_batch_parallel_matches_sequential() {
        let inputs: Vec<_> = (0..64)
            .map(|i| (AddressFields::new().with_city(format!("Town {i}")), None))
            .collect();
        let normalizer = AddressNormalizer::new();
        assert_eq!(
            normalizer.normalize_batch_parallel(&inputs),
            normalizer.normalize_batch(&inputs)
        );
    }

    fn field_value() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            Just(Some("null".to_string())),
            Just(Some("undefined".to_string())),
            "[ ]{0,2}[A-Za-z0-9 ]{0,12}[ ]{0,2}".prop_map(Some),
        ]
    }

    fn coordinate_value() -> impl Strategy<Value = Option<CoordinateInput>> {
        prop_oneof![
            Just(None),
            (-200.0f64..200.0).prop_map(|v| Some(CoordinateInput::Number(v))),
            (-200.0f64..200.0).prop_map(|v| Some(CoordinateInput::Text(v.to_string()))),
            "[a-z]{0,4}".prop_map(|s| Some(CoordinateInput::Text(s))),
        ]
    }

    fn address_fields() -> impl Strategy<Value = AddressFields> {
        (
            (field_value(), field_value(), field_value(), field_value()),
            (field_value(), field_value(), field_value()),
            (coordinate_value(), coordinate_value()),
        )
            .prop_map(
                |(
                    (region, city, sub_city, woreda),
                    (kebele, street, home_number),
                    (latitude, longitude),
                )| AddressFields {
                    region,
                    city,
                    sub_city,
                    woreda,
                    kebele,
                    street,
                    home_number,
                    latitude,
                    longitude,
                },
            )
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(fields in address_fields(), legacy in field_value()) {
            let first = normalize(&fields, legacy.as_deref());
            let second = normalize(&first.to_structured(), None);

            for level in AddressLevel::ALL {
                prop_assert_eq!(first.get(level), second.get(level));
            }
            prop_assert_eq!(first.coordinates(), second.coordinates());
            if first.has_structured() {
                prop_assert_eq!(first.display_string(), second.display_string());
            }
        }

        #[test]
        fn prop_normalize_is_deterministic(fields in address_fields(), legacy in field_value()) {
            prop_assert_eq!(
                normalize(&fields, legacy.as_deref()),
                normalize(&fields, legacy.as_deref())
            );
        }
    }
}
