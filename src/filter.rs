//! Search predicates for record list views.
//!
//! Every visible filter field contributes one predicate; a record is shown
//! when all of them match. Each predicate is a case-insensitive substring
//! test, and an empty or whitespace-only query matches everything.

use std::borrow::Cow;

use crate::address::{AddressLevel, AddressRecord};

/// Case-insensitive substring predicate over a single text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPredicate {
    needle: Option<String>,
}

impl TextPredicate {
    /// Build a predicate for a query string.
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        Self {
            needle: (!query.is_empty()).then(|| query.to_lowercase()),
        }
    }

    /// Predicate that accepts everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether this predicate filters nothing out.
    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    /// Lowercased query, if any.
    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    /// Test a value. A missing value only matches the empty query.
    pub fn matches(&self, haystack: Option<&str>) -> bool {
        match (&self.needle, haystack) {
            (None, _) => true,
            (Some(needle), Some(haystack)) => haystack.to_lowercase().contains(needle.as_str()),
            (Some(_), None) => false,
        }
    }
}

/// Build a text predicate for one filter field.
pub fn build_text_predicate(query: &str) -> TextPredicate {
    TextPredicate::new(query)
}

/// Location predicate over an [`AddressRecord`].
///
/// Matches the display string, or the region, city and sub-city joined
/// together. Street and house number are not indexed for quick search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPredicate {
    text: TextPredicate,
}

impl LocationPredicate {
    /// Build a location predicate for a query string.
    pub fn new(query: &str) -> Self {
        Self {
            text: TextPredicate::new(query),
        }
    }

    /// Whether this predicate filters nothing out.
    pub fn is_match_all(&self) -> bool {
        self.text.is_match_all()
    }

    /// Test an address.
    pub fn matches(&self, addr: &AddressRecord) -> bool {
        if self.text.is_match_all() {
            return true;
        }
        if self.text.matches(addr.display_string()) {
            return true;
        }
        let coarse = AddressLevel::SEARCHABLE
            .iter()
            .filter_map(|level| addr.get(*level))
            .collect::<Vec<_>>();
        !coarse.is_empty() && self.text.matches(Some(&coarse.join(" ")))
    }

    /// Borrow as a closure, e.g. for `Iterator::filter`.
    pub fn as_fn(&self) -> impl Fn(&AddressRecord) -> bool + '_ {
        move |addr| self.matches(addr)
    }
}

/// Build the location predicate for a free-text query.
///
/// # Example
///
/// ```rust
/// use bloodbank_records::{AddressFields, build_location_predicate, normalize};
///
/// let gondar = normalize(&AddressFields::new().with_city("Gondar"), None);
/// let hawassa = normalize(&AddressFields::new().with_city("Hawassa"), None);
///
/// let predicate = build_location_predicate("gon");
/// assert!(predicate.matches(&gondar));
/// assert!(!predicate.matches(&hawassa));
/// ```
pub fn build_location_predicate(query: &str) -> LocationPredicate {
    LocationPredicate::new(query)
}

/// A record that can be searched from a list view.
pub trait Searchable {
    /// Display name.
    fn name(&self) -> &str;

    /// Contact phone number.
    fn phone(&self) -> Option<&str>;

    /// Category text: blood type for donors, hospital type for hospitals.
    fn category(&self) -> Option<Cow<'_, str>>;

    /// Embedded address.
    fn address(&self) -> &AddressRecord;
}

/// Conjunction of one predicate per filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    name: TextPredicate,
    phone: TextPredicate,
    category: TextPredicate,
    location: LocationPredicate,
}

impl RecordFilter {
    /// Filter that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on name.
    pub fn name(mut self, query: &str) -> Self {
        self.name = TextPredicate::new(query);
        self
    }

    /// Filter on phone number.
    pub fn phone(mut self, query: &str) -> Self {
        self.phone = TextPredicate::new(query);
        self
    }

    /// Filter on category (blood type or hospital type).
    pub fn category(mut self, query: &str) -> Self {
        self.category = TextPredicate::new(query);
        self
    }

    /// Filter on location.
    pub fn location(mut self, query: &str) -> Self {
        self.location = LocationPredicate::new(query);
        self
    }

    /// Whether no field filters anything out.
    pub fn is_match_all(&self) -> bool {
        self.name.is_match_all()
            && self.phone.is_match_all()
            && self.category.is_match_all()
            && self.location.is_match_all()
    }

    /// Test a record against every field.
    pub fn matches<R: Searchable + ?Sized>(&self, record: &R) -> bool {
        self.name.matches(Some(record.name()))
            && self.phone.matches(record.phone())
            && self.category.matches(record.category().as_deref())
            && self.location.matches(record.address())
    }

    /// Records that pass the filter, in input order.
    pub fn apply<'a, R: Searchable>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }

    /// Owned variant of [`RecordFilter::apply`].
    pub fn retain<R: Searchable>(&self, records: Vec<R>) -> Vec<R> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Filter in parallel, preserving input order.
    #[cfg(feature = "parallel")]
    pub fn apply_parallel<'a, R: Searchable + Sync>(&self, records: &'a [R]) -> Vec<&'a R> {
        use rayon::prelude::*;

        records.par_iter().filter(|r| self.matches(*r)).collect()
    }
}

/// Raw query strings from a list view, one per filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecordQuery {
    /// Name query
    pub name: String,
    /// Phone query
    pub phone: String,
    /// Blood type or hospital type query
    pub category: String,
    /// Free-text location query
    pub location: String,
}

impl From<&RecordQuery> for RecordFilter {
    fn from(query: &RecordQuery) -> Self {
        RecordFilter::new()
            .name(&query.name)
            .phone(&query.phone)
            .category(&query.category)
            .location(&query.location)
    }
}
