//! Donor and hospital records.
//!
//! Each record owns exactly one [`AddressRecord`] by value. The address is
//! normalized from the same input as its owner and replaced together with it,
//! so there is never an address without an owner or an owner half-updated.

use std::borrow::Cow;

use uuid::Uuid;

use crate::address::{AddressFields, AddressRecord};
use crate::error::{Error, Result};
use crate::filter::Searchable;
use crate::normalizer::AddressNormalizer;
use crate::types::{BloodType, Gender, HospitalType};

/// A record with identity that can live in a repository.
pub trait Record: Searchable + Clone + Send + Sync + 'static {
    /// Human-readable record kind, used in logs and errors.
    const KIND: &'static str;

    /// Stable identifier.
    fn id(&self) -> Uuid;
}

/// Normalize the address part of a form submission.
fn address_from_input(
    normalizer: &AddressNormalizer,
    details: Option<&AddressFields>,
    location: Option<&str>,
) -> AddressRecord {
    let empty = AddressFields::default();
    normalizer.normalize(details.unwrap_or(&empty), location)
}

/// Address carried by an update form, if any of its location data survives
/// sanitization.
fn address_update(
    normalizer: &AddressNormalizer,
    details: Option<&AddressFields>,
    location: Option<&str>,
) -> Option<AddressRecord> {
    let address = address_from_input(normalizer, details, location);
    (!address.is_unknown() || address.coordinates().is_some()).then_some(address)
}

fn required(normalizer: &AddressNormalizer, value: Option<&str>, what: &str) -> Result<String> {
    value
        .and_then(|v| normalizer.sanitize(v))
        .ok_or_else(|| Error::invalid_record(format!("{what} is required")))
}

fn optional(normalizer: &AddressNormalizer, value: Option<&str>) -> Option<String> {
    value.and_then(|v| normalizer.sanitize(v))
}

fn parse_blood_type(normalizer: &AddressNormalizer, value: Option<&str>) -> Result<Option<BloodType>> {
    match optional(normalizer, value) {
        None => Ok(None),
        Some(code) => BloodType::from_code(&code)
            .map(Some)
            .ok_or_else(|| Error::invalid_record(format!("unknown blood type: {code}"))),
    }
}

/// Donor registration or update form.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct DonorInput {
    /// Full name
    pub name: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Blood type in conventional notation
    pub blood_type: Option<String>,
    /// Gender label
    pub gender: Option<String>,
    /// Whether the donor is currently available to donate
    pub available: Option<bool>,
    /// Legacy free-text location
    pub location: Option<String>,
    /// Structured location
    pub location_details: Option<AddressFields>,
}

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Donor {
    /// Identifier
    pub id: Uuid,
    /// Full name
    pub name: String,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Blood type
    pub blood_type: BloodType,
    /// Gender, if recorded
    pub gender: Option<Gender>,
    /// Whether the donor is currently available to donate
    pub available: bool,
    /// Home address
    #[cfg_attr(feature = "serde", serde(rename = "locationDetails"))]
    pub address: AddressRecord,
}

impl Donor {
    /// Build a new donor from a registration form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the name or blood type is missing,
    /// or the blood type is not recognised.
    pub fn from_input(normalizer: &AddressNormalizer, input: &DonorInput) -> Result<Self> {
        let name = required(normalizer, input.name.as_deref(), "donor name")?;
        let blood_type = parse_blood_type(normalizer, input.blood_type.as_deref())?
            .ok_or_else(|| Error::invalid_record("donor blood type is required"))?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            phone: optional(normalizer, input.phone.as_deref()),
            email: optional(normalizer, input.email.as_deref()),
            blood_type,
            gender: optional(normalizer, input.gender.as_deref())
                .and_then(|g| Gender::from_label(&g)),
            available: input.available.unwrap_or(true),
            address: address_from_input(
                normalizer,
                input.location_details.as_ref(),
                input.location.as_deref(),
            ),
        })
    }

    /// Apply an update form.
    ///
    /// Fields left out of the form, or sent as empty or sentinel values, keep
    /// their value. If any location data survives sanitization the whole
    /// address is replaced by one normalized from the form alone. Nothing
    /// changes unless the whole update is valid.
    pub fn apply(&mut self, normalizer: &AddressNormalizer, input: &DonorInput) -> Result<()> {
        let blood_type = parse_blood_type(normalizer, input.blood_type.as_deref())?;

        if let Some(name) = optional(normalizer, input.name.as_deref()) {
            self.name = name;
        }
        if let Some(blood_type) = blood_type {
            self.blood_type = blood_type;
        }
        if let Some(phone) = optional(normalizer, input.phone.as_deref()) {
            self.phone = Some(phone);
        }
        if let Some(email) = optional(normalizer, input.email.as_deref()) {
            self.email = Some(email);
        }
        if let Some(gender) = optional(normalizer, input.gender.as_deref()) {
            self.gender = Gender::from_label(&gender);
        }
        if let Some(available) = input.available {
            self.available = available;
        }
        if let Some(address) = address_update(
            normalizer,
            input.location_details.as_ref(),
            input.location.as_deref(),
        ) {
            self.address = address;
        }
        Ok(())
    }
}

impl Searchable for Donor {
    fn name(&self) -> &str {
        &self.name
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.blood_type.as_str()))
    }

    fn address(&self) -> &AddressRecord {
        &self.address
    }
}

impl Record for Donor {
    const KIND: &'static str = "donor";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Hospital registration or update form.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct HospitalInput {
    /// Hospital name
    pub name: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Hospital type label
    pub hospital_type: Option<String>,
    /// Legacy free-text location
    pub location: Option<String>,
    /// Structured location
    pub location_details: Option<AddressFields>,
}

/// A hospital that requests and receives blood.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Hospital {
    /// Identifier
    pub id: Uuid,
    /// Hospital name
    pub name: String,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Ownership category, if known
    pub hospital_type: Option<HospitalType>,
    /// Site address
    #[cfg_attr(feature = "serde", serde(rename = "locationDetails"))]
    pub address: AddressRecord,
}

impl Hospital {
    /// Build a new hospital from a registration form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the name is missing.
    pub fn from_input(normalizer: &AddressNormalizer, input: &HospitalInput) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required(normalizer, input.name.as_deref(), "hospital name")?,
            phone: optional(normalizer, input.phone.as_deref()),
            email: optional(normalizer, input.email.as_deref()),
            hospital_type: optional(normalizer, input.hospital_type.as_deref())
                .map(|t| HospitalType::from_label(&t)),
            address: address_from_input(
                normalizer,
                input.location_details.as_ref(),
                input.location.as_deref(),
            ),
        })
    }

    /// Apply an update form. Same rules as [`Donor::apply`].
    pub fn apply(&mut self, normalizer: &AddressNormalizer, input: &HospitalInput) -> Result<()> {
        if let Some(name) = optional(normalizer, input.name.as_deref()) {
            self.name = name;
        }
        if let Some(phone) = optional(normalizer, input.phone.as_deref()) {
            self.phone = Some(phone);
        }
        if let Some(email) = optional(normalizer, input.email.as_deref()) {
            self.email = Some(email);
        }
        if let Some(kind) = optional(normalizer, input.hospital_type.as_deref()) {
            self.hospital_type = Some(HospitalType::from_label(&kind));
        }
        if let Some(address) = address_update(
            normalizer,
            input.location_details.as_ref(),
            input.location.as_deref(),
        ) {
            self.address = address;
        }
        Ok(())
    }
}

impl Searchable for Hospital {
    fn name(&self) -> &str {
        &self.name
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        self.hospital_type.as_ref().map(|t| Cow::Borrowed(t.as_str()))
    }

    fn address(&self) -> &AddressRecord {
        &self.address
    }
}

impl Record for Hospital {
    const KIND: &'static str = "hospital";

    fn id(&self) -> Uuid {
        self.id
    }
}
