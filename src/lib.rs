//! # bloodbank-records
//!
//! Donor and hospital records for blood-donation coordination, built around
//! one piece of shared business logic: reconciling structured Ethiopian
//! addresses (region, city, sub-city, woreda, kebele, street, house number)
//! with legacy free-text locations.
//!
//! ## Features
//!
//! - **Address Normalization**: Sanitize form input, apply structured-over-legacy
//!   precedence, derive a display string, validate coordinates
//! - **Flat Storage Projection**: Map addresses to and from like-named columns
//! - **Search**: Case-insensitive, per-field predicates composed by AND
//! - **Repositories**: In-memory and SQLite-backed record stores
//!
//! ## Quick Start
//!
//! ```rust
//! use bloodbank_records::{AddressFields, DonorInput, RecordQuery, Registry, RegistryConfig};
//!
//! let registry = Registry::with_config(RegistryConfig::in_memory())?;
//!
//! registry.register_donor(&DonorInput {
//!     name: Some("Abebe Kebede".to_string()),
//!     blood_type: Some("O+".to_string()),
//!     location_details: Some(AddressFields::new().with_city("Addis Ababa")),
//!     ..DonorInput::default()
//! })?;
//!
//! let query = RecordQuery {
//!     category: "O+".to_string(),
//!     location: "addis".to_string(),
//!     ..RecordQuery::default()
//! };
//! assert_eq!(registry.search_donors(&query)?.len(), 1);
//! # Ok::<(), bloodbank_records::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod address;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod normalizer;
pub mod records;
pub mod repository;
pub mod types;

use std::path::PathBuf;

use uuid::Uuid;

// Re-export main API
pub use address::{AddressFields, AddressLevel, AddressRecord, CoordinateInput, Coordinates};
pub use error::{Error, Result};
pub use filter::{
    build_location_predicate, build_text_predicate, LocationPredicate, RecordFilter, RecordQuery,
    Searchable, TextPredicate,
};
pub use flatten::{flatten, unflatten, FlatColumns};
pub use normalizer::{normalize, sanitize, AddressNormalizer, NormalizeOptions};
pub use records::{Donor, DonorInput, Hospital, HospitalInput, Record};
pub use repository::{InMemoryRepository, Repository};
pub use types::*;

#[cfg(feature = "sqlite")]
pub use repository::sqlite::{SqlRecord, SqliteRepository};

/// Main entry point: donor and hospital stores sharing one normalizer.
///
/// # Examples
///
/// ```rust
/// use bloodbank_records::{HospitalInput, Registry, RegistryConfig};
///
/// let registry = Registry::with_config(RegistryConfig::in_memory())?;
/// let hospital = registry.register_hospital(&HospitalInput {
///     name: Some("Tikur Anbessa".to_string()),
///     location: Some("Lideta, Addis Ababa".to_string()),
///     ..HospitalInput::default()
/// })?;
/// assert_eq!(hospital.address.display_string(), Some("Lideta, Addis Ababa"));
/// # Ok::<(), bloodbank_records::Error>(())
/// ```
pub struct Registry {
    config: RegistryConfig,
    normalizer: AddressNormalizer,
    donors: Box<dyn Repository<Donor>>,
    hospitals: Box<dyn Repository<Hospital>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Open a registry with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be opened.
    pub fn new() -> Result<Self> {
        Self::with_config(RegistryConfig::default())
    }

    /// Open a registry with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created or the
    /// database cannot be opened.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        let normalizer = AddressNormalizer::with_options(config.normalize_options.clone());

        let donors: Box<dyn Repository<Donor>>;
        let hospitals: Box<dyn Repository<Hospital>>;
        match &config.backend {
            StorageBackend::InMemory => {
                donors = Box::new(InMemoryRepository::<Donor>::new());
                hospitals = Box::new(InMemoryRepository::<Hospital>::new());
            }
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                donors = Box::new(
                    SqliteRepository::<Donor>::open(path)?.with_normalizer(normalizer.clone()),
                );
                hospitals = Box::new(
                    SqliteRepository::<Hospital>::open(path)?.with_normalizer(normalizer.clone()),
                );
            }
        }

        tracing::info!(backend = ?config.backend, "opened registry");
        Ok(Self {
            config,
            normalizer,
            donors,
            hospitals,
        })
    }

    /// Configuration used by this registry.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Normalizer applied to every address written.
    pub fn normalizer(&self) -> &AddressNormalizer {
        &self.normalizer
    }

    /// Donor store.
    pub fn donors(&self) -> &dyn Repository<Donor> {
        self.donors.as_ref()
    }

    /// Hospital store.
    pub fn hospitals(&self) -> &dyn Repository<Hospital> {
        self.hospitals.as_ref()
    }

    /// Register a new donor from a form submission.
    pub fn register_donor(&self, input: &DonorInput) -> Result<Donor> {
        let donor = Donor::from_input(&self.normalizer, input)?;
        self.donors.upsert(donor.clone())?;
        tracing::info!(id = %donor.id, "registered donor");
        Ok(donor)
    }

    /// Update a donor. The address is replaced together with the donor.
    pub fn update_donor(&self, id: Uuid, input: &DonorInput) -> Result<Donor> {
        let mut donor = self.donors.get(id)?.ok_or_else(|| Error::not_found(id))?;
        donor.apply(&self.normalizer, input)?;
        self.donors.upsert(donor.clone())?;
        Ok(donor)
    }

    /// Remove a donor. Returns whether one was removed.
    pub fn remove_donor(&self, id: Uuid) -> Result<bool> {
        self.donors.delete(id)
    }

    /// Look up a donor.
    pub fn donor(&self, id: Uuid) -> Result<Option<Donor>> {
        self.donors.get(id)
    }

    /// Donors matching every non-empty field of a query.
    pub fn search_donors(&self, query: &RecordQuery) -> Result<Vec<Donor>> {
        self.donors.search(&RecordFilter::from(query))
    }

    /// Register a new hospital from a form submission.
    pub fn register_hospital(&self, input: &HospitalInput) -> Result<Hospital> {
        let hospital = Hospital::from_input(&self.normalizer, input)?;
        self.hospitals.upsert(hospital.clone())?;
        tracing::info!(id = %hospital.id, "registered hospital");
        Ok(hospital)
    }

    /// Update a hospital. The address is replaced together with the hospital.
    pub fn update_hospital(&self, id: Uuid, input: &HospitalInput) -> Result<Hospital> {
        let mut hospital = self.hospitals.get(id)?.ok_or_else(|| Error::not_found(id))?;
        hospital.apply(&self.normalizer, input)?;
        self.hospitals.upsert(hospital.clone())?;
        Ok(hospital)
    }

    /// Remove a hospital. Returns whether one was removed.
    pub fn remove_hospital(&self, id: Uuid) -> Result<bool> {
        self.hospitals.delete(id)
    }

    /// Look up a hospital.
    pub fn hospital(&self, id: Uuid) -> Result<Option<Hospital>> {
        self.hospitals.get(id)
    }

    /// Hospitals matching every non-empty field of a query.
    pub fn search_hospitals(&self, query: &RecordQuery) -> Result<Vec<Hospital>> {
        self.hospitals.search(&RecordFilter::from(query))
    }
}

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on drop
    InMemory,
    /// SQLite database file
    #[cfg(feature = "sqlite")]
    Sqlite(PathBuf),
}

impl Default for StorageBackend {
    fn default() -> Self {
        #[cfg(feature = "sqlite")]
        {
            StorageBackend::Sqlite(default_database_path())
        }
        #[cfg(not(feature = "sqlite"))]
        {
            StorageBackend::InMemory
        }
    }
}

/// Default database location under the platform's local data directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("bloodbank-records")
        .join("records.db")
}

/// Configuration for [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Storage backend
    pub backend: StorageBackend,

    /// Address normalization options
    pub normalize_options: NormalizeOptions,
}

impl RegistryConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bloodbank_records::RegistryConfig;
    ///
    /// let config = RegistryConfig::builder()
    ///     .in_memory()
    ///     .separator(" / ")
    ///     .sentinel("N/A")
    ///     .build();
    /// ```
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::new()
    }

    /// Configuration with in-memory storage and default normalization.
    pub fn in_memory() -> Self {
        Self::builder().in_memory().build()
    }
}

/// Builder for RegistryConfig.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfigBuilder {
    backend: StorageBackend,
    normalize_options: NormalizeOptions,
}

impl RegistryConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records in memory.
    pub fn in_memory(mut self) -> Self {
        self.backend = StorageBackend::InMemory;
        self
    }

    /// Keep records in a SQLite database file.
    #[cfg(feature = "sqlite")]
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.backend = StorageBackend::Sqlite(path.into());
        self
    }

    /// Set the display string separator.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.normalize_options.separator = separator.into();
        self
    }

    /// Treat an additional literal as an empty form value.
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.normalize_options.extra_sentinels.push(sentinel.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RegistryConfig {
        RegistryConfig {
            backend: self.backend,
            normalize_options: self.normalize_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn donor_input(name: &str, blood_type: &str, city: &str) -> DonorInput {
        DonorInput {
            name: Some(name.to_string()),
            blood_type: Some(blood_type.to_string()),
            location_details: Some(AddressFields::new().with_city(city)),
            ..DonorInput::default()
        }
    }

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::builder()
            .in_memory()
            .separator(" / ")
            .sentinel("N/A")
            .build();
        assert_eq!(config.backend, StorageBackend::InMemory);
        assert_eq!(config.normalize_options.separator, " / ");
        assert_eq!(config.normalize_options.extra_sentinels, vec!["N/A".to_string()]);
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path();
        assert!(path.ends_with("bloodbank-records/records.db"));
    }

    #[test]
    fn test_register_update_remove_donor() {
        let registry = Registry::with_config(RegistryConfig::in_memory()).unwrap();
        let donor = registry
            .register_donor(&donor_input("Abebe", "O+", "Gondar"))
            .unwrap();

        let updated = registry
            .update_donor(
                donor.id,
                &DonorInput {
                    location_details: Some(AddressFields::new().with_city("Bahir Dar")),
                    ..DonorInput::default()
                },
            )
            .unwrap();
        assert_eq!(updated.address.city(), Some("Bahir Dar"));
        assert_eq!(registry.donor(donor.id).unwrap(), Some(updated));

        assert!(registry.remove_donor(donor.id).unwrap());
        assert_eq!(registry.donor(donor.id).unwrap(), None);
    }

    #[test]
    fn test_update_missing_donor() {
        let registry = Registry::with_config(RegistryConfig::in_memory()).unwrap();
        let id = Uuid::new_v4();
        assert_matches!(
            registry.update_donor(id, &DonorInput::default()),
            Err(Error::NotFound { id: missing }) if missing == id
        );
    }

    #[test]
    fn test_search_donors_combined() {
        let registry = Registry::with_config(RegistryConfig::in_memory()).unwrap();
        let first = registry
            .register_donor(&donor_input("Abebe", "O+", "Addis Ababa"))
            .unwrap();
        registry
            .register_donor(&donor_input("Sara", "A-", "Gondar"))
            .unwrap();
        registry
            .register_donor(&donor_input("Kebede", "O+", "Dire Dawa"))
            .unwrap();

        let query = RecordQuery {
            category: "O+".to_string(),
            location: "addis".to_string(),
            ..RecordQuery::default()
        };
        let found = registry.search_donors(&query).unwrap();
        assert_eq!(found, vec![first]);

        assert_eq!(registry.search_donors(&RecordQuery::default()).unwrap().len(), 3);
    }

    #[test]
    fn test_registry_uses_configured_normalizer() {
        let config = RegistryConfig::builder()
            .in_memory()
            .separator(" | ")
            .sentinel("-")
            .build();
        let registry = Registry::with_config(config).unwrap();
        let hospital = registry
            .register_hospital(&HospitalInput {
                name: Some("Ayder".to_string()),
                location_details: Some(
                    AddressFields::new()
                        .with_region("Tigray")
                        .with_city("Mekelle")
                        .with_sub_city("-"),
                ),
                ..HospitalInput::default()
            })
            .unwrap();
        assert_eq!(hospital.address.display_string(), Some("Mekelle | Tigray"));
    }

    #[test]
    fn test_search_hospitals_by_type() {
        let registry = Registry::with_config(RegistryConfig::in_memory()).unwrap();
        for (name, kind) in [("Ayder", "government"), ("Hayat", "private")] {
            registry
                .register_hospital(&HospitalInput {
                    name: Some(name.to_string()),
                    hospital_type: Some(kind.to_string()),
                    ..HospitalInput::default()
                })
                .unwrap();
        }
        let query = RecordQuery {
            category: "priv".to_string(),
            ..RecordQuery::default()
        };
        let found = registry.search_hospitals(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Hayat");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_registry_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");
        let config = RegistryConfig::builder().database_path(&path).build();

        let id = {
            let registry = Registry::with_config(config.clone()).unwrap();
            registry
                .register_donor(&donor_input("Abebe", "O+", "Gondar"))
                .unwrap()
                .id
        };

        let registry = Registry::with_config(config).unwrap();
        let donor = registry.donor(id).unwrap().unwrap();
        assert_eq!(donor.address.display_string(), Some("Gondar"));
        assert_eq!(registry.hospitals().list().unwrap().len(), 0);
    }
}
