//! SQLite-backed repository.
//!
//! One table per record kind. Address columns are produced by
//! [`flatten`] and read back through [`unflatten_with`]; nothing else in
//! the crate knows their names.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{sort_records, Repository};
use crate::address::{AddressLevel, AddressRecord};
use crate::error::{Error, Result};
use crate::flatten::{
    flatten, unflatten_with, FlatColumns, ADDRESS_COLUMNS, LATITUDE_COLUMN, LOCATION_COLUMN,
    LONGITUDE_COLUMN,
};
use crate::normalizer::AddressNormalizer;
use crate::records::{Donor, Hospital, Record};
use crate::types::{BloodType, Gender, HospitalType};

/// A record that maps onto one SQLite table.
pub trait SqlRecord: Record {
    /// Table name.
    const TABLE: &'static str;

    /// Column names and SQL types, excluding `id` and the address columns.
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Values for [`SqlRecord::COLUMNS`], in order.
    fn to_values(&self) -> Vec<Value>;

    /// Rebuild a record from a row and its already decoded id and address.
    fn from_row(id: Uuid, row: &Row<'_>, address: AddressRecord) -> rusqlite::Result<Self>;
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}

fn real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn address_values(row: &FlatColumns) -> Vec<Value> {
    let mut values: Vec<Value> = AddressLevel::ALL
        .iter()
        .map(|level| text(row.get(*level)))
        .collect();
    values.push(real(row.latitude));
    values.push(real(row.longitude));
    values.push(text(row.location.as_deref()));
    values
}

fn read_flat(row: &Row<'_>) -> rusqlite::Result<FlatColumns> {
    let mut flat = FlatColumns {
        latitude: row.get(LATITUDE_COLUMN)?,
        longitude: row.get(LONGITUDE_COLUMN)?,
        location: row.get(LOCATION_COLUMN)?,
        ..FlatColumns::default()
    };
    for level in AddressLevel::ALL {
        *flat.slot_mut(level) = row.get(level.column())?;
    }
    Ok(flat)
}

fn address_column_type(column: &str) -> &'static str {
    if column == LATITUDE_COLUMN || column == LONGITUDE_COLUMN {
        "REAL"
    } else {
        "TEXT"
    }
}

/// Repository storing records of one kind in a SQLite table.
#[derive(Debug)]
pub struct SqliteRepository<R> {
    conn: Mutex<Connection>,
    normalizer: AddressNormalizer,
    _record: PhantomData<fn() -> R>,
}

impl<R: SqlRecord> SqliteRepository<R> {
    /// Open (or create) a database file and ensure the table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(table = R::TABLE, path = %path.as_ref().display(), "opened sqlite repository");
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection and ensure the table exists.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(&Self::schema())?;
        Ok(Self {
            conn: Mutex::new(conn),
            normalizer: AddressNormalizer::new(),
            _record: PhantomData,
        })
    }

    /// Use a custom normalizer when reading addresses back.
    pub fn with_normalizer(mut self, normalizer: AddressNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn schema() -> String {
        let mut columns = vec!["id TEXT PRIMARY KEY NOT NULL".to_string()];
        columns.extend(R::COLUMNS.iter().map(|(name, ty)| format!("{name} {ty}")));
        columns.extend(
            ADDRESS_COLUMNS
                .iter()
                .map(|name| format!("{name} {}", address_column_type(name))),
        );
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            R::TABLE,
            columns.join(", ")
        )
    }

    fn column_list() -> String {
        std::iter::once("id")
            .chain(R::COLUMNS.iter().map(|(name, _)| *name))
            .chain(ADDRESS_COLUMNS)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::storage_error("sqlite connection lock poisoned"))
    }

    fn decode(&self, row: &Row<'_>) -> rusqlite::Result<R> {
        let raw_id: String = row.get("id")?;
        let id = Uuid::parse_str(&raw_id)
            .map_err(|e| conversion_error(0, format!("invalid id {raw_id}: {e}")))?;
        let address = unflatten_with(&self.normalizer, &read_flat(row)?);
        R::from_row(id, row, address)
    }
}

impl<R: SqlRecord> Repository<R> for SqliteRepository<R> {
    fn get(&self, id: Uuid) -> Result<Option<R>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            Self::column_list(),
            R::TABLE
        );
        let record = conn
            .prepare_cached(&sql)?
            .query_row([id.to_string()], |row| self.decode(row))
            .optional()?;
        Ok(record)
    }

    fn list(&self) -> Result<Vec<R>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM {}", Self::column_list(), R::TABLE);
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut records = stmt
            .query_map([], |row| self.decode(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        sort_records(&mut records);
        Ok(records)
    }

    fn upsert(&self, record: R) -> Result<()> {
        let mut values = vec![Value::Text(record.id().to_string())];
        values.extend(record.to_values());
        values.extend(address_values(&flatten(record.address())));

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            R::TABLE,
            Self::column_list(),
            placeholders
        );

        let conn = self.lock()?;
        conn.prepare_cached(&sql)?
            .execute(params_from_iter(values.iter()))?;
        tracing::debug!(kind = R::KIND, id = %record.id(), "upserted record");
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        let changed = conn.prepare_cached(&sql)?.execute([id.to_string()])?;
        tracing::debug!(kind = R::KIND, %id, removed = changed > 0, "deleted record");
        Ok(changed > 0)
    }
}

impl SqlRecord for Donor {
    const TABLE: &'static str = "donors";

    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("name", "TEXT NOT NULL"),
        ("phone", "TEXT"),
        ("email", "TEXT"),
        ("blood_type", "TEXT NOT NULL"),
        ("gender", "TEXT"),
        ("available", "INTEGER NOT NULL"),
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            text(self.phone.as_deref()),
            text(self.email.as_deref()),
            Value::Text(self.blood_type.as_str().to_string()),
            text(self.gender.map(|g| g.as_str())),
            Value::Integer(i64::from(self.available)),
        ]
    }

    fn from_row(id: Uuid, row: &Row<'_>, address: AddressRecord) -> rusqlite::Result<Self> {
        let code: String = row.get("blood_type")?;
        let blood_type = BloodType::from_code(&code)
            .ok_or_else(|| conversion_error(4, format!("unknown blood type: {code}")))?;
        let gender: Option<String> = row.get("gender")?;
        Ok(Self {
            id,
            name: row.get("name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            blood_type,
            gender: gender.as_deref().and_then(Gender::from_label),
            available: row.get("available")?,
            address,
        })
    }
}

impl SqlRecord for Hospital {
    const TABLE: &'static str = "hospitals";

    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("name", "TEXT NOT NULL"),
        ("phone", "TEXT"),
        ("email", "TEXT"),
        ("hospital_type", "TEXT"),
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            text(self.phone.as_deref()),
            text(self.email.as_deref()),
            text(self.hospital_type.as_ref().map(|t| t.as_str())),
        ]
    }

    fn from_row(id: Uuid, row: &Row<'_>, address: AddressRecord) -> rusqlite::Result<Self> {
        let hospital_type: Option<String> = row.get("hospital_type")?;
        Ok(Self {
            id,
            name: row.get("name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            hospital_type: hospital_type.as_deref().map(HospitalType::from_label),
            address,
        })
    }
}
