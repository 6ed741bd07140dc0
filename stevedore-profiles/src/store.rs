//! SQLite-backed profile storage

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::warn;

/// A named connection profile for one S3-compatible backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageProfile {
    /// Surrogate key, assigned on insert
    pub id: i64,
    /// Unique, human-chosen name
    pub name: String,
    /// Endpoint URL
    pub endpoint: String,
    /// Optional port, kept as text to match operator input
    pub port: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    pub bucket_name: String,
}

/// Fields required to create a profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub endpoint: String,
    pub port: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    pub bucket_name: String,
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub endpoint: Option<String>,
    pub port: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket_name: Option<String>,
}

/// Profile store errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile already exists: {0}")]
    DuplicateName(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Invalid profile: {0}")]
    Validation(String),

    #[error("Storage fault: {0}")]
    Persistence(#[from] rusqlite::Error),
}

/// SQLite-backed store for storage profiles
///
/// One connection guarded by a mutex; each operation acquires it for the
/// duration of that operation only. Single-operator tool, so no further
/// concurrency control.
pub struct ProfileStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS storage_profiles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    endpoint    TEXT NOT NULL,
    port        TEXT,
    access_key  TEXT NOT NULL,
    secret_key  TEXT NOT NULL,
    region      TEXT,
    bucket_name TEXT NOT NULL
)";

impl ProfileStore {
    /// Open (or create) the profile database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let conn = Connection::open(path)?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a transient in-memory store
    pub fn open_in_memory() -> Result<Self, ProfileError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a new profile and return it with its assigned id
    pub fn save(&self, profile: NewProfile) -> Result<StorageProfile, ProfileError> {
        validate(&profile)?;

        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO storage_profiles
                 (name, endpoint, port, access_key, secret_key, region, bucket_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.name,
                profile.endpoint,
                profile.port,
                profile.access_key,
                profile.secret_key,
                profile.region,
                profile.bucket_name,
            ],
        );

        match result {
            Ok(_) => Ok(StorageProfile {
                id: conn.last_insert_rowid(),
                name: profile.name,
                endpoint: profile.endpoint,
                port: profile.port,
                access_key: profile.access_key,
                secret_key: profile.secret_key,
                region: profile.region,
                bucket_name: profile.bucket_name,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ProfileError::DuplicateName(profile.name))
            }
            Err(e) => Err(ProfileError::Persistence(e)),
        }
    }

    /// List all profiles in storage order
    ///
    /// A storage fault is logged and swallowed; callers always get a list,
    /// possibly empty.
    pub fn list(&self) -> Vec<StorageProfile> {
        match self.try_list() {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "failed to list profiles, returning empty");
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> Result<Vec<StorageProfile>, ProfileError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, endpoint, port, access_key, secret_key, region, bucket_name
             FROM storage_profiles",
        )?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    /// Fetch a profile by id
    pub fn get_by_id(&self, id: i64) -> Result<StorageProfile, ProfileError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, endpoint, port, access_key, secret_key, region, bucket_name
             FROM storage_profiles WHERE id = ?1",
            params![id],
            row_to_profile,
        )
        .optional()?
        .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }

    /// Apply the supplied fields to the profile matched by `name`
    pub fn update(&self, name: &str, update: &ProfileUpdate) -> Result<StorageProfile, ProfileError> {
        let conn = self.conn.lock();
        let mut profile = conn
            .query_row(
                "SELECT id, name, endpoint, port, access_key, secret_key, region, bucket_name
                 FROM storage_profiles WHERE name = ?1",
                params![name],
                row_to_profile,
            )
            .optional()?
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;

        if let Some(endpoint) = &update.endpoint {
            profile.endpoint = endpoint.clone();
        }
        if let Some(port) = &update.port {
            profile.port = Some(port.clone());
        }
        if let Some(access_key) = &update.access_key {
            profile.access_key = access_key.clone();
        }
        if let Some(secret_key) = &update.secret_key {
            profile.secret_key = secret_key.clone();
        }
        if let Some(region) = &update.region {
            profile.region = Some(region.clone());
        }
        if let Some(bucket_name) = &update.bucket_name {
            profile.bucket_name = bucket_name.clone();
        }

        conn.execute(
            "UPDATE storage_profiles
             SET endpoint = ?1, port = ?2, access_key = ?3, secret_key = ?4,
                 region = ?5, bucket_name = ?6
             WHERE id = ?7",
            params![
                profile.endpoint,
                profile.port,
                profile.access_key,
                profile.secret_key,
                profile.region,
                profile.bucket_name,
                profile.id,
            ],
        )?;

        Ok(profile)
    }

    /// Remove the profile matched by `name`
    pub fn delete(&self, name: &str) -> Result<(), ProfileError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM storage_profiles WHERE name = ?1",
            params![name],
        )?;
        if affected == 0 {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<StorageProfile> {
    Ok(StorageProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        endpoint: row.get(2)?,
        port: row.get(3)?,
        access_key: row.get(4)?,
        secret_key: row.get(5)?,
        region: row.get(6)?,
        bucket_name: row.get(7)?,
    })
}

fn validate(profile: &NewProfile) -> Result<(), ProfileError> {
    let required = [
        ("name", &profile.name),
        ("endpoint", &profile.endpoint),
        ("access_key", &profile.access_key),
        ("secret_key", &profile.secret_key),
        ("bucket_name", &profile.bucket_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ProfileError::Validation(format!("{} is required", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio_profile(name: &str) -> NewProfile {
        NewProfile {
            name: name.to_string(),
            endpoint: "http://localhost".to_string(),
            port: Some("9000".to_string()),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            region: Some("us-east-1".to_string()),
            bucket_name: "data".to_string(),
        }
    }

    #[test]
    fn test_save_then_list_round_trip() {
        let store = ProfileStore::open_in_memory().unwrap();

        let saved = store.save(minio_profile("minio-local")).unwrap();
        assert!(saved.id > 0);

        let profiles = store.list();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0], saved);
        assert_eq!(profiles[0].endpoint, "http://localhost");
        assert_eq!(profiles[0].bucket_name, "data");
    }

    #[test]
    fn test_duplicate_name_fails_and_keeps_one_row() {
        let store = ProfileStore::open_in_memory().unwrap();

        store.save(minio_profile("minio-local")).unwrap();
        let result = store.save(minio_profile("minio-local"));
        assert!(matches!(result, Err(ProfileError::DuplicateName(_))));

        let with_name: Vec<_> = store
            .list()
            .into_iter()
            .filter(|p| p.name == "minio-local")
            .collect();
        assert_eq!(with_name.len(), 1);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let store = ProfileStore::open_in_memory().unwrap();

        let mut profile = minio_profile("minio-local");
        profile.access_key = String::new();
        let result = store.save(profile);
        assert!(matches!(result, Err(ProfileError::Validation(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let store = ProfileStore::open_in_memory().unwrap();
        let saved = store.save(minio_profile("minio-local")).unwrap();

        let updated = store
            .update(
                "minio-local",
                &ProfileUpdate {
                    region: Some("eu-west-1".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.region.as_deref(), Some("eu-west-1"));
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.endpoint, saved.endpoint);
        assert_eq!(updated.port, saved.port);
        assert_eq!(updated.access_key, saved.access_key);
        assert_eq!(updated.secret_key, saved.secret_key);
        assert_eq!(updated.bucket_name, saved.bucket_name);

        // Persisted, not just echoed back
        let fetched = store.get_by_id(saved.id).unwrap();
        assert_eq!(fetched, updated);
    }

    #[test]
    fn test_update_missing_profile_is_not_found() {
        let store = ProfileStore::open_in_memory().unwrap();

        let result = store.update("ghost", &ProfileUpdate::default());
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_delete_removes_profile() {
        let store = ProfileStore::open_in_memory().unwrap();
        let saved = store.save(minio_profile("minio-local")).unwrap();

        store.delete("minio-local").unwrap();

        let result = store.get_by_id(saved.id);
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing_profile_leaves_store_unchanged() {
        let store = ProfileStore::open_in_memory().unwrap();
        store.save(minio_profile("minio-local")).unwrap();

        let result = store.delete("ghost");
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_get_by_id_missing_is_not_found() {
        let store = ProfileStore::open_in_memory().unwrap();

        let result = store.get_by_id(42);
        assert!(matches!(result, Err(ProfileError::NotFound(_))));
    }
}
