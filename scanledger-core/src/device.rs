//! Stable per-device identity.
//!
//! The cloud gateway keys its remote directory by this identifier. It is
//! issued once (a random UUID) and persisted; every later load returns the
//! same value.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{keys, KeyValueStore, StorageError};

/// Errors that can occur with device identities.
#[derive(Error, Debug)]
pub enum DeviceIdError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid persisted device id: {0}")]
    InvalidFormat(String),
}

/// A stable per-device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Loads the persisted device id, issuing and persisting a new one on
    /// first use.
    pub fn load_or_create(store: &dyn KeyValueStore) -> Result<Self, DeviceIdError> {
        if let Some(raw) = store.get(keys::DEVICE_ID)? {
            let uuid = raw
                .trim()
                .parse::<Uuid>()
                .map_err(|e| DeviceIdError::InvalidFormat(e.to_string()))?;
            return Ok(Self(uuid));
        }

        let id = Self(Uuid::new_v4());
        store.set(keys::DEVICE_ID, &id.0.to_string())?;
        Ok(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
