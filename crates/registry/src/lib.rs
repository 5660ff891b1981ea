//! JSON-file backed sensor registry.
//!
//! Holds the registered sensors, the dashboard preferences and the next
//! sensor id in a single JSON document. The document is loaded once on
//! [`JsonRegistry::open`] and every mutation is written through to disk
//! (temp file + rename) before the in-memory copy is replaced, so a failed
//! write never leaves memory and disk out of step.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use airwatch_core::error::CoreError;
use airwatch_core::preferences::{Preferences, PreferencesPatch};
use airwatch_core::registry::SensorRegistry;
use airwatch_core::sensor::{NewSensor, Sensor, UpdateSensor, MAX_SENSORS};
use airwatch_core::types::SensorId;

/// Default location of the registry document.
pub const DEFAULT_REGISTRY_PATH: &str = "sensors.json";

/// Errors from the registry store.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Reading or writing the document failed.
    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document on disk is not valid registry JSON.
    #[error("Registry document is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// On-disk layout of the registry document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    sensors: Vec<Sensor>,
    #[serde(default)]
    preferences: Preferences,
    #[serde(default = "first_id")]
    next_id: SensorId,
}

fn first_id() -> SensorId {
    1
}

impl Default for RegistryDocument {
    fn default() -> Self {
        Self {
            sensors: Vec::new(),
            preferences: Preferences::default(),
            next_id: first_id(),
        }
    }
}

/// Sensor and preference store backed by a JSON file.
///
/// Designed to be wrapped in `Arc` and shared between the HTTP handlers
/// (read/write) and the poller (read-only, through [`SensorRegistry`]).
#[derive(Debug)]
pub struct JsonRegistry {
    path: PathBuf,
    document: RwLock<RegistryDocument>,
}

impl JsonRegistry {
    /// Load the registry at `path`, creating an empty document if the file
    /// does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();

        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let document = RegistryDocument::default();
                write_document(&path, &document).await?;
                tracing::info!(path = %path.display(), "Created empty sensor registry");
                document
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            sensors = document.sensors.len(),
            "Sensor registry loaded"
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that the backing file is still reachable.
    pub async fn health_check(&self) -> Result<(), RegistryError> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sensors
    // -----------------------------------------------------------------------

    /// All sensors in registration order.
    pub async fn sensors(&self) -> Vec<Sensor> {
        self.document.read().await.sensors.clone()
    }

    pub async fn get(&self, id: SensorId) -> Option<Sensor> {
        self.document
            .read()
            .await
            .sensors
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Register a new sensor. Fails once [`MAX_SENSORS`] are registered.
    pub async fn add(&self, input: NewSensor) -> Result<Sensor, RegistryError> {
        input.validate()?;

        let mut guard = self.document.write().await;
        if guard.sensors.len() >= MAX_SENSORS {
            return Err(CoreError::Validation(format!(
                "Maximum {MAX_SENSORS} sensors allowed"
            ))
            .into());
        }

        let mut next = guard.clone();
        let sensor = Sensor {
            id: next.next_id,
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
            created_at: Utc::now(),
        };
        next.next_id += 1;
        next.sensors.push(sensor.clone());

        write_document(&self.path, &next).await?;
        *guard = next;

        Ok(sensor)
    }

    /// Update a sensor's name and/or address.
    ///
    /// Returns `None` when no sensor has the given id.
    pub async fn update(
        &self,
        id: SensorId,
        input: UpdateSensor,
    ) -> Result<Option<Sensor>, RegistryError> {
        input.validate()?;

        let mut guard = self.document.write().await;
        let mut next = guard.clone();
        let Some(sensor) = next.sensors.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(name) = input.name {
            sensor.name = name.trim().to_string();
        }
        if let Some(address) = input.address {
            sensor.address = address.trim().to_string();
        }
        let updated = sensor.clone();

        write_document(&self.path, &next).await?;
        *guard = next;

        Ok(Some(updated))
    }

    /// Remove a sensor. Returns `false` when no sensor has the given id.
    ///
    /// The id is also dropped from the stored card order and metric toggles.
    pub async fn delete(&self, id: SensorId) -> Result<bool, RegistryError> {
        let mut guard = self.document.write().await;
        if !guard.sensors.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let mut next = guard.clone();
        next.sensors.retain(|s| s.id != id);
        next.preferences.forget_sensor(id);

        write_document(&self.path, &next).await?;
        *guard = next;

        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    pub async fn preferences(&self) -> Preferences {
        self.document.read().await.preferences.clone()
    }

    /// Merge `patch` into the stored preferences and return the result.
    pub async fn update_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<Preferences, RegistryError> {
        let mut guard = self.document.write().await;
        let mut next = guard.clone();
        next.preferences.apply(patch);

        write_document(&self.path, &next).await?;
        let preferences = next.preferences.clone();
        *guard = next;

        Ok(preferences)
    }
}

#[async_trait]
impl SensorRegistry for JsonRegistry {
    async fn list(&self) -> Result<Vec<Sensor>, CoreError> {
        Ok(self.sensors().await)
    }
}

/// Write the document to a sibling temp file, then rename it into place.
async fn write_document(path: &Path, document: &RegistryDocument) -> Result<(), RegistryError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
