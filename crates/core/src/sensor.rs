//! Registered sensors and the validation rules applied on create/update.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{SensorId, Timestamp};

/// Hard cap on the number of registered sensors.
///
/// The poller probes the whole fleet at once, so this also bounds the number
/// of simultaneous outbound requests per poll cycle.
pub const MAX_SENSORS: usize = 16;

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// A sensor known to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    /// `host` or `host:port`; port 80 when omitted.
    pub address: String,
    pub created_at: Timestamp,
}

/// Request body for registering a sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSensor {
    pub name: String,
    pub address: String,
}

/// Request body for updating a sensor. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSensor {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Validate a display name: non-blank and at most [`MAX_NAME_LEN`] chars.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Sensor name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Sensor name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a sensor address: non-blank, no scheme, no path, no whitespace.
pub fn validate_address(address: &str) -> Result<(), CoreError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Sensor address is required".into()));
    }
    if trimmed.contains("://") || trimmed.contains('/') || trimmed.contains(char::is_whitespace)
    {
        return Err(CoreError::Validation(format!(
            "Invalid sensor address '{trimmed}': expected host or host:port"
        )));
    }
    Ok(())
}

impl NewSensor {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_address(&self.address)
    }
}

impl UpdateSensor {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        Ok(())
    }
}
