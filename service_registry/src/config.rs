use serde::{
	Deserialize,
	Serialize,
};
use thiserror::Error;


/// Highest accepted `first_id`, leaving room for 2^63 registrations
pub const MAX_FIRST_ID: u64 = 1 << 63;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid registry configuration: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("first_id {0} is out of range (1..={max})", max = MAX_FIRST_ID)]
	FirstIdOutOfRange(u64),
}


/// Construction-time settings for a `ServiceRegistry`.
///
/// Every field has a default, so a partial (or empty) JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
	/// The id handed to the first registration. Ids start at 1 or higher.
	pub first_id: u64,

	/// How many registry events a slow subscriber may fall behind by before it
	/// starts missing them.
	pub event_capacity: usize,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		return RegistryConfig {
			first_id: 1,
			event_capacity: 64,
		};
	}
}

impl RegistryConfig {
	/// Parses a configuration, rejecting a `first_id` above `MAX_FIRST_ID`
	pub fn from_json(json: &str) -> Result<RegistryConfig, ConfigError> {
		let config: RegistryConfig = serde_json::from_str(json)?;
		if config.first_id > MAX_FIRST_ID {
			return Err(ConfigError::FirstIdOutOfRange(config.first_id));
		}
		return Ok(config.normalized());
	}

	/// Clamps out-of-range values to the nearest usable ones
	pub(crate) fn normalized(self) -> RegistryConfig {
		return RegistryConfig {
			first_id: self.first_id.clamp(1, MAX_FIRST_ID),
			event_capacity: self.event_capacity.max(1),
		};
	}
}
