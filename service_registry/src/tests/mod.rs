// Create an alias for macro output to use since this is an internal module
// and the `#[service]` macro outputs crate-qualified paths
mod service_registry {
	pub use crate::*;
}

mod queries;

use serde_json::Value;

use crate::{
	service,
	Properties,
};


/// A plain service with a couple of queryable attributes
#[service]
pub struct Light {
	pub name: String,
	pub active: bool,
}

/// A service built from its registration properties
#[service]
pub struct Paint {
	pub color: String,
}

pub fn light(name: &str, active: bool) -> Light {
	return Light {
		name: String::from(name),
		active,
	};
}

/// Builds properties from a `json!` object
pub fn props(value: Value) -> Properties {
	return match value {
		Value::Object(properties) => properties,
		other => panic!("expected a JSON object, got {}", other),
	};
}
