//! An in-process registry of services keyed by protocol.
//!
//! ```
//! use service_registry::{Lookup, Properties, Protocol, Registration, ServiceRegistry, service};
//! use serde_json::json;
//!
//! #[service]
//! struct Greeter {
//! 	greeting: String,
//! }
//!
//! let registry = ServiceRegistry::new();
//! let greeters = Protocol::named("example.greeter");
//!
//! let mut properties = Properties::new();
//! properties.insert("greeting".into(), json!("hello"));
//! properties.insert("weight".into(), json!(2));
//! registry.register(greeters.clone(), Registration::deserialize::<Greeter>(), properties);
//!
//! let greeter = registry
//! 	.get_service_as::<Greeter>(&greeters, &Lookup::new().query("weight > 1"))
//! 	.unwrap()
//! 	.unwrap();
//! assert_eq!(greeter.greeting, "hello");
//! ```

// Mods
mod arc_any;
mod config;
mod errors;
mod events;
mod protocol;
mod query;
mod registry;
mod service;

// Tests
#[cfg(test)]
mod tests;

// Re-exports
pub use arc_any::{
	AsAnyArc,
	downcast_service,
};
pub use config::{
	ConfigError,
	RegistryConfig,
	MAX_FIRST_ID,
};
pub use errors::{
	FactoryError,
	GetServicesError,
	GetServiceByIdError,
	NotFoundError,
};
pub use events::RegistryEvent;
pub use protocol::Protocol;
pub use query::{
	namespace,
	EvalError,
	Lookup,
	Predicate,
	Query,
	QueryParseError,
};
pub use registry::{
	ServiceId,
	ServiceRegistry,
};
pub use service::{
	serialized_attributes,
	Properties,
	Registration,
	Service,
	ServiceFactory,
	ServiceRef,
};

// Macro re-exports
pub use service_registry_macros::service;
