use std::{
	fmt,
	sync::Arc,
};

use serde::{
	de::DeserializeOwned,
	Serialize,
};
use serde_json::Value;

use crate::arc_any::AsAnyArc;


/// Free-form metadata attached to a registration.
///
/// Properties are handed to factories as construction arguments and merged over
/// the service's own attributes when queries and rankings are evaluated.
pub type Properties = serde_json::Map<String, Value>;

/// A shared handle to a registered service
pub type ServiceRef = Arc<dyn Service>;

/// An object that can be registered against a protocol.
///
/// `attributes` is the object's half of the query namespace. Most services get it
/// from the `#[service]` attribute, which exposes their serialized fields.
pub trait Service: AsAnyArc {
	fn attributes(&self) -> Properties {
		return Properties::new();
	}
}

impl fmt::Debug for dyn Service {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.debug_tuple("Service").field(&self.attributes()).finish();
	}
}

/// Serializes a value into a map of attributes.
///
/// Anything that does not serialize to a JSON object has no attributes.
pub fn serialized_attributes<T: Serialize + ?Sized>(value: &T) -> Properties {
	return match serde_json::to_value(value) {
		Ok(Value::Object(attributes)) => attributes,
		Ok(_) => Properties::new(),
		Err(error) => {
			tracing::debug!("could not serialize service attributes: {}", error);
			Properties::new()
		},
	};
}

type FactoryFn = dyn Fn(&Properties) -> anyhow::Result<ServiceRef> + Send + Sync;

/// Builds a service from the properties it was registered with.
///
/// Factories run while the registry is locked and must not call back into the
/// registry that owns them.
pub struct ServiceFactory(Box<FactoryFn>);

impl ServiceFactory {
	pub fn new<F, S>(factory: F) -> ServiceFactory
	where
		F: Fn(&Properties) -> anyhow::Result<S> + Send + Sync + 'static,
		S: Service,
	{
		return ServiceFactory(Box::new(move |properties| {
			let service: ServiceRef = Arc::new(factory(properties)?);
			return Ok(service);
		}));
	}

	/// A factory that deserializes `S` from the registration's properties, so each
	/// property acts as a named constructor argument.
	pub fn deserialize<S: Service + DeserializeOwned>() -> ServiceFactory {
		return ServiceFactory::new::<_, S>(|properties: &Properties| -> anyhow::Result<S> {
			let service = serde_json::from_value(Value::Object(properties.clone()))?;
			return Ok(service);
		});
	}

	pub(crate) fn create(&self, properties: &Properties) -> anyhow::Result<ServiceRef> {
		return (self.0)(properties);
	}
}

impl fmt::Debug for ServiceFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str("ServiceFactory");
	}
}

/// What gets stored for a registration: a ready instance, or a factory that is
/// resolved into one the first time a lookup inspects it.
pub enum Registration {
	Instance(ServiceRef),
	Factory(ServiceFactory),
}

impl Registration {
	pub fn instance<S: Service>(service: S) -> Registration {
		return Registration::Instance(Arc::new(service));
	}

	pub fn shared(service: ServiceRef) -> Registration {
		return Registration::Instance(service);
	}

	pub fn factory<F, S>(factory: F) -> Registration
	where
		F: Fn(&Properties) -> anyhow::Result<S> + Send + Sync + 'static,
		S: Service,
	{
		return Registration::Factory(ServiceFactory::new(factory));
	}

	pub fn deserialize<S: Service + DeserializeOwned>() -> Registration {
		return Registration::Factory(ServiceFactory::deserialize::<S>());
	}

	pub fn is_factory(&self) -> bool {
		return matches!(self, Registration::Factory(_));
	}
}

impl fmt::Debug for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return match self {
			Registration::Instance(_) => f.write_str("Registration::Instance"),
			Registration::Factory(_) => f.write_str("Registration::Factory"),
		};
	}
}
