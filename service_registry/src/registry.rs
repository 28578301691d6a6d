//! # Service registry
//!
//! A thread-safe table mapping protocols to the services registered against them.
//!
//! ## Locking
//!
//! A single mutex guards the entry table and the id counter. Every operation holds
//! it for its whole duration, including factory resolution and query evaluation.
//! This keeps resolution exactly-once and ordering simple, at the cost of
//! serializing all callers; registries are expected to hold few entries.
//!
//! Factories and filter callbacks run with the lock held. If they call back into
//! the same registry they will deadlock.

use std::{
	collections::{
		BTreeMap,
		BTreeSet,
	},
	fmt,
	sync::Arc,
};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{
	Deserialize,
	Serialize,
};
use tokio::sync::broadcast;
use tracing::{
	debug,
	warn,
};

use crate::{
	arc_any::downcast_service,
	config::RegistryConfig,
	errors::{
		FactoryError,
		GetServiceByIdError,
		GetServicesError,
		NotFoundError,
	},
	events::RegistryEvent,
	query::Lookup,
	service::{
		Properties,
		Registration,
		Service,
		ServiceRef,
	},
	Protocol,
};


/// Identifies one registration for the lifetime of its registry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u64);

impl fmt::Display for ServiceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return write!(f, "{}", self.0);
	}
}

struct ServiceEntry {
	protocol: Protocol,
	registration: Registration,
	properties: Properties,
}

impl ServiceEntry {
	/// Returns the service, running and caching the factory on first use
	fn resolve(&mut self, id: ServiceId) -> Result<ServiceRef, FactoryError> {
		let service = match &self.registration {
			Registration::Instance(service) => return Ok(Arc::clone(service)),
			Registration::Factory(factory) => match factory.create(&self.properties) {
				Ok(service) => service,
				Err(source) => {
					warn!("factory for service <{}> ({}) failed: {:#}", id, self.protocol, source);
					return Err(FactoryError {
						id,
						protocol: self.protocol.clone(),
						source,
					});
				},
			},
		};

		self.registration = Registration::Instance(Arc::clone(&service));
		debug!("service <{}> resolved from its factory", id);
		return Ok(service);
	}
}

struct RegistryState {
	next_id: u64,

	/// Ordered by id, which is registration order
	entries: BTreeMap<ServiceId, ServiceEntry>,

	/// Ids registered against each protocol
	by_protocol: FxHashMap<Protocol, BTreeSet<ServiceId>>,
}

/// The service registry. Share it between threads with an `Arc`.
pub struct ServiceRegistry {
	state: Mutex<RegistryState>,
	events: broadcast::Sender<RegistryEvent>,
}

impl Default for ServiceRegistry {
	fn default() -> Self {
		return ServiceRegistry::new();
	}
}

impl fmt::Debug for ServiceRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		return f.debug_struct("ServiceRegistry")
			.field("services", &state.entries.len())
			.field("next_id", &state.next_id)
			.finish();
	}
}

impl ServiceRegistry {
	pub fn new() -> ServiceRegistry {
		return ServiceRegistry::with_config(RegistryConfig::default());
	}

	pub fn with_config(config: RegistryConfig) -> ServiceRegistry {
		let config = config.normalized();
		let (events, _) = broadcast::channel(config.event_capacity);
		return ServiceRegistry {
			state: Mutex::new(RegistryState {
				next_id: config.first_id,
				entries: BTreeMap::new(),
				by_protocol: FxHashMap::default(),
			}),
			events,
		};
	}

	/// Registers a service (or a factory for one) against a protocol.
	///
	/// # Panics
	///
	/// If the id space is exhausted. `first_id` is capped at `MAX_FIRST_ID`, so this
	/// takes at least 2^63 registrations.
	pub fn register(&self, protocol: Protocol, registration: Registration, properties: Properties) -> ServiceId {
		let mut state = self.state.lock();

		let id = ServiceId(state.next_id);
		state.next_id = match state.next_id.checked_add(1) {
			Some(next_id) => next_id,
			None => panic!("service ids exhausted after <{}>", id),
		};

		state.by_protocol.entry(protocol.clone()).or_default().insert(id);
		state.entries.insert(id, ServiceEntry {
			protocol: protocol.clone(),
			registration,
			properties,
		});

		// Nobody listening is fine
		let _ = self.events.send(RegistryEvent::Registered {
			id,
			protocol: protocol.clone(),
		});
		drop(state);

		debug!("service <{}> registered {}", id, protocol);
		return id;
	}

	/// Shorthand for registering a ready-made instance
	pub fn register_instance<S: Service>(&self, protocol: Protocol, service: S, properties: Properties) -> ServiceId {
		return self.register(protocol, Registration::instance(service), properties);
	}

	pub fn unregister(&self, id: ServiceId) -> Result<(), NotFoundError> {
		let mut state = self.state.lock();

		let entry = match state.entries.remove(&id) {
			Some(entry) => entry,
			None => return Err(NotFoundError { id }),
		};
		if let Some(ids) = state.by_protocol.get_mut(&entry.protocol) {
			ids.remove(&id);
			if ids.is_empty() {
				state.by_protocol.remove(&entry.protocol);
			}
		}

		let _ = self.events.send(RegistryEvent::Unregistered {
			id,
			protocol: entry.protocol.clone(),
		});
		drop(state);

		debug!("service <{}> unregistered", id);
		return Ok(());
	}

	/// Returns a copy of the properties a service was registered with
	pub fn get_service_properties(&self, id: ServiceId) -> Result<Properties, NotFoundError> {
		let state = self.state.lock();
		return match state.entries.get(&id) {
			Some(entry) => Ok(entry.properties.clone()),
			None => Err(NotFoundError { id }),
		};
	}

	/// Returns every service registered against `protocol` that passes the lookup.
	///
	/// Factories are resolved as they are inspected. A failing factory aborts the
	/// lookup with `GetServicesError::Factory`; a failing query only excludes its candidate.
	pub fn get_services(&self, protocol: &Protocol, lookup: &Lookup) -> Result<Vec<ServiceRef>, GetServicesError> {
		let mut guard = self.state.lock();
		let state = &mut *guard;

		let ids = match state.by_protocol.get(protocol) {
			Some(ids) => ids,
			None => return Ok(Vec::new()),
		};

		let mut candidates = Vec::with_capacity(ids.len());
		for id in ids {
			let entry = match state.entries.get_mut(id) {
				Some(entry) => entry,
				None => continue,
			};
			let service = entry.resolve(*id)?;
			if let Some(candidate) = lookup.candidate(*id, service, &entry.properties) {
				candidates.push(candidate);
			}
		}
		drop(guard);

		return Ok(lookup.finish(candidates));
	}

	/// Returns the first service `get_services` would, if any
	pub fn get_service(&self, protocol: &Protocol, lookup: &Lookup) -> Result<Option<ServiceRef>, GetServicesError> {
		let services = self.get_services(protocol, lookup)?;
		return Ok(services.into_iter().next());
	}

	/// Like `get_services`, keeping only services of concrete type `T`
	pub fn get_services_as<T: Service>(&self, protocol: &Protocol, lookup: &Lookup) -> Result<Vec<Arc<T>>, GetServicesError> {
		let services = self.get_services(protocol, lookup)?;
		return Ok(services.iter().filter_map(downcast_service::<T>).collect());
	}

	pub fn get_service_as<T: Service>(&self, protocol: &Protocol, lookup: &Lookup) -> Result<Option<Arc<T>>, GetServicesError> {
		let services = self.get_services_as::<T>(protocol, lookup)?;
		return Ok(services.into_iter().next());
	}

	/// Returns the service registered under `id`, resolving its factory if needed
	pub fn get_service_by_id(&self, id: ServiceId) -> Result<ServiceRef, GetServiceByIdError> {
		let mut state = self.state.lock();
		let entry = match state.entries.get_mut(&id) {
			Some(entry) => entry,
			None => return Err(NotFoundError { id }.into()),
		};
		return Ok(entry.resolve(id)?);
	}

	/// Protocol a service was registered against
	pub fn get_service_protocol(&self, id: ServiceId) -> Result<Protocol, NotFoundError> {
		let state = self.state.lock();
		return match state.entries.get(&id) {
			Some(entry) => Ok(entry.protocol.clone()),
			None => Err(NotFoundError { id }),
		};
	}

	/// Ids of all current registrations, in registration order
	pub fn ids(&self) -> Vec<ServiceId> {
		return self.state.lock().entries.keys().copied().collect();
	}

	pub fn len(&self) -> usize {
		return self.state.lock().entries.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.len() == 0;
	}

	/// Subscribes to registration and unregistration events.
	///
	/// The receiver works from both sync (`try_recv`, `blocking_recv`) and async code.
	/// Only events sent after subscribing are received.
	pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
		return self.events.subscribe();
	}
}
