use thiserror::Error;

use crate::{
	Protocol,
	ServiceId,
};


/// Returned when an operation names an id that was never registered or has
/// already been unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no service with id <{id}>")]
pub struct NotFoundError {
	pub id: ServiceId,
}

/// A registered factory failed while being resolved into a service.
///
/// This is a configuration bug in whoever registered the factory, so unlike a
/// failing query it is surfaced to the caller. The entry stays unresolved.
#[derive(Debug, Error)]
#[error("factory for service <{id}> registered against {protocol} failed")]
pub struct FactoryError {
	pub id: ServiceId,
	pub protocol: Protocol,
	#[source]
	pub source: anyhow::Error,
}

/// Returned by lookups by protocol
#[derive(Debug, Error)]
pub enum GetServicesError {
	#[error(transparent)]
	Factory(#[from] FactoryError),
}

#[derive(Debug, Error)]
pub enum GetServiceByIdError {
	#[error(transparent)]
	NotFound(#[from] NotFoundError),
	#[error(transparent)]
	Factory(#[from] FactoryError),
}
