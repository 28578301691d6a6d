use std::{
	any::Any,
	sync::Arc,
};

use crate::service::{
	Service,
	ServiceRef,
};


/// Type-erasure helpers every service gets for free, used to recover the concrete
/// type behind a `ServiceRef`.
pub trait AsAnyArc: Any + Send + Sync {
	/// Borrows the service as `Any`
	fn as_any(&self) -> &(dyn Any + Send + Sync);

	/// Converts a shared service into a shared `Any` without cloning the value
	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAnyArc for T {
	fn as_any(&self) -> &(dyn Any + Send + Sync) {
		return self;
	}

	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		return self;
	}
}

/// Returns the service as its concrete type, or `None` if it is something else.
///
/// The returned `Arc` shares ownership with the registry entry, so the same
/// instance is observed by every caller.
pub fn downcast_service<T: Service>(service: &ServiceRef) -> Option<Arc<T>> {
	return Arc::clone(service).into_any_arc().downcast::<T>().ok();
}
