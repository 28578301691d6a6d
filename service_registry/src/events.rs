use crate::{
	Protocol,
	ServiceId,
};


/// Announcements published by a registry as its contents change.
///
/// Events are sent while the registry is locked, so subscribers observe them in
/// the same order the changes were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
	Registered {
		id: ServiceId,
		protocol: Protocol,
	},
	Unregistered {
		id: ServiceId,
		protocol: Protocol,
	},
}

impl RegistryEvent {
	pub fn id(&self) -> ServiceId {
		return match self {
			RegistryEvent::Registered { id, .. } => *id,
			RegistryEvent::Unregistered { id, .. } => *id,
		};
	}
}
