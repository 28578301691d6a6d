use std::{
	any::{
		type_name,
		TypeId,
	},
	borrow::Cow,
	fmt,
	hash::{
		Hash,
		Hasher,
	},
};


/// The capability tag services are registered against.
///
/// Protocols match by identity only. A named protocol never equals a type
/// protocol, and there is no notion of one protocol extending another.
#[derive(Clone)]
pub struct Protocol(ProtocolKind);

#[derive(Clone)]
enum ProtocolKind {
	Named(Cow<'static, str>),
	Type {
		id: TypeId,
		name: &'static str,
	},
}

impl Protocol {
	/// A protocol identified by a string, such as `"simplydmx.output_driver"`
	pub fn named(name: impl Into<Cow<'static, str>>) -> Protocol {
		return Protocol(ProtocolKind::Named(name.into()));
	}

	/// A protocol identified by a Rust type, usually a trait object like `dyn Driver`.
	pub fn of<T: ?Sized + 'static>() -> Protocol {
		return Protocol(ProtocolKind::Type {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		});
	}

	/// Human-readable name. Not used for matching.
	pub fn name(&self) -> &str {
		return match &self.0 {
			ProtocolKind::Named(name) => name.as_ref(),
			ProtocolKind::Type { name, .. } => *name,
		};
	}
}

impl PartialEq for Protocol {
	fn eq(&self, other: &Self) -> bool {
		return match (&self.0, &other.0) {
			(ProtocolKind::Named(a), ProtocolKind::Named(b)) => a == b,
			(ProtocolKind::Type { id: a, .. }, ProtocolKind::Type { id: b, .. }) => a == b,
			_ => false,
		};
	}
}

impl Eq for Protocol {}

impl Hash for Protocol {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match &self.0 {
			ProtocolKind::Named(name) => {
				state.write_u8(0);
				name.hash(state);
			},
			ProtocolKind::Type { id, .. } => {
				state.write_u8(1);
				id.hash(state);
			},
		}
	}
}

impl fmt::Debug for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return match &self.0 {
			ProtocolKind::Named(name) => write!(f, "Protocol({:?})", name),
			ProtocolKind::Type { name, .. } => write!(f, "Protocol(<{}>)", name),
		};
	}
}

impl fmt::Display for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str(self.name());
	}
}

impl From<&'static str> for Protocol {
	fn from(name: &'static str) -> Self {
		return Protocol::named(name);
	}
}
