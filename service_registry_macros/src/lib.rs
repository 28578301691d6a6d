extern crate proc_macro;
use proc_macro::TokenStream;

mod service_object_macro;


/// Turns a struct or enum into a queryable service.
///
/// Adds `Debug`, `serde::Serialize` and `serde::Deserialize` to the item's derives and
/// implements `service_registry::Service`, exposing the serialized fields as the
/// service's attributes. Use `#[service(no_deserialize)]` for types that can only be
/// registered as ready-made instances.
#[proc_macro_attribute]
pub fn service(attr: TokenStream, body: TokenStream) -> TokenStream {
	return service_object_macro::service_object(attr, body);
}
