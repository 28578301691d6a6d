use proc_macro::TokenStream;
use proc_macro2::{
	Delimiter,
	TokenTree,
};
use quote::{
	ToTokens,
	quote,
};
use syn::{
	punctuated::Punctuated,
	parse::Parser,
	Attribute,
	Generics,
	Ident,
};


pub fn service_object(attr: TokenStream, body: TokenStream) -> TokenStream {
	let deserialize = match parse_options(attr) {
		Ok(deserialize) => deserialize,
		Err(error) => return error.into_compile_error().into(),
	};

	let (modified_body, ident, generics): (proc_macro2::TokenStream, Ident, Generics) = if let Ok(mut input) = syn::parse::<syn::ItemStruct>(body.clone()) {
		if let Err(error) = edit_attributes(&mut input.attrs, deserialize) {
			return error.into_compile_error().into();
		}
		let ident = input.ident.clone();
		let generics = input.generics.clone();
		(input.into_token_stream(), ident, generics)
	} else if let Ok(mut input) = syn::parse::<syn::ItemEnum>(body.clone()) {
		if let Err(error) = edit_attributes(&mut input.attrs, deserialize) {
			return error.into_compile_error().into();
		}
		let ident = input.ident.clone();
		let generics = input.generics.clone();
		(input.into_token_stream(), ident, generics)
	} else {
		return syn::Error::new(
			proc_macro2::Span::call_site(),
			"#[service] can only be applied to structs and enums",
		).into_compile_error().into();
	};

	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

	// Paths are left unanchored so the crate can alias itself in its own tests
	return quote! {
		#modified_body

		impl #impl_generics service_registry::Service for #ident #ty_generics #where_clause {
			fn attributes(&self) -> service_registry::Properties {
				return service_registry::serialized_attributes(self);
			}
		}
	}.into();
}

/// Returns whether `Deserialize` should be derived
fn parse_options(attr: TokenStream) -> syn::Result<bool> {
	let options = Punctuated::<Ident, syn::Token![,]>::parse_terminated.parse(attr)?;
	let mut deserialize = true;
	for option in options {
		if option == "no_deserialize" {
			deserialize = false;
		} else {
			return Err(syn::Error::new_spanned(option, "unknown #[service] option, expected `no_deserialize`"));
		}
	}
	return Ok(deserialize);
}

fn edit_attributes(attrs: &mut Vec<Attribute>, deserialize: bool) -> syn::Result<()> {
	let mut all_derived_traits = Vec::<syn::Path>::new();
	let mut derive_attributes = Vec::<Attribute>::new();
	attrs.retain(|attr| {
		if !attr.path.is_ident("derive") {
			return true;
		}
		derive_attributes.push(attr.clone());
		return false;
	});
	for derive in derive_attributes {
		let mut tokens = derive.tokens.clone().into_iter();
		match [tokens.next(), tokens.next()] {
			[Some(TokenTree::Group(group)), None]
				if group.delimiter() == Delimiter::Parenthesis =>
			{
				let derived_traits = Punctuated::<syn::Path, syn::Token![,]>::parse_terminated
					.parse2(group.stream())?;
				all_derived_traits.extend(derived_traits);
			}
			_ => return Err(syn::Error::new_spanned(derive, "malformed derive")),
		}
	}

	let mut required: Vec<syn::Path> = vec![
		syn::parse_quote!(Debug),
		syn::parse_quote!(serde::Serialize),
	];
	if deserialize {
		required.push(syn::parse_quote!(serde::Deserialize));
	}
	for path in required {
		if !all_derived_traits.contains(&path) {
			all_derived_traits.push(path);
		}
	}

	attrs.insert(0, syn::parse_quote! {
		#[derive( #(#all_derived_traits),* )]
	});

	return Ok(());
}
