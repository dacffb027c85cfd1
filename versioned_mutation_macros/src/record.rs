use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let collection = extract_collection(input)?;
    let id_field = extract_id_field(input)?;

    Ok(quote! {
        impl versioned_mutation::Record for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> &str {
                &self.#id_field
            }
        }
    })
}

/// `#[record(collection = "...")]` on the struct. Only `collection` is accepted.
fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    let mut collection: Option<String> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("collection") {
                return Err(meta.error(
                    "unsupported record attribute; expected `collection = \"...\"`",
                ));
            }
            if collection.is_some() {
                return Err(meta.error("duplicate `collection` in record attributes"));
            }
            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new_spanned(
                    &value,
                    "record collection must not be empty",
                ));
            }
            collection = Some(value.value());
            Ok(())
        })?;
    }

    // snake_case struct name + "s"
    Ok(collection.unwrap_or_else(|| format!("{}s", to_snake_case(&input.ident.to_string()))))
}

/// The field marked `#[record(id)]`, or a field named `id`. Only `id` is
/// accepted inside field attributes, and at most one field may carry it.
fn extract_id_field(input: &DeriveInput) -> syn::Result<syn::Ident> {
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record derive only supports structs",
            ))
        }
    };

    let mut marked: Option<syn::Ident> = None;

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if !meta.path.is_ident("id") {
                    return Err(meta.error("unsupported record field attribute; expected `id`"));
                }
                if marked.is_some() {
                    return Err(meta.error("more than one field is marked #[record(id)]"));
                }
                marked = field.ident.clone();
                Ok(())
            })?;
        }
    }

    if let Some(ident) = marked {
        return Ok(ident);
    }

    fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == "id")
        .cloned()
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Record derive: no field marked with #[record(id)] and no field named `id`",
            )
        })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
