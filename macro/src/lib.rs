extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{punctuated::Punctuated, parse_macro_input};

const FEATURE_SERVER: &str = "server-http2";
const FEATURE_CLIENT: &str = "client-http2";

#[derive(Debug, Default)]
struct DtoFlags {
    pub clone: bool,
    pub request: bool,
    pub response: bool,
}

/// Derives the wire traits for a gateway DTO.
///
/// `request` types are read by the server and written by clients, `response`
/// types the other way around. A type flagged with both always gets both serde
/// derives. `clone` adds `Clone`; `Debug` is always derived.
///
/// ```ignore
/// #[dto(request)]
/// pub struct SearchParams { pub query: Option<String> }
/// ```
#[proc_macro_attribute]
pub fn dto(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated<syn::Ident, syn::Token![,]>::parse_terminated);

    let mut flags = DtoFlags::default();
    for flag in args {
        match flag.to_string().as_str() {
            "clone" => flags.clone = true,
            "request" => flags.request = true,
            "response" => flags.response = true,
            other => {
                return syn::Error::new(flag.span(), format!("Unknown dto flag: {other}"))
                    .to_compile_error()
                    .into();
            }
        }
    }

    let mut item: syn::Item = parse_macro_input!(item as syn::Item);
    let item_attrs = match &mut item {
        syn::Item::Struct(s) => &mut s.attrs,
        syn::Item::Enum(e) => &mut e.attrs,
        other => {
            return syn::Error::new_spanned(other, "dto macro only supports structs and enums")
                .to_compile_error()
                .into();
        }
    };

    let mut universal_derives: Vec<syn::Path> = vec![syn::parse_quote!(Debug)];
    let mut derive_attrs: Vec<syn::Attribute> = Vec::new();

    if flags.clone {
        universal_derives.push(syn::parse_quote!(Clone));
    }

    if flags.request && flags.response {
        universal_derives.push(syn::parse_quote!(serde::Serialize));
        universal_derives.push(syn::parse_quote!(serde::Deserialize));
    } else if flags.request {
        derive_attrs.push(syn::parse_quote! {
            #[cfg_attr(feature = #FEATURE_SERVER, derive(serde::Deserialize))]
        });
        derive_attrs.push(syn::parse_quote! {
            #[cfg_attr(feature = #FEATURE_CLIENT, derive(serde::Serialize))]
        });
    } else if flags.response {
        derive_attrs.push(syn::parse_quote! {
            #[cfg_attr(feature = #FEATURE_SERVER, derive(serde::Serialize))]
        });
        derive_attrs.push(syn::parse_quote! {
            #[cfg_attr(feature = #FEATURE_CLIENT, derive(serde::Deserialize))]
        });
    }

    derive_attrs.insert(
        0,
        syn::parse_quote! {
            #[derive(#(#universal_derives),*)]
        },
    );

    // Derives go first so serde helper attributes on the item resolve.
    derive_attrs.append(item_attrs);
    *item_attrs = derive_attrs;

    TokenStream::from(quote! { #item })
}
