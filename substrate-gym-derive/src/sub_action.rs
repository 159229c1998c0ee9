use proc_macro2::TokenStream;
use proc_macro_error::{abort, abort_call_site};
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Ident, Lit, Meta, NestedMeta};

pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (action_name, minimum) = parse_attributes(name, &input.attrs);
    let (from_index, index, num_values, labels) = generate(name, &input.data);

    let expanded = quote! {
        #[allow(unused_qualifications)]
        impl #impl_generics SubAction for #name #ty_generics #where_clause {
            fn from_index(index: u64) -> Self {
                #from_index
            }

            fn index(&self) -> u64 {
                #index
            }

            fn num_values() -> u64 {
                #num_values
            }

            fn name() -> &'static str {
                #action_name
            }

            fn labels() -> &'static [&'static str] {
                #labels
            }

            fn minimum() -> i64 {
                #minimum
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

fn parse_attributes(ident: &Ident, attrs: &[Attribute]) -> (String, i64) {
    let mut action_name = ident.to_string().to_lowercase();
    let mut minimum = 0i64;
    for attr in attrs.iter().filter(|a| a.path.is_ident("sub_action")) {
        let list = match attr.parse_meta() {
            Ok(Meta::List(list)) => list,
            _ => abort!(attr, "expected #[sub_action(name = \"...\", minimum = \"...\")]"),
        };
        for nested in list.nested.iter() {
            let nv = match nested {
                NestedMeta::Meta(Meta::NameValue(nv)) => nv,
                _ => abort!(nested, "expected `key = \"value\"`"),
            };
            if nv.path.is_ident("name") {
                match &nv.lit {
                    Lit::Str(s) => action_name = s.value(),
                    _ => abort!(nv.lit, "`name` must be a string literal"),
                }
            } else if nv.path.is_ident("minimum") {
                minimum = match &nv.lit {
                    Lit::Str(s) => match s.value().parse::<i64>() {
                        Ok(value) => value,
                        Err(_) => abort!(s, "`minimum` must parse as an integer"),
                    },
                    Lit::Int(i) => match i.base10_parse::<i64>() {
                        Ok(value) => value,
                        Err(_) => abort!(i, "`minimum` must be an integer"),
                    },
                    _ => abort!(nv.lit, "`minimum` must be an integer"),
                };
            } else {
                abort!(nv.path, "unknown sub_action attribute");
            }
        }
    }
    (action_name, minimum)
}

fn generate(ident: &Ident, data: &Data) -> (TokenStream, TokenStream, TokenStream, TokenStream) {
    match data {
        Data::Enum(em) => {
            let len = em.variants.len() as u64;
            let mut from_index = vec![];
            let mut index = vec![];
            let mut labels = vec![];
            for (i, variant) in em.variants.iter().enumerate() {
                if !variant.fields.is_empty() {
                    abort!(variant, "\"SubAction\" variants cannot carry fields");
                }
                let i = i as u64;
                let variant_ident = &variant.ident;
                let variant_name = variant.ident.to_string().to_uppercase();
                from_index.push(quote! {
                    #i => { #ident::#variant_ident }
                });
                index.push(quote! {
                    #ident::#variant_ident => { #i }
                });
                labels.push(quote! {
                    #variant_name
                });
            }
            (
                quote! {
                    match index {
                        #(#from_index),*
                        _ => panic!("Invalid sub-action index: {}", index),
                    }
                },
                quote! {
                    match &self {
                        #(#index),*
                    }
                },
                quote! { #len },
                quote! { &[#(#labels),*] },
            )
        }
        _ => abort_call_site!("\"SubAction\" can only be derived for enums"),
    }
}
