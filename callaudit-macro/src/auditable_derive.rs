use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Fields, GenericParam, Generics, Ident, parse_macro_input, parse_quote,
};

pub fn auditable_derive_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let generics = add_trait_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let type_name = name.to_string();
            let fields = field_calls(&data.fields, |member| quote! { &self.#member });
            quote! {
                ::callaudit::AuditValue::composite(#type_name)
                    #(#fields)*
                    .build()
            }
        }
        Data::Enum(data) => {
            let arms = data.variants.iter().map(|variant| {
                let variant_name = &variant.ident;
                let type_name = format!("{}::{}", name, variant_name);
                let (pattern, bindings) = variant_pattern(&variant.fields);
                let fields = field_calls_bound(&variant.fields, &bindings);
                quote! {
                    #name::#variant_name #pattern => ::callaudit::AuditValue::composite(#type_name)
                        #(#fields)*
                        .build(),
                }
            });
            if data.variants.is_empty() {
                quote! { match *self {} }
            } else {
                quote! {
                    match self {
                        #(#arms)*
                    }
                }
            }
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Auditable cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::callaudit::Auditable for #name #ty_generics #where_clause {
            fn audit_value(&self) -> ::callaudit::AuditValue {
                #body
            }
        }
    })
}

/// Require `Auditable` on every type parameter
fn add_trait_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::callaudit::Auditable));
        }
    }
    generics
}

/// `.field(...)` calls for struct fields, in declaration order
fn field_calls<F>(fields: &Fields, access: F) -> Vec<TokenStream2>
where
    F: Fn(TokenStream2) -> TokenStream2,
{
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (label, member) = match &field.ident {
                Some(ident) => (ident.to_string(), quote! { #ident }),
                None => {
                    let index = syn::Index::from(index);
                    (index.index.to_string(), quote! { #index })
                }
            };
            let value = access(member);
            quote! { .field(#label, #value) }
        })
        .collect()
}

/// Destructuring pattern of an enum variant and the names it binds
fn variant_pattern(fields: &Fields) -> (TokenStream2, Vec<Ident>) {
    match fields {
        Fields::Named(named) => {
            let bindings: Vec<Ident> = named
                .named
                .iter()
                .filter_map(|field| field.ident.clone())
                .collect();
            (quote! { { #(#bindings),* } }, bindings)
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<Ident> = (0..unnamed.unnamed.len())
                .map(|index| format_ident!("__field{}", index))
                .collect();
            (quote! { ( #(#bindings),* ) }, bindings)
        }
        Fields::Unit => (quote! {}, Vec::new()),
    }
}

/// `.field(...)` calls for the bindings of an enum variant
fn field_calls_bound(fields: &Fields, bindings: &[Ident]) -> Vec<TokenStream2> {
    fields
        .iter()
        .zip(bindings)
        .enumerate()
        .map(|(index, (field, binding))| {
            let label = match &field.ident {
                Some(ident) => ident.to_string(),
                None => index.to_string(),
            };
            quote! { .field(#label, #binding) }
        })
        .collect()
}
