//! `#[audited]` attribute macro.
//!
//! Wraps functions so every call reports its entry, return and failure to an
//! audit engine.
//!
//! # Examples
//!
//! ```ignore
//! use callaudit::audited;
//!
//! // Type-level marker: every method is audited
//! #[audited]
//! impl Accounts {
//!     pub fn login(&self, user: &str, #[mask] password: &str) -> Result<Session, LoginError> {
//!         ...
//!     }
//!
//!     #[do_not_audit]
//!     pub fn health(&self) -> bool {
//!         true
//!     }
//! }
//!
//! // Method-level marker with an explicit engine and a masked return value
//! #[audited(engine = AUDIT.clone())]
//! #[mask_return("secret")]
//! fn issue_token(#[do_not_audit] request: &Request) -> Token {
//!     ...
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::{
    Attribute, Block, Expr, FnArg, ImplItem, Item, ItemImpl, LitStr, Meta, Pat, PatType,
    ReturnType, Signature, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Arguments for the `#[audited]` attribute.
struct AuditedArgs {
    /// Engine expression (`Arc<AuditEngine>` or `&'static AuditEngine`)
    engine: Option<Expr>,
}

impl Parse for AuditedArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut engine = None;

        if input.is_empty() {
            return Ok(Self { engine });
        }

        let items = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for item in items {
            match item {
                Meta::NameValue(nv) if nv.path.is_ident("engine") => {
                    engine = Some(nv.value);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected `engine = <expr>`",
                    ));
                }
            }
        }

        Ok(Self { engine })
    }
}

/// Where the positive marker sits
enum Selection {
    /// Marker on the impl block; owner name is `module::Type`
    Type(TokenStream2),
    /// Marker on the function itself
    Method,
}

/// Marker attached to a parameter
#[derive(Debug, PartialEq)]
enum ParamMarker {
    /// No marker
    Plain,
    /// `#[mask]` or `#[mask("field", ...)]`
    Mask(Vec<String>),
    /// `#[do_not_audit]`
    DoNotAudit,
}

/// Implementation of the `#[audited]` attribute macro.
pub fn audited_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AuditedArgs);
    let item = parse_macro_input!(item as Item);

    let expanded = match item {
        Item::Impl(item_impl) => expand_impl(&args, item_impl),
        Item::Fn(mut item_fn) => {
            expand_fn(
                &args,
                &Selection::Method,
                &mut item_fn.attrs,
                &mut item_fn.sig,
                &mut item_fn.block,
            )
            .map(|()| quote! { #item_fn })
        }
        other => Err(syn::Error::new_spanned(
            other,
            "#[audited] applies to functions and impl blocks",
        )),
    };

    expanded.unwrap_or_else(|e| e.to_compile_error()).into()
}

fn expand_impl(args: &AuditedArgs, mut item_impl: ItemImpl) -> syn::Result<TokenStream2> {
    let owner = owner_type_name(&item_impl.self_ty);
    let selection = Selection::Type(quote! { concat!(module_path!(), "::", #owner) });

    for impl_item in &mut item_impl.items {
        if let ImplItem::Fn(method) = impl_item {
            if take_attr(&mut method.attrs, "do_not_audit") {
                strip_param_markers(&mut method.sig);
                take_return_mask(&mut method.attrs)?;
                continue;
            }
            expand_fn(
                args,
                &selection,
                &mut method.attrs,
                &mut method.sig,
                &mut method.block,
            )?;
        }
    }

    Ok(quote! { #item_impl })
}

/// Rewrite one function in place: strip markers and wrap the body.
fn expand_fn(
    args: &AuditedArgs,
    selection: &Selection,
    attrs: &mut Vec<Attribute>,
    sig: &mut Signature,
    block: &mut Block,
) -> syn::Result<()> {
    if sig.constness.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.constness,
            "#[audited] cannot wrap a const fn",
        ));
    }

    let excluded = take_attr(attrs, "do_not_audit");
    let return_mask = take_return_mask(attrs)?;

    let has_receiver = sig.receiver().is_some();
    let method_name = sig.ident.to_string();

    let (owner, owner_marker, method_marker) = match selection {
        Selection::Type(owner) => (
            owner.clone(),
            quote! { .owner_annotation(::callaudit::Annotation::Audit) },
            quote! {},
        ),
        Selection::Method => {
            let owner = if has_receiver {
                quote! { ::std::any::type_name::<Self>() }
            } else {
                quote! { module_path!() }
            };
            (
                owner,
                quote! {},
                quote! { .annotation(::callaudit::Annotation::Audit) },
            )
        }
    };

    let exclusion_marker = if excluded {
        quote! { .annotation(::callaudit::Annotation::DoNotAudit) }
    } else {
        quote! {}
    };

    let mut params = Vec::new();
    let mut captures = Vec::new();
    for arg in sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };

        let marker = parse_param_marker(pat_type)?;
        pat_type.attrs.retain(|attr| !is_param_marker(attr));

        let (name, ident) = match pat_type.pat.as_ref() {
            Pat::Ident(pat_ident) => (
                pat_ident.ident.to_string(),
                Some(pat_ident.ident.clone()),
            ),
            other => (quote! { #other }.to_string(), None),
        };

        let meta = match &marker {
            ParamMarker::Plain => quote! { ::callaudit::ParamMeta::new(#name) },
            ParamMarker::Mask(fields) => {
                let mask = mask_tokens(fields);
                quote! { ::callaudit::ParamMeta::new(#name).mask(#mask) }
            }
            ParamMarker::DoNotAudit => {
                quote! { ::callaudit::ParamMeta::new(#name).do_not_audit() }
            }
        };
        params.push(quote! { .param(#meta) });

        captures.push(match (&marker, ident) {
            (ParamMarker::DoNotAudit, _) | (_, None) => quote! { ::std::option::Option::None },
            (_, Some(ident)) => quote! {
                ::std::option::Option::Some(&#ident as &dyn ::callaudit::Auditable)
            },
        });
    }

    let return_marker = match return_mask {
        Some(fields) => {
            let mask = mask_tokens(&fields);
            quote! { .mask_return(#mask) }
        }
        None => quote! {},
    };

    let engine = match &args.engine {
        Some(expr) => quote! {
            let __callaudit_engine = ::std::clone::Clone::clone(&(#expr));
            let __callaudit_engine: &::callaudit::AuditEngine = &*__callaudit_engine;
        },
        None => quote! {
            let __callaudit_engine: &::callaudit::AuditEngine = ::callaudit::global();
        },
    };

    let return_type = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) if contains_impl(ty) => quote! { _ },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    let returns_result = matches!(&sig.output, ReturnType::Type(_, ty) if is_result(ty));
    let report = if returns_result {
        quote! {
            match &__callaudit_ret {
                ::std::result::Result::Ok(__callaudit_value) => {
                    __callaudit_engine.on_return(&__callaudit_call, __callaudit_value);
                }
                ::std::result::Result::Err(__callaudit_error) => {
                    __callaudit_engine.on_error_with(&__callaudit_call, || {
                        ::callaudit::Failure::from_display(__callaudit_error)
                    });
                }
            }
        }
    } else {
        quote! {
            __callaudit_engine.on_return(&__callaudit_call, &__callaudit_ret);
        }
    };

    let body = &*block;
    let run = if sig.asyncness.is_some() {
        // Panics unwind through the future's poll; only values are reported.
        // No borrowed argument slots may live across the await.
        quote! {
            let __callaudit_ret = ::callaudit::__private::typed_future::<#return_type, _>(
                async move #body
            ).await;
            let __callaudit_call = ::callaudit::InterceptedCall::without_args(&__callaudit_sig);
            #report
            __callaudit_ret
        }
    } else {
        quote! {
            let __callaudit_call = ::callaudit::InterceptedCall::without_args(&__callaudit_sig);
            match ::callaudit::__private::catch_call::<#return_type, _>(move || #body) {
                ::std::result::Result::Ok(__callaudit_ret) => {
                    #report
                    __callaudit_ret
                }
                ::std::result::Result::Err(__callaudit_payload) => {
                    __callaudit_engine.on_error_with(&__callaudit_call, || {
                        ::callaudit::Failure::from_panic(&*__callaudit_payload)
                    });
                    ::std::panic::resume_unwind(__callaudit_payload)
                }
            }
        }
    };

    let wrapped: Block = syn::parse2(quote! {
        {
            #engine
            let __callaudit_sig = ::callaudit::MethodSignature::new(#owner, #method_name)
                #owner_marker
                #method_marker
                #exclusion_marker
                #(#params)*
                #return_marker;
            __callaudit_engine.on_entry(&::callaudit::InterceptedCall::new(
                &__callaudit_sig,
                ::std::vec![#(#captures),*],
            ));
            #run
        }
    })?;

    *block = wrapped;
    Ok(())
}

/// Name used for the owner of methods in an audited impl block
fn owner_type_name(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => segment.ident.to_string(),
            None => quote! { #ty }.to_string(),
        },
        Type::Group(group) => owner_type_name(&group.elem),
        Type::Paren(paren) => owner_type_name(&paren.elem),
        other => quote! { #other }.to_string(),
    }
}

/// Parse the audit marker of a function parameter; exclusion wins over masking
fn parse_param_marker(param: &PatType) -> syn::Result<ParamMarker> {
    if param.attrs.iter().any(|attr| attr.path().is_ident("do_not_audit")) {
        return Ok(ParamMarker::DoNotAudit);
    }
    match param.attrs.iter().find(|attr| attr.path().is_ident("mask")) {
        Some(attr) => Ok(ParamMarker::Mask(parse_fields(attr)?)),
        None => Ok(ParamMarker::Plain),
    }
}

fn is_param_marker(attr: &Attribute) -> bool {
    attr.path().is_ident("mask") || attr.path().is_ident("do_not_audit")
}

/// Remove parameter markers from a function left unwrapped
fn strip_param_markers(sig: &mut Signature) {
    for arg in sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = arg {
            pat_type.attrs.retain(|attr| !is_param_marker(attr));
        }
    }
}

/// Field list of `#[mask(...)]` / `#[mask_return(...)]`; empty for the bare form
fn parse_fields(attr: &Attribute) -> syn::Result<Vec<String>> {
    match &attr.meta {
        Meta::Path(_) => Ok(Vec::new()),
        Meta::List(_) => {
            let fields =
                attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
            Ok(fields.iter().map(LitStr::value).collect())
        }
        Meta::NameValue(nv) => Err(syn::Error::new_spanned(
            nv,
            "expected `#[mask]` or `#[mask(\"field\", ...)]`",
        )),
    }
}

/// Remove the first attribute with the given name; true if one was present
fn take_attr(attrs: &mut Vec<Attribute>, name: &str) -> bool {
    match attrs.iter().position(|attr| attr.path().is_ident(name)) {
        Some(index) => {
            attrs.remove(index);
            true
        }
        None => false,
    }
}

/// Remove `#[mask_return]` and return its field list
fn take_return_mask(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Vec<String>>> {
    match attrs.iter().position(|attr| attr.path().is_ident("mask_return")) {
        Some(index) => {
            let attr = attrs.remove(index);
            parse_fields(&attr).map(Some)
        }
        None => Ok(None),
    }
}

fn mask_tokens(fields: &[String]) -> TokenStream2 {
    if fields.is_empty() {
        quote! { ::callaudit::Mask::new() }
    } else {
        quote! { ::callaudit::Mask::fields([#(#fields),*]) }
    }
}

/// Whether a return type is a `Result` (including aliases like `io::Result<T>`)
fn is_result(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        Type::Group(group) => is_result(&group.elem),
        Type::Paren(paren) => is_result(&paren.elem),
        _ => false,
    }
}

/// Whether a type mentions `impl Trait`, which cannot be named in a turbofish
fn contains_impl(ty: &Type) -> bool {
    fn scan(tokens: TokenStream2) -> bool {
        tokens.into_iter().any(|token| match token {
            TokenTree::Ident(ident) => ident == "impl",
            TokenTree::Group(group) => scan(group.stream()),
            _ => false,
        })
    }
    scan(quote! { #ty })
}
