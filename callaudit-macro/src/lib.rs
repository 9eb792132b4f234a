// Procedural macros for callaudit
// These macros weave entry/return/error audit hooks around ordinary functions

use proc_macro::TokenStream;

mod audited_attr;
mod auditable_derive;

/// Audits calls to a function, or to every method of an impl block.
///
/// On an `impl` block the marker applies to the type: every method is
/// wrapped except those marked `#[do_not_audit]`. On a function or single
/// method it applies to that method only.
///
/// Parameter markers: `#[mask]`, `#[mask("field", ...)]`, `#[do_not_audit]`.
/// Return marker (placed after `#[audited]`): `#[mask_return]`,
/// `#[mask_return("field", ...)]`.
///
/// `#[audited(engine = expr)]` reports to the given engine (an
/// `Arc<AuditEngine>` or `&'static AuditEngine`) instead of the global one.
///
/// # Examples
///
/// ```ignore
/// use callaudit::audited;
///
/// #[audited]
/// impl Accounts {
///     pub fn login(&self, user: &str, #[mask] password: &str) -> Result<Session, LoginError> {
///         self.authenticate(user, password)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn audited(attr: TokenStream, item: TokenStream) -> TokenStream {
    audited_attr::audited_impl(attr, item)
}

/// Derives `Auditable`, describing a struct or enum field by field.
///
/// Structs render as `Type[field=value, ...]`, enum variants as
/// `Type::Variant[...]`. Every field must itself be `Auditable`.
#[proc_macro_derive(Auditable)]
pub fn auditable_derive(input: TokenStream) -> TokenStream {
    auditable_derive::auditable_derive_impl(input)
}
