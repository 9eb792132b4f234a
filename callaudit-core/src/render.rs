//! Rendering audited values into log-safe strings, with masking

use crate::AuditValue;
use std::collections::BTreeSet;

/// Placeholder written in place of a masked primitive value
pub const MASKED_PLACEHOLDER: &str = "**********";

/// Placeholder written when describing or rendering a value failed
pub const UNRENDERABLE_PLACEHOLDER: &str = "<unrenderable>";

/// Mask marker attached to a parameter or to a declared return type.
///
/// The field list names the fields dropped from a composite dump. It has no
/// effect on primitives, which are always replaced by [`MASKED_PLACEHOLDER`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    /// Field names excluded from the dump
    pub fields: BTreeSet<String>,
}

impl Mask {
    /// Mask without a field list
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask that drops the named fields
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a field to drop
    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into());
        self
    }

    /// Whether a field is dropped by this mask
    pub fn excludes(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}

/// How a value should be rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderPolicy {
    /// No mask marker present
    #[default]
    Unmasked,
    /// Mask marker present
    Masked(Mask),
}

impl RenderPolicy {
    /// Policy for an optional mask marker
    pub fn from_mask(mask: Option<&Mask>) -> Self {
        match mask {
            Some(mask) => RenderPolicy::Masked(mask.clone()),
            None => RenderPolicy::Unmasked,
        }
    }
}

/// The concrete rendering a value receives under a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Full field dump
    Reflective,
    /// Natural string form of a primitive
    AsIs,
    /// Fixed masked placeholder
    Placeholder,
    /// Field dump with the masked fields removed
    ReflectiveElided,
}

/// Decide how a value is rendered under a policy.
///
/// Masking a primitive always collapses to the placeholder, whatever the
/// field list says.
pub fn classify(value: &AuditValue, policy: &RenderPolicy) -> RenderMode {
    match (policy, value.is_primitive()) {
        (RenderPolicy::Unmasked, true) => RenderMode::AsIs,
        (RenderPolicy::Unmasked, false) => RenderMode::Reflective,
        (RenderPolicy::Masked(_), true) => RenderMode::Placeholder,
        (RenderPolicy::Masked(_), false) => RenderMode::ReflectiveElided,
    }
}

/// Render a value under a policy
///
/// # Examples
///
/// ```
/// use callaudit_core::*;
///
/// let policy = RenderPolicy::Masked(Mask::new());
/// assert_eq!(render(&"secret".audit_value(), &policy), "**********");
/// assert_eq!(render(&42.audit_value(), &RenderPolicy::Unmasked), "42");
/// ```
pub fn render(value: &AuditValue, policy: &RenderPolicy) -> String {
    let mut out = String::new();
    write_value(&mut out, value, policy);
    out
}

fn write_value(out: &mut String, value: &AuditValue, policy: &RenderPolicy) {
    match (classify(value, policy), value) {
        (RenderMode::Placeholder, _) => out.push_str(MASKED_PLACEHOLDER),
        (RenderMode::AsIs, AuditValue::Primitive(text)) => out.push_str(text),
        (RenderMode::AsIs, _) => out.push_str("null"),
        (_, AuditValue::Sequence(items)) => {
            // A mask on a collection applies to every element
            out.push('{');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, policy);
            }
            out.push('}');
        }
        (mode, AuditValue::Composite { type_name, fields }) => {
            out.push_str(type_name);
            out.push('[');
            let mut first = true;
            for (name, field) in fields {
                if mode == RenderMode::ReflectiveElided
                    && let RenderPolicy::Masked(mask) = policy
                    && mask.excludes(name)
                {
                    continue;
                }
                if !first {
                    out.push_str(", ");
                }
                first = false;
                out.push_str(name);
                out.push('=');
                write_value(out, field, &RenderPolicy::Unmasked);
            }
            out.push(']');
        }
        // classify only yields the reflective modes for sequences and composites
        (_, AuditValue::Null | AuditValue::Primitive(_)) => out.push_str(UNRENDERABLE_PLACEHOLDER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Auditable;

    fn user() -> AuditValue {
        AuditValue::composite("User")
            .field("name", "alice")
            .field("password", "secret123")
            .field("age", &30)
            .build()
    }

    #[test]
    fn test_unmasked_primitives() {
        assert_eq!(render(&42.audit_value(), &RenderPolicy::Unmasked), "42");
        assert_eq!(render(&"abc".audit_value(), &RenderPolicy::Unmasked), "abc");
        assert_eq!(render(&AuditValue::Null, &RenderPolicy::Unmasked), "null");
    }

    #[test]
    fn test_masked_primitives_use_placeholder() {
        let masks = [Mask::new(), Mask::fields(["length", "chars"])];
        let values = [
            "secret".audit_value(),
            7i64.audit_value(),
            true.audit_value(),
            AuditValue::Null,
        ];

        for mask in &masks {
            for value in &values {
                let rendered = render(value, &RenderPolicy::Masked(mask.clone()));
                assert_eq!(rendered, MASKED_PLACEHOLDER);
                assert_eq!(rendered.len(), 10);
            }
        }
    }

    #[test]
    fn test_unmasked_composite_dump() {
        assert_eq!(
            render(&user(), &RenderPolicy::Unmasked),
            "User[name=alice, password=secret123, age=30]"
        );
    }

    #[test]
    fn test_masked_composite_removes_fields() {
        let policy = RenderPolicy::Masked(Mask::fields(["password"]));
        let rendered = render(&user(), &policy);

        assert_eq!(rendered, "User[name=alice, age=30]");
        assert!(!rendered.contains("password"));
        assert!(!rendered.contains(MASKED_PLACEHOLDER));
    }

    #[test]
    fn test_masked_composite_all_fields() {
        let policy = RenderPolicy::Masked(Mask::fields(["name", "password", "age"]));
        assert_eq!(render(&user(), &policy), "User[]");
    }

    #[test]
    fn test_masked_composite_without_field_list() {
        let policy = RenderPolicy::Masked(Mask::new());
        assert_eq!(
            render(&user(), &policy),
            "User[name=alice, password=secret123, age=30]"
        );
    }

    #[test]
    fn test_nested_composite_rendered_unmasked() {
        let value = AuditValue::composite("Order")
            .field_value("owner", user())
            .field("id", &9)
            .build();
        let policy = RenderPolicy::Masked(Mask::fields(["id"]));

        assert_eq!(
            render(&value, &policy),
            "Order[owner=User[name=alice, password=secret123, age=30]]"
        );
    }

    #[test]
    fn test_sequences() {
        let values = vec!["a", "b"].audit_value();
        assert_eq!(render(&values, &RenderPolicy::Unmasked), "{a, b}");
        assert_eq!(
            render(&values, &RenderPolicy::Masked(Mask::new())),
            "{**********, **********}"
        );

        let users = AuditValue::Sequence(vec![user(), user()]);
        let rendered = render(&users, &RenderPolicy::Masked(Mask::fields(["password"])));
        assert_eq!(
            rendered,
            "{User[name=alice, age=30], User[name=alice, age=30]}"
        );
    }

    #[test]
    fn test_classify() {
        let masked = RenderPolicy::Masked(Mask::new());
        assert_eq!(classify(&1.audit_value(), &RenderPolicy::Unmasked), RenderMode::AsIs);
        assert_eq!(classify(&user(), &RenderPolicy::Unmasked), RenderMode::Reflective);
        assert_eq!(classify(&AuditValue::Null, &masked), RenderMode::Placeholder);
        assert_eq!(classify(&user(), &masked), RenderMode::ReflectiveElided);
    }

    #[test]
    fn test_render_is_idempotent() {
        let policy = RenderPolicy::Masked(Mask::fields(["age"]));
        assert_eq!(render(&user(), &policy), render(&user(), &policy));
    }
}
