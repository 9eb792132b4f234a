//! Describing values for audit rendering
//!
//! Anything passed to or returned from an audited call is turned into an
//! [`AuditValue`] through the [`Auditable`] trait. The renderer never looks at
//! the original value, only at this description, so masking by field name works
//! the same way for hand-written and derived implementations.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

/// Description of a single audited value.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditValue {
    /// Absent value (`None`, `()`)
    Null,

    /// Value from the closed primitive set, already in its string form
    Primitive(String),

    /// Value with named fields, in declaration order
    Composite {
        /// Type name shown in front of the field list
        type_name: Cow<'static, str>,
        /// Field name and value pairs
        fields: Vec<(Cow<'static, str>, AuditValue)>,
    },

    /// Ordered collection of values
    Sequence(Vec<AuditValue>),
}

impl AuditValue {
    /// Describe a primitive value through its `Display` form.
    pub fn primitive(value: impl Display) -> Self {
        AuditValue::Primitive(value.to_string())
    }

    /// Start describing a composite value.
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::*;
    ///
    /// let value = AuditValue::composite("Credentials")
    ///     .field("user", "alice")
    ///     .field("password", "hunter2")
    ///     .build();
    ///
    /// assert_eq!(
    ///     render(&value, &RenderPolicy::Masked(Mask::fields(["password"]))),
    ///     "Credentials[user=alice]"
    /// );
    /// ```
    pub fn composite(type_name: impl Into<Cow<'static, str>>) -> CompositeBuilder {
        CompositeBuilder {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Whether this value is classified as primitive.
    ///
    /// Null counts as primitive: it has no fields to enumerate.
    pub fn is_primitive(&self) -> bool {
        matches!(self, AuditValue::Null | AuditValue::Primitive(_))
    }
}

/// Builder for [`AuditValue::Composite`].
#[derive(Debug, Clone)]
pub struct CompositeBuilder {
    type_name: Cow<'static, str>,
    fields: Vec<(Cow<'static, str>, AuditValue)>,
}

impl CompositeBuilder {
    /// Add a field described through its [`Auditable`] implementation.
    pub fn field<T>(self, name: impl Into<Cow<'static, str>>, value: &T) -> Self
    where
        T: Auditable + ?Sized,
    {
        self.field_value(name, value.audit_value())
    }

    /// Add a field with an already built description.
    pub fn field_value(mut self, name: impl Into<Cow<'static, str>>, value: AuditValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Finish the composite.
    pub fn build(self) -> AuditValue {
        AuditValue::Composite {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

/// Describe-fields capability for audited values.
///
/// Implemented here for the primitive set, common containers and smart
/// pointers. Application types usually get it from `#[derive(Auditable)]`.
pub trait Auditable {
    /// Describe this value.
    fn audit_value(&self) -> AuditValue;
}

macro_rules! primitive_auditable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Auditable for $ty {
                fn audit_value(&self) -> AuditValue {
                    AuditValue::primitive(self)
                }
            }
        )*
    };
}

primitive_auditable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String,
);

impl Auditable for Cow<'_, str> {
    fn audit_value(&self) -> AuditValue {
        AuditValue::primitive(self)
    }
}

impl Auditable for () {
    fn audit_value(&self) -> AuditValue {
        AuditValue::Null
    }
}

impl Auditable for AuditValue {
    fn audit_value(&self) -> AuditValue {
        self.clone()
    }
}

impl<T: Auditable> Auditable for Option<T> {
    fn audit_value(&self) -> AuditValue {
        match self {
            Some(value) => value.audit_value(),
            None => AuditValue::Null,
        }
    }
}

impl<T: Auditable + ?Sized> Auditable for &T {
    fn audit_value(&self) -> AuditValue {
        (**self).audit_value()
    }
}

impl<T: Auditable + ?Sized> Auditable for &mut T {
    fn audit_value(&self) -> AuditValue {
        (**self).audit_value()
    }
}

impl<T: Auditable + ?Sized> Auditable for Box<T> {
    fn audit_value(&self) -> AuditValue {
        (**self).audit_value()
    }
}

impl<T: Auditable + ?Sized> Auditable for Rc<T> {
    fn audit_value(&self) -> AuditValue {
        (**self).audit_value()
    }
}

impl<T: Auditable + ?Sized> Auditable for Arc<T> {
    fn audit_value(&self) -> AuditValue {
        (**self).audit_value()
    }
}

impl<T: Auditable> Auditable for [T] {
    fn audit_value(&self) -> AuditValue {
        AuditValue::Sequence(self.iter().map(Auditable::audit_value).collect())
    }
}

impl<T: Auditable, const N: usize> Auditable for [T; N] {
    fn audit_value(&self) -> AuditValue {
        self.as_slice().audit_value()
    }
}

impl<T: Auditable> Auditable for Vec<T> {
    fn audit_value(&self) -> AuditValue {
        self.as_slice().audit_value()
    }
}

impl<T: Auditable> Auditable for VecDeque<T> {
    fn audit_value(&self) -> AuditValue {
        AuditValue::Sequence(self.iter().map(Auditable::audit_value).collect())
    }
}

impl<T: Auditable> Auditable for BTreeSet<T> {
    fn audit_value(&self) -> AuditValue {
        AuditValue::Sequence(self.iter().map(Auditable::audit_value).collect())
    }
}

impl<K: Display, V: Auditable> Auditable for BTreeMap<K, V> {
    fn audit_value(&self) -> AuditValue {
        AuditValue::Composite {
            type_name: Cow::Borrowed("BTreeMap"),
            fields: self
                .iter()
                .map(|(key, value)| (Cow::Owned(key.to_string()), value.audit_value()))
                .collect(),
        }
    }
}

impl<K: Display, V: Auditable, S> Auditable for HashMap<K, V, S> {
    fn audit_value(&self) -> AuditValue {
        // Iteration order of a hash map is arbitrary; sort so the line is stable
        let mut fields: Vec<(Cow<'static, str>, AuditValue)> = self
            .iter()
            .map(|(key, value)| (Cow::Owned(key.to_string()), value.audit_value()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        AuditValue::Composite {
            type_name: Cow::Borrowed("HashMap"),
            fields,
        }
    }
}
