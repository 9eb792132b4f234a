//! Uniform view of an intercepted call
//!
//! The interception runtime hands the engine an [`InterceptedCall`]: the
//! static [`MethodSignature`] with its markers, plus the argument values of
//! this particular invocation. [`CallDescriptor::adapt`] pairs the two
//! positionally into the shape the rest of the engine works with.

use crate::{Auditable, Mask};
use std::borrow::Cow;

/// Marker attached to a type, method, parameter or return type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Positive "audit this" marker (method or type)
    Audit,
    /// Negative marker (method or parameter)
    DoNotAudit,
    /// Mask marker (parameter or return type)
    Mask(Mask),
}

/// Declared parameter of an audited method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMeta {
    /// Parameter name
    pub name: Cow<'static, str>,
    /// Markers attached to this parameter position
    pub annotations: Vec<Annotation>,
}

impl ParamMeta {
    /// Create a parameter without markers
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Attach a marker
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Attach a mask marker
    pub fn mask(self, mask: Mask) -> Self {
        self.annotation(Annotation::Mask(mask))
    }

    /// Attach the exclusion marker
    pub fn do_not_audit(self) -> Self {
        self.annotation(Annotation::DoNotAudit)
    }
}

/// Static metadata of an audited method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Name of the type the method belongs to
    pub owner_type_name: Cow<'static, str>,
    /// Method name
    pub method_name: Cow<'static, str>,
    /// Markers on the owner type
    pub owner_annotations: Vec<Annotation>,
    /// Markers on the method itself
    pub annotations: Vec<Annotation>,
    /// Declared parameters, in order
    pub params: Vec<ParamMeta>,
    /// Markers on the declared return type
    pub return_annotations: Vec<Annotation>,
}

impl MethodSignature {
    /// Create a signature without markers or parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::*;
    ///
    /// let signature = MethodSignature::new("accounts::Service", "login")
    ///     .owner_annotation(Annotation::Audit)
    ///     .param(ParamMeta::new("user"))
    ///     .param(ParamMeta::new("password").mask(Mask::new()));
    ///
    /// assert_eq!(signature.qualified_name(), "accounts::Service.login");
    /// ```
    pub fn new(
        owner_type_name: impl Into<Cow<'static, str>>,
        method_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            owner_type_name: owner_type_name.into(),
            method_name: method_name.into(),
            owner_annotations: Vec::new(),
            annotations: Vec::new(),
            params: Vec::new(),
            return_annotations: Vec::new(),
        }
    }

    /// Attach a marker to the owner type
    pub fn owner_annotation(mut self, annotation: Annotation) -> Self {
        self.owner_annotations.push(annotation);
        self
    }

    /// Attach a marker to the method
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Append a declared parameter
    pub fn param(mut self, param: ParamMeta) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a mask marker to the declared return type
    pub fn mask_return(mut self, mask: Mask) -> Self {
        self.return_annotations.push(Annotation::Mask(mask));
        self
    }

    /// `<owner>.<method>`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner_type_name, self.method_name)
    }
}

/// A single invocation as seen by the interception runtime
pub struct InterceptedCall<'a> {
    signature: &'a MethodSignature,
    args: Vec<Option<&'a dyn Auditable>>,
}

impl<'a> InterceptedCall<'a> {
    /// Pair a signature with the argument values of one invocation.
    ///
    /// `None` marks an argument the runtime did not capture. Arguments may be
    /// omitted entirely for the return and error phases.
    pub fn new(signature: &'a MethodSignature, args: Vec<Option<&'a dyn Auditable>>) -> Self {
        Self { signature, args }
    }

    /// Call without captured argument values
    pub fn without_args(signature: &'a MethodSignature) -> Self {
        Self::new(signature, Vec::new())
    }

    /// Static metadata of the called method
    pub fn signature(&self) -> &'a MethodSignature {
        self.signature
    }
}

/// One parameter of an adapted call
pub struct ParamSpec<'a> {
    /// Parameter name
    pub name: &'a str,
    /// Argument value, if captured
    pub value: Option<&'a dyn Auditable>,
    /// Whether the parameter carries the exclusion marker
    pub is_excluded: bool,
    /// Mask marker, if present
    pub mask: Option<&'a Mask>,
}

/// Return channel of an adapted call
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnSpec<'a> {
    /// Mask marker on the declared return type
    pub mask: Option<&'a Mask>,
}

impl ReturnSpec<'_> {
    /// Whether the declared return type carries a mask marker
    pub fn is_present(&self) -> bool {
        self.mask.is_some()
    }
}

/// Uniform view of an intercepted call, built fresh for every phase
pub struct CallDescriptor<'a> {
    /// Name of the owner type
    pub owner_type_name: &'a str,
    /// Method name
    pub method_name: &'a str,
    /// Markers on the owner type
    pub owner_annotations: &'a [Annotation],
    /// Markers on the method
    pub method_annotations: &'a [Annotation],
    /// Parameters paired with their arguments
    pub parameters: Vec<ParamSpec<'a>>,
    /// Return channel
    pub return_spec: ReturnSpec<'a>,
}

impl<'a> CallDescriptor<'a> {
    /// Adapt an intercepted call.
    pub fn adapt(call: &InterceptedCall<'a>) -> Self {
        let signature = call.signature;

        let parameters = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let (is_excluded, mask) = scan_param(&param.annotations);
                ParamSpec {
                    name: &param.name,
                    value: call.args.get(i).copied().flatten(),
                    is_excluded,
                    mask,
                }
            })
            .collect();

        Self {
            owner_type_name: &signature.owner_type_name,
            method_name: &signature.method_name,
            owner_annotations: &signature.owner_annotations,
            method_annotations: &signature.annotations,
            parameters,
            return_spec: ReturnSpec {
                mask: find_mask(&signature.return_annotations),
            },
        }
    }

    /// `<owner>.<method>`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner_type_name, self.method_name)
    }

    /// Whether the method itself carries the given marker
    pub fn method_has(&self, annotation: &Annotation) -> bool {
        self.method_annotations.contains(annotation)
    }

    /// Whether the owner type carries the given marker
    pub fn owner_has(&self, annotation: &Annotation) -> bool {
        self.owner_annotations.contains(annotation)
    }
}

/// Exclusion anywhere in the list wins; otherwise the first mask applies.
fn scan_param(annotations: &[Annotation]) -> (bool, Option<&Mask>) {
    if annotations.contains(&Annotation::DoNotAudit) {
        return (true, None);
    }
    (false, find_mask(annotations))
}

fn find_mask(annotations: &[Annotation]) -> Option<&Mask> {
    annotations.iter().find_map(|annotation| match annotation {
        Annotation::Mask(mask) => Some(mask),
        _ => None,
    })
}
