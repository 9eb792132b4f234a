//! Deciding whether a call is audited

use crate::{Annotation, CallDescriptor};

/// Audit decision for an intercepted call.
///
/// Evaluated independently for every phase; implementations must be cheap
/// and free of side effects.
pub trait AuditPolicy: Send + Sync {
    /// Whether this call produces audit lines
    fn should_audit(&self, descriptor: &CallDescriptor<'_>) -> bool;
}

/// Marker-driven policy.
///
/// A call is audited when the method or its owner type carries the positive
/// marker and the method does not carry the exclusion marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerPolicy;

impl AuditPolicy for MarkerPolicy {
    fn should_audit(&self, descriptor: &CallDescriptor<'_>) -> bool {
        let selected =
            descriptor.method_has(&Annotation::Audit) || descriptor.owner_has(&Annotation::Audit);
        selected && !descriptor.method_has(&Annotation::DoNotAudit)
    }
}

/// Policy that audits every call it is shown, ignoring markers.
///
/// Useful when the interception runtime already did the selection, such as
/// an explicit decorator wrapped around a closure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditAll;

impl AuditPolicy for AuditAll {
    fn should_audit(&self, descriptor: &CallDescriptor<'_>) -> bool {
        !descriptor.method_has(&Annotation::DoNotAudit)
    }
}

impl<F> AuditPolicy for F
where
    F: Fn(&CallDescriptor<'_>) -> bool + Send + Sync,
{
    fn should_audit(&self, descriptor: &CallDescriptor<'_>) -> bool {
        self(descriptor)
    }
}
