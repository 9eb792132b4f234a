//! Process-wide audit engine used by `#[audited]` code

use crate::{AuditEngine, AuditError};
use once_cell::sync::{Lazy, OnceCell};

static INSTALLED: OnceCell<AuditEngine> = OnceCell::new();

static DISABLED: Lazy<AuditEngine> = Lazy::new(AuditEngine::disabled);

/// Install the process-wide engine.
///
/// Succeeds once; later calls return [`AuditError::AlreadyInstalled`] and
/// drop the given engine.
///
/// # Examples
///
/// ```no_run
/// use callaudit_core::*;
///
/// install(AuditEngine::builder().sink(ConsoleSink::default()).build())?;
/// # Ok::<(), AuditError>(())
/// ```
pub fn install(engine: AuditEngine) -> Result<(), AuditError> {
    INSTALLED
        .set(engine)
        .map_err(|_| AuditError::AlreadyInstalled)?;
    tracing::debug!(target: "callaudit::fallback", "Installed global audit engine");
    Ok(())
}

/// The process-wide engine, or a disabled one if none was installed
pub fn global() -> &'static AuditEngine {
    INSTALLED.get().unwrap_or(&DISABLED)
}

/// Whether a process-wide engine was installed
pub fn is_installed() -> bool {
    INSTALLED.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Annotation, InterceptedCall, MemorySink, MethodSignature};

    #[test]
    fn test_install_once() {
        let sink = MemorySink::new();
        let first = install(AuditEngine::builder().sink(sink.clone()).build());
        let second = install(AuditEngine::disabled());

        assert!(first.is_ok());
        assert!(matches!(second, Err(AuditError::AlreadyInstalled)));
        assert!(is_installed());
        assert!(global().is_enabled());

        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);
        global().on_entry(&InterceptedCall::without_args(&signature));
        assert_eq!(sink.lines(), vec!["Entering >>> T.m Arguments: { }"]);
    }
}
