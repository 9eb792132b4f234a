// callaudit - Decorator-style method call auditing for Rust
//
// Audited calls log their arguments on entry, then either their result or
// their failure, with masking, exclusion and pluggable context tags.

// Re-export core functionality
pub use callaudit_core::*;

// Re-export procedural macros
pub use callaudit_macro::{Auditable, audited};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AuditConfig,
        AuditEngine,
        AuditSink,
        Auditable,
        ContextTagProvider,
        Failure,
        // Sinks
        FileSink,
        MemorySink,
        TracingSink,
        audited,
        global,
        install,
    };
}
