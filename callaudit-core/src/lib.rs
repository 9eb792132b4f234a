//! Method-call audit logging
//!
//! This crate provides the engine behind call auditing: every audited call
//! produces an entry line with its arguments, then either a return line with
//! its result or an error line with the failure and its stack.
//!
//! # Features
//!
//! - **Audit Lines** - Fixed entry, return and error line formats
//! - **Masking** - Placeholders for primitives, field elision for composites
//! - **Exclusion** - Whole methods or single parameters
//! - **Context Tags** - Pluggable providers prefixed to every line
//! - **Multiple Sinks** - tracing, log, console, file, memory, fan-out
//! - **Failure Isolation** - The audited call never sees an audit failure
//!
//! # Quick Start
//!
//! ```
//! use callaudit_core::*;
//!
//! let sink = MemorySink::new();
//! let engine = AuditEngine::builder()
//!     .tag_provider(StaticTag::new("req-7"))
//!     .sink(sink.clone())
//!     .build();
//!
//! let signature = MethodSignature::new("accounts::Service", "login")
//!     .owner_annotation(Annotation::Audit)
//!     .param(ParamMeta::new("user"))
//!     .param(ParamMeta::new("password").mask(Mask::new()));
//!
//! let (user, password) = ("alice", "hunter2");
//! engine.on_entry(&InterceptedCall::new(
//!     &signature,
//!     vec![Some(&user as &dyn Auditable), Some(&password as &dyn Auditable)],
//! ));
//!
//! assert_eq!(
//!     sink.lines()[0],
//!     "[ req-7 ] Entering >>> accounts::Service.login Arguments: { user=alice password=********** }"
//! );
//! ```

pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod event;
pub mod failure;
pub mod global;
pub mod policy;
pub mod render;
pub mod sink;
pub mod tags;
pub mod value;

pub use config::*;
pub use descriptor::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use failure::*;
pub use global::*;
pub use policy::*;
pub use render::*;
pub use sink::*;
pub use tags::*;
pub use value::*;

/// Support items for `#[audited]` expansions; not public API.
#[doc(hidden)]
pub mod __private {
    use std::future::Future;
    use std::panic::{self, AssertUnwindSafe};

    /// Run an audited body, fixing its return type from the declared one.
    pub fn catch_call<R, F>(body: F) -> std::thread::Result<R>
    where
        F: FnOnce() -> R,
    {
        panic::catch_unwind(AssertUnwindSafe(body))
    }

    /// Fix the output type of an audited async body from the declared one.
    pub fn typed_future<T, F>(body: F) -> F
    where
        F: Future<Output = T>,
    {
        body
    }
}
