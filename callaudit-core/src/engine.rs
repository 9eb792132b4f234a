//! Audit engine

use crate::failure::panic_message;
use crate::{
    AuditConfig, AuditPolicy, AuditSink, AuditValue, Auditable, CallDescriptor, ConfigError,
    ConsoleSink, ContextTagProvider, FacadeSink, Failure, FileSink, InterceptedCall, LogEvent,
    MarkerPolicy, Mask, MethodSignature, Phase, RenderPolicy, Severity, SinkKind, TracingSink,
    UNRENDERABLE_PLACEHOLDER, collect_tags, render,
};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// `tracing` target of the engine's own failures
pub const FALLBACK_TARGET: &str = "callaudit::fallback";

/// Audit engine
///
/// Turns the entry, return and error phases of intercepted calls into audit
/// lines. Providers, sinks and policy are fixed once built, so one engine
/// can be shared by any number of threads.
///
/// No hook ever fails the audited call: rendering panics degrade to a
/// placeholder, and hook panics or sink errors are recorded on
/// [`FALLBACK_TARGET`] and dropped.
pub struct AuditEngine {
    tag_providers: Vec<Arc<dyn ContextTagProvider>>,
    sink: Arc<dyn AuditSink>,
    error_sink: Option<Arc<dyn AuditSink>>,
    policy: Arc<dyn AuditPolicy>,
    application_name: Option<String>,
    enabled: bool,
}

impl AuditEngine {
    /// Create a new audit engine builder
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::*;
    ///
    /// let sink = MemorySink::new();
    /// let engine = AuditEngine::builder()
    ///     .tag_provider(StaticTag::new("First"))
    ///     .sink(sink.clone())
    ///     .build();
    ///
    /// let signature = MethodSignature::new("app::Greeter", "greet")
    ///     .annotation(Annotation::Audit)
    ///     .param(ParamMeta::new("name"));
    /// let name = "alice";
    /// engine.on_entry(&InterceptedCall::new(&signature, vec![Some(&name)]));
    ///
    /// assert_eq!(
    ///     sink.lines(),
    ///     vec!["[ First ] Entering >>> app::Greeter.greet Arguments: { name=alice }"]
    /// );
    /// ```
    pub fn builder() -> AuditEngineBuilder {
        AuditEngineBuilder::new()
    }

    /// Build an engine and its sinks from configuration
    pub fn from_config(config: &AuditConfig) -> crate::Result<Self> {
        let builder = Self::builder().config(config.clone());

        let builder = match config.sink {
            SinkKind::Tracing => builder.sink(TracingSink::new()),
            SinkKind::Log => builder.sink(FacadeSink::with_targets(
                config.info_target.clone(),
                config.error_target.clone(),
            )),
            SinkKind::Console => builder.sink(ConsoleSink::new(config.console_format)),
            SinkKind::File => {
                let path = config.file.clone().ok_or_else(|| ConfigError::InvalidValue {
                    key: "file".to_string(),
                    value: "a file sink needs a path".to_string(),
                })?;
                builder.sink(FileSink::new(path))
            }
        };

        let builder = match &config.error_file {
            Some(path) => builder.error_sink(FileSink::new(path.clone())),
            None => builder,
        };

        Ok(builder.build())
    }

    /// Build an engine from `CALLAUDIT_*` environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_config(&AuditConfig::from_env()?)
    }

    /// An engine that never emits anything
    pub fn disabled() -> Self {
        Self::builder().enabled(false).build()
    }

    /// Check if the engine is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Entry phase: `Entering >>> <name> Arguments: { p=v ... }`
    ///
    /// Excluded parameters contribute an empty slot, leaving a doubled
    /// separator in the block.
    pub fn on_entry(&self, call: &InterceptedCall<'_>) {
        self.hook(Phase::Entry, call, |descriptor| {
            let mut block = String::from("Arguments: { ");
            for param in &descriptor.parameters {
                if !param.is_excluded {
                    block.push_str(param.name);
                    block.push('=');
                    block.push_str(&self.render_value(param.value, param.mask));
                }
                block.push(' ');
            }
            block.push('}');
            block
        });
    }

    /// Return phase: `Exiting <<< <name> Returned: <value>`
    ///
    /// The value is masked by the declared return marker, if any.
    pub fn on_return(&self, call: &InterceptedCall<'_>, value: &dyn Auditable) {
        self.hook(Phase::Return, call, |descriptor| {
            format!(
                "Returned: {}",
                self.render_value(Some(value), descriptor.return_spec.mask)
            )
        });
    }

    /// Error phase: `Exiting <<< <name> Exception: <type> Message: <message>`
    /// followed by one indented line per frame.
    pub fn on_error(&self, call: &InterceptedCall<'_>, failure: &Failure) {
        self.hook(Phase::Error, call, |_| error_block(failure));
    }

    /// Error phase with a lazily built failure.
    ///
    /// `failure` only runs when the call is audited, so stack capture is
    /// skipped for calls that produce no lines.
    pub fn on_error_with<F>(&self, call: &InterceptedCall<'_>, failure: F)
    where
        F: FnOnce() -> Failure,
    {
        self.hook(Phase::Error, call, |_| error_block(&failure()));
    }

    /// Run `f` as an audited call.
    ///
    /// A panic inside `f` is logged as a failure and resumed unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::*;
    ///
    /// let sink = MemorySink::new();
    /// let engine = AuditEngine::builder()
    ///     .policy(AuditAll)
    ///     .sink(sink.clone())
    ///     .build();
    ///
    /// let signature = MethodSignature::new("app", "add")
    ///     .param(ParamMeta::new("a"))
    ///     .param(ParamMeta::new("b"));
    /// let (a, b) = (2, 3);
    /// let sum = engine.invoke(&signature, vec![Some(&a), Some(&b)], || a + b);
    ///
    /// assert_eq!(sum, 5);
    /// assert_eq!(sink.lines()[1], "Exiting <<< app.add Returned: 5");
    /// ```
    pub fn invoke<R, F>(
        &self,
        signature: &MethodSignature,
        args: Vec<Option<&dyn Auditable>>,
        f: F,
    ) -> R
    where
        F: FnOnce() -> R,
        R: Auditable,
    {
        self.on_entry(&InterceptedCall::new(signature, args));

        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                self.on_return(&InterceptedCall::without_args(signature), &value);
                value
            }
            Err(payload) => {
                self.on_error_with(&InterceptedCall::without_args(signature), || {
                    Failure::from_panic(&*payload)
                });
                panic::resume_unwind(payload)
            }
        }
    }

    /// Run a fallible `f` as an audited call.
    ///
    /// `Ok` values are logged as returns, `Err` values as failures; either is
    /// handed back unchanged. Panics are logged and resumed.
    pub fn invoke_result<T, E, F>(
        &self,
        signature: &MethodSignature,
        args: Vec<Option<&dyn Auditable>>,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        T: Auditable,
        E: fmt::Display,
    {
        self.on_entry(&InterceptedCall::new(signature, args));

        let call = InterceptedCall::without_args(signature);
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => {
                self.on_return(&call, &value);
                Ok(value)
            }
            Ok(Err(error)) => {
                self.on_error_with(&call, || Failure::from_display(&error));
                Err(error)
            }
            Err(payload) => {
                self.on_error_with(&call, || Failure::from_panic(&*payload));
                panic::resume_unwind(payload)
            }
        }
    }

    /// Flush every sink
    pub fn flush(&self) -> crate::Result<()> {
        self.sink.flush()?;
        if let Some(error_sink) = &self.error_sink {
            error_sink.flush()?;
        }
        Ok(())
    }

    fn hook<F>(&self, phase: Phase, call: &InterceptedCall<'_>, body: F)
    where
        F: FnOnce(&CallDescriptor<'_>) -> String,
    {
        if !self.enabled {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let descriptor = CallDescriptor::adapt(call);
            if !self.policy.should_audit(&descriptor) {
                return;
            }

            let event = LogEvent::new(phase, descriptor.qualified_name(), body(&descriptor))
                .application(self.application_name.clone())
                .tags(collect_tags(&self.tag_providers));
            self.emit(&event);
        }));

        if let Err(payload) = outcome {
            warn!(
                target: FALLBACK_TARGET,
                method = %call.signature().qualified_name(),
                phase = ?phase,
                "Audit hook panicked: {}",
                panic_message(&*payload)
            );
        }
    }

    fn emit(&self, event: &LogEvent) {
        let severity = event.severity();
        let sink = match (severity, &self.error_sink) {
            (Severity::Error, Some(error_sink)) => error_sink,
            _ => &self.sink,
        };

        let line = event.line();
        if let Err(e) = sink.emit(severity, &line) {
            warn!(
                target: FALLBACK_TARGET,
                error = %e,
                severity = %severity,
                "Failed to emit audit line: {}",
                line
            );
        }
    }

    fn render_value(&self, value: Option<&dyn Auditable>, mask: Option<&Mask>) -> String {
        let policy = RenderPolicy::from_mask(mask);
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            let value = value.map_or(AuditValue::Null, |v| v.audit_value());
            render(&value, &policy)
        }));

        rendered.unwrap_or_else(|payload| {
            debug!(
                target: FALLBACK_TARGET,
                "Failed to render audited value: {}",
                panic_message(&*payload)
            );
            UNRENDERABLE_PLACEHOLDER.to_string()
        })
    }
}

impl fmt::Debug for AuditEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditEngine")
            .field("enabled", &self.enabled)
            .field("application_name", &self.application_name)
            .field("tag_providers", &self.tag_providers.len())
            .field("error_sink", &self.error_sink.is_some())
            .finish_non_exhaustive()
    }
}

fn error_block(failure: &Failure) -> String {
    let mut block = format!(
        "Exception: {} Message: {}",
        failure.type_name, failure.message
    );
    for frame in &failure.frames {
        block.push_str("\n\t\t\t");
        block.push_str(frame);
    }
    block
}

/// Audit engine builder
pub struct AuditEngineBuilder {
    tag_providers: Vec<Arc<dyn ContextTagProvider>>,
    sink: Option<Arc<dyn AuditSink>>,
    error_sink: Option<Arc<dyn AuditSink>>,
    policy: Arc<dyn AuditPolicy>,
    application_name: Option<String>,
    enabled: bool,
}

impl AuditEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            tag_providers: Vec::new(),
            sink: None,
            error_sink: None,
            policy: Arc::new(MarkerPolicy),
            application_name: None,
            enabled: true,
        }
    }

    /// Register a context tag provider; tags appear in registration order
    pub fn tag_provider(mut self, provider: impl ContextTagProvider + 'static) -> Self {
        self.tag_providers.push(Arc::new(provider));
        self
    }

    /// Set the sink for all lines
    pub fn sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Route failure lines to a dedicated sink
    pub fn error_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    /// Set the audit decision policy
    pub fn policy(mut self, policy: impl AuditPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Apply the switches of a configuration; sinks are not touched
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.enabled = config.enabled;
        self.application_name = config.application_name;
        self
    }

    /// Set the application name prefixed to every line
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Enable or disable the engine
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build the audit engine, defaulting to a [`TracingSink`]
    pub fn build(self) -> AuditEngine {
        AuditEngine {
            tag_providers: self.tag_providers,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink::new())),
            error_sink: self.error_sink,
            policy: self.policy,
            application_name: self.application_name,
            enabled: self.enabled,
        }
    }
}

impl Default for AuditEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Annotation, AuditAll, MemorySink, ParamMeta, SinkError, StaticTag};
    use parking_lot::Mutex;
    use std::io;

    /// Buffer collecting formatted `tracing` output
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a scoped subscriber; returns the warnings on the fallback target
    fn fallback_warnings(f: impl FnOnce()) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let output = String::from_utf8_lossy(&captured.0.lock()).into_owned();
        output
            .lines()
            .filter(|line| line.contains(&format!("WARN {}:", FALLBACK_TARGET)))
            .map(str::to_string)
            .collect()
    }

    struct Modal {
        hello: String,
        world: i32,
    }

    impl Auditable for Modal {
        fn audit_value(&self) -> AuditValue {
            AuditValue::composite("Modal")
                .field("hello", &self.hello)
                .field("world", &self.world)
                .build()
        }
    }

    struct Exploding;

    impl Auditable for Exploding {
        fn audit_value(&self) -> AuditValue {
            panic!("cannot describe")
        }
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn emit(&self, _severity: Severity, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn engine(sink: &MemorySink) -> AuditEngine {
        AuditEngine::builder().sink(sink.clone()).build()
    }

    fn signature() -> MethodSignature {
        MethodSignature::new("app::TestObject", "print")
            .owner_annotation(Annotation::Audit)
            .param(ParamMeta::new("modal").mask(Mask::fields(["hello"])))
            .param(ParamMeta::new("token").do_not_audit())
            .param(ParamMeta::new("count"))
    }

    #[test]
    fn test_entry_line() {
        let sink = MemorySink::new();
        let engine = engine(&sink);
        let signature = signature();
        let modal = Modal {
            hello: "hi".into(),
            world: 7,
        };
        let token = "secret";
        let count = 3;

        engine.on_entry(&InterceptedCall::new(
            &signature,
            vec![Some(&modal), Some(&token), Some(&count)],
        ));

        assert_eq!(
            sink.lines(),
            vec!["Entering >>> app::TestObject.print Arguments: { modal=Modal[world=7]  count=3 }"]
        );
        assert_eq!(sink.lines_at(Severity::Info).len(), 1);
    }

    #[test]
    fn test_entry_without_params() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);

        engine(&sink).on_entry(&InterceptedCall::without_args(&signature));

        assert_eq!(sink.lines(), vec!["Entering >>> T.m Arguments: { }"]);
    }

    #[test]
    fn test_missing_argument_renders_null() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m")
            .annotation(Annotation::Audit)
            .param(ParamMeta::new("a"))
            .param(ParamMeta::new("b").mask(Mask::new()));

        engine(&sink).on_entry(&InterceptedCall::without_args(&signature));

        assert_eq!(
            sink.lines(),
            vec!["Entering >>> T.m Arguments: { a=null b=********** }"]
        );
    }

    #[test]
    fn test_return_uses_declared_mask() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m")
            .annotation(Annotation::Audit)
            .mask_return(Mask::new());

        engine(&sink).on_return(&InterceptedCall::without_args(&signature), &"token");

        assert_eq!(sink.lines(), vec!["Exiting <<< T.m Returned: **********"]);
    }

    #[test]
    fn test_error_line_with_frames() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);
        let failure = Failure::new("NullPointer", "name can't be null")
            .with_frame("app::T::m")
            .with_frame("app::main");

        engine(&sink).on_error(&InterceptedCall::without_args(&signature), &failure);

        let lines = sink.lines_at(Severity::Error);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "Exiting <<< T.m Exception: NullPointer Message: name can't be null\n\t\t\tapp::T::m\n\t\t\tapp::main"
        );
    }

    #[test]
    fn test_error_sink_routing() {
        let sink = MemorySink::new();
        let errors = MemorySink::new();
        let engine = AuditEngine::builder()
            .sink(sink.clone())
            .error_sink(errors.clone())
            .build();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);
        let call = InterceptedCall::without_args(&signature);

        engine.on_entry(&call);
        engine.on_error(&call, &Failure::new("E", "boom"));

        assert_eq!(sink.len(), 1);
        assert_eq!(errors.lines(), vec!["Exiting <<< T.m Exception: E Message: boom"]);
    }

    #[test]
    fn test_tags_and_application_prefix() {
        let sink = MemorySink::new();
        let engine = AuditEngine::builder()
            .tag_provider(StaticTag::new("First"))
            .tag_provider(|| "Second".to_string())
            .application_name("billing")
            .sink(sink.clone())
            .build();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);

        engine.on_return(&InterceptedCall::without_args(&signature), &());

        assert_eq!(
            sink.lines(),
            vec!["[ billing ] - [ First Second ] Exiting <<< T.m Returned: null"]
        );
    }

    #[test]
    fn test_excluded_method_emits_nothing() {
        let sink = MemorySink::new();
        let engine = engine(&sink);
        let signature = MethodSignature::new("T", "m")
            .owner_annotation(Annotation::Audit)
            .annotation(Annotation::DoNotAudit);
        let call = InterceptedCall::without_args(&signature);

        engine.on_entry(&call);
        engine.on_return(&call, &1);
        engine.on_error_with(&call, || panic!("failure must not be built"));

        assert!(sink.is_empty());
    }

    #[test]
    fn test_unmarked_method_emits_nothing() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m");

        engine(&sink).on_entry(&InterceptedCall::without_args(&signature));

        assert!(sink.is_empty());
    }

    #[test]
    fn test_disabled_engine() {
        let sink = MemorySink::new();
        let engine = AuditEngine::builder()
            .sink(sink.clone())
            .enabled(false)
            .build();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);

        assert!(!engine.is_enabled());
        engine.on_entry(&InterceptedCall::without_args(&signature));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_render_panic_degrades_to_placeholder() {
        let sink = MemorySink::new();
        let signature = MethodSignature::new("T", "m")
            .annotation(Annotation::Audit)
            .param(ParamMeta::new("value"))
            .param(ParamMeta::new("count"));
        let count = 2;

        engine(&sink).on_entry(&InterceptedCall::new(
            &signature,
            vec![Some(&Exploding), Some(&count)],
        ));

        assert_eq!(
            sink.lines(),
            vec!["Entering >>> T.m Arguments: { value=<unrenderable> count=2 }"]
        );
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let engine = AuditEngine::builder().sink(FailingSink).build();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);

        let warnings = fallback_warnings(|| {
            engine.on_entry(&InterceptedCall::without_args(&signature));
            engine.on_return(&InterceptedCall::without_args(&signature), &1);
        });

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Failed to emit audit line: Entering >>> T.m"));
        assert!(warnings[1].contains("Failed to emit audit line: Exiting <<< T.m Returned: 1"));
    }

    #[test]
    fn test_policy_panic_is_swallowed() {
        let sink = MemorySink::new();
        let engine = AuditEngine::builder()
            .sink(sink.clone())
            .policy(|_: &CallDescriptor<'_>| -> bool { panic!("policy failure") })
            .build();
        let signature = MethodSignature::new("T", "m");

        let warnings = fallback_warnings(|| {
            engine.on_entry(&InterceptedCall::without_args(&signature));
        });

        assert!(sink.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Audit hook panicked: policy failure"));
        assert!(warnings[0].contains("method=T.m"));
    }

    #[test]
    fn test_healthy_calls_record_no_fallback() {
        let sink = MemorySink::new();
        let engine = engine(&sink);
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);

        let warnings = fallback_warnings(|| {
            engine.on_entry(&InterceptedCall::without_args(&signature));
        });

        assert!(warnings.is_empty());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_invoke_result_err_passes_through() {
        let sink = MemorySink::new();
        let engine = AuditEngine::builder()
            .policy(AuditAll)
            .sink(sink.clone())
            .build();
        let signature = MethodSignature::new("T", "parse").param(ParamMeta::new("input"));
        let input = "abc";

        let result = engine.invoke_result(&signature, vec![Some(&input)], || {
            input.parse::<i32>()
        });

        assert!(result.is_err());
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Entering >>> T.parse Arguments: { input=abc }");
        assert!(lines[1].starts_with(
            "Exiting <<< T.parse Exception: core::num::error::ParseIntError Message: invalid digit"
        ));
    }

    #[test]
    fn test_invoke_panic_is_resumed() {
        let sink = MemorySink::new();
        let engine = AuditEngine::builder()
            .policy(AuditAll)
            .sink(sink.clone())
            .build();
        let signature = MethodSignature::new("T", "explode");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.invoke(&signature, Vec::new(), || -> i32 { panic!("kaboom") })
        }));

        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"kaboom"));

        let errors = sink.lines_at(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(
            errors[0].starts_with("Exiting <<< T.explode Exception: panic Message: kaboom\n\t\t\t")
        );
    }

    #[test]
    fn test_from_config_file_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig::new()
            .sink(SinkKind::File)
            .file(dir.path().join("audit.log"))
            .error_file(dir.path().join("error.log"))
            .application_name("billing");
        let engine = AuditEngine::from_config(&config).unwrap();
        let signature = MethodSignature::new("T", "m").annotation(Annotation::Audit);
        let call = InterceptedCall::without_args(&signature);

        engine.on_entry(&call);
        engine.on_error(&call, &Failure::new("E", "boom"));
        engine.flush().unwrap();

        let audit = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        let errors = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
        assert!(audit.contains("[ billing ] - Entering >>> T.m Arguments: { }"));
        assert!(!audit.contains("Exception"));
        assert!(errors.contains("[ billing ] - Exiting <<< T.m Exception: E Message: boom"));
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuditEngine>();
    }
}
