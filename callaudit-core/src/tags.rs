//! Context tags prefixed to every audit line

use std::sync::Arc;

/// Contributes one short tag to every audit line.
///
/// Called fresh for each line, so the tag may change from call to call (a
/// request or correlation id, for example).
pub trait ContextTagProvider: Send + Sync {
    /// Current tag value
    fn tag(&self) -> String;
}

impl<F> ContextTagProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn tag(&self) -> String {
        self()
    }
}

/// Provider returning the same tag every time
#[derive(Debug, Clone)]
pub struct StaticTag(String);

impl StaticTag {
    /// Create a fixed tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl ContextTagProvider for StaticTag {
    fn tag(&self) -> String {
        self.0.clone()
    }
}

/// Collect the current tags, in registration order.
pub fn collect_tags(providers: &[Arc<dyn ContextTagProvider>]) -> Vec<String> {
    providers.iter().map(|provider| provider.tag()).collect()
}

/// Bracketed prefix for a set of tags: `"[ a b ] "`, or empty without tags.
pub fn tag_prefix(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let mut prefix = String::from("[ ");
    for tag in tags {
        prefix.push_str(tag);
        prefix.push(' ');
    }
    prefix.push_str("] ");
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_prefix() {
        assert_eq!(tag_prefix(&[]), "");
    }

    #[test]
    fn test_prefix_in_registration_order() {
        let providers: Vec<Arc<dyn ContextTagProvider>> = vec![
            Arc::new(StaticTag::new("First")),
            Arc::new(StaticTag::new("Second")),
        ];

        let tags = collect_tags(&providers);
        assert_eq!(tag_prefix(&tags), "[ First Second ] ");
    }

    #[test]
    fn test_closure_provider_called_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let source = counter.clone();
        let provider: Arc<dyn ContextTagProvider> =
            Arc::new(move || format!("req-{}", source.fetch_add(1, Ordering::SeqCst)));
        let providers = vec![provider];

        assert_eq!(collect_tags(&providers), vec!["req-0".to_string()]);
        assert_eq!(collect_tags(&providers), vec!["req-1".to_string()]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
