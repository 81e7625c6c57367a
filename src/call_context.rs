use std::{any::Any, sync::Arc};

/// Request-scoped values handed to observers alongside each evaluation.
///
/// A `CallContext` is immutable. [`CallContext::with_value`] returns a new context layered on top
/// of the receiver, so one context can be shared across threads and specialized per request
/// without locking. Values are looked up by type; wrap plain types in a newtype to avoid
/// collisions.
///
/// ```
/// # use flaghook::CallContext;
/// #[derive(Debug, PartialEq)]
/// struct RequestId(String);
///
/// let ctx = CallContext::background().with_value(RequestId("req-1".to_owned()));
/// assert_eq!(ctx.value::<RequestId>(), Some(&RequestId("req-1".to_owned())));
/// assert_eq!(CallContext::background().value::<RequestId>(), None);
/// ```
#[derive(Clone, Default)]
pub struct CallContext {
    head: Option<Arc<Entry>>,
}

struct Entry {
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl CallContext {
    /// The empty context.
    pub fn background() -> CallContext {
        CallContext::default()
    }

    /// Returns a child context carrying `value`. A value of the same type in the parent is
    /// shadowed, not replaced.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> CallContext {
        CallContext {
            head: Some(Arc::new(Entry {
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Returns the most recently added value of type `T`.
    pub fn value<T: Any>(&self) -> Option<&T> {
        self.entries().find_map(|entry| entry.value.downcast_ref::<T>())
    }

    pub fn is_background(&self) -> bool {
        self.head.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("values", &self.entries().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::CallContext;

    #[derive(Debug, PartialEq)]
    struct Marker(&'static str);

    #[derive(Debug, PartialEq)]
    struct TraceId(u64);

    #[test]
    fn child_shadows_parent_without_mutating_it() {
        let parent = CallContext::background().with_value(Marker("parent"));
        let child = parent.with_value(Marker("child"));

        assert_eq!(parent.value::<Marker>(), Some(&Marker("parent")));
        assert_eq!(child.value::<Marker>(), Some(&Marker("child")));
    }

    #[test]
    fn values_of_different_types_coexist() {
        let ctx = CallContext::background()
            .with_value(TraceId(7))
            .with_value(Marker("m"));

        assert_eq!(ctx.value::<TraceId>(), Some(&TraceId(7)));
        assert_eq!(ctx.value::<Marker>(), Some(&Marker("m")));
        assert!(!ctx.is_background());
        assert!(CallContext::background().is_background());
    }

    #[test]
    fn can_be_shared_across_threads() {
        let ctx = CallContext::background().with_value(Marker("shared"));
        let handle = {
            let ctx = ctx.clone();
            std::thread::spawn(move || ctx.value::<Marker>().map(|m| m.0))
        };
        assert_eq!(handle.join().unwrap(), Some("shared"));
    }
}
