use std::sync::Arc;

use crate::{CallContext, Evaluator, ObservedEvaluator, Observer, Result, SharedObserver};

/// What to do when an observer panics while being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObserverPanicPolicy {
    /// Catch the panic, log it at `error` level, and continue with the next observer. The
    /// evaluation result is returned to the caller as usual.
    #[default]
    Isolate,
    /// Let the panic unwind into the caller of the evaluation method. Remaining observers are not
    /// notified.
    Propagate,
}

/// Configuration for [`ObservedEvaluator`].
///
/// # Examples
/// ```
/// # use flaghook::{ObservedEvaluatorConfig, OfflineEvaluator, LogObserver, Observation, User};
/// let evaluator = ObservedEvaluatorConfig::new()
///     .evaluator(OfflineEvaluator)
///     .observer(LogObserver::new())
///     .observer(|observation: &Observation<'_, User>| {
///         println!("{:?}", observation.detail);
///     })
///     .build()?;
/// # Ok::<(), flaghook::Error>(())
/// ```
pub struct ObservedEvaluatorConfig<E: ?Sized, C> {
    evaluator: Option<Arc<E>>,
    observers: Vec<SharedObserver<C>>,
    call_context: CallContext,
    observer_panic_policy: ObserverPanicPolicy,
}

impl<E: Evaluator<C> + ?Sized, C> ObservedEvaluatorConfig<E, C> {
    /// Create an empty configuration. An evaluator must be set before calling
    /// [`ObservedEvaluatorConfig::build()`].
    pub fn new() -> Self {
        ObservedEvaluatorConfig {
            evaluator: None,
            observers: Vec::new(),
            call_context: CallContext::background(),
            observer_panic_policy: ObserverPanicPolicy::default(),
        }
    }

    /// Set the flag client to wrap.
    pub fn evaluator(self, evaluator: E) -> Self
    where
        E: Sized,
    {
        self.shared_evaluator(Arc::new(evaluator))
    }

    /// Set the flag client to wrap, sharing ownership with the caller. Use this to wrap a
    /// `dyn Evaluator`.
    pub fn shared_evaluator(mut self, evaluator: Arc<E>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn observer(self, observer: impl Observer<C> + Send + Sync + 'static) -> Self {
        self.shared_observer(Arc::new(observer))
    }

    /// Register an observer that is shared with other evaluators.
    pub fn shared_observer(mut self, observer: SharedObserver<C>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Set the call context handed to observers. Defaults to [`CallContext::background()`].
    pub fn call_context(mut self, call_context: CallContext) -> Self {
        self.call_context = call_context;
        self
    }

    /// Override how observer panics are handled. Defaults to [`ObserverPanicPolicy::Isolate`].
    pub fn observer_panic_policy(mut self, policy: ObserverPanicPolicy) -> Self {
        self.observer_panic_policy = policy;
        self
    }

    /// Create a new [`ObservedEvaluator`] using the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if no evaluator was set.
    pub fn build(self) -> Result<ObservedEvaluator<E, C>> {
        ObservedEvaluator::from_parts(
            self.call_context,
            self.evaluator,
            self.observers.into_iter().map(Some),
            self.observer_panic_policy,
        )
    }
}

impl<E: Evaluator<C> + ?Sized, C> Default for ObservedEvaluatorConfig<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        CallContext, ContextualEvaluator, Error, Evaluator, Observation, OfflineEvaluator, User,
    };

    use super::{ObservedEvaluatorConfig, ObserverPanicPolicy};

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn build_fails_without_evaluator() {
        let result = ObservedEvaluatorConfig::<OfflineEvaluator, User>::new().build();
        assert!(matches!(
            result,
            Err(Error::InvalidArgument("client must not be nil"))
        ));
    }

    #[test]
    fn configured_call_context_reaches_observers() {
        let tenants = Arc::new(Mutex::new(Vec::new()));
        let evaluator = {
            let tenants = tenants.clone();
            ObservedEvaluatorConfig::new()
                .evaluator(OfflineEvaluator)
                .call_context(CallContext::background().with_value(Tenant("acme")))
                .observer(move |observation: &Observation<'_, User>| {
                    let tenant = observation.call_context.value::<Tenant>().map(|t| t.0);
                    tenants.lock().unwrap().push(tenant);
                })
                .build()
                .unwrap()
        };

        assert!(evaluator.bool_variation("flag", &User::new("u"), true).unwrap());

        // rebinding keeps observers
        let rebound = evaluator.with_call_context(CallContext::background());
        let _ = rebound.int_variation("flag", &User::new("u"), 1);

        assert_eq!(*tenants.lock().unwrap(), vec![Some("acme"), None]);
        assert_eq!(
            evaluator.call_context().value::<Tenant>(),
            Some(&Tenant("acme"))
        );
    }

    #[test]
    fn builds_for_foreign_context_types() {
        let evaluator = ObservedEvaluatorConfig::new()
            .evaluator(OfflineEvaluator)
            .observer(|observation: &Observation<'_, serde_json::Value>| {
                assert_eq!(observation.context["tenant"], "acme");
            })
            .observer_panic_policy(ObserverPanicPolicy::Propagate)
            .build()
            .unwrap();

        let context = serde_json::json!({"tenant": "acme"});
        assert_eq!(
            evaluator
                .string_variation("plan", &context, "free".to_owned())
                .unwrap(),
            "free"
        );
    }

    #[test]
    fn default_policy_isolates_observers() {
        assert_eq!(ObserverPanicPolicy::default(), ObserverPanicPolicy::Isolate);
    }
}
