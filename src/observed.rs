use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Instant,
};

use chrono::Utc;

use crate::{
    config::ObserverPanicPolicy, CallContext, ContextualEvaluator, Error, Evaluation, Evaluator,
    Observation, Result, SharedObserver, Variation,
};

/// An [`Evaluator`] that reports every evaluation to a set of observers.
///
/// `ObservedEvaluator` wraps another evaluator and is itself an evaluator, so it can be used
/// anywhere the wrapped one was. Each call is delegated to the wrapped evaluator unchanged; the
/// time spent there, the callsite default, the evaluation detail, and any error are then handed to
/// every observer, in registration order, before the result is returned.
///
/// The wrapped evaluator, observers, and call context are immutable. Binding a different
/// [`CallContext`] with [`ContextualEvaluator::with_call_context`] produces a new
/// `ObservedEvaluator` that shares the evaluator and observers with the original.
///
/// # Examples
/// ```
/// # use std::sync::Arc;
/// # use flaghook::{Evaluator, ObservedEvaluator, OfflineEvaluator, Observation, SharedObserver, User};
/// let observer: SharedObserver<User> = Arc::new(|observation: &Observation<'_, User>| {
///     println!("{} evaluated in {:?}", observation.key, observation.elapsed);
/// });
/// let evaluator = ObservedEvaluator::new(Some(Arc::new(OfflineEvaluator)), [Some(observer)])?;
///
/// let enabled = evaluator.bool_variation("new-checkout", &User::new("user-1"), false)?;
/// assert!(!enabled);
/// # Ok::<(), flaghook::Error>(())
/// ```
pub struct ObservedEvaluator<E: ?Sized, C> {
    evaluator: Arc<E>,
    observers: Arc<[SharedObserver<C>]>,
    call_context: CallContext,
    panic_policy: ObserverPanicPolicy,
}

impl<E: Evaluator<C> + ?Sized, C> ObservedEvaluator<E, C> {
    /// Wrap `evaluator`, notifying `observers`. Observers receive [`CallContext::background()`]
    /// until another call context is bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `evaluator` or any of the observers is `None`.
    /// An empty list of observers is accepted.
    pub fn new(
        evaluator: Option<Arc<E>>,
        observers: impl IntoIterator<Item = Option<SharedObserver<C>>>,
    ) -> Result<Self> {
        Self::new_with_call_context(CallContext::background(), evaluator, observers)
    }

    /// Same as [`ObservedEvaluator::new`], with an explicit initial call context.
    pub fn new_with_call_context(
        call_context: CallContext,
        evaluator: Option<Arc<E>>,
        observers: impl IntoIterator<Item = Option<SharedObserver<C>>>,
    ) -> Result<Self> {
        Self::from_parts(
            call_context,
            evaluator,
            observers,
            ObserverPanicPolicy::default(),
        )
    }

    pub(crate) fn from_parts(
        call_context: CallContext,
        evaluator: Option<Arc<E>>,
        observers: impl IntoIterator<Item = Option<SharedObserver<C>>>,
        panic_policy: ObserverPanicPolicy,
    ) -> Result<Self> {
        let evaluator = evaluator.ok_or(Error::InvalidArgument("client must not be nil"))?;
        // An empty observer list is fine, but a missing entry is a misconfiguration.
        let observers = observers
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::InvalidArgument("subscribers must not be nil"))?;

        log::debug!(target: "flaghook",
                    observers = observers.len(),
                    panic_policy:debug = panic_policy;
                    "created observed evaluator");

        Ok(ObservedEvaluator {
            evaluator,
            observers: observers.into(),
            call_context,
            panic_policy,
        })
    }

    /// The call context handed to observers by the non-`_ctx` methods.
    pub fn call_context(&self) -> &CallContext {
        &self.call_context
    }

    fn evaluate<T: Variation>(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: T,
    ) -> Evaluation<T> {
        let callsite_default = default.to_flag_value();

        let timestamp = Utc::now();
        let start = Instant::now();
        // The wrapped evaluator's value is ignored, detail is the source of truth.
        let Evaluation { detail, error, .. } =
            T::evaluate(self.evaluator.as_ref(), key, context, default);
        let elapsed = start.elapsed();

        log::trace!(target: "flaghook",
                    flag_key = key,
                    reason = detail.reason,
                    failed = error.is_some();
                    "observed a flag evaluation");

        self.notify(&Observation {
            call_context,
            key,
            context,
            callsite_default,
            elapsed,
            detail: &detail,
            error: error.as_ref(),
            timestamp,
        });

        Evaluation {
            value: T::from_flag_value(&detail.value),
            detail,
            error,
        }
    }

    fn notify(&self, observation: &Observation<'_, C>) {
        for (index, observer) in self.observers.iter().enumerate() {
            match self.panic_policy {
                ObserverPanicPolicy::Propagate => observer.observe(observation),
                ObserverPanicPolicy::Isolate => {
                    let result =
                        panic::catch_unwind(AssertUnwindSafe(|| observer.observe(observation)));
                    if let Err(payload) = result {
                        log::error!(target: "flaghook",
                                    flag_key = observation.key,
                                    observer_index = index;
                                    "observer panicked: {}", panic_message(payload.as_ref()));
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<E: ?Sized, C> Clone for ObservedEvaluator<E, C> {
    fn clone(&self) -> Self {
        ObservedEvaluator {
            evaluator: self.evaluator.clone(),
            observers: self.observers.clone(),
            call_context: self.call_context.clone(),
            panic_policy: self.panic_policy,
        }
    }
}

impl<E: ?Sized, C> std::fmt::Debug for ObservedEvaluator<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservedEvaluator")
            .field("observers", &self.observers.len())
            .field("call_context", &self.call_context)
            .field("panic_policy", &self.panic_policy)
            .finish_non_exhaustive()
    }
}

impl<E: Evaluator<C> + ?Sized, C> Evaluator<C> for ObservedEvaluator<E, C> {
    fn bool_variation_detail(&self, key: &str, context: &C, default: bool) -> Evaluation<bool> {
        self.evaluate(&self.call_context, key, context, default)
    }

    fn float64_variation_detail(&self, key: &str, context: &C, default: f64) -> Evaluation<f64> {
        self.evaluate(&self.call_context, key, context, default)
    }

    fn int_variation_detail(&self, key: &str, context: &C, default: i64) -> Evaluation<i64> {
        self.evaluate(&self.call_context, key, context, default)
    }

    fn json_variation_detail(
        &self,
        key: &str,
        context: &C,
        default: serde_json::Value,
    ) -> Evaluation<serde_json::Value> {
        self.evaluate(&self.call_context, key, context, default)
    }

    fn string_variation_detail(
        &self,
        key: &str,
        context: &C,
        default: String,
    ) -> Evaluation<String> {
        self.evaluate(&self.call_context, key, context, default)
    }
}

impl<E: Evaluator<C> + ?Sized, C> ContextualEvaluator<C>
    for ObservedEvaluator<E, C>
{
    fn with_call_context(&self, call_context: CallContext) -> Self {
        ObservedEvaluator {
            call_context,
            ..self.clone()
        }
    }

    fn variation_detail_ctx<T: Variation>(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: T,
    ) -> Evaluation<T> {
        self.evaluate(call_context, key, context, default)
    }
}
