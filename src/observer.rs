use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{CallContext, Error, EvaluationDetail, FlagValue};

/// Everything known about a single flag evaluation.
///
/// An `Observation` is built once per evaluation call and handed to every registered observer.
#[derive(Debug)]
pub struct Observation<'a, C> {
    /// The call context in effect for this evaluation. [`CallContext::background()`] unless the
    /// caller bound or passed one.
    pub call_context: &'a CallContext,
    pub key: &'a str,
    /// Evaluation context, as passed by the caller.
    pub context: &'a C,
    /// The fallback value supplied at the call site.
    pub callsite_default: FlagValue,
    /// Time spent inside the wrapped evaluator. Excludes observer notification.
    pub elapsed: Duration,
    pub detail: &'a EvaluationDetail,
    /// Error returned by the wrapped evaluator, if any.
    pub error: Option<&'a Error>,
    /// When the evaluation started.
    pub timestamp: DateTime<Utc>,
}

impl<C> Observation<'_, C> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A trait for being notified about the results of feature flag evaluations.
///
/// Observers are called synchronously, in registration order, before the evaluation result is
/// returned to the caller.
pub trait Observer<C> {
    /// Invoked once per evaluation with the details of that evaluation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use flaghook::{Observation, Observer, User};
    /// struct SlowFlagReporter;
    ///
    /// impl Observer<User> for SlowFlagReporter {
    ///     fn observe(&self, observation: &Observation<'_, User>) {
    ///         if observation.elapsed.as_millis() > 50 {
    ///             eprintln!("{} took {:?}", observation.key, observation.elapsed);
    ///         }
    ///     }
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// This method has no error channel and cannot alter the evaluation result. Errors that occur
    /// inside the observer should be handled within the implementation.
    ///
    /// # Notes
    ///
    /// This method is called before returning the flag value to the caller, so it is important
    /// that `observe` does not block the calling thread.
    fn observe(&self, observation: &Observation<'_, C>);
}

impl<C, F: Fn(&Observation<'_, C>)> Observer<C> for F {
    fn observe(&self, observation: &Observation<'_, C>) {
        self(observation);
    }
}

/// An observer shared between evaluators.
pub type SharedObserver<C> = Arc<dyn Observer<C> + Send + Sync>;

/// Adapt a function into an [`Observer`].
///
/// Closures implement [`Observer`] directly. `observer_fn` pins the closure signature so the
/// argument type does not need to be spelled out.
///
/// ```
/// # use flaghook::{observer_fn, User};
/// let observer = observer_fn::<User, _>(|observation| {
///     println!("{} -> {}", observation.key, observation.detail.value);
/// });
/// ```
pub fn observer_fn<C, F>(f: F) -> F
where
    F: Fn(&Observation<'_, C>) + Send + Sync,
{
    f
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use chrono::Utc;

    use crate::{
        CallContext, Error, EvaluationDetail, EvaluationErrorKind, FlagValue, User,
    };

    use super::{observer_fn, Observation, Observer, SharedObserver};

    #[test]
    fn function_adapter_forwards_observation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer: SharedObserver<User> = {
            let seen = seen.clone();
            Arc::new(observer_fn(move |observation: &Observation<'_, User>| {
                seen.lock()
                    .unwrap()
                    .push((observation.key.to_owned(), observation.is_error()));
            }))
        };

        let call_context = CallContext::background();
        let user = User::new("user-1");
        let detail = EvaluationDetail::error(true, EvaluationErrorKind::FlagNotFound);
        let error = Error::FlagNotFound;
        observer.observe(&Observation {
            call_context: &call_context,
            key: "flag",
            context: &user,
            callsite_default: FlagValue::Boolean(true),
            elapsed: Duration::from_millis(1),
            detail: &detail,
            error: Some(&error),
            timestamp: Utc::now(),
        });

        assert_eq!(*seen.lock().unwrap(), vec![("flag".to_owned(), true)]);
    }
}
