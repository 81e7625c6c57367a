//! `flaghook` lets you observe every feature flag evaluation made through a flag client, without
//! changing call sites beyond swapping in a wrapper.
//!
//! # Overview
//!
//! A flag client is described by the [`Evaluator`] trait: five typed "detail" operations (boolean,
//! floating-point, integer, JSON, and string), each taking a flag key, an evaluation context, and a
//! callsite default. [`ObservedEvaluator`] wraps any `Evaluator` and is an `Evaluator` itself. On
//! every call it delegates to the wrapped client, measures how long that took, and hands an
//! [`Observation`] to each registered [`Observer`]. Observers are where metrics, logging, or tracing
//! hook in.
//!
//! The decorator never changes what the wrapped client returns: the value, the
//! [`EvaluationDetail`], and any [`Error`] are passed through as-is.
//!
//! # Evaluation contexts
//!
//! `ObservedEvaluator` is generic over the evaluation context type `C` and places no bounds on it,
//! so it can wrap a client whose context type is defined elsewhere. Two context types ship with the
//! crate: [`User`] and its successor [`Context`]. [`LogObserver`] additionally needs
//! [`EvaluationContext`] to name the target in its records.
//!
//! # Call context
//!
//! Observers often need request-scoped data (a request id, a tracing span, a tenant). A
//! [`CallContext`] carries such values. Bind one for a request with
//! [`ContextualEvaluator::with_call_context`], which returns a new evaluator and leaves the
//! original untouched, or pass one to a single call with the `*_ctx` methods.
//!
//! ```
//! # use flaghook::{CallContext, ContextualEvaluator, Evaluator, ObservedEvaluatorConfig, OfflineEvaluator, Observation, User};
//! struct RequestId(&'static str);
//!
//! let evaluator = ObservedEvaluatorConfig::new()
//!     .evaluator(OfflineEvaluator)
//!     .observer(|observation: &Observation<'_, User>| {
//!         let request_id = observation.call_context.value::<RequestId>().map(|id| id.0);
//!         println!("{} evaluated for request {:?}", observation.key, request_id);
//!     })
//!     .build()?;
//!
//! let per_request = evaluator.with_call_context(CallContext::background().with_value(RequestId("req-1")));
//! let enabled = per_request.bool_variation("new-checkout", &User::new("user-1"), false)?;
//! # Ok::<(), flaghook::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Construction fails with
//! [`Error::InvalidArgument`] when the evaluator or an observer is missing. Errors produced by the
//! wrapped client are returned unchanged and are also visible to observers.
//!
//! Observers have no error channel. A panicking observer is isolated by default; see
//! [`ObserverPanicPolicy`].
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `flaghook` target. [`LogObserver`] writes one record per evaluation.

#![warn(rustdoc::missing_crate_level_docs)]

mod call_context;
mod config;
mod context;
mod detail;
mod error;
mod evaluator;
mod log_observer;
mod observed;
mod observer;
mod value;

pub use call_context::CallContext;
pub use config::{ObservedEvaluatorConfig, ObserverPanicPolicy};
pub use context::{AttributeValue, Attributes, Context, EvaluationContext, User};
pub use detail::{Evaluation, EvaluationDetail, EvaluationErrorKind, EvaluationReason};
pub use error::{Error, Result};
pub use evaluator::{ContextualEvaluator, Evaluator, OfflineEvaluator};
pub use log_observer::LogObserver;
pub use observed::ObservedEvaluator;
pub use observer::{observer_fn, Observation, Observer, SharedObserver};
pub use value::{FlagValue, Variation};
