use crate::{CallContext, Evaluation, EvaluationDetail, EvaluationErrorKind, Result, Variation};

/// The subset of a flag client's methods that a consumer invokes to retrieve individual flag
/// values.
///
/// `C` is the evaluation context type understood by the flag client, e.g. [`User`](crate::User)
/// or [`Context`](crate::Context).
///
/// Implementors provide the five typed "detail" operations; the simple forms are derived from
/// them. By convention, a failed evaluation serves the callsite default and reports the failure
/// both in [`Evaluation::error`] and in the detail's reason.
///
/// # Simple and detail forms
///
/// The simple forms (`bool_variation()`, ...) return `Err` when the evaluation failed and drop the
/// value that was served. If you need the served value together with the error, use the
/// corresponding `*_detail` form, which always returns all three.
pub trait Evaluator<C> {
    /// Evaluate a boolean flag, returning the value, the evaluation detail, and any error.
    ///
    /// # Errors
    ///
    /// Failures are reported in [`Evaluation::error`]; the value is then the one the flag client
    /// chose to serve, normally `default`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flaghook::{Evaluator, OfflineEvaluator, User};
    /// let evaluation = OfflineEvaluator.bool_variation_detail("dark-mode", &User::new("u-1"), false);
    /// println!("{} because {}", evaluation.value, evaluation.detail.reason);
    /// ```
    fn bool_variation_detail(&self, key: &str, context: &C, default: bool) -> Evaluation<bool>;

    /// Evaluate a numeric flag. Same error reporting as
    /// [`bool_variation_detail()`](Evaluator::bool_variation_detail).
    fn float64_variation_detail(&self, key: &str, context: &C, default: f64) -> Evaluation<f64>;

    /// Evaluate an integer flag. Same error reporting as
    /// [`bool_variation_detail()`](Evaluator::bool_variation_detail).
    fn int_variation_detail(&self, key: &str, context: &C, default: i64) -> Evaluation<i64>;

    /// Evaluate a JSON flag. Same error reporting as
    /// [`bool_variation_detail()`](Evaluator::bool_variation_detail).
    fn json_variation_detail(
        &self,
        key: &str,
        context: &C,
        default: serde_json::Value,
    ) -> Evaluation<serde_json::Value>;

    /// Evaluate a string flag. Same error reporting as
    /// [`bool_variation_detail()`](Evaluator::bool_variation_detail).
    fn string_variation_detail(
        &self,
        key: &str,
        context: &C,
        default: String,
    ) -> Evaluation<String>;

    /// Evaluate a boolean flag.
    ///
    /// # Errors
    ///
    /// Returns the error reported by [`Evaluator::bool_variation_detail()`], e.g.
    /// [`Error::FlagNotFound`](crate::Error::FlagNotFound). The served value is not available in
    /// that case; call the detail form if you need it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flaghook::{Evaluator, OfflineEvaluator, User};
    /// let enabled = OfflineEvaluator
    ///     .bool_variation("dark-mode", &User::new("u-1"), false)
    ///     .unwrap_or(false);
    /// ```
    fn bool_variation(&self, key: &str, context: &C, default: bool) -> Result<bool> {
        self.bool_variation_detail(key, context, default).into_result()
    }

    /// Evaluate a numeric flag. Errors as in [`Evaluator::bool_variation()`].
    fn float64_variation(&self, key: &str, context: &C, default: f64) -> Result<f64> {
        self.float64_variation_detail(key, context, default)
            .into_result()
    }

    /// Evaluate an integer flag. Errors as in [`Evaluator::bool_variation()`].
    fn int_variation(&self, key: &str, context: &C, default: i64) -> Result<i64> {
        self.int_variation_detail(key, context, default).into_result()
    }

    /// Evaluate a JSON flag. Errors as in [`Evaluator::bool_variation()`].
    fn json_variation(
        &self,
        key: &str,
        context: &C,
        default: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.json_variation_detail(key, context, default)
            .into_result()
    }

    /// Evaluate a string flag. Errors as in [`Evaluator::bool_variation()`].
    fn string_variation(&self, key: &str, context: &C, default: String) -> Result<String> {
        self.string_variation_detail(key, context, default)
            .into_result()
    }
}

/// An [`Evaluator`] bound to a request-scoped [`CallContext`].
///
/// The bound context can be replaced with [`ContextualEvaluator::with_call_context`], or bypassed
/// for a single call with the `*_ctx` methods.
pub trait ContextualEvaluator<C>: Evaluator<C> + Sized {
    /// Returns a copy of this evaluator bound to `call_context`. The receiver is not modified.
    fn with_call_context(&self, call_context: CallContext) -> Self;

    /// Evaluate a flag of any supported type using `call_context` instead of the bound one.
    fn variation_detail_ctx<T: Variation>(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: T,
    ) -> Evaluation<T>;

    fn bool_variation_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: bool,
    ) -> Result<bool> {
        self.variation_detail_ctx(call_context, key, context, default)
            .into_result()
    }

    fn bool_variation_detail_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: bool,
    ) -> Evaluation<bool> {
        self.variation_detail_ctx(call_context, key, context, default)
    }

    fn float64_variation_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: f64,
    ) -> Result<f64> {
        self.variation_detail_ctx(call_context, key, context, default)
            .into_result()
    }

    fn float64_variation_detail_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: f64,
    ) -> Evaluation<f64> {
        self.variation_detail_ctx(call_context, key, context, default)
    }

    fn int_variation_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: i64,
    ) -> Result<i64> {
        self.variation_detail_ctx(call_context, key, context, default)
            .into_result()
    }

    fn int_variation_detail_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: i64,
    ) -> Evaluation<i64> {
        self.variation_detail_ctx(call_context, key, context, default)
    }

    fn json_variation_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.variation_detail_ctx(call_context, key, context, default)
            .into_result()
    }

    fn json_variation_detail_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: serde_json::Value,
    ) -> Evaluation<serde_json::Value> {
        self.variation_detail_ctx(call_context, key, context, default)
    }

    fn string_variation_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: String,
    ) -> Result<String> {
        self.variation_detail_ctx(call_context, key, context, default)
            .into_result()
    }

    fn string_variation_detail_ctx(
        &self,
        call_context: &CallContext,
        key: &str,
        context: &C,
        default: String,
    ) -> Evaluation<String> {
        self.variation_detail_ctx(call_context, key, context, default)
    }
}

/// An evaluator that always serves the callsite default, like a flag client configured offline.
///
/// Every evaluation reports [`EvaluationErrorKind::ClientNotReady`] as its reason, without
/// returning an error.
///
/// ```
/// # use flaghook::{Evaluator, OfflineEvaluator, User};
/// let value = OfflineEvaluator.bool_variation("new-checkout", &User::new("u-1"), true);
/// assert!(value.unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEvaluator;

impl OfflineEvaluator {
    fn serve_default<T: Variation>(default: T) -> Evaluation<T> {
        let detail = EvaluationDetail::error(
            default.to_flag_value(),
            EvaluationErrorKind::ClientNotReady,
        );
        Evaluation::ok(default, detail)
    }
}

impl<C> Evaluator<C> for OfflineEvaluator {
    fn bool_variation_detail(&self, _key: &str, _context: &C, default: bool) -> Evaluation<bool> {
        Self::serve_default(default)
    }

    fn float64_variation_detail(&self, _key: &str, _context: &C, default: f64) -> Evaluation<f64> {
        Self::serve_default(default)
    }

    fn int_variation_detail(&self, _key: &str, _context: &C, default: i64) -> Evaluation<i64> {
        Self::serve_default(default)
    }

    fn json_variation_detail(
        &self,
        _key: &str,
        _context: &C,
        default: serde_json::Value,
    ) -> Evaluation<serde_json::Value> {
        Self::serve_default(default)
    }

    fn string_variation_detail(
        &self,
        _key: &str,
        _context: &C,
        default: String,
    ) -> Evaluation<String> {
        Self::serve_default(default)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Context, EvaluationErrorKind, Evaluator, FlagValue, User};

    use super::OfflineEvaluator;

    #[test]
    fn offline_serves_defaults_for_every_type() {
        let user = User::new("user-1");

        assert!(OfflineEvaluator.bool_variation("b", &user, true).unwrap());
        assert_eq!(
            OfflineEvaluator.float64_variation("f", &user, 0.25).unwrap(),
            0.25
        );
        assert_eq!(OfflineEvaluator.int_variation("i", &user, -3).unwrap(), -3);
        assert_eq!(
            OfflineEvaluator
                .json_variation("j", &user, json!({"a": 1}))
                .unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            OfflineEvaluator
                .string_variation("s", &user, "dflt".to_owned())
                .unwrap(),
            "dflt"
        );
    }

    #[test]
    fn offline_detail_reports_client_not_ready() {
        let evaluation =
            OfflineEvaluator.string_variation_detail("s", &Context::new("c-1"), "x".to_owned());

        assert!(evaluation.error.is_none());
        assert_eq!(evaluation.detail.value, FlagValue::String("x".to_owned()));
        assert_eq!(
            evaluation.detail.reason.error_kind(),
            Some(EvaluationErrorKind::ClientNotReady)
        );
    }
}
