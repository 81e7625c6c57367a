use serde::{Deserialize, Serialize};

use crate::{Error, FlagValue, Result};

/// Explains how a flag value was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
    /// The flag is off and served its off variation.
    Off,
    /// No targets or rules matched, the fallthrough variation was served.
    Fallthrough,
    /// The context was individually targeted.
    TargetMatch,
    /// The context matched one of the flag rules.
    #[serde(rename_all = "camelCase")]
    RuleMatch { rule_index: usize, rule_id: String },
    /// A prerequisite flag did not return the required variation.
    #[serde(rename_all = "camelCase")]
    PrerequisiteFailed { prerequisite_key: String },
    /// The flag could not be evaluated and the callsite default was served.
    #[serde(rename_all = "camelCase")]
    Error { error_kind: EvaluationErrorKind },
}

impl EvaluationReason {
    /// Returns the error kind if this reason describes a failed evaluation.
    pub fn error_kind(&self) -> Option<EvaluationErrorKind> {
        match self {
            Self::Error { error_kind } => Some(*error_kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvaluationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => f.write_str("OFF"),
            Self::Fallthrough => f.write_str("FALLTHROUGH"),
            Self::TargetMatch => f.write_str("TARGET_MATCH"),
            Self::RuleMatch { rule_index, .. } => write!(f, "RULE_MATCH({rule_index})"),
            Self::PrerequisiteFailed { prerequisite_key } => {
                write!(f, "PREREQUISITE_FAILED({prerequisite_key})")
            }
            Self::Error { error_kind } => write!(f, "ERROR({error_kind:?})"),
        }
    }
}

impl log::kv::ToValue for EvaluationReason {
    fn to_value(&self) -> log::kv::Value {
        log::kv::Value::from_display(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationErrorKind {
    /// The flag client has not been initialized or is offline.
    ClientNotReady,
    /// The flag key is unknown.
    FlagNotFound,
    /// The flag configuration is invalid.
    MalformedFlag,
    /// No evaluation context was supplied.
    UserNotSpecified,
    /// The flag value does not match the requested type.
    WrongType,
    /// Unexpected failure inside the flag client.
    Exception,
}

/// Structured result of a flag evaluation: the resolved value plus the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetail {
    pub value: FlagValue,
    /// Index of the served variation. `None` when the callsite default was served.
    pub variation_index: Option<usize>,
    pub reason: EvaluationReason,
}

impl EvaluationDetail {
    pub fn new(
        value: impl Into<FlagValue>,
        variation_index: Option<usize>,
        reason: EvaluationReason,
    ) -> Self {
        EvaluationDetail {
            value: value.into(),
            variation_index,
            reason,
        }
    }

    /// Detail of an evaluation that failed and served `default`.
    pub fn error(default: impl Into<FlagValue>, error_kind: EvaluationErrorKind) -> Self {
        Self::new(default, None, EvaluationReason::Error { error_kind })
    }

    pub fn is_default_value(&self) -> bool {
        self.variation_index.is_none()
    }
}

/// Outcome of a typed evaluation: the value, the full detail, and the error reported by the flag
/// client, if any.
///
/// On error, `value` is whatever the flag client returned, conventionally the callsite default.
#[derive(Debug, Clone)]
pub struct Evaluation<T> {
    pub value: T,
    pub detail: EvaluationDetail,
    pub error: Option<Error>,
}

impl<T> Evaluation<T> {
    /// A successful evaluation.
    pub fn ok(value: T, detail: EvaluationDetail) -> Self {
        Evaluation {
            value,
            detail,
            error: None,
        }
    }

    /// A failed evaluation, still carrying the value and detail that were served.
    pub fn failed(value: T, detail: EvaluationDetail, error: Error) -> Self {
        Evaluation {
            value,
            detail,
            error: Some(error),
        }
    }

    /// Map `Evaluation.value` using the `f` function.
    pub fn map<T2, F: FnOnce(T) -> T2>(self, f: F) -> Evaluation<T2> {
        Evaluation {
            value: f(self.value),
            detail: self.detail,
            error: self.error,
        }
    }

    /// Drop the detail, keeping only the value or the error.
    pub fn into_result(self) -> Result<T> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Error, FlagValue};

    use super::{Evaluation, EvaluationDetail, EvaluationErrorKind, EvaluationReason};

    #[test]
    fn reason_serialization() {
        assert_eq!(
            serde_json::to_value(EvaluationReason::RuleMatch {
                rule_index: 2,
                rule_id: "beta-testers".to_owned()
            })
            .unwrap(),
            json!({"kind": "RULE_MATCH", "ruleIndex": 2, "ruleId": "beta-testers"})
        );
        assert_eq!(
            serde_json::to_value(EvaluationReason::Error {
                error_kind: EvaluationErrorKind::FlagNotFound
            })
            .unwrap(),
            json!({"kind": "ERROR", "errorKind": "FLAG_NOT_FOUND"})
        );
    }

    #[test]
    fn error_detail_serves_default() {
        let detail = EvaluationDetail::error(42_i64, EvaluationErrorKind::ClientNotReady);
        assert_eq!(detail.value, FlagValue::Integer(42));
        assert!(detail.is_default_value());
        assert_eq!(
            detail.reason.error_kind(),
            Some(EvaluationErrorKind::ClientNotReady)
        );
    }

    #[test]
    fn into_result_prefers_error() {
        let detail = EvaluationDetail::error(false, EvaluationErrorKind::FlagNotFound);
        let evaluation = Evaluation::failed(false, detail.clone(), Error::FlagNotFound);
        assert!(matches!(evaluation.into_result(), Err(Error::FlagNotFound)));

        let evaluation = Evaluation::ok(true, detail).map(|b| !b);
        assert!(!evaluation.into_result().unwrap());
    }
}
