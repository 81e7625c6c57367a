use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::{Evaluation, Evaluator};

/// Enum representing a flag value of any of the supported kinds.
///
/// Observers receive the callsite default as a `FlagValue`, so they see a single value type no
/// matter which typed variation method was called.
///
/// # Serialization
///
/// When serialized to JSON, serialized as a two-field object with `type` and `value`. Type is one
/// of "BOOLEAN", "NUMERIC", "INTEGER", "STRING", or "JSON".
///
/// Example:
/// ```json
/// {"type":"JSON","value":{"hello":"world"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagValue {
    /// A boolean value.
    Boolean(bool),
    /// A numeric value (floating-point).
    Numeric(f64),
    /// An integer value.
    Integer(i64),
    /// A string value.
    String(String),
    /// Arbitrary JSON value.
    Json(serde_json::Value),
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl FlagValue {
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Json(v) => v.as_bool(),
            _ => None,
        }
    }

    /// Integers are widened to `f64`.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            Self::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    /// Numbers are truncated toward zero.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Numeric(n) => Some(*n as i64),
            Self::Json(v) => v.as_i64().or_else(|| v.as_f64().map(|n| n as i64)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Json(v) => v.as_str(),
            _ => None,
        }
    }

    /// Convert into a JSON value. Every flag value has a JSON representation; non-finite numbers
    /// become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Boolean(b) => (*b).into(),
            Self::Numeric(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Integer(i) => (*i).into(),
            Self::String(s) => s.as_str().into(),
            Self::Json(v) => v.clone(),
        }
    }
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl log::kv::ToValue for FlagValue {
    fn to_value(&self) -> log::kv::Value {
        log::kv::Value::from_display(self)
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for f64 {}
    impl Sealed for i64 {}
    impl Sealed for serde_json::Value {}
    impl Sealed for String {}
}

/// A value type that can be requested from an [`Evaluator`].
///
/// `Variation` is implemented for the five supported kinds: `bool`, `f64`, `i64`,
/// `serde_json::Value`, and `String`. It selects the typed [`Evaluator`] operation to call, so
/// decorators can be written once for all kinds.
pub trait Variation: Sized + private::Sealed {
    /// Call the typed detail operation of `evaluator` matching `Self`.
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self>;

    fn to_flag_value(&self) -> FlagValue;

    /// Coerce a flag value into `Self`. Mismatched kinds yield the zero value of `Self`.
    fn from_flag_value(value: &FlagValue) -> Self;
}

impl Variation for bool {
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self> {
        evaluator.bool_variation_detail(key, context, default)
    }

    fn to_flag_value(&self) -> FlagValue {
        FlagValue::Boolean(*self)
    }

    fn from_flag_value(value: &FlagValue) -> Self {
        value.as_boolean().unwrap_or_default()
    }
}

impl Variation for f64 {
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self> {
        evaluator.float64_variation_detail(key, context, default)
    }

    fn to_flag_value(&self) -> FlagValue {
        FlagValue::Numeric(*self)
    }

    fn from_flag_value(value: &FlagValue) -> Self {
        value.as_numeric().unwrap_or_default()
    }
}

impl Variation for i64 {
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self> {
        evaluator.int_variation_detail(key, context, default)
    }

    fn to_flag_value(&self) -> FlagValue {
        FlagValue::Integer(*self)
    }

    fn from_flag_value(value: &FlagValue) -> Self {
        value.as_integer().unwrap_or_default()
    }
}

impl Variation for serde_json::Value {
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self> {
        evaluator.json_variation_detail(key, context, default)
    }

    fn to_flag_value(&self) -> FlagValue {
        FlagValue::Json(self.clone())
    }

    fn from_flag_value(value: &FlagValue) -> Self {
        value.to_json()
    }
}

impl Variation for String {
    fn evaluate<C, E: Evaluator<C> + ?Sized>(
        evaluator: &E,
        key: &str,
        context: &C,
        default: Self,
    ) -> Evaluation<Self> {
        evaluator.string_variation_detail(key, context, default)
    }

    fn to_flag_value(&self) -> FlagValue {
        FlagValue::String(self.clone())
    }

    fn from_flag_value(value: &FlagValue) -> Self {
        value.as_str().unwrap_or_default().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FlagValue, Variation};

    #[test]
    fn serializes_with_type_tag() {
        assert_eq!(
            serde_json::to_value(FlagValue::Boolean(true)).unwrap(),
            json!({"type": "BOOLEAN", "value": true})
        );
        assert_eq!(
            serde_json::to_value(FlagValue::Json(json!({"hello": "world"}))).unwrap(),
            json!({"type": "JSON", "value": {"hello": "world"}})
        );
    }

    #[test]
    fn mismatched_kinds_coerce_to_zero_value() {
        let value = FlagValue::String("on".to_owned());
        assert!(!bool::from_flag_value(&value));
        assert_eq!(f64::from_flag_value(&value), 0.0);
        assert_eq!(i64::from_flag_value(&value), 0);
        assert_eq!(String::from_flag_value(&FlagValue::Boolean(true)), "");
    }

    #[test]
    fn numbers_convert_between_integer_and_numeric() {
        assert_eq!(i64::from_flag_value(&FlagValue::Numeric(2.9)), 2);
        assert_eq!(i64::from_flag_value(&FlagValue::Numeric(-2.9)), -2);
        assert_eq!(f64::from_flag_value(&FlagValue::Integer(7)), 7.0);
        assert_eq!(i64::from_flag_value(&FlagValue::Json(json!(12))), 12);
    }

    #[test]
    fn json_accepts_every_kind() {
        assert_eq!(
            serde_json::Value::from_flag_value(&FlagValue::Integer(3)),
            json!(3)
        );
        assert_eq!(
            serde_json::Value::from_flag_value(&FlagValue::Numeric(f64::NAN)),
            serde_json::Value::Null
        );
        assert_eq!(
            serde_json::Value::from_flag_value(&"text".into()),
            json!("text")
        );
    }
}
