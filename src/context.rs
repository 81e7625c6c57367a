//! Evaluation contexts: who a flag is being evaluated for.
//!
//! The decorator treats the evaluation context as opaque and passes it through unchanged. Two
//! representations are provided: [`User`], a plain identity with attributes, and [`Context`], which
//! adds a context kind so that non-user entities (organizations, devices, ...) can be targeted.

use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// An evaluation target that can be named in log records, as [`LogObserver`](crate::LogObserver)
/// does. The decorator itself accepts any context type.
pub trait EvaluationContext {
    /// Key identifying the target. Used in log records.
    fn key(&self) -> &str;
}

/// Type alias for a HashMap representing key-value pairs of attributes.
///
/// # Examples
/// ```
/// # use flaghook::{Attributes, AttributeValue};
/// let attributes = [
///     ("age".to_owned(), 30.0.into()),
///     ("is_premium_member".to_owned(), true.into()),
///     ("username".to_owned(), "john_doe".into()),
/// ].into_iter().collect::<Attributes>();
/// ```
pub type Attributes = HashMap<String, AttributeValue>;

/// Enum representing possible values of an attribute.
///
/// Conveniently implements `From` conversions for `String`, `&str`, `f64`, and `bool` types.
#[derive(Debug, Serialize, Deserialize, PartialEq, PartialOrd, From, Clone)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A string value.
    String(String),
    /// A numerical value.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// A null value or absence of value.
    Null,
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// A user being evaluated.
///
/// ```
/// # use flaghook::User;
/// let user = User::new("user-42").with_attribute("country", "NZ");
/// assert_eq!(user.key(), "user-42");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    key: String,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    attributes: Attributes,
}

impl User {
    pub fn new(key: impl Into<String>) -> User {
        User {
            key: key.into(),
            anonymous: false,
            attributes: Attributes::new(),
        }
    }

    /// A user whose key is not tied to a known identity (e.g., a session id).
    pub fn anonymous(key: impl Into<String>) -> User {
        User {
            anonymous: true,
            ..User::new(key)
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl EvaluationContext for User {
    fn key(&self) -> &str {
        &self.key
    }
}

/// A typed evaluation target. Supersedes [`User`]: a user is a `Context` of kind `"user"`.
///
/// ```
/// # use flaghook::Context;
/// let org = Context::with_kind("organization", "acme")
///     .with_name("Acme Corp.")
///     .with_attribute("seats", 250.0);
/// assert_eq!(org.kind(), "organization");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    kind: String,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    attributes: Attributes,
}

impl Context {
    /// Default context kind.
    pub const DEFAULT_KIND: &'static str = "user";

    /// A context of the default kind.
    pub fn new(key: impl Into<String>) -> Context {
        Context::with_kind(Context::DEFAULT_KIND, key)
    }

    pub fn with_kind(kind: impl Into<String>, key: impl Into<String>) -> Context {
        Context {
            kind: kind.into(),
            key: key.into(),
            name: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl EvaluationContext for Context {
    fn key(&self) -> &str {
        &self.key
    }
}

impl From<User> for Context {
    fn from(user: User) -> Self {
        let mut context = Context::new(user.key);
        context.attributes = user.attributes;
        if user.anonymous {
            context
                .attributes
                .insert("anonymous".to_owned(), AttributeValue::Boolean(true));
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeValue, Context, EvaluationContext, User};

    #[test]
    fn user_converts_into_user_kind_context() {
        let user = User::anonymous("session-1").with_attribute("plan", "free");
        let context = Context::from(user);

        assert_eq!(context.kind(), "user");
        assert_eq!(EvaluationContext::key(&context), "session-1");
        assert_eq!(
            context.attributes().get("plan"),
            Some(&AttributeValue::String("free".to_owned()))
        );
        assert_eq!(
            context.attributes().get("anonymous"),
            Some(&AttributeValue::Boolean(true))
        );
    }

    #[test]
    fn context_deserializes_with_defaults() {
        let context: Context =
            serde_json::from_str(r#"{"kind": "device", "key": "d-1"}"#).unwrap();
        assert_eq!(context, Context::with_kind("device", "d-1"));
        assert_eq!(context.name(), None);
    }
}
