//! Builder API for ergonomic call and struct construction.
//!
//! # Example
//!
//! ```rust
//! use xmlrpc_codec::model::builder::MethodCallBuilder;
//!
//! let call = MethodCallBuilder::new("blog.newPost")
//!     .param(1)
//!     .param("alice")
//!     .struct_param(|s| s
//!         .member("title", "Hello")
//!         .member("published", true)
//!     )
//!     .build();
//!
//! assert_eq!(call.params.len(), 3);
//! ```

use crate::model::envelope::MethodCall;
use crate::model::value::{Struct, Value};

/// Builder for constructing a [`MethodCall`].
#[derive(Debug, Clone)]
pub struct MethodCallBuilder {
    method_name: String,
    params: Vec<Value>,
}

impl MethodCallBuilder {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Appends several parameters in iteration order.
    pub fn params(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    /// Appends a struct parameter built with a [`StructBuilder`].
    pub fn struct_param<F>(mut self, f: F) -> Self
    where
        F: FnOnce(StructBuilder) -> StructBuilder,
    {
        self.params.push(f(StructBuilder::new()).into_value());
        self
    }

    pub fn build(self) -> MethodCall {
        MethodCall {
            method_name: self.method_name,
            params: self.params,
        }
    }
}

/// Builder for struct values.
///
/// Setting a member twice keeps the last value, matching how duplicate
/// member names are decoded.
#[derive(Debug, Clone, Default)]
pub struct StructBuilder {
    members: Struct,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Adds a nested struct member.
    pub fn nested<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(StructBuilder) -> StructBuilder,
    {
        let nested = f(StructBuilder::new()).into_value();
        self.member(name, nested)
    }

    pub fn build(self) -> Struct {
        self.members
    }

    pub fn into_value(self) -> Value {
        Value::Struct(self.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_call_builder_order() {
        let call = MethodCallBuilder::new("sum")
            .param(1)
            .params([2, 3])
            .param(Value::Nil)
            .build();

        assert_eq!(call.method_name, "sum");
        assert_eq!(
            call.params,
            vec![Value::int(1), Value::int(2), Value::int(3), Value::Nil]
        );
    }

    #[test]
    fn test_struct_builder_nested() {
        let members = StructBuilder::new()
            .member("name", "Alice")
            .nested("address", |a| a.member("city", "Paris"))
            .build();

        assert_eq!(members.get("name"), Some(&Value::string("Alice")));
        let address = members.get("address").unwrap();
        assert_eq!(address.get("city"), Some(&Value::string("Paris")));
    }

    #[test]
    fn test_struct_builder_last_member_wins() {
        let members = StructBuilder::new().member("k", 1).member("k", 2).build();
        assert_eq!(members.len(), 1);
        assert_eq!(members.get("k"), Some(&Value::int(2)));
    }
}
