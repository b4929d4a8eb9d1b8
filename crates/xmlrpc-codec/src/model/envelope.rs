//! Top-level document shapes: method calls, responses and faults.

use num_bigint::BigInt;
use thiserror::Error;

use crate::grammar::tags;
use crate::model::builder::MethodCallBuilder;
use crate::model::value::{Struct, Value};

/// A `methodCall` document.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method_name: String,
    /// Parameters in wire order.
    pub params: Vec<Value>,
}

impl MethodCall {
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method_name: method_name.into(),
            params,
        }
    }

    /// Starts a fluent builder for a call to `method_name`.
    pub fn builder(method_name: impl Into<String>) -> MethodCallBuilder {
        MethodCallBuilder::new(method_name)
    }
}

/// A successful `methodResponse` carrying exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResponse {
    pub param: Value,
}

impl MethodResponse {
    pub fn new(param: impl Into<Value>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

/// A `methodResponse` fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fault {fault_code}: {fault_string}")]
pub struct Fault {
    pub fault_code: BigInt,
    pub fault_string: String,
}

impl Fault {
    pub fn new(fault_code: impl Into<BigInt>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
        }
    }

    /// Returns the two-member struct this fault travels as.
    pub fn to_value(&self) -> Value {
        let mut members = Struct::new();
        members.insert(
            tags::FAULT_CODE.to_string(),
            Value::Int(self.fault_code.clone()),
        );
        members.insert(
            tags::FAULT_STRING.to_string(),
            Value::Str(self.fault_string.clone()),
        );
        Value::Struct(members)
    }
}

/// Envelope kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    Call,
    Response,
    Fault,
}

impl EnvelopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopeKind::Call => "call",
            EnvelopeKind::Response => "response",
            EnvelopeKind::Fault => "fault",
        }
    }
}

/// Any complete XML-RPC document.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Call(MethodCall),
    Response(MethodResponse),
    Fault(Fault),
}

impl Envelope {
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Envelope::Call(_) => EnvelopeKind::Call,
            Envelope::Response(_) => EnvelopeKind::Response,
            Envelope::Fault(_) => EnvelopeKind::Fault,
        }
    }

    /// Converts a response envelope into the returned value or the fault.
    ///
    /// Returns `None` for method calls.
    pub fn into_result(self) -> Option<Result<Value, Fault>> {
        match self {
            Envelope::Call(_) => None,
            Envelope::Response(response) => Some(Ok(response.param)),
            Envelope::Fault(fault) => Some(Err(fault)),
        }
    }
}

impl From<MethodCall> for Envelope {
    fn from(call: MethodCall) -> Self {
        Envelope::Call(call)
    }
}

impl From<MethodResponse> for Envelope {
    fn from(response: MethodResponse) -> Self {
        Envelope::Response(response)
    }
}

impl From<Fault> for Envelope {
    fn from(fault: Fault) -> Self {
        Envelope::Fault(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let fault = Fault::new(4, "Too many parameters.");
        assert_eq!(fault.to_string(), "fault 4: Too many parameters.");
    }

    #[test]
    fn test_fault_to_value() {
        let value = Fault::new(-1, "boom").to_value();
        assert_eq!(value.get("faultCode"), Some(&Value::int(-1)));
        assert_eq!(value.get("faultString"), Some(&Value::string("boom")));
    }

    #[test]
    fn test_into_result() {
        let ok = Envelope::from(MethodResponse::new(1));
        assert_eq!(ok.kind(), EnvelopeKind::Response);
        assert_eq!(ok.into_result(), Some(Ok(Value::int(1))));

        let err = Envelope::from(Fault::new(2, "no"));
        assert_eq!(err.into_result(), Some(Err(Fault::new(2, "no"))));

        let call = Envelope::from(MethodCall::new("m", vec![]));
        assert_eq!(call.into_result(), None);
    }
}
