//! Conversions from Rust types into [`Value`].
//!
//! [`ToValue`] lets caller-defined types present themselves as one of the
//! canonical kinds. [`StructLike`] is the narrower view used by
//! [`Foreign`] values that should encode as a struct.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use num_bigint::BigInt;

use crate::model::value::{BinaryRaw, DateTimeRaw, FormattedDouble, Foreign, Struct, Value};

/// Conversion of a borrowed value into an owned [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// A caller type that can be viewed as a list of named members.
pub trait StructLike {
    fn members(&self) -> Vec<(String, Value)>;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(BigInt::from(*self))
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(BigInt::from(value))
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ToValue for BigInt {
    fn to_value(&self) -> Value {
        Value::Int(self.clone())
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Double(f64::from(*self))
    }
}

impl ToValue for FormattedDouble {
    fn to_value(&self) -> Value {
        Value::FormattedDouble(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for DateTimeRaw {
    fn to_value(&self) -> Value {
        Value::DateTime(self.clone())
    }
}

impl ToValue for BinaryRaw {
    fn to_value(&self) -> Value {
        Value::Binary(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Struct(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue, S: BuildHasher> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Struct(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Double(f64::from(value))
    }
}

impl From<FormattedDouble> for Value {
    fn from(value: FormattedDouble) -> Self {
        Value::FormattedDouble(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<DateTimeRaw> for Value {
    fn from(value: DateTimeRaw) -> Self {
        Value::DateTime(value)
    }
}

impl From<BinaryRaw> for Value {
    fn from(value: BinaryRaw) -> Self {
        Value::Binary(value)
    }
}

impl From<Foreign> for Value {
    fn from(value: Foreign) -> Self {
        Value::Foreign(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(members: BTreeMap<String, T>) -> Self {
        Value::Struct(members.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>, S: BuildHasher> From<HashMap<String, T, S>> for Value {
    fn from(members: HashMap<String, T, S>) -> Self {
        Value::Struct(members.into_iter().map(|(k, v)| (k, v.into())).collect::<Struct>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl StructLike for Point {
        fn members(&self) -> Vec<(String, Value)> {
            vec![
                ("x".to_string(), self.x.to_value()),
                ("y".to_string(), self.y.to_value()),
            ]
        }
    }

    #[test]
    fn test_scalar_to_value() {
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(42u8.to_value(), Value::int(42));
        assert_eq!((-7i64).to_value(), Value::int(-7));
        assert_eq!(u128::MAX.to_value(), Value::Int(BigInt::from(u128::MAX)));
        assert_eq!(0.5f32.to_value(), Value::Double(0.5));
        assert_eq!("abc".to_value(), Value::string("abc"));
    }

    #[test]
    fn test_collections_to_value() {
        let none: Option<i32> = None;
        assert_eq!(none.to_value(), Value::Nil);
        assert_eq!(Some(3).to_value(), Value::int(3));

        let items = vec![1, 2, 3];
        assert_eq!(
            items.to_value(),
            Value::Array(vec![Value::int(1), Value::int(2), Value::int(3)])
        );

        let mut map = HashMap::new();
        map.insert("a".to_string(), "b");
        assert_eq!(map.to_value().get("a"), Some(&Value::string("b")));
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(5i32), Value::int(5));
        assert_eq!(Value::from("x"), Value::string("x"));
        assert_eq!(Value::from(None::<bool>), Value::Nil);
        assert_eq!(
            Value::from(vec![true, false]),
            Value::Array(vec![Value::Bool(true), Value::Bool(false)])
        );
    }

    #[test]
    fn test_struct_like_foreign() {
        let foreign = Foreign::from_struct_like(&Point { x: 1, y: 2 });
        let members = foreign.members().unwrap();
        assert_eq!(members[0], ("x".to_string(), Value::int(1)));
        assert_eq!(members[1], ("y".to_string(), Value::int(2)));
        assert_eq!(foreign.repr(), "Point { x: 1, y: 2 }");
    }
}
