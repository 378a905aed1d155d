use crate::PortError;
use serde::{Deserialize, Serialize};

/// Dynamic value stored on the blackboard.
///
/// The tag is the value's dynamic type; extraction through [`PortValue`]
/// fails (it never aborts) when the tag does not match the requested type.
/// `String` doubles as the textual representation used for late coercion:
/// a text entry can be read back as any parseable type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Json(serde_json::Value),
}

impl Value {
    /// Name of the dynamic type tag, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Uint(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            Value::Uint(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Uint(n as u64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Double(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

/// Types that can travel through a port: extracted from a stored [`Value`],
/// written back as one, or parsed from the text of a literal binding.
///
/// `from_value` returns `None` on a dynamic type mismatch rather than
/// panicking; the port layer turns that into a [`PortError::TypeMismatch`].
pub trait PortValue: Sized + Clone + Send + 'static {
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;

    fn parse_text(text: &str) -> Result<Self, PortError>;
}

macro_rules! impl_port_value_int {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl PortValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(*n).ok(),
                        Value::Uint(n) => <$ty>::try_from(*n).ok(),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::from(self)
                }

                fn parse_text(text: &str) -> Result<Self, PortError> {
                    text.trim().parse::<$ty>().map_err(|_| PortError::Parse {
                        text: text.to_string(),
                        target: Self::TYPE_NAME,
                    })
                }
            }
        )*
    };
}

impl_port_value_int! {
    i32 => "int32",
    i64 => "int64",
    u32 => "uint32",
    u64 => "uint64",
}

macro_rules! impl_port_value_float {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl PortValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_f64().map(|n| n as $ty)
                }

                fn into_value(self) -> Value {
                    Value::from(self)
                }

                fn parse_text(text: &str) -> Result<Self, PortError> {
                    text.trim().parse::<$ty>().map_err(|_| PortError::Parse {
                        text: text.to_string(),
                        target: Self::TYPE_NAME,
                    })
                }
            }
        )*
    };
}

impl_port_value_float! {
    f32 => "float",
    f64 => "double",
}

impl PortValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn parse_text(text: &str) -> Result<Self, PortError> {
        let trimmed = text.trim();
        if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(PortError::Parse {
                text: text.to_string(),
                target: Self::TYPE_NAME,
            })
        }
    }
}

impl PortValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn parse_text(text: &str) -> Result<Self, PortError> {
        Ok(text.to_string())
    }
}

impl PortValue for serde_json::Value {
    const TYPE_NAME: &'static str = "json";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_json().cloned()
    }

    fn into_value(self) -> Value {
        Value::Json(self)
    }

    fn parse_text(text: &str) -> Result<Self, PortError> {
        serde_json::from_str(text).map_err(|_| PortError::Parse {
            text: text.to_string(),
            target: Self::TYPE_NAME,
        })
    }
}

impl PortValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }

    fn parse_text(text: &str) -> Result<Self, PortError> {
        Ok(Value::String(text.to_string()))
    }
}
