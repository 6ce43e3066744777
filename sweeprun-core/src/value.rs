//! Value model shared by parameters, auxiliary data and table cells.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A displayable scalar stored in records and table cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Optional capability: a parameter value that reports extra metrics for
/// statistics rows. Queried with the elapsed run time in seconds.
pub trait Diagnostics {
    fn diagnostics(&self, elapsed_secs: f64) -> Record;
}

/// A non-scalar parameter value, e.g. a temperature schedule.
pub trait SweepComponent: fmt::Debug + Send + Sync + Any {
    /// Compact display form used in parameter columns and banners.
    fn short_name(&self) -> String;

    /// Returns the diagnostics capability when this component has one.
    fn diagnostics(&self) -> Option<&dyn Diagnostics> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// A concrete value bound to one sweep option.
#[derive(Clone)]
pub enum ParamValue {
    Scalar(Value),
    Component(Arc<dyn SweepComponent>),
}

impl ParamValue {
    pub fn component<C: SweepComponent>(component: C) -> Self {
        ParamValue::Component(Arc::new(component))
    }

    /// Display form written into records.
    pub fn display_value(&self) -> Value {
        match self {
            ParamValue::Scalar(v) => v.clone(),
            ParamValue::Component(c) => Value::Text(c.short_name()),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ParamValue::Scalar(v) => Some(v),
            ParamValue::Component(_) => None,
        }
    }

    /// Downcast a component value to its concrete type.
    pub fn downcast<T: SweepComponent>(&self) -> Option<&T> {
        match self {
            ParamValue::Component(c) => c.as_any().downcast_ref::<T>(),
            ParamValue::Scalar(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&dyn Diagnostics> {
        match self {
            ParamValue::Component(c) => c.diagnostics(),
            ParamValue::Scalar(_) => None,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => write!(f, "{v:?}"),
            ParamValue::Component(c) => write!(f, "{c:?}"),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_value())
    }
}

macro_rules! scalar_param_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_param_from!(Value, bool, i64, i32, usize, f64, &str, String);
