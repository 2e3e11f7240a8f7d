//! Runtime values and bindings for the expression calculator.

use crate::error::CoreError;
use std::collections::HashMap;
use std::fmt;

/// A calculator runtime value. Types follow C-style coercion: booleans
/// coerce to 0/1 in arithmetic, integers widen to reals when mixed with a
/// real operand, and `nil` participates only in equality comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
        }
    }

    pub fn as_f64(&self) -> Result<f64, CoreError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Real(r) => Ok(*r),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(CoreError::Runtime(format!(
                "cannot coerce {} to a number",
                other.type_name()
            ))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, CoreError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Real(r) => Ok(*r != 0.0),
            other => Err(CoreError::Runtime(format!(
                "cannot coerce {} to a boolean",
                other.type_name()
            ))),
        }
    }

    pub fn as_i64(&self) -> Result<i64, CoreError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
            Value::Real(r) if r.fract() == 0.0 => Ok(*r as i64),
            other => Err(CoreError::Runtime(format!(
                "expected an integer, found {}",
                other.type_name()
            ))),
        }
    }

    /// True if evaluating this value to an integer would not lose
    /// information; used by `PostUpdater` to enforce integer assignments.
    pub fn is_integral(&self) -> bool {
        matches!(self, Value::Int(_))
            || matches!(self, Value::Real(r) if r.fract() == 0.0)
            || matches!(self, Value::Bool(_))
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_) | Value::Bool(_))
    }

    pub(crate) fn both_numeric(a: &Value, b: &Value) -> bool {
        a.is_numeric() && b.is_numeric()
    }

    pub(crate) fn either_real(a: &Value, b: &Value) -> bool {
        matches!(a, Value::Real(_)) || matches!(b, Value::Real(_))
    }
}

/// Binds place/variable names to runtime values for expression evaluation.
/// A bare identifier in an enabling function, post-updater expression, or
/// clock-rate expression evaluates to whatever this returns for its name.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// A plain name -> value table, useful for tests and for composing rate
/// expressions that reference auxiliary parameters alongside place counts.
#[derive(Debug, Default, Clone)]
pub struct VarBindings(pub HashMap<String, Value>);

impl VarBindings {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }
}

impl Bindings for VarBindings {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }
}
