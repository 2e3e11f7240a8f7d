//! Evaluator for the Lello expression AST.

use super::ast::{BinOp, Expr, UnaryOp};
use super::value::{Bindings, Value};
use crate::error::CoreError;

pub fn eval(expr: &Expr, bindings: &dyn Bindings) -> Result<Value, CoreError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Ident(name) => bindings
            .lookup(name)
            .ok_or_else(|| CoreError::Runtime(format!("unbound identifier '{name}'"))),
        Expr::Unary(op, inner) => eval_unary(*op, eval(inner, bindings)?),
        Expr::Binary(op, lhs, rhs) => {
            // Short-circuit && / || before evaluating the right operand.
            match op {
                BinOp::And => {
                    let l = eval(lhs, bindings)?.as_bool()?;
                    if !l {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(eval(rhs, bindings)?.as_bool()?))
                }
                BinOp::Or => {
                    let l = eval(lhs, bindings)?.as_bool()?;
                    if l {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(eval(rhs, bindings)?.as_bool()?))
                }
                _ => eval_binary(*op, eval(lhs, bindings)?, eval(rhs, bindings)?),
            }
        }
        Expr::Call(name, args) => {
            let values = args
                .iter()
                .map(|a| eval(a, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            eval_call(name, &values)
        }
    }
}

fn eval_unary(op: UnaryOp, v: Value) -> Result<Value, CoreError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!v.as_bool()?)),
        UnaryOp::Pos => match v {
            Value::Int(_) | Value::Real(_) => Ok(v),
            other => Ok(Value::Real(other.as_f64()?)),
        },
        UnaryOp::Neg => match v {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Real(r) => Ok(Value::Real(-r)),
            other => Ok(Value::Real(-other.as_f64()?)),
        },
    }
}

fn eval_binary(op: BinOp, l: Value, r: Value) -> Result<Value, CoreError> {
    use BinOp::*;
    match op {
        Eq => Ok(Value::Bool(values_equal(&l, &r))),
        Ne => Ok(Value::Bool(!values_equal(&l, &r))),
        Lt | Le | Gt | Ge => eval_relational(op, l, r),
        Add if matches!((&l, &r), (Value::Str(_), _)) || matches!((&l, &r), (_, Value::Str(_))) => {
            Ok(Value::Str(format!("{l}{r}")))
        }
        Add | Sub | Mul | Mod => eval_arith(op, l, r),
        Div => eval_div(l, r),
        Pow => eval_pow(l, r),
        And | Or => unreachable!("short-circuited above"),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Nil, Value::Nil) => true,
        (Value::Nil, _) | (_, Value::Nil) => false,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Str(_), _) | (_, Value::Str(_)) => false,
        _ if Value::both_numeric(l, r) => l.as_f64().unwrap_or(f64::NAN) == r.as_f64().unwrap_or(f64::NAN),
        _ => false,
    }
}

fn eval_relational(op: BinOp, l: Value, r: Value) -> Result<Value, CoreError> {
    let ordering = match (&l, &r) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ if Value::both_numeric(&l, &r) => {
            let (a, b) = (l.as_f64()?, r.as_f64()?);
            a.partial_cmp(&b)
                .ok_or_else(|| CoreError::Runtime("NaN in relational comparison".into()))?
        }
        _ => {
            return Err(CoreError::Runtime(format!(
                "cannot compare {} with {}",
                l.type_name(),
                r.type_name()
            )))
        }
    };
    use std::cmp::Ordering::*;
    use BinOp::*;
    let result = match op {
        Lt => ordering == Less,
        Le => ordering != Greater,
        Gt => ordering == Greater,
        Ge => ordering != Less,
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn eval_arith(op: BinOp, l: Value, r: Value) -> Result<Value, CoreError> {
    if !Value::both_numeric(&l, &r) {
        return Err(CoreError::Runtime(format!(
            "arithmetic on non-numeric operands: {} and {}",
            l.type_name(),
            r.type_name()
        )));
    }
    if Value::either_real(&l, &r) {
        let (a, b) = (l.as_f64()?, r.as_f64()?);
        let out = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            // IEEE-754-conformant modulus for reals.
            BinOp::Mod => a % b,
            _ => unreachable!(),
        };
        Ok(Value::Real(out))
    } else {
        let (a, b) = (l.as_i64()?, r.as_i64()?);
        let out = match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::Mod => {
                if b == 0 {
                    return Err(CoreError::Runtime("modulus by zero".into()));
                }
                a % b
            }
            _ => unreachable!(),
        };
        Ok(Value::Int(out))
    }
}

fn eval_div(l: Value, r: Value) -> Result<Value, CoreError> {
    if !Value::both_numeric(&l, &r) {
        return Err(CoreError::Runtime(format!(
            "division on non-numeric operands: {} and {}",
            l.type_name(),
            r.type_name()
        )));
    }
    if Value::either_real(&l, &r) {
        Ok(Value::Real(l.as_f64()? / r.as_f64()?))
    } else {
        let (a, b) = (l.as_i64()?, r.as_i64()?);
        if b == 0 {
            return Err(CoreError::Runtime("division by zero".into()));
        }
        // Integer/integer division truncates, C-style.
        Ok(Value::Int(a / b))
    }
}

fn eval_pow(l: Value, r: Value) -> Result<Value, CoreError> {
    if !Value::both_numeric(&l, &r) {
        return Err(CoreError::Runtime(format!(
            "exponentiation on non-numeric operands: {} and {}",
            l.type_name(),
            r.type_name()
        )));
    }
    if let (Value::Int(base), Value::Int(exp)) = (&l, &r) {
        if *exp >= 0 {
            return Ok(Value::Int(base.pow(*exp as u32)));
        }
    }
    Ok(Value::Real(l.as_f64()?.powf(r.as_f64()?)))
}

fn eval_call(name: &str, args: &[Value]) -> Result<Value, CoreError> {
    match (name, args) {
        ("max", [a, b]) => {
            if a.as_f64()? >= b.as_f64()? {
                Ok(a.clone())
            } else {
                Ok(b.clone())
            }
        }
        ("min", [a, b]) => {
            if a.as_f64()? <= b.as_f64()? {
                Ok(a.clone())
            } else {
                Ok(b.clone())
            }
        }
        ("abs", [a]) => match a {
            Value::Int(i) => Ok(Value::Int(i.abs())),
            other => Ok(Value::Real(other.as_f64()?.abs())),
        },
        (other, args) => Err(CoreError::Runtime(format!(
            "unknown function '{other}' with {} argument(s)",
            args.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;
    use crate::expr::value::VarBindings;

    fn eval_str(src: &str, bindings: &dyn Bindings) -> Value {
        eval(&parse(src).unwrap(), bindings).unwrap()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval_str("1 + 2 * 3", &VarBindings::new()), Value::Int(7));
    }

    #[test]
    fn integer_division_truncates() {
        assert_eq!(eval_str("7 / 2", &VarBindings::new()), Value::Int(3));
    }

    #[test]
    fn mixed_real_division() {
        assert_eq!(eval_str("7.0 / 2", &VarBindings::new()), Value::Real(3.5));
    }

    #[test]
    fn relational_and_logic() {
        let b = VarBindings::new().with("p0", Value::Int(3));
        assert_eq!(eval_str("p0 > 1 && p0 < 10", &b), Value::Bool(true));
        assert_eq!(eval_str("p0 == 3 || p0 == 4", &b), Value::Bool(true));
    }

    #[test]
    fn short_circuit_or_skips_unbound_rhs() {
        let b = VarBindings::new().with("p0", Value::Int(1));
        assert_eq!(eval_str("p0 == 1 || unbound == 1", &b), Value::Bool(true));
    }

    #[test]
    fn unbound_identifier_is_runtime_error() {
        assert!(eval(&parse("p0").unwrap(), &VarBindings::new()).is_err());
    }
}
