use std::cmp::Ordering;

use serde_json::Value;
use thiserror::Error;

use crate::Properties;
use super::parser::{
	CompareOp,
	Expr,
};


/// Why a query could not be evaluated against one candidate.
///
/// Registry lookups treat all of these as "does not match".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
	#[error("name `{0}` is not defined")]
	UnknownName(String),
	#[error("value has no member `{0}`")]
	MissingMember(String),
	#[error("index {0} is out of range")]
	IndexOutOfRange(i64),
	#[error("cannot index {target} with {index}")]
	BadIndex {
		target: &'static str,
		index: &'static str,
	},
	#[error("cannot compare {lhs} with {rhs} using `{op}`")]
	Incomparable {
		op: &'static str,
		lhs: &'static str,
		rhs: &'static str,
	},
	#[error("cannot negate {0}")]
	BadNegation(&'static str),
}

pub(crate) fn evaluate(expr: &Expr, namespace: &Properties) -> Result<Value, EvalError> {
	return match expr {
		Expr::Literal(value) => Ok(value.clone()),
		Expr::Name(name) => match namespace.get(name) {
			Some(value) => Ok(value.clone()),
			None => Err(EvalError::UnknownName(name.clone())),
		},
		Expr::Member(target, member) => match evaluate(target, namespace)? {
			Value::Object(mut fields) => match fields.remove(member) {
				Some(value) => Ok(value),
				None => Err(EvalError::MissingMember(member.clone())),
			},
			_ => Err(EvalError::MissingMember(member.clone())),
		},
		Expr::Index(target, index) => {
			let target = evaluate(target, namespace)?;
			let index = evaluate(index, namespace)?;
			index_value(target, &index)
		},
		Expr::List(items) => {
			let mut values = Vec::with_capacity(items.len());
			for item in items {
				values.push(evaluate(item, namespace)?);
			}
			Ok(Value::Array(values))
		},
		Expr::Neg(operand) => match evaluate(operand, namespace)? {
			Value::Number(number) => {
				if let Some(int) = number.as_i64().and_then(i64::checked_neg) {
					Ok(Value::from(int))
				} else {
					Ok(Value::from(-number.as_f64().unwrap_or(f64::NAN)))
				}
			},
			other => Err(EvalError::BadNegation(kind(&other))),
		},
		Expr::Not(operand) => Ok(Value::Bool(!truthy(&evaluate(operand, namespace)?))),

		// `and`/`or` short-circuit and yield an operand, not a bool
		Expr::And(lhs, rhs) => {
			let lhs = evaluate(lhs, namespace)?;
			if truthy(&lhs) {
				evaluate(rhs, namespace)
			} else {
				Ok(lhs)
			}
		},
		Expr::Or(lhs, rhs) => {
			let lhs = evaluate(lhs, namespace)?;
			if truthy(&lhs) {
				Ok(lhs)
			} else {
				evaluate(rhs, namespace)
			}
		},
		Expr::Compare(op, lhs, rhs) => {
			let lhs = evaluate(lhs, namespace)?;
			let rhs = evaluate(rhs, namespace)?;
			compare(*op, &lhs, &rhs).map(Value::Bool)
		},
	};
}

/// Null, false, zero and empty values are false; everything else is true
pub(crate) fn truthy(value: &Value) -> bool {
	return match value {
		Value::Null => false,
		Value::Bool(value) => *value,
		Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
		Value::String(value) => !value.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(fields) => !fields.is_empty(),
	};
}

fn kind(value: &Value) -> &'static str {
	return match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	};
}

fn index_value(target: Value, index: &Value) -> Result<Value, EvalError> {
	return match (target, index) {
		(Value::Array(mut items), Value::Number(number)) => {
			let position = match number.as_i64() {
				Some(position) => position,
				None => return Err(EvalError::BadIndex { target: "array", index: "non-integer number" }),
			};
			// Negative positions count from the end
			let resolved = if position < 0 { position + items.len() as i64 } else { position };
			if resolved < 0 || resolved >= items.len() as i64 {
				return Err(EvalError::IndexOutOfRange(position));
			}
			Ok(items.swap_remove(resolved as usize))
		},
		(Value::Object(mut fields), Value::String(key)) => match fields.remove(key) {
			Some(value) => Ok(value),
			None => Err(EvalError::MissingMember(key.clone())),
		},
		(target, index) => Err(EvalError::BadIndex { target: kind(&target), index: kind(index) }),
	};
}

pub(crate) fn values_equal(lhs: &Value, rhs: &Value) -> bool {
	return match (lhs, rhs) {
		(Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
			(Some(a), Some(b)) => a == b,
			_ => a.as_f64() == b.as_f64(),
		},
		(Value::Array(a), Value::Array(b)) => {
			a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| values_equal(a, b))
		},
		(Value::Object(a), Value::Object(b)) => {
			a.len() == b.len() && a.iter().all(|(key, a)| b.get(key).map(|b| values_equal(a, b)).unwrap_or(false))
		},
		(a, b) => a == b,
	};
}

/// Orders two values of the same orderable kind, or `None` if they can't be ordered
pub(crate) fn order_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
	return match (lhs, rhs) {
		(Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
			(Some(a), Some(b)) => Some(a.cmp(&b)),
			_ => a.as_f64()?.partial_cmp(&b.as_f64()?),
		},
		(Value::String(a), Value::String(b)) => Some(a.cmp(b)),
		(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
		_ => None,
	};
}

fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
	let ordered = |symbol: &'static str, accept: fn(Ordering) -> bool| -> Result<bool, EvalError> {
		return match order_values(lhs, rhs) {
			Some(ordering) => Ok(accept(ordering)),
			None => Err(EvalError::Incomparable { op: symbol, lhs: kind(lhs), rhs: kind(rhs) }),
		};
	};

	return match op {
		CompareOp::Eq => Ok(values_equal(lhs, rhs)),
		CompareOp::NotEq => Ok(!values_equal(lhs, rhs)),
		CompareOp::Lt => ordered("<", Ordering::is_lt),
		CompareOp::LtEq => ordered("<=", Ordering::is_le),
		CompareOp::Gt => ordered(">", Ordering::is_gt),
		CompareOp::GtEq => ordered(">=", Ordering::is_ge),
		CompareOp::In => contains(lhs, rhs),
		CompareOp::NotIn => contains(lhs, rhs).map(|found| !found),
	};
}

/// Evaluates `needle in haystack`
fn contains(needle: &Value, haystack: &Value) -> Result<bool, EvalError> {
	return match (needle, haystack) {
		(needle, Value::Array(items)) => Ok(items.iter().any(|item| values_equal(needle, item))),
		(Value::String(needle), Value::String(haystack)) => Ok(haystack.contains(needle.as_str())),
		(Value::String(key), Value::Object(fields)) => Ok(fields.contains_key(key)),
		(needle, haystack) => Err(EvalError::Incomparable { op: "in", lhs: kind(needle), rhs: kind(haystack) }),
	};
}
