//! Shared binary/unary operator semantics, called identically by
//! `glint-eval` and `glint-vm`. This resolves `spec.md` §9's first Open
//! Question: the source has `Evaluator` and `VM` each reimplement operator
//! semantics; here there is exactly one implementation, living below both
//! consumers in the dependency graph.

use std::rc::Rc;

use glint_lex::TokenKind;
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Error)]
pub enum OpError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("bitwise operator requires integer operands, got {left} and {right}")]
    BitwiseNonInt {
        left: &'static str,
        right: &'static str,
    },
    #[error("'{op}' requires a numeric operand, got {operand}")]
    UnaryNonNumeric {
        op: &'static str,
        operand: &'static str,
    },
    #[error("index operator requires a vector on the left and an int on the right")]
    BadIndex,
    #[error("vector index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: i64, len: usize },
}

/// Exponentiation by squaring with an 8-bit exponent, per `spec.md` §4.7.
pub fn ipow(mut base: i64, mut exp: u8) -> i64 {
    let mut result: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        exp >>= 1;
        if exp > 0 {
            base = base.wrapping_mul(base);
        }
    }
    result
}

fn int_floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f32 == *b,
        (Value::Vec(a), Value::Vec(b)) => {
            Rc::ptr_eq(a, b) || {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
            }
        }
        (Value::ClassInstance(a), Value::ClassInstance(b)) => Rc::ptr_eq(a, b),
        (Value::NullOp, Value::NullOp) => true,
        _ => false,
    }
}

fn numeric_order(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        _ => {
            let (a, b) = (as_f32(left)?, as_f32(right)?);
            a.partial_cmp(&b)
        }
    }
}

fn as_f32(v: &Value) -> Option<f32> {
    match v {
        Value::Int(i) => Some(*i as f32),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn both_int(left: &Value, right: &Value) -> Option<(i64, i64)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some((*a, *b)),
        _ => None,
    }
}

/// Applies a binary operator to two already-evaluated operands. `op` must
/// be one of the binary opcodes (`TokenKind::is_binary_op`); `Dot` is
/// handled separately by the evaluator/compiler since member access needs
/// the unevaluated field/method name, not a `Value`.
pub fn eval_binary_op(left: &Value, right: &Value, op: TokenKind) -> Result<Value, OpError> {
    match op {
        TokenKind::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => numeric_binop(left, right, "+", |a, b| a.wrapping_add(b), |a, b| a + b),
        },
        TokenKind::Sub => numeric_binop(left, right, "-", |a, b| a.wrapping_sub(b), |a, b| a - b),
        TokenKind::Mul => numeric_binop(left, right, "*", |a, b| a.wrapping_mul(b), |a, b| a * b),
        TokenKind::Div => {
            if is_zero(right) {
                return Err(OpError::DivisionByZero);
            }
            numeric_binop(left, right, "/", |a, b| a.wrapping_div(b), |a, b| a / b)
        }
        TokenKind::Mod => {
            if is_zero(right) {
                return Err(OpError::DivisionByZero);
            }
            numeric_binop(left, right, "%", |a, b| a.wrapping_rem(b), |a, b| a % b)
        }
        TokenKind::FloorDiv => {
            if is_zero(right) {
                return Err(OpError::DivisionByZero);
            }
            numeric_binop(left, right, "//", int_floor_div, |a, b| (a / b).floor())
        }
        TokenKind::Pow => numeric_binop(
            left,
            right,
            "**",
            |a, b| ipow(a, b as u8),
            |a, b| a.powf(b),
        ),
        TokenKind::BitAnd => int_binop(left, right, "&", |a, b| a & b),
        TokenKind::BitOr => int_binop(left, right, "|", |a, b| a | b),
        TokenKind::BitXor => int_binop(left, right, "^", |a, b| a ^ b),
        TokenKind::LShift => int_binop(left, right, "<<", |a, b| a << (b & 63)),
        TokenKind::RShift => int_binop(left, right, ">>", |a, b| a >> (b & 63)),
        TokenKind::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        TokenKind::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        TokenKind::EqEq => Ok(Value::Bool(values_equal(left, right))),
        TokenKind::NotEq => Ok(Value::Bool(!values_equal(left, right))),
        TokenKind::Less | TokenKind::LessEq | TokenKind::Greater | TokenKind::GreaterEq => {
            let ord = numeric_order(left, right).ok_or_else(|| OpError::TypeMismatch {
                op: "comparison",
                left: left.type_name(),
                right: right.type_name(),
            })?;
            use std::cmp::Ordering::*;
            Ok(Value::Bool(match op {
                TokenKind::Less => ord == Less,
                TokenKind::LessEq => ord != Greater,
                TokenKind::Greater => ord == Greater,
                TokenKind::GreaterEq => ord != Less,
                _ => unreachable!(),
            }))
        }
        TokenKind::Index => eval_index(left, right),
        other => unreachable!("eval_binary_op called with non-binary opcode {other:?}"),
    }
}

fn is_zero(v: &Value) -> bool {
    matches!(v, Value::Int(0)) || matches!(v, Value::Float(f) if *f == 0.0)
}

fn numeric_binop(
    left: &Value,
    right: &Value,
    op: &'static str,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f32, f32) -> f32,
) -> Result<Value, OpError> {
    if let Some((a, b)) = both_int(left, right) {
        return Ok(Value::Int(int_op(a, b)));
    }
    match (as_f32(left), as_f32(right)) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(OpError::TypeMismatch {
            op,
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn int_binop(
    left: &Value,
    right: &Value,
    op: &'static str,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value, OpError> {
    match both_int(left, right) {
        Some((a, b)) => Ok(Value::Int(f(a, b))),
        None => {
            let _ = op;
            Err(OpError::BitwiseNonInt {
                left: left.type_name(),
                right: right.type_name(),
            })
        }
    }
}

fn eval_index(left: &Value, right: &Value) -> Result<Value, OpError> {
    let (vec, idx) = match (left, right) {
        (Value::Vec(v), Value::Int(i)) => (v, *i),
        _ => return Err(OpError::BadIndex),
    };
    let borrowed = vec.borrow();
    let len = borrowed.len();
    let resolved = if idx < 0 { idx + len as i64 } else { idx };
    if resolved < 0 || resolved as usize >= len {
        return Err(OpError::IndexOutOfBounds { index: idx, len });
    }
    Ok(borrowed[resolved as usize].clone())
}

/// Applies a unary operator to an already-evaluated operand. `++`/`--`
/// compute the new value; the caller is responsible for writing it back
/// to the underlying variable (an lvalue requirement glint-value itself
/// has no notion of).
pub fn eval_unary_op(operand: &Value, op: TokenKind) -> Result<Value, OpError> {
    match op {
        TokenKind::Not => Ok(Value::Bool(!operand.is_truthy())),
        TokenKind::BitNot => match operand {
            Value::Int(i) => Ok(Value::Int(!i)),
            other => Err(OpError::UnaryNonNumeric {
                op: "!!",
                operand: other.type_name(),
            }),
        },
        TokenKind::Negate => match operand {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(OpError::UnaryNonNumeric {
                op: "-",
                operand: other.type_name(),
            }),
        },
        TokenKind::Increment => bump(operand, 1, "++"),
        TokenKind::Decrement => bump(operand, -1, "--"),
        other => unreachable!("eval_unary_op called with non-unary opcode {other:?}"),
    }
}

fn bump(operand: &Value, delta: i64, op: &'static str) -> Result<Value, OpError> {
    match operand {
        Value::Int(i) => Ok(Value::Int(i + delta)),
        Value::Float(f) => Ok(Value::Float(f + delta as f32)),
        other => Err(OpError::UnaryNonNumeric {
            op,
            operand: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_promotion_stays_int() {
        let r = eval_binary_op(&Value::Int(2), &Value::Int(3), TokenKind::Add).unwrap();
        assert!(matches!(r, Value::Int(5)));
    }

    #[test]
    fn mixed_numeric_widens_to_float() {
        let r = eval_binary_op(&Value::Int(2), &Value::Float(1.5), TokenKind::Add).unwrap();
        match r {
            Value::Float(f) => assert!((f - 3.5).abs() < 1e-6),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn string_add_concatenates() {
        let r = eval_binary_op(
            &Value::String("a".into()),
            &Value::String("b".into()),
            TokenKind::Add,
        )
        .unwrap();
        match r {
            Value::String(s) => assert_eq!(s, "ab"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn div_by_zero_errors() {
        let r = eval_binary_op(&Value::Int(1), &Value::Int(0), TokenKind::Div);
        assert!(matches!(r, Err(OpError::DivisionByZero)));
    }

    #[test]
    fn mismatched_types_error() {
        let r = eval_binary_op(&Value::Int(1), &Value::String("x".into()), TokenKind::Add);
        assert!(r.is_err());
    }

    #[test]
    fn ipow_matches_exponentiation_by_squaring() {
        assert_eq!(ipow(2, 10), 1024);
        assert_eq!(ipow(3, 0), 1);
    }

    #[test]
    fn eqeq_coerces_int_float() {
        assert!(
            eval_binary_op(&Value::Int(2), &Value::Float(2.0), TokenKind::EqEq).unwrap().is_truthy()
        );
    }

    #[test]
    fn index_reads_vector_element() {
        let v = Value::vec_from(vec![Value::Int(10), Value::Int(20)]);
        let r = eval_binary_op(&v, &Value::Int(1), TokenKind::Index).unwrap();
        assert!(matches!(r, Value::Int(20)));
    }

    #[test]
    fn unary_negate_and_increment() {
        assert!(matches!(
            eval_unary_op(&Value::Int(5), TokenKind::Negate).unwrap(),
            Value::Int(-5)
        ));
        assert!(matches!(
            eval_unary_op(&Value::Int(5), TokenKind::Increment).unwrap(),
            Value::Int(6)
        ));
    }
}
